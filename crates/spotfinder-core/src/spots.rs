//! Per-floor spot layout for a parking facility.

use serde::Serialize;

use crate::locations::LocationRecord;
use crate::CoreError;

pub const DEFAULT_SPOTS_PER_FLOOR: u32 = 20;

/// Spots shown per row in the floor grid.
pub const SPOTS_PER_ROW: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotStatus {
    Available,
    Occupied,
    Selected,
    Disabled,
}

impl std::fmt::Display for SpotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpotStatus::Available => write!(f, "available"),
            SpotStatus::Occupied => write!(f, "occupied"),
            SpotStatus::Selected => write!(f, "selected"),
            SpotStatus::Disabled => write!(f, "disabled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParkingSpot {
    pub id: String,
    pub floor: u32,
    pub status: SpotStatus,
}

impl ParkingSpot {
    /// Mark this spot as the user's pick.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SpotUnavailable`] unless the spot is `Available`
    /// (or already `Selected`).
    pub fn select(&mut self) -> Result<(), CoreError> {
        match self.status {
            SpotStatus::Available | SpotStatus::Selected => {
                self.status = SpotStatus::Selected;
                Ok(())
            }
            SpotStatus::Occupied | SpotStatus::Disabled => Err(CoreError::SpotUnavailable {
                spot_id: self.id.clone(),
            }),
        }
    }
}

/// Display id of a spot, e.g. `F2-07`.
#[must_use]
pub fn spot_id(floor: u32, index: u32) -> String {
    format!("F{floor}-{index:02}")
}

/// Spread the facility's available spots across its floors.
///
/// Earlier floors take the remainder; each floor is capped at
/// `spots_per_floor`.
#[must_use]
pub fn available_per_floor(location: &LocationRecord, spots_per_floor: u32) -> Vec<u32> {
    let floors = location.floors;
    if floors == 0 {
        return Vec::new();
    }
    let available = location.available_spots();
    let base = available / floors;
    let remainder = available % floors;

    (0..floors)
        .map(|i| {
            let share = base + u32::from(i < remainder);
            share.min(spots_per_floor)
        })
        .collect()
}

/// Build the spot grid for one floor (1-based).
///
/// # Errors
///
/// Returns [`CoreError::FloorOutOfRange`] when `floor` is not in
/// `1..=location.floors`.
pub fn floor_layout(
    location: &LocationRecord,
    floor: u32,
    spots_per_floor: u32,
) -> Result<Vec<ParkingSpot>, CoreError> {
    if floor == 0 || floor > location.floors {
        return Err(CoreError::FloorOutOfRange {
            id: location.id.clone(),
            floor,
            floors: location.floors,
        });
    }

    let free = available_per_floor(location, spots_per_floor)
        .get((floor - 1) as usize)
        .copied()
        .unwrap_or(0);

    Ok((1..=spots_per_floor)
        .map(|index| ParkingSpot {
            id: spot_id(floor, index),
            floor,
            status: if index <= free {
                SpotStatus::Available
            } else {
                SpotStatus::Occupied
            },
        })
        .collect())
}

/// Group spots into display rows of `per_row`.
#[must_use]
pub fn spot_rows(spots: &[ParkingSpot], per_row: usize) -> Vec<&[ParkingSpot]> {
    spots.chunks(per_row.max(1)).collect()
}
