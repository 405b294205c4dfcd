//! Parking location records and their distance-annotated projection.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `true` when both components are finite and inside their degree ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// Spot counts for a facility. `available <= total` holds for every value of
/// this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Availability {
    total: u32,
    available: u32,
}

impl Availability {
    /// # Errors
    ///
    /// Returns [`CoreError::AvailabilityExceedsCapacity`] when `available > total`.
    pub fn new(total: u32, available: u32) -> Result<Self, CoreError> {
        if available > total {
            return Err(CoreError::AvailabilityExceedsCapacity { available, total });
        }
        Ok(Self { total, available })
    }

    /// Like [`Availability::new`] but caps `available` at `total`.
    #[must_use]
    pub fn clamped(total: u32, available: u32) -> Self {
        Self {
            total,
            available: available.min(total),
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn available(&self) -> u32 {
        self.available
    }

    #[must_use]
    pub fn occupied(&self) -> u32 {
        self.total - self.available
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.available == 0
    }

    /// One spot fewer, saturating at zero.
    #[must_use]
    pub fn with_spot_taken(self) -> Self {
        Self {
            total: self.total,
            available: self.available.saturating_sub(1),
        }
    }
}

/// A parking facility as served by the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationRecord {
    pub id: String,
    pub name: String,
    pub address: String,
    /// `None` when the backend row carries no usable position.
    pub coordinate: Option<Coordinate>,
    pub price_per_hour: Decimal,
    pub spots: Availability,
    /// Number of floors, used only for spot layout.
    pub floors: u32,
}

impl LocationRecord {
    #[must_use]
    pub fn available_spots(&self) -> u32 {
        self.spots.available()
    }

    #[must_use]
    pub fn total_spots(&self) -> u32 {
        self.spots.total()
    }

    /// The record as it looks after one booking lands on it.
    #[must_use]
    pub fn with_spot_taken(&self) -> Self {
        Self {
            spots: self.spots.with_spot_taken(),
            ..self.clone()
        }
    }
}

/// A [`LocationRecord`] annotated with its distance from a reference point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedLocation {
    #[serde(flatten)]
    pub location: LocationRecord,
    /// `None` when either end of the measurement had no valid coordinate.
    pub distance_km: Option<f64>,
    /// e.g. `"1.1 km"`; absent together with `distance_km`.
    pub distance_label: Option<String>,
}

impl RankedLocation {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.location.id
    }
}
