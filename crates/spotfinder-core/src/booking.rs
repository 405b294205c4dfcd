//! Booking requests: vehicle validation, price quotes, and the payloads
//! exchanged with the backend.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::locations::LocationRecord;
use crate::row_id::RowId;
use crate::spots::{ParkingSpot, SpotStatus};
use crate::CoreError;

pub const DEFAULT_STAY_HOURS: u32 = 2;
pub const MAX_STAY_HOURS: u32 = 24;

static LICENSE_PLATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[A-Z0-9 ]{5,10}$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleDetails {
    pub model: String,
    pub license_plate: String,
}

/// Per-field validation failures for [`VehicleDetails`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BookingValidationError {
    pub model: Option<String>,
    pub license_plate: Option<String>,
}

impl BookingValidationError {
    fn is_empty(&self) -> bool {
        self.model.is_none() && self.license_plate.is_none()
    }
}

impl std::fmt::Display for BookingValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = [self.model.as_deref(), self.license_plate.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for BookingValidationError {}

impl VehicleDetails {
    /// Check both fields, collecting every failure.
    ///
    /// # Errors
    ///
    /// Returns [`BookingValidationError`] naming each invalid field.
    pub fn validate(&self) -> Result<(), BookingValidationError> {
        let mut errors = BookingValidationError::default();

        if self.model.trim().is_empty() {
            errors.model = Some("Car model is required".to_string());
        }

        let plate = self.license_plate.trim();
        if plate.is_empty() {
            errors.license_plate = Some("License plate is required".to_string());
        } else if !LICENSE_PLATE_RE.is_match(plate) {
            errors.license_plate = Some("Enter a valid license plate".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Price of a stay of `hours` at `price_per_hour`.
///
/// # Errors
///
/// Returns [`CoreError::InvalidStay`] when `hours` is not in
/// `1..=MAX_STAY_HOURS`.
pub fn quote(price_per_hour: Decimal, hours: u32) -> Result<Decimal, CoreError> {
    if hours == 0 || hours > MAX_STAY_HOURS {
        return Err(CoreError::InvalidStay {
            hours,
            max: MAX_STAY_HOURS,
        });
    }
    Ok(price_per_hour * Decimal::from(hours))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Active,
    Completed,
    Cancelled,
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingStatus::Active => write!(f, "active"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Insert payload for the bookings table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewBooking {
    pub location_id: String,
    pub location_name: String,
    pub spot_id: String,
    pub floor: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub vehicle_model: String,
    pub license_plate: String,
    pub price: Decimal,
}

impl NewBooking {
    /// Assemble a booking for `spot` at `location`, starting at `start` and
    /// lasting `hours`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidVehicle`] if the vehicle details fail validation.
    /// - [`CoreError::SpotUnavailable`] if the spot is not free or the
    ///   facility has no availability left.
    /// - [`CoreError::FloorOutOfRange`] if the spot's floor does not exist.
    /// - [`CoreError::InvalidStay`] if `hours` is out of range.
    pub fn prepare(
        location: &LocationRecord,
        spot: &ParkingSpot,
        vehicle: &VehicleDetails,
        start: DateTime<Utc>,
        hours: u32,
    ) -> Result<Self, CoreError> {
        vehicle.validate()?;

        if spot.floor == 0 || spot.floor > location.floors {
            return Err(CoreError::FloorOutOfRange {
                id: location.id.clone(),
                floor: spot.floor,
                floors: location.floors,
            });
        }
        let spot_free = matches!(spot.status, SpotStatus::Available | SpotStatus::Selected);
        if !spot_free || location.spots.is_full() {
            return Err(CoreError::SpotUnavailable {
                spot_id: spot.id.clone(),
            });
        }

        let price = quote(location.price_per_hour, hours)?;

        Ok(Self {
            location_id: location.id.clone(),
            location_name: location.name.clone(),
            spot_id: spot.id.clone(),
            floor: spot.floor,
            start_time: start,
            end_time: start + Duration::hours(i64::from(hours)),
            vehicle_model: vehicle.model.trim().to_string(),
            license_plate: vehicle.license_plate.trim().to_uppercase(),
            price,
        })
    }
}

/// A booking row as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: RowId,
    pub location_id: String,
    pub location_name: String,
    pub spot_id: String,
    pub floor: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub vehicle_model: String,
    pub license_plate: String,
    pub price: Decimal,
    pub status: BookingStatus,
}

impl Booking {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == BookingStatus::Active
    }

    /// Only active bookings can be cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotCancellable`] for completed or already
    /// cancelled bookings.
    pub fn ensure_cancellable(&self) -> Result<(), CoreError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(CoreError::NotCancellable {
                id: self.id.clone(),
                status: self.status,
            })
        }
    }
}

/// A user's bookings split the way the reservations screen shows them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reservations {
    pub active: Vec<Booking>,
    /// Completed and cancelled bookings.
    pub history: Vec<Booking>,
}

impl Reservations {
    /// Partition `bookings` by status, keeping the incoming order in each half.
    #[must_use]
    pub fn split(bookings: Vec<Booking>) -> Self {
        let (active, history) = bookings.into_iter().partition(Booking::is_active);
        Self { active, history }
    }

    #[must_use]
    pub fn find(&self, id: &RowId) -> Option<&Booking> {
        self.active
            .iter()
            .chain(&self.history)
            .find(|booking| &booking.id == id)
    }
}

#[cfg(test)]
#[path = "booking_test.rs"]
mod tests;
