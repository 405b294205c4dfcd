pub mod app_config;
pub mod booking;
pub mod config;
pub mod geo;
pub mod locations;
pub mod row_id;
pub mod spots;

pub use app_config::{AppConfig, Environment};
pub use booking::{
    quote, Booking, BookingStatus, BookingValidationError, NewBooking, Reservations,
    VehicleDetails, DEFAULT_STAY_HOURS, MAX_STAY_HOURS,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{
    filter_by_query, format_distance, haversine_distance, rank_locations, sort_by_distance,
    EARTH_RADIUS_KM,
};
pub use locations::{Availability, Coordinate, LocationRecord, RankedLocation};
pub use row_id::RowId;
pub use spots::{
    available_per_floor, floor_layout, spot_id, spot_rows, ParkingSpot, SpotStatus,
    DEFAULT_SPOTS_PER_FLOOR, SPOTS_PER_ROW,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("available spots ({available}) exceed total spots ({total})")]
    AvailabilityExceedsCapacity { available: u32, total: u32 },

    #[error("floor {floor} is out of range for location {id} (1..={floors})")]
    FloorOutOfRange { id: String, floor: u32, floors: u32 },

    #[error("spot {spot_id} is not available")]
    SpotUnavailable { spot_id: String },

    #[error("stay of {hours}h is outside 1..={max}h")]
    InvalidStay { hours: u32, max: u32 },

    #[error("invalid vehicle details: {0}")]
    InvalidVehicle(#[from] BookingValidationError),

    #[error("booking {id} is {status} and cannot be cancelled")]
    NotCancellable { id: RowId, status: BookingStatus },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
