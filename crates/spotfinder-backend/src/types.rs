//! Wire shapes returned by the backend and position endpoints.

use rust_decimal::Decimal;
use serde::Deserialize;
use spotfinder_core::{Availability, Coordinate, LocationRecord, RowId};

/// One row of the parking locations table.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationRow {
    pub id: RowId,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub price_per_hour: Option<Decimal>,
    pub total_spots: u32,
    pub available_spots: u32,
    #[serde(default)]
    pub floors: Option<u32>,
}

impl LocationRow {
    /// Convert to the domain record.
    ///
    /// Availability above capacity is capped at capacity and a negative price
    /// is read as zero; both are logged. A row missing either coordinate
    /// component has no coordinate.
    #[must_use]
    pub fn into_record(self) -> LocationRecord {
        let id = self.id.to_string();

        if self.available_spots > self.total_spots {
            tracing::warn!(
                location_id = %id,
                available = self.available_spots,
                total = self.total_spots,
                "available spots exceed total; capping at total"
            );
        }

        let price_per_hour = match self.price_per_hour {
            Some(p) if p.is_sign_negative() => {
                tracing::warn!(location_id = %id, price = %p, "negative price; reading as zero");
                Decimal::ZERO
            }
            Some(p) => p,
            None => Decimal::ZERO,
        };

        let coordinate = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
            _ => None,
        };

        LocationRecord {
            id,
            name: self.name,
            address: self.address.unwrap_or_default(),
            coordinate,
            price_per_hour,
            spots: Availability::clamped(self.total_spots, self.available_spots),
            floors: self.floors.unwrap_or(1),
        }
    }
}

/// Body of an IP geolocation lookup. Accepts the common `lat`/`lon` and
/// `latitude`/`longitude` spellings.
#[derive(Debug, Clone, Deserialize)]
pub struct PositionResponse {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "lon", alias = "longitude")]
    pub lng: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(json: serde_json::Value) -> LocationRow {
        serde_json::from_value(json).expect("row should deserialize")
    }

    #[test]
    fn full_row_converts() {
        let record = row(serde_json::json!({
            "id": "p1",
            "name": "D-Mart Mall",
            "address": "Sanjivini Rd, Parvati Nagar, Nashik",
            "lat": 19.9975,
            "lng": 73.7898,
            "price_per_hour": 50,
            "total_spots": 100,
            "available_spots": 45,
            "floors": 3
        }))
        .into_record();

        assert_eq!(record.id, "p1");
        assert_eq!(record.coordinate, Some(Coordinate::new(19.9975, 73.7898)));
        assert_eq!(record.price_per_hour, Decimal::from(50));
        assert_eq!(record.available_spots(), 45);
        assert_eq!(record.total_spots(), 100);
        assert_eq!(record.floors, 3);
    }

    #[test]
    fn numeric_id_and_missing_optionals() {
        let record = row(serde_json::json!({
            "id": 7,
            "name": "Central Plaza",
            "lat": null,
            "total_spots": 80,
            "available_spots": 12
        }))
        .into_record();

        assert_eq!(record.id, "7");
        assert!(record.coordinate.is_none());
        assert_eq!(record.address, "");
        assert_eq!(record.price_per_hour, Decimal::ZERO);
        assert_eq!(record.floors, 1);
    }

    #[test]
    fn availability_above_capacity_is_capped() {
        let record = row(serde_json::json!({
            "id": "p3",
            "name": "City Center",
            "total_spots": 10,
            "available_spots": 15
        }))
        .into_record();
        assert_eq!(record.available_spots(), 10);
    }

    #[test]
    fn negative_price_reads_as_zero() {
        let record = row(serde_json::json!({
            "id": "p4",
            "name": "Odd Lot",
            "price_per_hour": -5,
            "total_spots": 10,
            "available_spots": 1
        }))
        .into_record();
        assert_eq!(record.price_per_hour, Decimal::ZERO);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn position_response_accepts_alternate_spellings() {
        let a: PositionResponse =
            serde_json::from_value(serde_json::json!({"lat": 19.07, "lon": 72.87})).unwrap();
        let b: PositionResponse =
            serde_json::from_value(serde_json::json!({"latitude": 19.07, "longitude": 72.87}))
                .unwrap();
        assert_eq!(a.lat, b.lat);
        assert_eq!(a.lng, b.lng);
    }
}
