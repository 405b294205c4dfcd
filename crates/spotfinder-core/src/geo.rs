//! Great-circle distance and nearby-location ranking.
//!
//! Everything here is a pure function of its inputs: the same origin and the
//! same record set always produce the same distances in the same order.

use std::cmp::Ordering;
use std::f64::consts::PI;

use crate::locations::{Coordinate, LocationRecord, RankedLocation};

/// Mean Earth radius. Spherical model; error is well under 1% at parking
/// distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

fn to_rad(deg: f64) -> f64 {
    deg * (PI / 180.0)
}

/// Haversine distance between two coordinates, in kilometres.
#[must_use]
pub fn haversine_distance(from: Coordinate, to: Coordinate) -> f64 {
    let d_lat = to_rad(to.lat - from.lat);
    let d_lng = to_rad(to.lng - from.lng);

    let a = (d_lat / 2.0).sin().powi(2)
        + to_rad(from.lat).cos() * to_rad(to.lat).cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Display form of a distance: one decimal place and a `km` suffix.
#[must_use]
pub fn format_distance(distance_km: f64) -> String {
    format!("{distance_km:.1} km")
}

/// Annotate every record with its distance from `origin`.
///
/// Input order is preserved; use [`sort_by_distance`] to order by proximity.
/// Records without a valid coordinate are kept with `distance_km = None` so
/// they can still be listed without a distance badge. An invalid origin
/// leaves every distance unset.
#[must_use]
pub fn rank_locations(origin: Coordinate, records: &[LocationRecord]) -> Vec<RankedLocation> {
    let origin_valid = origin.is_valid();
    if !origin_valid && !records.is_empty() {
        tracing::warn!(%origin, "ranking origin is not a valid coordinate; distances left unset");
    }

    records
        .iter()
        .map(|record| {
            let distance_km = match record.coordinate {
                Some(target) if origin_valid && target.is_valid() => {
                    Some(haversine_distance(origin, target))
                }
                _ => {
                    if origin_valid {
                        tracing::debug!(
                            location_id = %record.id,
                            "location has no usable coordinate; listing without distance"
                        );
                    }
                    None
                }
            };

            RankedLocation {
                location: record.clone(),
                distance_km,
                distance_label: distance_km.map(format_distance),
            }
        })
        .collect()
}

/// Stable ascending sort by distance.
///
/// Equal distances keep their incoming order. Locations without a distance
/// take no part in the ordering and trail the ranked ones in their incoming
/// order.
#[must_use]
pub fn sort_by_distance(mut ranked: Vec<RankedLocation>) -> Vec<RankedLocation> {
    ranked.sort_by(|a, b| match (a.distance_km, b.distance_km) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    ranked
}

/// Case-insensitive substring match on name or address.
///
/// A blank query hands the list back untouched rather than filtering it to
/// nothing.
#[must_use]
pub fn filter_by_query(mut ranked: Vec<RankedLocation>, query: &str) -> Vec<RankedLocation> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return ranked;
    }

    ranked.retain(|r| {
        r.location.name.to_lowercase().contains(&needle)
            || r.location.address.to_lowercase().contains(&needle)
    });
    ranked
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::locations::Availability;

    const MUMBAI: Coordinate = Coordinate::new(19.0760, 72.8777);

    fn record(
        id: &str,
        name: &str,
        address: &str,
        coordinate: Option<Coordinate>,
    ) -> LocationRecord {
        LocationRecord {
            id: id.to_string(),
            name: name.to_string(),
            address: address.to_string(),
            coordinate,
            price_per_hour: Decimal::from(50),
            spots: Availability::new(100, 45).unwrap(),
            floors: 3,
        }
    }

    fn ids(ranked: &[RankedLocation]) -> Vec<&str> {
        ranked.iter().map(RankedLocation::id).collect()
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (MUMBAI, Coordinate::new(19.9975, 73.7898)),
            (Coordinate::new(-33.8688, 151.2093), Coordinate::new(51.5074, -0.1278)),
            (Coordinate::new(0.0, 179.9), Coordinate::new(0.0, -179.9)),
        ];
        for (a, b) in pairs {
            let ab = haversine_distance(a, b);
            let ba = haversine_distance(b, a);
            assert!((ab - ba).abs() < 1e-9, "{ab} != {ba}");
        }
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn distance_to_self_is_zero() {
        for c in [MUMBAI, Coordinate::new(90.0, 0.0), Coordinate::new(-45.5, -120.25)] {
            assert_eq!(haversine_distance(c, c), 0.0);
        }
    }

    #[test]
    fn triangle_inequality_along_a_meridian() {
        let a = Coordinate::new(10.0, 30.0);
        let b = Coordinate::new(20.0, 30.0);
        let c = Coordinate::new(30.0, 30.0);
        let ac = haversine_distance(a, c);
        let ab = haversine_distance(a, b);
        let bc = haversine_distance(b, c);
        assert!(ac <= ab + bc + 1e-9);
        // Colinear on a great circle, so the two legs add up to the whole.
        assert!((ac - (ab + bc)).abs() < 1e-6);
    }

    #[test]
    fn one_hundredth_of_a_degree_east_in_mumbai() {
        let ranked = rank_locations(
            MUMBAI,
            &[record("p1", "East Lot", "Somewhere", Some(Coordinate::new(19.0760, 72.8877)))],
        );
        let d = ranked[0].distance_km.unwrap();
        assert!((d - 1.05).abs() < 0.05, "got {d}");
        assert_eq!(ranked[0].distance_label.as_deref(), Some("1.1 km"));
    }

    #[test]
    fn paris_to_berlin_is_roughly_878_km() {
        let d = haversine_distance(
            Coordinate::new(48.8566, 2.3522),
            Coordinate::new(52.5200, 13.4050),
        );
        assert!((d - 878.0).abs() < 10.0, "got {d}");
    }

    #[test]
    fn empty_input_ranks_to_empty_output() {
        assert!(rank_locations(MUMBAI, &[]).is_empty());
    }

    #[test]
    fn ranking_preserves_input_order_and_is_deterministic() {
        let records = vec![
            record("far", "Far", "a", Some(Coordinate::new(19.2, 72.9))),
            record("near", "Near", "b", Some(Coordinate::new(19.08, 72.88))),
        ];
        let first = rank_locations(MUMBAI, &records);
        let second = rank_locations(MUMBAI, &records);
        assert_eq!(ids(&first), vec!["far", "near"]);
        assert_eq!(first, second);
    }

    #[test]
    fn invalid_record_coordinate_is_kept_without_distance() {
        let records = vec![
            record("nan", "Broken", "x", Some(Coordinate::new(f64::NAN, 72.9))),
            record("none", "Missing", "y", None),
            record("oob", "Out of range", "z", Some(Coordinate::new(120.0, 72.9))),
        ];
        let ranked = rank_locations(MUMBAI, &records);
        assert_eq!(ranked.len(), 3);
        assert!(ranked.iter().all(|r| r.distance_km.is_none()));
        assert!(ranked.iter().all(|r| r.distance_label.is_none()));
    }

    #[test]
    fn invalid_origin_leaves_every_distance_unset() {
        let records = vec![record("p1", "A", "a", Some(MUMBAI))];
        let ranked = rank_locations(Coordinate::new(f64::NAN, 0.0), &records);
        assert_eq!(ranked.len(), 1);
        assert!(ranked[0].distance_km.is_none());
    }

    #[test]
    fn sort_is_ascending_with_unranked_last() {
        let records = vec![
            record("unranked-1", "U1", "a", None),
            record("far", "Far", "b", Some(Coordinate::new(19.3, 72.9))),
            record("near", "Near", "c", Some(Coordinate::new(19.08, 72.88))),
            record("unranked-2", "U2", "d", None),
        ];
        let sorted = sort_by_distance(rank_locations(MUMBAI, &records));
        assert_eq!(ids(&sorted), vec!["near", "far", "unranked-1", "unranked-2"]);
    }

    #[test]
    fn sort_ties_keep_original_order() {
        let spot = Some(Coordinate::new(19.1, 72.9));
        let records = vec![
            record("b", "B", "x", spot),
            record("a", "A", "x", spot),
            record("c", "C", "x", spot),
        ];
        let sorted = sort_by_distance(rank_locations(MUMBAI, &records));
        assert_eq!(ids(&sorted), vec!["b", "a", "c"]);
    }

    #[test]
    fn blank_query_returns_list_unchanged() {
        let ranked = rank_locations(
            MUMBAI,
            &[
                record("p1", "D-Mart Mall", "Sanjivini Rd", Some(MUMBAI)),
                record("p2", "Central Plaza", "123 Main St", None),
            ],
        );
        assert_eq!(filter_by_query(ranked.clone(), ""), ranked);
        assert_eq!(filter_by_query(ranked.clone(), "   "), ranked);
    }

    #[test]
    fn query_match_is_case_insensitive() {
        let ranked = rank_locations(MUMBAI, &[record("p1", "D-Mart Mall", "Nashik", Some(MUMBAI))]);
        let hits = filter_by_query(ranked, "mart");
        assert_eq!(ids(&hits), vec!["p1"]);
    }

    #[test]
    fn query_matches_address_as_well_as_name() {
        let ranked = rank_locations(
            MUMBAI,
            &[
                record("p1", "D-Mart Mall", "Sanjivini Rd, Nashik", Some(MUMBAI)),
                record("p2", "Central Plaza", "123 Main St, Downtown", Some(MUMBAI)),
                record("p3", "City Center", "456 Park Ave, Uptown", Some(MUMBAI)),
            ],
        );
        assert_eq!(ids(&filter_by_query(ranked.clone(), "DOWNTOWN")), vec!["p2"]);
        assert_eq!(ids(&filter_by_query(ranked.clone(), " c")), vec!["p2", "p3"]);
        assert!(filter_by_query(ranked, "airport").is_empty());
    }
}
