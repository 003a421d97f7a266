//! Proximity ranking over a filtered candidate set.

use super::types::FacilityRecord;
use crate::geo::{self, Coordinates};

/// How many facilities a query returns unless configured otherwise.
pub const DEFAULT_LIMIT: usize = 5;

/// A candidate with its distance from the reference point, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedFacility<'a> {
    pub record: &'a FacilityRecord,
    /// Rounded to two decimals.
    pub distance_km: Option<f64>,
}

/// Order candidates by distance and keep the first `limit`.
///
/// With a reference point the sort is stable, so equal distances keep the
/// filter's order. Without one the filter's order is kept as-is and no
/// distance is reported.
pub fn rank<'a>(
    records: &[&'a FacilityRecord],
    reference: Option<Coordinates>,
    limit: usize,
) -> Vec<RankedFacility<'a>> {
    let Some(origin) = reference else {
        return records
            .iter()
            .take(limit)
            .map(|r| RankedFacility { record: r, distance_km: None })
            .collect();
    };

    let mut measured: Vec<(&'a FacilityRecord, f64)> = records
        .iter()
        .map(|r| (*r, origin.distance_km(&r.location)))
        .collect();
    measured.sort_by(|a, b| a.1.total_cmp(&b.1));
    measured.truncate(limit);

    measured
        .into_iter()
        .map(|(record, km)| RankedFacility {
            record,
            distance_km: Some(geo::round_km(km)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(name: &str, lat: f64, lon: f64) -> FacilityRecord {
        FacilityRecord {
            name: name.into(),
            street: String::new(),
            neighborhood: String::new(),
            region_code: "355030".into(),
            state_code: "SP".into(),
            location: Coordinates { lat, lon },
        }
    }

    const SE: Coordinates = Coordinates { lat: -23.55, lon: -46.63 };

    #[test]
    fn test_sorted_by_distance() {
        // ~1.2 km and ~0.3 km north of the reference.
        let far = rec("far", -23.539208, -46.63);
        let near = rec("near", -23.547302, -46.63);
        let candidates = vec![&far, &near];

        let ranked = rank(&candidates, Some(SE), DEFAULT_LIMIT);
        let names: Vec<&str> = ranked.iter().map(|r| r.record.name.as_str()).collect();
        assert_eq!(names, vec!["near", "far"]);
        assert_eq!(ranked[0].distance_km, Some(0.3));
        assert_eq!(ranked[1].distance_km, Some(1.2));
    }

    #[test]
    fn test_non_decreasing_and_truncated() {
        let records: Vec<FacilityRecord> = (0..12)
            .map(|i| rec(&format!("u{}", i), -23.55 + ((i * 7) % 12) as f64 * 0.01, -46.63))
            .collect();
        let candidates: Vec<&FacilityRecord> = records.iter().collect();

        let ranked = rank(&candidates, Some(SE), 5);
        assert_eq!(ranked.len(), 5);
        let distances: Vec<f64> = ranked.iter().map(|r| r.distance_km.unwrap()).collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]), "{:?}", distances);
        assert_eq!(distances[0], 0.0);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let c = rec("c", -23.56, -46.63);
        let b = rec("b", -23.60, -46.63);
        let a = rec("a", -23.56, -46.63);
        let candidates = vec![&c, &b, &a];

        let ranked = rank(&candidates, Some(SE), 10);
        let names: Vec<&str> = ranked.iter().map(|r| r.record.name.as_str()).collect();
        // a and c share a point, so they keep their input order.
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_without_reference_keeps_order_and_has_no_distance() {
        let records: Vec<FacilityRecord> =
            (0..8).map(|i| rec(&format!("u{}", i), -23.0 - i as f64, -46.0)).collect();
        let candidates: Vec<&FacilityRecord> = records.iter().rev().collect();

        let ranked = rank(&candidates, None, 5);
        let names: Vec<&str> = ranked.iter().map(|r| r.record.name.as_str()).collect();
        assert_eq!(names, vec!["u7", "u6", "u5", "u4", "u3"]);
        assert!(ranked.iter().all(|r| r.distance_km.is_none()));
    }

    #[test]
    fn test_fewer_than_limit() {
        let a = rec("a", -23.56, -46.63);
        let ranked = rank(&[&a], Some(SE), 5);
        assert_eq!(ranked.len(), 1);
        assert!(rank(&[], Some(SE), 5).is_empty());
        assert!(rank(&[], None, 5).is_empty());
    }

    #[test]
    fn test_zero_limit() {
        let a = rec("a", -23.56, -46.63);
        assert!(rank(&[&a], Some(SE), 0).is_empty());
        assert!(rank(&[&a], None, 0).is_empty());
    }
}
