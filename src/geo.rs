//! Great-circle geometry for facility ranking.
//!
//! Haversine on a spherical Earth (mean radius 6371 km). Good to a few
//! metres at city scale, which is all the ranking needs.

use serde::Serialize;
use std::f64::consts::PI;

const DEG: f64 = PI / 180.0;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 point in decimal degrees. Build it with [`Coordinates::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Build a point, rejecting NaN and anything outside lat [-90, 90] / lon [-180, 180].
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        if is_valid(lat, lon) {
            Some(Self { lat, lon })
        } else {
            None
        }
    }

    /// Distance to another point in kilometres.
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        distance_km(self.lat, self.lon, other.lat, other.lon)
    }
}

/// True when both values are finite and inside the WGS84 ranges.
pub fn is_valid(lat: f64, lon: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

/// Haversine distance between two points given in degrees, in kilometres.
///
/// Inputs are assumed to be in range; the catalog and the lookups validate
/// before anything reaches this function.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1 * DEG;
    let phi2 = lat2 * DEG;
    let d_phi = (lat2 - lat1) * DEG;
    let d_lambda = (lon2 - lon1) * DEG;

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1.0 for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Round a distance to two decimal places for output.
pub fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}
