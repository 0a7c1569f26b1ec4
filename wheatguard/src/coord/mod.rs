//! Coordinate handling
//!
//! Provides the rounded location key shared by the sample store, the value
//! cache and the stress scanner, plus great-circle distance used by the
//! proximity push dispatcher and the nearby incident query.

mod types;

pub use types::{
    CoordError, Coordinate, LocationKey, COORD_PRECISION, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON,
};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;

/// Rounds a value to a fixed number of decimal places.
#[inline]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Great-circle distance between two coordinates in kilometres.
///
/// Uses the haversine formula on a spherical Earth.
///
/// # Example
///
/// ```
/// use wheatguard::coord::{haversine_km, Coordinate};
///
/// let a = Coordinate { lat: 0.0, lon: 0.0 };
/// let b = Coordinate { lat: 1.0, lon: 0.0 };
/// assert!((haversine_km(a, b) - 111.19).abs() < 0.01);
/// ```
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat1_rad = from.lat * DEG_TO_RAD;
    let lat2_rad = to.lat * DEG_TO_RAD;
    let delta_lat = (to.lat - from.lat) * DEG_TO_RAD;
    let delta_lon = (to.lon - from.lon) * DEG_TO_RAD;

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests;
