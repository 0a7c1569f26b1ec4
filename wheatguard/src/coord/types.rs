//! Coordinate type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Valid latitude range
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Decimal places used for grouping samples and building cache keys.
pub const COORD_PRECISION: i32 = 4;

const COORD_SCALE: f64 = 10_000.0;

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees, positive north
    pub lat: f64,
    /// Longitude in degrees, positive east
    pub lon: f64,
}

impl Coordinate {
    /// Creates a validated coordinate.
    ///
    /// # Errors
    ///
    /// Returns an error for non-finite values or values outside the
    /// geographic range.
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordError> {
        if !lat.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&lat) {
            return Err(CoordError::InvalidLatitude(lat));
        }
        if !lon.is_finite() || !(MIN_LON..=MAX_LON).contains(&lon) {
            return Err(CoordError::InvalidLongitude(lon));
        }
        Ok(Self { lat, lon })
    }

    /// Returns the grouping key for this coordinate.
    #[inline]
    pub fn location_key(&self) -> LocationKey {
        LocationKey::from_degrees(self.lat, self.lon)
    }

    /// Returns this coordinate rounded to [`COORD_PRECISION`] decimals.
    #[inline]
    pub fn rounded(&self) -> Coordinate {
        self.location_key().coordinate()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

/// A coordinate rounded to the system-wide precision.
///
/// Stored as integers scaled by 10^4 so the key hashes and compares exactly.
/// Two raw coordinates that round to the same four decimals produce equal keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocationKey {
    lat_e4: i64,
    lon_e4: i64,
}

impl LocationKey {
    /// Builds a key by rounding raw degrees.
    pub fn from_degrees(lat: f64, lon: f64) -> Self {
        Self {
            lat_e4: (lat * COORD_SCALE).round() as i64,
            lon_e4: (lon * COORD_SCALE).round() as i64,
        }
    }

    /// Rounded latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat_e4 as f64 / COORD_SCALE
    }

    /// Rounded longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.lon_e4 as f64 / COORD_SCALE
    }

    /// The rounded position as a coordinate.
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat(),
            lon: self.lon(),
        }
    }
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}:{:.4}", self.lat(), self.lon())
    }
}

/// Errors for invalid geographic input.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Latitude is outside valid range (-90.0 to 90.0) or not finite
    InvalidLatitude(f64),
    /// Longitude is outside valid range (-180.0 to 180.0) or not finite
    InvalidLongitude(f64),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidLatitude(lat) => {
                write!(
                    f,
                    "Invalid latitude: {} (must be between {} and {})",
                    lat, MIN_LAT, MAX_LAT
                )
            }
            CoordError::InvalidLongitude(lon) => {
                write!(
                    f,
                    "Invalid longitude: {} (must be between {} and {})",
                    lon, MIN_LON, MAX_LON
                )
            }
        }
    }
}

impl std::error::Error for CoordError {}
