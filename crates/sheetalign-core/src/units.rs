//! Real-world unit handling for calibrations.
//!
//! Asset coordinates arrive either as meters from a project origin or as
//! WGS84 degrees (longitude/latitude). Degree deltas are converted to
//! meter deltas with an equirectangular approximation at the reference
//! latitude. The vertical axis is negated in the process: latitude
//! increases northward while canvas Y increases downward.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Meters per degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Unit of real-world asset coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordUnit {
    /// Meters from the project origin
    Meters,
    /// WGS84 degrees, stored as (longitude, latitude)
    Degrees,
}

impl Default for CoordUnit {
    fn default() -> Self {
        Self::Meters
    }
}

impl fmt::Display for CoordUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Meters => write!(f, "meters"),
            Self::Degrees => write!(f, "degrees"),
        }
    }
}

impl FromStr for CoordUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "meters" | "m" => Ok(Self::Meters),
            "degrees" | "deg" => Ok(Self::Degrees),
            _ => Err(format!("Unknown coordinate unit: {}", s)),
        }
    }
}

/// Converts a (longitude, latitude) degree delta to a meter delta at the
/// given reference latitude.
///
/// Longitude shrinks with the cosine of latitude; the latitude component
/// is negated so that "north" maps to "up" on a y-down canvas.
pub fn degree_delta_to_meters(d_lon: f64, d_lat: f64, ref_lat_deg: f64) -> (f64, f64) {
    let cos_lat = ref_lat_deg.to_radians().cos();
    (d_lon * METERS_PER_DEGREE * cos_lat, -(d_lat * METERS_PER_DEGREE))
}

/// Inverse of [`degree_delta_to_meters`].
pub fn meter_delta_to_degrees(meters_x: f64, meters_y: f64, ref_lat_deg: f64) -> (f64, f64) {
    let cos_lat = ref_lat_deg.to_radians().cos();
    (
        meters_x / (METERS_PER_DEGREE * cos_lat),
        -(meters_y / METERS_PER_DEGREE),
    )
}
