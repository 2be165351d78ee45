//! Geolocated point assets and the adjustment audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sheetalign_core::Point;

/// A point asset plotted over the sheets, with its original imported
/// coordinate and an optional manual correction. Coordinates are in
/// real-world units (meters or degrees, per the active calibration).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub asset_id: String,
    pub name: String,
    /// Coordinate from the source data.
    pub original: Point,
    /// Coordinate after manual correction, when one was made.
    pub adjusted: Option<Point>,
}

impl Asset {
    /// Creates an unadjusted asset.
    pub fn new(asset_id: impl Into<String>, name: impl Into<String>, original: Point) -> Self {
        Self {
            asset_id: asset_id.into(),
            name: name.into(),
            original,
            adjusted: None,
        }
    }

    /// The effective position: adjusted if available, otherwise original.
    pub fn current_position(&self) -> Point {
        self.adjusted.unwrap_or(self.original)
    }

    /// Distance between the original and adjusted positions; zero when
    /// the asset has not been adjusted.
    pub fn delta_distance(&self) -> f64 {
        match self.adjusted {
            Some(adjusted) => self.original.distance_to(&adjusted),
            None => 0.0,
        }
    }
}

/// One entry in the adjustment audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentRecord {
    pub asset_id: String,
    pub from: Point,
    pub to: Point,
    pub delta_x: f64,
    pub delta_y: f64,
    pub delta_distance: f64,
    pub timestamp: DateTime<Utc>,
    pub notes: String,
}

impl AdjustmentRecord {
    /// Creates a record, computing the deltas from the endpoints.
    pub fn new(asset_id: impl Into<String>, from: Point, to: Point, notes: impl Into<String>) -> Self {
        let delta = to - from;
        Self {
            asset_id: asset_id.into(),
            from,
            to,
            delta_x: delta.x,
            delta_y: delta.y,
            delta_distance: delta.length(),
            timestamp: Utc::now(),
            notes: notes.into(),
        }
    }
}
