//! Cut lines and the visible-region composer.
//!
//! A cut is a straight line drawn across a sheet; the half not containing
//! the sheet's local origin is clipped away (unless the cut is flipped).
//! Cuts are stored in sheet-local coordinates so they stay valid wherever
//! the sheet is placed on screen, and they are applied in insertion order.

use serde::{Deserialize, Serialize};

use sheetalign_core::constants::{CLIP_PADDING_FACTOR, INTERSECT_EPSILON};
use sheetalign_core::Point;

use crate::clip::clip_half_plane;

/// One user-drawn cut line across a sheet, in sheet-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cut {
    pub p1: Point,
    pub p2: Point,
    /// Keep the half away from the sheet center instead.
    #[serde(default)]
    pub flipped: bool,
}

impl Cut {
    /// Creates an unflipped cut between two sheet-local points.
    pub fn new(p1: Point, p2: Point) -> Self {
        Self {
            p1,
            p2,
            flipped: false,
        }
    }

    /// Length of the cut line in sheet-local units.
    pub fn length(&self) -> f64 {
        self.p1.distance_to(&self.p2)
    }
}

/// Composes the visible clip polygon for a sheet from its ordered cut list.
///
/// Starts from a rectangle centered on the sheet-local origin, padded well
/// past the sheet edges, and clips it by each cut in list order. The keep
/// side of a cut is the side containing the sheet-local origin (the sheet
/// center), reversed when the cut is flipped.
///
/// Returns `None` when the running polygon collapses, meaning the sheet is
/// fully clipped away. This is distinct from the no-cut case, which returns the
/// padded rectangle. Output vertices are rounded to integer pixel units
/// for stable rendering.
///
/// The composition is deterministic for a given cut list, and order
/// sensitive when cuts overlap.
pub fn compose_cut_polygon(sheet_width: f64, sheet_height: f64, cuts: &[Cut]) -> Option<Vec<Point>> {
    let padding = sheet_width.max(sheet_height) * CLIP_PADDING_FACTOR;
    let half_w = sheet_width / 2.0 + padding;
    let half_h = sheet_height / 2.0 + padding;

    let mut polygon = vec![
        Point::new(-half_w, -half_h),
        Point::new(half_w, -half_h),
        Point::new(half_w, half_h),
        Point::new(-half_w, half_h),
    ];

    for cut in cuts {
        let span = cut.p2 - cut.p1;
        let len = span.length();
        if len < INTERSECT_EPSILON {
            // Zero-length cut: expected user input, clips nothing.
            continue;
        }
        let dir = span.scale(1.0 / len);
        let left_normal = Point::new(-dir.y, dir.x);

        // Point the keep-side normal at the sheet-local origin.
        let mid = cut.p1.midpoint(&cut.p2);
        let to_origin = Point::ORIGIN - mid;
        let mut keep = left_normal;
        if to_origin.dot(&keep) < 0.0 {
            keep = -keep;
        }
        if cut.flipped {
            keep = -keep;
        }

        // The clipper keeps the left of a -> b; order the endpoints so the
        // keep side is on the left.
        let (a, b) = if keep.dot(&left_normal) > 0.0 {
            (cut.p1, cut.p2)
        } else {
            (cut.p2, cut.p1)
        };

        polygon = clip_half_plane(&polygon, a, b);
        if polygon.len() < 3 {
            return None;
        }
    }

    Some(polygon.iter().map(Point::round).collect())
}
