//! Shared constants for viewport control, clipping, and history.

/// Minimum viewport zoom level.
pub const MIN_ZOOM: f64 = 0.1;

/// Maximum viewport zoom level.
pub const MAX_ZOOM: f64 = 5.0;

/// Fraction of the viewport reserved as padding on each edge when
/// fitting content into view.
pub const VIEW_PADDING: f64 = 0.10;

/// Maximum number of entries retained in the undo history. Older
/// entries are dropped silently.
pub const UNDO_CAPACITY: usize = 50;

/// Denominator threshold below which two lines are treated as parallel
/// during intersection.
pub const INTERSECT_EPSILON: f64 = 1e-10;

/// Padding applied to the initial clip rectangle, as a fraction of the
/// larger sheet dimension. Guarantees the clip region fully covers the
/// unclipped edges even after cuts near the boundary.
pub const CLIP_PADDING_FACTOR: f64 = 0.6;
