//! Half-plane polygon clipping.
//!
//! A single Sutherland-Hodgman step: clip a polygon against one directed
//! line, keeping the area on the left of the line. The cut composer folds
//! a sheet's cut list through this to build the visible region.

use sheetalign_core::constants::INTERSECT_EPSILON;
use sheetalign_core::Point;

/// Returns the portion of `polygon` lying on the left side of the
/// directed line `a -> b`.
///
/// A vertex is "inside" when the 2D cross product `(b - a) x (p - a)` is
/// non-negative, so points exactly on the line are kept. An empty input
/// yields an empty output. The output may have fewer than 3 vertices (or
/// zero area); callers must treat that as fully clipped away.
pub fn clip_half_plane(polygon: &[Point], a: Point, b: Point) -> Vec<Point> {
    if polygon.is_empty() {
        return Vec::new();
    }

    let mut output = Vec::with_capacity(polygon.len() + 1);
    for i in 0..polygon.len() {
        let current = polygon[i];
        let next = polygon[(i + 1) % polygon.len()];
        let current_inside = is_left(a, b, current);
        let next_inside = is_left(a, b, next);

        if current_inside && next_inside {
            output.push(next);
        } else if current_inside {
            output.push(line_intersection(current, next, a, b));
        } else if next_inside {
            output.push(line_intersection(current, next, a, b));
            output.push(next);
        }
        // Both outside: the edge contributes nothing.
    }
    output
}

fn is_left(a: Point, b: Point, p: Point) -> bool {
    (b - a).cross(&(p - a)) >= 0.0
}

/// Intersection of the segment `p1 -> p2` with the infinite line `a -> b`.
/// Near-parallel pairs resolve to the segment midpoint instead of failing.
fn line_intersection(p1: Point, p2: Point, a: Point, b: Point) -> Point {
    let seg = p2 - p1;
    let line = b - a;
    let denom = seg.cross(&line);
    if denom.abs() < INTERSECT_EPSILON {
        return p1.midpoint(&p2);
    }
    let t = (a - p1).cross(&line) / denom;
    Point::new(p1.x + t * seg.x, p1.y + t * seg.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<Point> {
        vec![
            Point::new(-1.0, -1.0),
            Point::new(1.0, -1.0),
            Point::new(1.0, 1.0),
            Point::new(-1.0, 1.0),
        ]
    }

    #[test]
    fn test_empty_input() {
        let out = clip_half_plane(&[], Point::new(0.0, 0.0), Point::new(1.0, 0.0));
        assert!(out.is_empty());
    }

    #[test]
    fn test_fully_inside_is_unchanged() {
        // Line far below the square, keep side facing up: nothing is cut.
        let square = unit_square();
        let out = clip_half_plane(&square, Point::new(-10.0, -5.0), Point::new(10.0, -5.0));
        assert_eq!(out.len(), 4);
        for v in &square {
            assert!(out.iter().any(|o| o.distance_to(v) < 1e-9));
        }
    }

    #[test]
    fn test_fully_outside_is_empty() {
        // Same line with reversed direction keeps the lower half-plane.
        let out = clip_half_plane(&unit_square(), Point::new(10.0, -5.0), Point::new(-10.0, -5.0));
        assert!(out.is_empty());
    }

    #[test]
    fn test_half_clip() {
        // Keep the upper half (y >= 0) of the unit square.
        let out = clip_half_plane(&unit_square(), Point::new(-10.0, 0.0), Point::new(10.0, 0.0));
        assert_eq!(out.len(), 4);
        for v in &out {
            assert!(v.y >= -1e-9, "vertex {} below the keep side", v);
        }
        // The two intersection vertices land on the line.
        let on_line = out.iter().filter(|v| v.y.abs() < 1e-9).count();
        assert_eq!(on_line, 2);
    }

    #[test]
    fn test_soundness_for_diagonal_cut() {
        let a = Point::new(-2.0, -2.0);
        let b = Point::new(2.0, 2.0);
        let out = clip_half_plane(&unit_square(), a, b);
        assert!(out.len() >= 3);
        let dir = b - a;
        for v in &out {
            let side = dir.cross(&(*v - a));
            assert!(side >= -1e-9, "vertex {} on the wrong side", v);
        }
    }

    #[test]
    fn test_clip_is_idempotent() {
        // Re-clipping against the same line removes nothing more.
        let a = Point::new(-10.0, 0.0);
        let b = Point::new(10.0, 0.0);
        let once = clip_half_plane(&unit_square(), a, b);
        let twice = clip_half_plane(&once, a, b);
        assert_eq!(once.len(), twice.len());
        for v in &once {
            assert!(twice.iter().any(|o| o.distance_to(v) < 1e-9));
        }
    }

    #[test]
    fn test_vertex_on_line_is_kept() {
        // Line through two opposite corners keeps them.
        let out = clip_half_plane(&unit_square(), Point::new(-1.0, -1.0), Point::new(1.0, 1.0));
        assert!(out.iter().any(|v| v.distance_to(&Point::new(-1.0, -1.0)) < 1e-9));
        assert!(out.iter().any(|v| v.distance_to(&Point::new(1.0, 1.0)) < 1e-9));
    }
}
