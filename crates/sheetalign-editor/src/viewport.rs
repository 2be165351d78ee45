//! Viewport and screen coordinate transformation.
//!
//! Handles conversion between screen coordinates (raw canvas pixels) and
//! canvas-world coordinates. Manages pan, zoom, and rotation with proper
//! coordinate mapping.
//!
//! Zoom and rotation are authoritative scalars; the affine matrix is
//! always rebuilt from them and never read back. At a rotation of exactly
//! 90 degrees the matrix's raw scale terms collapse toward zero, so the
//! zoom level is not recoverable from the matrix alone.

use serde::{Deserialize, Serialize};
use std::fmt;

use sheetalign_core::constants::{MAX_ZOOM, MIN_ZOOM, VIEW_PADDING};
use sheetalign_core::Point;

/// Persistable snapshot of the viewport scalars. Written only on explicit
/// save; mid-session state is never persisted automatically.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub zoom_level: f64,
    pub rotation_deg: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

/// Represents the viewport transformation state (zoom, rotation, pan).
#[derive(Debug, Clone)]
pub struct Viewport {
    zoom: f64,
    rotation_deg: f64,
    pan_x: f64,
    pan_y: f64,
    canvas_width: f64,
    canvas_height: f64,
    /// Canvas-style affine matrix `[a, b, c, d, e, f]`, derived from the
    /// scalars above on every mutation.
    matrix: [f64; 6],
}

impl Viewport {
    /// Creates a new viewport with initial dimensions, at 1:1 zoom with
    /// no rotation or pan.
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        let mut viewport = Self {
            zoom: 1.0,
            rotation_deg: 0.0,
            pan_x: 0.0,
            pan_y: 0.0,
            canvas_width,
            canvas_height,
            matrix: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
        };
        viewport.rebuild_matrix();
        viewport
    }

    /// Gets the canvas width.
    pub fn canvas_width(&self) -> f64 {
        self.canvas_width
    }

    /// Gets the canvas height.
    pub fn canvas_height(&self) -> f64 {
        self.canvas_height
    }

    /// Sets the canvas dimensions (typically called when the window
    /// resizes).
    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.canvas_width = width;
        self.canvas_height = height;
    }

    /// Gets the current zoom level (1.0 = 100%).
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Sets the zoom level, clamped to `[0.1, 5.0]`. Pan is preserved.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.rebuild_matrix();
    }

    /// Zooms in by multiplying current zoom by 1.2.
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * 1.2);
    }

    /// Zooms out by dividing current zoom by 1.2.
    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / 1.2);
    }

    /// Gets the current rotation in degrees, normalized to `[0, 360)`.
    pub fn rotation_deg(&self) -> f64 {
        self.rotation_deg
    }

    /// Sets the rotation, normalized to `[0, 360)`. Pan and zoom are
    /// preserved.
    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation_deg = degrees.rem_euclid(360.0);
        self.rebuild_matrix();
    }

    /// Gets the pan offset (X coordinate).
    pub fn pan_x(&self) -> f64 {
        self.pan_x
    }

    /// Gets the pan offset (Y coordinate).
    pub fn pan_y(&self) -> f64 {
        self.pan_y
    }

    /// Sets the pan offset.
    pub fn set_pan(&mut self, x: f64, y: f64) {
        self.pan_x = x;
        self.pan_y = y;
        self.rebuild_matrix();
    }

    /// Pans by a delta amount in screen pixels.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.set_pan(self.pan_x + dx, self.pan_y + dy);
    }

    /// The composed affine matrix `[a, b, c, d, e, f]` where
    /// `screen = (a*x + c*y + e, b*x + d*y + f)`.
    pub fn matrix(&self) -> [f64; 6] {
        self.matrix
    }

    fn rebuild_matrix(&mut self) {
        let (sin, cos) = self.rotation_deg.to_radians().sin_cos();
        self.matrix = [
            cos * self.zoom,
            sin * self.zoom,
            -sin * self.zoom,
            cos * self.zoom,
            self.pan_x,
            self.pan_y,
        ];
    }

    /// Converts canvas-world coordinates to screen pixels.
    pub fn world_to_screen(&self, world: Point) -> Point {
        let [a, b, c, d, e, f] = self.matrix;
        Point::new(a * world.x + c * world.y + e, b * world.x + d * world.y + f)
    }

    /// Converts screen pixels to canvas-world coordinates (inverse of the
    /// composed matrix). The zoom clamp keeps the determinant positive,
    /// so the inverse always exists.
    pub fn screen_to_world(&self, screen: Point) -> Point {
        let [a, b, c, d, e, f] = self.matrix;
        let det = a * d - b * c;
        let x = screen.x - e;
        let y = screen.y - f;
        Point::new((d * x - c * y) / det, (a * y - b * x) / det)
    }

    /// Zooms toward a screen point, keeping the world point under it
    /// visually stationary (pointer-anchored zoom).
    pub fn zoom_at_point(&mut self, screen: Point, new_zoom: f64) {
        // Resolve the anchor through the matrix before the zoom change.
        let anchor_world = self.screen_to_world(screen);
        self.set_zoom(new_zoom);
        let moved = self.world_to_screen(anchor_world);
        self.set_pan(self.pan_x + screen.x - moved.x, self.pan_y + screen.y - moved.y);
    }

    /// Fits the given content bounds (canvas-world coordinates) into the
    /// viewport with a 10% margin, capping the zoom at `max_zoom`, then
    /// centers the pan on the content. Rotation is preserved.
    pub fn fit_to_content(&mut self, min: Point, max: Point, max_zoom: f64) {
        if min.x >= max.x || min.y >= max.y {
            return;
        }

        let width = max.x - min.x;
        let height = max.y - min.y;
        let padding_factor = 1.0 - VIEW_PADDING * 2.0;
        let zoom_x = self.canvas_width * padding_factor / width;
        let zoom_y = self.canvas_height * padding_factor / height;
        // A cap below the zoom floor (or NaN) would invert the clamp range.
        let cap = if max_zoom.is_finite() {
            max_zoom.max(MIN_ZOOM)
        } else {
            MAX_ZOOM
        };
        self.zoom = zoom_x.min(zoom_y).clamp(MIN_ZOOM, cap);
        self.pan_x = 0.0;
        self.pan_y = 0.0;
        self.rebuild_matrix();

        let center = min.midpoint(&max);
        let projected = self.world_to_screen(center);
        self.set_pan(
            self.canvas_width / 2.0 - projected.x,
            self.canvas_height / 2.0 - projected.y,
        );
    }

    /// Centers the viewport on a canvas-world coordinate.
    pub fn center_on(&mut self, world: Point) {
        self.pan_x = 0.0;
        self.pan_y = 0.0;
        self.rebuild_matrix();
        let projected = self.world_to_screen(world);
        self.set_pan(
            self.canvas_width / 2.0 - projected.x,
            self.canvas_height / 2.0 - projected.y,
        );
    }

    /// Resets the viewport to default state (1:1 zoom, no rotation, no
    /// pan).
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.rotation_deg = 0.0;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
        self.rebuild_matrix();
    }

    /// Snapshot of the authoritative scalars for persistence.
    pub fn state(&self) -> ViewportState {
        ViewportState {
            zoom_level: self.zoom,
            rotation_deg: self.rotation_deg,
            pan_x: self.pan_x,
            pan_y: self.pan_y,
        }
    }

    /// Restores a previously saved snapshot.
    pub fn restore(&mut self, state: &ViewportState) {
        self.zoom = state.zoom_level.clamp(MIN_ZOOM, MAX_ZOOM);
        self.rotation_deg = state.rotation_deg.rem_euclid(360.0);
        self.pan_x = state.pan_x;
        self.pan_y = state.pan_y;
        self.rebuild_matrix();
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Zoom: {:.2}x | Rotation: {:.1} deg | Pan: ({:.1}, {:.1})",
            self.zoom, self.rotation_deg, self.pan_x, self.pan_y
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1200.0, 800.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point, tol: f64) -> bool {
        (a.x - b.x).abs() < tol && (a.y - b.y).abs() < tol
    }

    #[test]
    fn test_zoom_clamp() {
        let mut vp = Viewport::default();
        vp.set_zoom(0.01);
        assert_eq!(vp.zoom(), 0.1);
        vp.set_zoom(80.0);
        assert_eq!(vp.zoom(), 5.0);
    }

    #[test]
    fn test_rotation_normalization() {
        let mut vp = Viewport::default();
        vp.set_rotation(450.0);
        assert_eq!(vp.rotation_deg(), 90.0);
        vp.set_rotation(-30.0);
        assert_eq!(vp.rotation_deg(), 330.0);
    }

    #[test]
    fn test_round_trip_with_rotation() {
        let mut vp = Viewport::default();
        vp.set_zoom(2.5);
        vp.set_rotation(37.0);
        vp.set_pan(120.0, -45.0);
        let screen = Point::new(333.0, 444.0);
        let world = vp.screen_to_world(screen);
        assert!(close(vp.world_to_screen(world), screen, 1e-9));
    }

    #[test]
    fn test_zoom_survives_90_degree_rotation() {
        // At 90 degrees the matrix scale terms collapse to zero; the
        // authoritative scalar must not.
        let mut vp = Viewport::default();
        vp.set_zoom(3.0);
        vp.set_rotation(90.0);
        let [a, _, _, d, _, _] = vp.matrix();
        assert!(a.abs() < 1e-12);
        assert!(d.abs() < 1e-12);
        assert_eq!(vp.zoom(), 3.0);
        // The matrix stays invertible.
        let world = vp.screen_to_world(Point::new(10.0, 20.0));
        assert!(world.is_finite());
    }

    #[test]
    fn test_pointer_anchored_zoom() {
        let mut vp = Viewport::default();
        vp.set_zoom(1.0);
        vp.set_rotation(15.0);
        vp.set_pan(40.0, 60.0);
        let cursor = Point::new(500.0, 300.0);
        let before = vp.screen_to_world(cursor);
        vp.zoom_at_point(cursor, 2.0);
        let after = vp.screen_to_world(cursor);
        assert!(close(before, after, 1e-9));
        assert_eq!(vp.zoom(), 2.0);
    }

    #[test]
    fn test_fit_to_content_margin() {
        let mut vp = Viewport::new(1000.0, 800.0);
        vp.fit_to_content(Point::new(0.0, 0.0), Point::new(400.0, 400.0), 2.0);
        // Height constrains: 800 * 0.8 / 400 = 1.6.
        assert!((vp.zoom() - 1.6).abs() < 1e-9);
        // Content center lands on the canvas center.
        let center = vp.world_to_screen(Point::new(200.0, 200.0));
        assert!(close(center, Point::new(500.0, 400.0), 1e-9));
    }

    #[test]
    fn test_fit_to_content_zoom_cap() {
        let mut vp = Viewport::new(1000.0, 800.0);
        vp.fit_to_content(Point::new(0.0, 0.0), Point::new(10.0, 10.0), 1.0);
        assert_eq!(vp.zoom(), 1.0);
    }

    #[test]
    fn test_fit_to_content_out_of_range_cap() {
        let mut vp = Viewport::new(1000.0, 800.0);
        vp.fit_to_content(Point::new(0.0, 0.0), Point::new(10.0, 10.0), 0.05);
        assert_eq!(vp.zoom(), MIN_ZOOM);
        vp.fit_to_content(Point::new(0.0, 0.0), Point::new(10.0, 10.0), f64::NAN);
        assert!(vp.zoom() <= MAX_ZOOM);
        assert!(vp.zoom() >= MIN_ZOOM);
    }

    #[test]
    fn test_fit_to_content_degenerate_bounds() {
        let mut vp = Viewport::new(1000.0, 800.0);
        let before = vp.matrix();
        vp.fit_to_content(Point::new(5.0, 5.0), Point::new(5.0, 5.0), 2.0);
        assert_eq!(vp.matrix(), before);
    }

    #[test]
    fn test_state_round_trip() {
        let mut vp = Viewport::default();
        vp.set_zoom(2.0);
        vp.set_rotation(45.0);
        vp.set_pan(10.0, 20.0);
        let state = vp.state();
        let mut other = Viewport::default();
        other.restore(&state);
        assert_eq!(other.matrix(), vp.matrix());
    }
}
