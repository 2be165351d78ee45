//! World <-> pixel coordinate mapping.
//!
//! Two operating modes, selected by whether a reference calibration is
//! set. In reference mode an asset's real-world coordinate is pinned to
//! a pixel position and the mapping composes a unit conversion, a
//! rotation, and a scale around that anchor. Without a reference the
//! mapper falls back to a plain origin/scale calibration: translation
//! plus isotropic scale, no rotation.
//!
//! Invalid scale factors never propagate `NaN` into rendering: both
//! directions fail closed and return the calibration anchor instead.

use serde::{Deserialize, Serialize};
use tracing::warn;

use sheetalign_core::units::{self, CoordUnit};
use sheetalign_core::Point;

/// Origin/scale fallback calibration: a pixel origin plus an isotropic
/// scale. The legacy calibration model, still used until a reference
/// asset has been picked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OriginCalibration {
    /// Pixel position of the world origin.
    pub origin: Point,
    /// World coordinate mapped to the pixel origin. Its latitude anchors
    /// the degree conversion in fallback mode.
    pub origin_world: Point,
}

impl Default for OriginCalibration {
    fn default() -> Self {
        Self {
            origin: Point::ORIGIN,
            origin_world: Point::ORIGIN,
        }
    }
}

/// Reference calibration: one asset's known world coordinate pinned to
/// its pixel position, plus a rotation of the asset layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCalibration {
    /// Identifier of the reference asset.
    pub ref_asset_id: String,
    /// World coordinate of the reference asset (lon/lat when the unit is
    /// degrees).
    pub ref_world: Point,
    /// Pixel position of the reference asset.
    pub ref_pixel: Point,
    /// Rotation of the asset layer in degrees.
    pub rotation_deg: f64,
}

/// Bidirectional world <-> pixel mapper.
///
/// `to_pixel` in reference mode: subtract the reference world coordinate,
/// convert degree deltas to meters at the reference latitude, rotate by
/// the calibration angle, scale by pixels-per-meter, add the reference
/// pixel. `to_world` is the exact algebraic inverse, so the round trip
/// holds within floating-point tolerance for every valid calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateMapper {
    pixels_per_meter: f64,
    coord_unit: CoordUnit,
    origin: OriginCalibration,
    reference: Option<ReferenceCalibration>,
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self {
            pixels_per_meter: 100.0,
            coord_unit: CoordUnit::Meters,
            origin: OriginCalibration::default(),
            reference: None,
        }
    }
}

impl CoordinateMapper {
    /// Creates a mapper with the given scale, in origin fallback mode.
    pub fn new(pixels_per_meter: f64) -> Self {
        Self {
            pixels_per_meter,
            ..Self::default()
        }
    }

    /// Current scale factor in pixels per meter.
    pub fn pixels_per_meter(&self) -> f64 {
        self.pixels_per_meter
    }

    /// Sets the scale factor. Invalid values are stored as-is and make
    /// the transforms fail closed until corrected.
    pub fn set_pixels_per_meter(&mut self, pixels_per_meter: f64) {
        self.pixels_per_meter = pixels_per_meter;
    }

    /// Unit of real-world coordinates handled by this mapper.
    pub fn coord_unit(&self) -> CoordUnit {
        self.coord_unit
    }

    /// Sets the unit of real-world coordinates.
    pub fn set_coord_unit(&mut self, unit: CoordUnit) {
        self.coord_unit = unit;
    }

    /// The fallback origin calibration.
    pub fn origin(&self) -> &OriginCalibration {
        &self.origin
    }

    /// Sets the pixel position of the world origin (fallback mode).
    pub fn set_origin(&mut self, origin: Point) {
        self.origin.origin = origin;
    }

    /// Sets the world coordinate anchored at the pixel origin.
    pub fn set_origin_world(&mut self, world: Point) {
        self.origin.origin_world = world;
    }

    /// The active reference calibration, if one is set.
    pub fn reference(&self) -> Option<&ReferenceCalibration> {
        self.reference.as_ref()
    }

    /// Installs a reference calibration, switching to reference mode.
    pub fn set_reference(&mut self, reference: ReferenceCalibration) {
        self.reference = Some(reference);
    }

    /// Removes the reference calibration, reverting to origin fallback.
    pub fn clear_reference(&mut self) {
        self.reference = None;
    }

    fn scale_is_valid(&self) -> bool {
        self.pixels_per_meter.is_finite() && self.pixels_per_meter > 0.0
    }

    /// Pixel position the transforms fall back to when the calibration is
    /// unusable: the reference pixel in reference mode, the pixel origin
    /// otherwise.
    fn safe_pixel(&self) -> Point {
        match &self.reference {
            Some(r) => r.ref_pixel,
            None => self.origin.origin,
        }
    }

    fn safe_world(&self) -> Point {
        match &self.reference {
            Some(r) => r.ref_world,
            None => self.origin.origin_world,
        }
    }

    /// Latitude anchoring the degree <-> meter conversion.
    fn anchor_lat(&self) -> f64 {
        self.safe_world().y
    }

    fn world_delta_to_meters(&self, delta: Point) -> Point {
        match self.coord_unit {
            CoordUnit::Meters => delta,
            CoordUnit::Degrees => {
                let (mx, my) = units::degree_delta_to_meters(delta.x, delta.y, self.anchor_lat());
                Point::new(mx, my)
            }
        }
    }

    fn meter_delta_to_world(&self, delta: Point) -> Point {
        match self.coord_unit {
            CoordUnit::Meters => delta,
            CoordUnit::Degrees => {
                let (dx, dy) = units::meter_delta_to_degrees(delta.x, delta.y, self.anchor_lat());
                Point::new(dx, dy)
            }
        }
    }

    /// Distance between two real-world coordinates, in meters. Degree
    /// coordinates are converted at the anchor latitude first.
    pub fn world_distance_meters(&self, a: Point, b: Point) -> f64 {
        self.world_delta_to_meters(b - a).length()
    }

    /// Converts a real-world coordinate to canvas pixels.
    pub fn to_pixel(&self, world: Point) -> Point {
        if !self.scale_is_valid() || !world.is_finite() {
            warn!(
                pixels_per_meter = self.pixels_per_meter,
                "unusable calibration, returning anchor pixel"
            );
            return self.safe_pixel();
        }

        match &self.reference {
            Some(r) => {
                let meters = self.world_delta_to_meters(world - r.ref_world);
                let rotated = meters.rotated(r.rotation_deg.to_radians());
                r.ref_pixel + rotated.scale(self.pixels_per_meter)
            }
            None => {
                let meters = self.world_delta_to_meters(world - self.origin.origin_world);
                self.origin.origin + meters.scale(self.pixels_per_meter)
            }
        }
    }

    /// Converts a canvas pixel position back to real-world coordinates.
    /// Exact inverse of [`CoordinateMapper::to_pixel`].
    pub fn to_world(&self, pixel: Point) -> Point {
        if !self.scale_is_valid() || !pixel.is_finite() {
            warn!(
                pixels_per_meter = self.pixels_per_meter,
                "unusable calibration, returning anchor world coordinate"
            );
            return self.safe_world();
        }

        match &self.reference {
            Some(r) => {
                let meters = (pixel - r.ref_pixel)
                    .scale(1.0 / self.pixels_per_meter)
                    .rotated(-r.rotation_deg.to_radians());
                r.ref_world + self.meter_delta_to_world(meters)
            }
            None => {
                let meters = (pixel - self.origin.origin).scale(1.0 / self.pixels_per_meter);
                self.origin.origin_world + self.meter_delta_to_world(meters)
            }
        }
    }
}
