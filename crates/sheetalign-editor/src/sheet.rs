//! Sheets and their placement on the shared canvas.

use serde::{Deserialize, Serialize};

use sheetalign_core::Point;

use crate::cuts::Cut;

/// Placement of a sheet on the canvas: the canvas-world position of the
/// sheet's center, its rotation, and its layer order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SheetPlacement {
    pub offset_x: f64,
    pub offset_y: f64,
    /// Rotation in degrees around the sheet center.
    pub rotation_deg: f64,
    /// Layer order; higher draws on top.
    pub z_index: i32,
}

impl Default for SheetPlacement {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            rotation_deg: 0.0,
            z_index: 0,
        }
    }
}

/// A scanned plan sheet: raster dimensions, placement, and the ordered
/// cut list that shapes its visible region.
///
/// The sheet-local frame has its origin at the sheet's own center and is
/// unaffected by the sheet's placement, so cuts stored locally stay valid
/// wherever the sheet is moved or rotated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sheet {
    pub id: u64,
    pub name: String,
    /// Raster width in pixels.
    pub width: f64,
    /// Raster height in pixels.
    pub height: f64,
    pub placement: SheetPlacement,
    cuts: Vec<Cut>,
}

impl Sheet {
    /// Creates a sheet at the default placement with no cuts.
    pub fn new(id: u64, name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id,
            name: name.into(),
            width,
            height,
            placement: SheetPlacement::default(),
            cuts: Vec::new(),
        }
    }

    /// The ordered cut list (insertion order = application order).
    pub fn cuts(&self) -> &[Cut] {
        &self.cuts
    }

    /// Replaces the whole cut list.
    pub fn set_cuts(&mut self, cuts: Vec<Cut>) {
        self.cuts = cuts;
    }

    /// Appends a cut to the end of the list.
    pub fn append_cut(&mut self, cut: Cut) {
        self.cuts.push(cut);
    }

    /// Toggles the `flipped` flag of the most recent cut. Returns false
    /// when there are no cuts.
    pub fn toggle_last_cut_flip(&mut self) -> bool {
        match self.cuts.last_mut() {
            Some(cut) => {
                cut.flipped = !cut.flipped;
                true
            }
            None => false,
        }
    }

    /// Removes all cuts, returning the previous list.
    pub fn clear_cuts(&mut self) -> Vec<Cut> {
        std::mem::take(&mut self.cuts)
    }

    /// Converts a canvas-world point into this sheet's local frame,
    /// undoing the placement's translation and rotation.
    pub fn world_to_local(&self, world: Point) -> Point {
        let translated = world - Point::new(self.placement.offset_x, self.placement.offset_y);
        translated.rotated(-self.placement.rotation_deg.to_radians())
    }

    /// Converts a sheet-local point to canvas-world coordinates.
    pub fn local_to_world(&self, local: Point) -> Point {
        local.rotated(self.placement.rotation_deg.to_radians())
            + Point::new(self.placement.offset_x, self.placement.offset_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_world_round_trip() {
        let mut sheet = Sheet::new(1, "A-1", 800.0, 600.0);
        sheet.placement = SheetPlacement {
            offset_x: 250.0,
            offset_y: -80.0,
            rotation_deg: 33.0,
            z_index: 2,
        };
        let local = Point::new(120.0, -45.0);
        let world = sheet.local_to_world(local);
        let back = sheet.world_to_local(world);
        assert!((back.x - local.x).abs() < 1e-9);
        assert!((back.y - local.y).abs() < 1e-9);
    }

    #[test]
    fn test_local_frame_ignores_placement() {
        // The same world point maps to different local points after the
        // sheet moves; the local origin always tracks the sheet center.
        let mut sheet = Sheet::new(1, "A-1", 800.0, 600.0);
        let center = sheet.world_to_local(Point::new(0.0, 0.0));
        assert_eq!(center, Point::ORIGIN);
        sheet.placement.offset_x = 100.0;
        let center = sheet.world_to_local(Point::new(100.0, 0.0));
        assert_eq!(center, Point::ORIGIN);
    }

    #[test]
    fn test_toggle_last_cut_flip() {
        let mut sheet = Sheet::new(1, "A-1", 800.0, 600.0);
        assert!(!sheet.toggle_last_cut_flip());
        sheet.append_cut(Cut::new(Point::new(-10.0, 0.0), Point::new(10.0, 0.0)));
        assert!(sheet.toggle_last_cut_flip());
        assert!(sheet.cuts()[0].flipped);
        assert!(sheet.toggle_last_cut_flip());
        assert!(!sheet.cuts()[0].flipped);
    }

    #[test]
    fn test_clear_returns_previous_list() {
        let mut sheet = Sheet::new(1, "A-1", 800.0, 600.0);
        sheet.append_cut(Cut::new(Point::new(-10.0, 0.0), Point::new(10.0, 0.0)));
        sheet.append_cut(Cut::new(Point::new(0.0, -10.0), Point::new(0.0, 10.0)));
        let removed = sheet.clear_cuts();
        assert_eq!(removed.len(), 2);
        assert!(sheet.cuts().is_empty());
    }
}
