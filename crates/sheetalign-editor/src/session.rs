//! Editor session: the single mutator of viewport, sheet, and cut state.
//!
//! All canvas state lives on an explicit session context object passed to
//! operations; there is no ambient global mode or selection. Operations
//! are gesture-level: a drag or cut pushes one undo entry when it
//! completes, never per intermediate pointer move, and in-progress
//! preview state is discarded by `cancel_gesture` (Escape, pointer
//! leaving the canvas) without touching the committed model.
//!
//! Saves are optimistic: local state and the on-screen clip update before
//! the store call; a failed save becomes a [`SessionEvent`] notification
//! and is never rolled back.

use std::collections::HashMap;

use tracing::{debug, warn};
use uuid::Uuid;

use sheetalign_core::{CalibrationError, Error, Point, Result};

use crate::asset::{AdjustmentRecord, Asset};
use crate::calibration::{CoordinateMapper, ReferenceCalibration};
use crate::cuts::{compose_cut_polygon, Cut};
use crate::joinmark::JoinMark;
use crate::persist::{CalibrationRecord, SheetStore};
use crate::render::{ObjectHandle, SceneRenderer};
use crate::sheet::{Sheet, SheetPlacement};
use crate::undo::{UndoEntry, UndoStack};
use crate::viewport::Viewport;

use sheetalign_core::units::CoordUnit;

/// Non-blocking notification surfaced to the user interface.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A save failed; local state was kept.
    PersistFailed {
        sheet_id: Option<u64>,
        message: String,
    },
}

/// In-progress cut drawing: the draft line, in sheet-local coordinates.
#[derive(Debug, Clone)]
struct CutDraft {
    sheet_id: u64,
    start_local: Point,
    current_local: Point,
}

/// In-progress sheet drag or rotation.
#[derive(Debug, Clone)]
struct SheetGesture {
    sheet_id: u64,
    start_placement: SheetPlacement,
}

/// One open editor session, owning the sheets, the viewport, the
/// calibration, the undo history, and the two collaborators.
#[derive(Debug)]
pub struct EditorSession<S: SheetStore, R: SceneRenderer> {
    session_id: Uuid,
    sheets: HashMap<u64, Sheet>,
    /// Explicit side table from sheet id to its display object.
    handles: HashMap<u64, ObjectHandle>,
    assets: HashMap<String, Asset>,
    adjustments: Vec<AdjustmentRecord>,
    join_marks: HashMap<u64, JoinMark>,
    viewport: Viewport,
    mapper: CoordinateMapper,
    undo: UndoStack,
    store: S,
    renderer: R,
    cut_draft: Option<CutDraft>,
    sheet_gesture: Option<SheetGesture>,
    notifications: Vec<SessionEvent>,
}

impl<S: SheetStore, R: SceneRenderer> EditorSession<S, R> {
    /// Creates a session over an empty canvas of the given pixel size.
    pub fn new(canvas_width: f64, canvas_height: f64, store: S, renderer: R) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            sheets: HashMap::new(),
            handles: HashMap::new(),
            assets: HashMap::new(),
            adjustments: Vec::new(),
            join_marks: HashMap::new(),
            viewport: Viewport::new(canvas_width, canvas_height),
            mapper: CoordinateMapper::default(),
            undo: UndoStack::new(),
            store,
            renderer,
            cut_draft: None,
            sheet_gesture: None,
            notifications: Vec::new(),
        }
    }

    /// Unique id of this session.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// The viewport (read-only; mutations go through the view operations
    /// so the renderer's hit-test cache stays in sync).
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The coordinate mapper.
    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    /// The persistence collaborator.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the persistence collaborator.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The rendering collaborator.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    /// Number of entries in the undo history.
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Drains pending user notifications.
    pub fn take_notifications(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.notifications)
    }

    // ------------------------------------------------------------------
    // Sheets and assets
    // ------------------------------------------------------------------

    /// Registers a sheet together with its display object handle.
    pub fn add_sheet(&mut self, sheet: Sheet, handle: ObjectHandle) {
        self.handles.insert(sheet.id, handle);
        self.sheets.insert(sheet.id, sheet);
    }

    /// Gets a sheet by id.
    pub fn sheet(&self, sheet_id: u64) -> Option<&Sheet> {
        self.sheets.get(&sheet_id)
    }

    /// Sheets in draw order: ascending z-index, then name.
    pub fn sheets_by_z(&self) -> Vec<&Sheet> {
        let mut sheets: Vec<&Sheet> = self.sheets.values().collect();
        sheets.sort_by(|a, b| {
            a.placement
                .z_index
                .cmp(&b.placement.z_index)
                .then_with(|| a.name.cmp(&b.name))
        });
        sheets
    }

    /// Registers an asset.
    pub fn add_asset(&mut self, asset: Asset) {
        self.assets.insert(asset.asset_id.clone(), asset);
    }

    /// Gets an asset by id.
    pub fn asset(&self, asset_id: &str) -> Option<&Asset> {
        self.assets.get(asset_id)
    }

    /// The adjustment audit trail, oldest first.
    pub fn adjustments(&self) -> &[AdjustmentRecord] {
        &self.adjustments
    }

    /// Moves an asset to a new world position, recording the change in
    /// the audit trail.
    pub fn adjust_asset(
        &mut self,
        asset_id: &str,
        new_world: Point,
        notes: &str,
    ) -> Result<AdjustmentRecord> {
        let asset = self
            .assets
            .get_mut(asset_id)
            .ok_or_else(|| Error::UnknownAsset(asset_id.to_string()))?;
        let from = asset.current_position();
        asset.adjusted = Some(new_world);
        let record = AdjustmentRecord::new(asset_id, from, new_world, notes);
        self.adjustments.push(record.clone());
        debug!(asset_id, "asset adjusted");
        Ok(record)
    }

    // ------------------------------------------------------------------
    // Join marks
    // ------------------------------------------------------------------

    /// Registers a join mark; its sheet must already be known.
    pub fn add_join_mark(&mut self, mark: JoinMark) -> Result<()> {
        self.sheet_ref(mark.sheet_id)?;
        self.join_marks.insert(mark.mark_id, mark);
        Ok(())
    }

    /// Gets a join mark by id.
    pub fn join_mark(&self, mark_id: u64) -> Option<&JoinMark> {
        self.join_marks.get(&mark_id)
    }

    /// Join marks on a sheet, in id order.
    pub fn sheet_join_marks(&self, sheet_id: u64) -> Vec<&JoinMark> {
        let mut marks: Vec<&JoinMark> = self
            .join_marks
            .values()
            .filter(|m| m.sheet_id == sheet_id)
            .collect();
        marks.sort_by_key(|m| m.mark_id);
        marks
    }

    /// Pairs two marks as each other's counterpart. Any previous pairing
    /// on either mark is dissolved first; a mark is never its own
    /// partner.
    pub fn link_join_marks(&mut self, a_id: u64, b_id: u64) -> Result<()> {
        if !self.join_marks.contains_key(&a_id) {
            return Err(Error::UnknownJoinMark(a_id));
        }
        if a_id == b_id || !self.join_marks.contains_key(&b_id) {
            return Err(Error::UnknownJoinMark(b_id));
        }
        self.unlink_join_mark(a_id)?;
        self.unlink_join_mark(b_id)?;
        if let Some(mark) = self.join_marks.get_mut(&a_id) {
            mark.linked_mark_id = Some(b_id);
        }
        if let Some(mark) = self.join_marks.get_mut(&b_id) {
            mark.linked_mark_id = Some(a_id);
        }
        debug!(a_id, b_id, "join marks linked");
        Ok(())
    }

    /// Dissolves a mark's pairing on both sides. No-op on an unlinked
    /// mark.
    pub fn unlink_join_mark(&mut self, mark_id: u64) -> Result<()> {
        let partner = self
            .join_marks
            .get_mut(&mark_id)
            .ok_or(Error::UnknownJoinMark(mark_id))?
            .linked_mark_id
            .take();
        if let Some(partner_id) = partner {
            if let Some(partner) = self.join_marks.get_mut(&partner_id) {
                partner.linked_mark_id = None;
            }
        }
        Ok(())
    }

    /// A mark's canvas-world position under its sheet's current
    /// placement.
    pub fn join_mark_world_position(&self, mark_id: u64) -> Option<Point> {
        let mark = self.join_marks.get(&mark_id)?;
        let sheet = self.sheets.get(&mark.sheet_id)?;
        Some(sheet.local_to_world(mark.position))
    }

    // ------------------------------------------------------------------
    // View operations
    // ------------------------------------------------------------------

    fn sync_renderer(&mut self) {
        self.renderer.sync_viewport(self.viewport.matrix());
    }

    /// Pans the view by a screen-pixel delta.
    pub fn pan_view_by(&mut self, dx: f64, dy: f64) {
        self.viewport.pan_by(dx, dy);
        self.sync_renderer();
    }

    /// Sets the view zoom (clamped).
    pub fn set_view_zoom(&mut self, zoom: f64) {
        self.viewport.set_zoom(zoom);
        self.sync_renderer();
    }

    /// Pointer-anchored zoom toward a screen point.
    pub fn zoom_view_at(&mut self, screen: Point, zoom: f64) {
        self.viewport.zoom_at_point(screen, zoom);
        self.sync_renderer();
    }

    /// Sets the view rotation (normalized to `[0, 360)`).
    pub fn set_view_rotation(&mut self, degrees: f64) {
        self.viewport.set_rotation(degrees);
        self.sync_renderer();
    }

    /// Fits content bounds into the view with a margin.
    pub fn fit_view_to(&mut self, min: Point, max: Point, max_zoom: f64) {
        self.viewport.fit_to_content(min, max, max_zoom);
        self.sync_renderer();
    }

    // ------------------------------------------------------------------
    // Cut drawing
    // ------------------------------------------------------------------

    /// Starts drawing a cut line on a sheet at a screen position.
    pub fn begin_cut(&mut self, sheet_id: u64, screen: Point) -> Result<()> {
        let local = self.screen_to_sheet_local(sheet_id, screen)?;
        self.cut_draft = Some(CutDraft {
            sheet_id,
            start_local: local,
            current_local: local,
        });
        Ok(())
    }

    /// Updates the draft cut line's free end. Returns the draft endpoints
    /// (sheet-local) for preview drawing, or `None` when no cut is being
    /// drawn.
    pub fn update_cut(&mut self, screen: Point) -> Option<(Point, Point)> {
        let sheet_id = self.cut_draft.as_ref()?.sheet_id;
        let local = self.screen_to_sheet_local(sheet_id, screen).ok()?;
        let draft = self.cut_draft.as_mut()?;
        draft.current_local = local;
        Some((draft.start_local, draft.current_local))
    }

    /// The clip polygon that would result from committing the draft cut,
    /// for preview rendering. `Some(None)` means the draft would clip the
    /// sheet away entirely.
    pub fn preview_cut_polygon(&self) -> Option<Option<Vec<Point>>> {
        let draft = self.cut_draft.as_ref()?;
        let sheet = self.sheets.get(&draft.sheet_id)?;
        let mut cuts = sheet.cuts().to_vec();
        cuts.push(Cut::new(draft.start_local, draft.current_local));
        Some(compose_cut_polygon(sheet.width, sheet.height, &cuts))
    }

    /// Finishes the cut gesture at a screen position. Returns false when
    /// no cut was being drawn or the drawn line is degenerate; the model
    /// and undo history are only touched on success.
    pub fn commit_cut(&mut self, screen: Point) -> Result<bool> {
        let draft = match self.cut_draft.take() {
            Some(draft) => draft,
            None => return Ok(false),
        };
        let end_local = self.screen_to_sheet_local(draft.sheet_id, screen)?;
        let cut = Cut::new(draft.start_local, end_local);
        if cut.length() < 1.0 {
            // Degenerate line: expected user input, drop the draft.
            return Ok(false);
        }

        let sheet = self.sheet_mut(draft.sheet_id)?;
        let prev_cuts = if sheet.cuts().is_empty() {
            None
        } else {
            Some(sheet.cuts().to_vec())
        };
        sheet.append_cut(cut);
        self.undo.push(UndoEntry::Cut {
            sheet_id: draft.sheet_id,
            prev_cuts,
        });
        self.apply_clip(draft.sheet_id)?;
        self.persist_cuts(draft.sheet_id);
        debug!(sheet_id = draft.sheet_id, "cut committed");
        Ok(true)
    }

    /// Toggles the keep side of the most recent cut on a sheet.
    pub fn flip_last_cut(&mut self, sheet_id: u64) -> Result<bool> {
        let sheet = self.sheet_mut(sheet_id)?;
        if sheet.cuts().is_empty() {
            return Ok(false);
        }
        let prev_cuts = Some(sheet.cuts().to_vec());
        sheet.toggle_last_cut_flip();
        self.undo.push(UndoEntry::Cut {
            sheet_id,
            prev_cuts,
        });
        self.apply_clip(sheet_id)?;
        self.persist_cuts(sheet_id);
        Ok(true)
    }

    /// Removes all cuts from a sheet. No-op on an uncut sheet.
    pub fn clear_cuts(&mut self, sheet_id: u64) -> Result<bool> {
        let sheet = self.sheet_mut(sheet_id)?;
        if sheet.cuts().is_empty() {
            return Ok(false);
        }
        let prev_cuts = sheet.clear_cuts();
        self.undo.push(UndoEntry::ClearCut {
            sheet_id,
            prev_cuts,
        });
        self.apply_clip(sheet_id)?;
        self.persist_cuts(sheet_id);
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Sheet transform gestures
    // ------------------------------------------------------------------

    /// Starts a drag/rotate gesture on a sheet, capturing its placement.
    pub fn begin_sheet_gesture(&mut self, sheet_id: u64) -> Result<()> {
        let sheet = self.sheet_ref(sheet_id)?;
        self.sheet_gesture = Some(SheetGesture {
            sheet_id,
            start_placement: sheet.placement,
        });
        Ok(())
    }

    /// Moves the gestured sheet by a canvas-world delta (live preview; no
    /// undo entry until the gesture commits).
    pub fn translate_sheet_by(&mut self, dx: f64, dy: f64) -> bool {
        let Some(gesture) = &self.sheet_gesture else {
            return false;
        };
        let sheet_id = gesture.sheet_id;
        if let Some(sheet) = self.sheets.get_mut(&sheet_id) {
            sheet.placement.offset_x += dx;
            sheet.placement.offset_y += dy;
            true
        } else {
            false
        }
    }

    /// Rotates the gestured sheet to an absolute angle (live preview).
    pub fn rotate_sheet_to(&mut self, degrees: f64) -> bool {
        let Some(gesture) = &self.sheet_gesture else {
            return false;
        };
        let sheet_id = gesture.sheet_id;
        if let Some(sheet) = self.sheets.get_mut(&sheet_id) {
            sheet.placement.rotation_deg = degrees;
            true
        } else {
            false
        }
    }

    /// Completes the sheet gesture. Pushes one undo entry and persists
    /// when the placement actually changed; a no-move gesture is
    /// discarded.
    pub fn commit_sheet_gesture(&mut self) -> bool {
        let Some(gesture) = self.sheet_gesture.take() else {
            return false;
        };
        let Some(sheet) = self.sheets.get(&gesture.sheet_id) else {
            return false;
        };
        if sheet.placement == gesture.start_placement {
            return false;
        }
        self.undo.push(UndoEntry::Transform {
            sheet_id: gesture.sheet_id,
            prev_placement: gesture.start_placement,
        });
        self.persist_transform(gesture.sheet_id);
        debug!(sheet_id = gesture.sheet_id, "sheet transform committed");
        true
    }

    /// Sets a sheet's placement directly (property edit). Pushes an undo
    /// entry and persists.
    pub fn set_sheet_placement(&mut self, sheet_id: u64, placement: SheetPlacement) -> Result<()> {
        let sheet = self.sheet_mut(sheet_id)?;
        let prev_placement = sheet.placement;
        if prev_placement == placement {
            return Ok(());
        }
        sheet.placement = placement;
        self.undo.push(UndoEntry::Transform {
            sheet_id,
            prev_placement,
        });
        self.persist_transform(sheet_id);
        Ok(())
    }

    /// Aborts any in-progress gesture (Escape, pointer leaving the
    /// canvas): the draft cut is dropped and a gestured sheet snaps back
    /// to its placement at gesture start. The committed model and the
    /// undo history are untouched.
    pub fn cancel_gesture(&mut self) {
        self.cut_draft = None;
        if let Some(gesture) = self.sheet_gesture.take() {
            if let Some(sheet) = self.sheets.get_mut(&gesture.sheet_id) {
                sheet.placement = gesture.start_placement;
            }
        }
    }

    // ------------------------------------------------------------------
    // Undo
    // ------------------------------------------------------------------

    /// Reverses the most recent completed gesture, restoring both the
    /// in-memory model and (best effort) the persisted state. A failed
    /// save is logged and surfaced, never retried, and does not roll back
    /// the undo itself. No-op on an empty history.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.undo.pop() else {
            return false;
        };
        match entry {
            UndoEntry::Transform {
                sheet_id,
                prev_placement,
            } => {
                if let Some(sheet) = self.sheets.get_mut(&sheet_id) {
                    sheet.placement = prev_placement;
                }
                self.persist_transform(sheet_id);
            }
            UndoEntry::Cut {
                sheet_id,
                prev_cuts,
            } => {
                if let Some(sheet) = self.sheets.get_mut(&sheet_id) {
                    // None: the undone action was the first cut on a
                    // previously uncut sheet, so clipping goes away
                    // entirely.
                    sheet.set_cuts(prev_cuts.unwrap_or_default());
                }
                let _ = self.apply_clip(sheet_id);
                self.persist_cuts(sheet_id);
            }
            UndoEntry::ClearCut {
                sheet_id,
                prev_cuts,
            } => {
                if let Some(sheet) = self.sheets.get_mut(&sheet_id) {
                    sheet.set_cuts(prev_cuts);
                }
                let _ = self.apply_clip(sheet_id);
                self.persist_cuts(sheet_id);
            }
        }
        true
    }

    // ------------------------------------------------------------------
    // Calibration and measurement
    // ------------------------------------------------------------------

    /// Distance between two screen points in real-world meters.
    pub fn measure(&self, screen_a: Point, screen_b: Point) -> f64 {
        let world_a = self.mapper.to_world(self.viewport.screen_to_world(screen_a));
        let world_b = self.mapper.to_world(self.viewport.screen_to_world(screen_b));
        self.mapper.world_distance_meters(world_a, world_b)
    }

    /// Derives the scale from a measured span: `pixels_per_meter =
    /// pixel_distance / real_distance`. Both spans must be positive and
    /// finite. Persists the calibration on success.
    pub fn calibrate_scale(&mut self, pixel_distance: f64, real_distance: f64) -> Result<f64> {
        if !(pixel_distance.is_finite() && real_distance.is_finite())
            || pixel_distance <= 0.0
            || real_distance <= 0.0
        {
            return Err(CalibrationError::InvalidSpan {
                pixel_distance,
                real_distance,
            }
            .into());
        }
        let pixels_per_meter = pixel_distance / real_distance;
        self.mapper.set_pixels_per_meter(pixels_per_meter);
        self.persist_calibration();
        Ok(pixels_per_meter)
    }

    /// Sets the pixel position of the world origin (fallback mode) and
    /// persists the calibration.
    pub fn set_origin(&mut self, pixel: Point) {
        self.mapper.set_origin(pixel);
        self.persist_calibration();
    }

    /// Pins a known asset to a pixel position as the reference
    /// calibration, switching the mapper to reference mode.
    pub fn set_reference(
        &mut self,
        asset_id: &str,
        ref_pixel: Point,
        rotation_deg: f64,
        unit: CoordUnit,
    ) -> Result<()> {
        let asset = self.assets.get(asset_id).ok_or_else(|| {
            Error::from(CalibrationError::UnknownReference {
                asset_id: asset_id.to_string(),
            })
        })?;
        self.mapper.set_coord_unit(unit);
        self.mapper.set_reference(ReferenceCalibration {
            ref_asset_id: asset_id.to_string(),
            ref_world: asset.current_position(),
            ref_pixel,
            rotation_deg,
        });
        self.persist_calibration();
        Ok(())
    }

    /// Persists the current view rotation along with the calibration
    /// (explicit save; the viewport is never auto-persisted).
    pub fn save_view(&mut self) {
        self.persist_calibration();
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn sheet_ref(&self, sheet_id: u64) -> Result<&Sheet> {
        self.sheets
            .get(&sheet_id)
            .ok_or(Error::UnknownSheet(sheet_id))
    }

    fn sheet_mut(&mut self, sheet_id: u64) -> Result<&mut Sheet> {
        self.sheets
            .get_mut(&sheet_id)
            .ok_or(Error::UnknownSheet(sheet_id))
    }

    fn screen_to_sheet_local(&self, sheet_id: u64, screen: Point) -> Result<Point> {
        let sheet = self.sheet_ref(sheet_id)?;
        let world = self.viewport.screen_to_world(screen);
        Ok(sheet.world_to_local(world))
    }

    /// Recomputes a sheet's clip region and hands it to the renderer:
    /// no cuts removes clipping, a composed polygon clips, and a fully
    /// clipped-away sheet is hidden with an empty region.
    fn apply_clip(&mut self, sheet_id: u64) -> Result<()> {
        let sheet = self.sheet_ref(sheet_id)?;
        let handle = match self.handles.get(&sheet_id) {
            Some(handle) => *handle,
            None => return Ok(()),
        };
        if sheet.cuts().is_empty() {
            self.renderer.set_clip_region(handle, None);
            return Ok(());
        }
        match compose_cut_polygon(sheet.width, sheet.height, sheet.cuts()) {
            Some(polygon) => self.renderer.set_clip_region(handle, Some(&polygon)),
            None => self.renderer.set_clip_region(handle, Some(&[])),
        }
        Ok(())
    }

    fn notify_persist_failure(&mut self, sheet_id: Option<u64>, err: &Error) {
        warn!(?sheet_id, error = %err, "save failed, keeping local state");
        self.notifications.push(SessionEvent::PersistFailed {
            sheet_id,
            message: err.to_string(),
        });
    }

    fn persist_cuts(&mut self, sheet_id: u64) {
        let cuts = match self.sheets.get(&sheet_id) {
            Some(sheet) => sheet.cuts().to_vec(),
            None => return,
        };
        if let Err(err) = self.store.persist_sheet_cuts(sheet_id, &cuts) {
            self.notify_persist_failure(Some(sheet_id), &err);
        }
    }

    fn persist_transform(&mut self, sheet_id: u64) {
        let placement = match self.sheets.get(&sheet_id) {
            Some(sheet) => sheet.placement,
            None => return,
        };
        if let Err(err) = self.store.persist_sheet_transform(sheet_id, &placement) {
            self.notify_persist_failure(Some(sheet_id), &err);
        }
    }

    fn persist_calibration(&mut self) {
        let record = CalibrationRecord {
            pixels_per_meter: self.mapper.pixels_per_meter(),
            origin: self.mapper.origin().origin,
            coord_unit: self.mapper.coord_unit(),
            canvas_rotation_deg: self.viewport.rotation_deg(),
            reference: self.mapper.reference().cloned(),
        };
        if let Err(err) = self.store.persist_calibration(&record) {
            self.notify_persist_failure(None, &err);
        }
    }
}
