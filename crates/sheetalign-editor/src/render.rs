//! Rendering collaborator interface.
//!
//! The engine does not draw. It hands the scene layer clip polygons and
//! viewport matrices, and reads back object transforms. Clipping is a
//! first-class argument of the interface, never a patched draw callback,
//! and domain identity is kept in the session's own side tables rather
//! than in tags attached to scene objects.

use std::collections::HashMap;

use sheetalign_core::Point;

/// Opaque handle to a display object owned by the scene layer.
pub type ObjectHandle = u64;

/// Contract the engine requires from the rendering/scene-graph library.
pub trait SceneRenderer {
    /// Applies `polygon` (sheet-local coordinates) as the clip region for
    /// an object. `None` removes clipping; an empty polygon hides the
    /// object entirely (the fully-clipped-away case).
    fn set_clip_region(&mut self, handle: ObjectHandle, polygon: Option<&[Point]>);

    /// Current affine transform of an object, canvas-style
    /// `[a, b, c, d, e, f]`.
    fn object_matrix(&self, handle: ObjectHandle) -> [f64; 6];

    /// Re-syncs cached screen-space coordinates after a viewport change.
    /// A stale cache makes selection and clip hit-testing disagree with
    /// what is drawn, so the session calls this after every viewport
    /// mutation, before the next hit-test.
    fn sync_viewport(&mut self, matrix: [f64; 6]);
}

/// Headless renderer that records every call, for tests.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    /// Last clip region applied per object.
    pub clip_regions: HashMap<ObjectHandle, Option<Vec<Point>>>,
    /// Every viewport matrix synced, in order.
    pub viewport_syncs: Vec<[f64; 6]>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last clip region applied to an object, if any call was made.
    pub fn clip_region(&self, handle: ObjectHandle) -> Option<&Option<Vec<Point>>> {
        self.clip_regions.get(&handle)
    }
}

impl SceneRenderer for RecordingRenderer {
    fn set_clip_region(&mut self, handle: ObjectHandle, polygon: Option<&[Point]>) {
        self.clip_regions.insert(handle, polygon.map(<[Point]>::to_vec));
    }

    fn object_matrix(&self, _handle: ObjectHandle) -> [f64; 6] {
        [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]
    }

    fn sync_viewport(&mut self, matrix: [f64; 6]) {
        self.viewport_syncs.push(matrix);
    }
}
