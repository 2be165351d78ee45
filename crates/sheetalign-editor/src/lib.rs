//! # SheetAlign Editor
//!
//! This crate provides the geometry and coordinate engine behind the
//! SheetAlign editor: aligning large scanned plan sheets with geolocated
//! point assets on an interactive canvas.
//!
//! ## Core Components
//!
//! ### Geometry
//! - **Half-plane clipper**: one Sutherland-Hodgman step against a
//!   directed line
//! - **Cut composer**: folds a sheet's ordered cut list into its visible
//!   clip polygon
//!
//! ### Coordinates
//! - **Coordinate mapper**: bidirectional pixel <-> world conversion,
//!   reference-calibrated (with rotation and degree support) or
//!   origin/scale fallback
//! - **Viewport**: pan, zoom, and rotation composed into one affine
//!   matrix, with pointer-anchored zoom
//!
//! ### Editing
//! - **Undo stack**: bounded history of inverse transform and cut
//!   operations
//! - **Editor session**: the single mutator of viewport, sheet, and cut
//!   state; drives the persistence and rendering collaborators
//! - **Join marks**: labeled match points pairing sheets along their
//!   printed join lines
//!
//! ## Architecture
//!
//! The engine operates in layers:
//!
//! ```text
//! EditorSession (gesture-level operations, undo, notifications)
//!   ├── Viewport (screen <-> canvas pixels)
//!   ├── CoordinateMapper (canvas pixels <-> meters/degrees)
//!   ├── Sheets (placement + ordered cut lists)
//!   │     └── compose_cut_polygon -> clip_half_plane
//!   ├── SheetStore (persistence collaborator, optimistic saves)
//!   └── SceneRenderer (clip regions, hit-test cache sync)
//! ```
//!
//! Rendering, raster decoding, and networking are collaborators behind
//! traits, not part of this crate.

pub mod asset;
pub mod calibration;
pub mod clip;
pub mod cuts;
pub mod joinmark;
pub mod persist;
pub mod render;
pub mod session;
pub mod sheet;
pub mod undo;
pub mod viewport;

pub use asset::{AdjustmentRecord, Asset};
pub use calibration::{CoordinateMapper, OriginCalibration, ReferenceCalibration};
pub use clip::clip_half_plane;
pub use cuts::{compose_cut_polygon, Cut};
pub use joinmark::JoinMark;
pub use persist::{CalibrationRecord, InMemoryStore, SheetStore};
pub use render::{ObjectHandle, RecordingRenderer, SceneRenderer};
pub use session::{EditorSession, SessionEvent};
pub use sheet::{Sheet, SheetPlacement};
pub use undo::{UndoEntry, UndoStack};
pub use viewport::{Viewport, ViewportState};
