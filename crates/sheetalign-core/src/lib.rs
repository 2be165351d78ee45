//! # SheetAlign Core
//!
//! Core types and utilities for the SheetAlign geometry engine.
//! Provides the 2D primitives, real-world unit conversions, shared
//! constants, and error types used by the editor crates.

pub mod constants;
pub mod error;
pub mod geom;
pub mod units;

pub use error::{CalibrationError, Error, PersistenceError, Result};
pub use geom::Point;
pub use units::{degree_delta_to_meters, meter_delta_to_degrees, CoordUnit, METERS_PER_DEGREE};
