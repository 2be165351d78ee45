//! Error handling for the SheetAlign engine.
//!
//! Provides error types for the failure domains the engine reports:
//! - Calibration errors (invalid scale factors or reference data)
//! - Persistence errors (save failures from the backing store)
//!
//! Expected geometric outcomes (a degenerate cut line, a fully clipped
//! sheet, a near-parallel intersection) are represented as sentinel
//! returns such as `None` or an empty polygon, never as errors.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Calibration error type
///
/// Represents errors raised while establishing or applying the
/// world-to-pixel mapping.
#[derive(Error, Debug, Clone)]
pub enum CalibrationError {
    /// Scale factor is zero, negative, or non-finite
    #[error("Invalid scale factor: {pixels_per_meter} pixels per meter")]
    InvalidScale {
        /// The rejected scale value.
        pixels_per_meter: f64,
    },

    /// A calibration span of zero or negative length was supplied
    #[error("Calibration span must be positive (pixel: {pixel_distance}, real: {real_distance})")]
    InvalidSpan {
        /// Measured pixel distance.
        pixel_distance: f64,
        /// Measured real-world distance in meters.
        real_distance: f64,
    },

    /// The named reference asset does not exist in the session
    #[error("Reference asset {asset_id} not found")]
    UnknownReference {
        /// Identifier of the missing asset.
        asset_id: String,
    },
}

/// Persistence error type
///
/// Represents save failures reported by the persistence collaborator.
/// These are surfaced to the user as non-blocking notifications; local
/// state is never rolled back on their account.
#[derive(Error, Debug, Clone)]
pub enum PersistenceError {
    /// The sheet does not exist in the backing store
    #[error("Sheet {sheet_id} not found")]
    SheetNotFound {
        /// Identifier of the missing sheet.
        sheet_id: u64,
    },

    /// The store rejected the save
    #[error("Save rejected: {reason}")]
    Rejected {
        /// Why the save was rejected.
        reason: String,
    },

    /// The store is unreachable
    #[error("Backend unavailable: {message}")]
    Unavailable {
        /// A message describing the outage.
        message: String,
    },
}

/// Top-level error type for the engine.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Calibration error
    #[error("Calibration error: {0}")]
    Calibration(#[from] CalibrationError),

    /// Persistence error
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// An asset referenced by id does not exist
    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    /// A sheet referenced by id does not exist
    #[error("Unknown sheet: {0}")]
    UnknownSheet(u64),

    /// A join mark referenced by id does not exist or is not a valid
    /// link partner
    #[error("Unknown join mark: {0}")]
    UnknownJoinMark(u64),
}

/// Convenience result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
