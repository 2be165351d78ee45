//! Persistence collaborator contracts and wire types.
//!
//! The engine saves optimistically: local state is updated first, then
//! the store is called. A failed save is surfaced to the user and logged,
//! never rolled back; a page reload re-fetches authoritative state.
//!
//! Cut lists are persisted as ordered arrays of
//! `{p1: {x, y}, p2: {x, y}, flipped}` objects in sheet-local
//! coordinates, so they remain valid regardless of the sheet's on-screen
//! placement at save time.

use std::collections::HashMap;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use sheetalign_core::{PersistenceError, Result};

use crate::calibration::ReferenceCalibration;
use crate::cuts::Cut;
use crate::sheet::SheetPlacement;

use sheetalign_core::units::CoordUnit;
use sheetalign_core::Point;

/// Project-level calibration as the backend stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRecord {
    pub pixels_per_meter: f64,
    pub origin: Point,
    pub coord_unit: CoordUnit,
    /// Persisted viewport rotation (saved on explicit request only).
    pub canvas_rotation_deg: f64,
    #[serde(default)]
    pub reference: Option<ReferenceCalibration>,
}

/// Contract the engine requires from the persistence/API layer.
///
/// Retries and caching belong to the implementation; the engine calls
/// these once per committed gesture and treats failures as non-fatal.
pub trait SheetStore {
    /// Saves the full cut list of a sheet (replacing the stored list).
    fn persist_sheet_cuts(&mut self, sheet_id: u64, cuts: &[Cut]) -> Result<()>;

    /// Saves a sheet's placement.
    fn persist_sheet_transform(&mut self, sheet_id: u64, placement: &SheetPlacement) -> Result<()>;

    /// Saves the project calibration.
    fn persist_calibration(&mut self, record: &CalibrationRecord) -> Result<()>;
}

/// Serializes a cut list to its wire JSON.
pub fn encode_cuts(cuts: &[Cut]) -> anyhow::Result<String> {
    serde_json::to_string(cuts).context("serializing cut list")
}

/// Parses a cut list from its wire JSON. Tolerates rows without the
/// `flipped` field, which older data omits.
pub fn decode_cuts(json: &str) -> anyhow::Result<Vec<Cut>> {
    serde_json::from_str(json).context("parsing cut list")
}

/// In-memory store for tests: records every save and can be told to fail.
/// Cut lists pass through the wire codec on the way in, as a real
/// backend's rows would.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    pub cuts: HashMap<u64, Vec<Cut>>,
    pub placements: HashMap<u64, SheetPlacement>,
    pub calibration: Option<CalibrationRecord>,
    /// When true, every save fails with a backend-unavailable error.
    pub fail_saves: bool,
    /// Total number of save calls, including failed ones.
    pub save_count: usize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(&mut self) -> Result<()> {
        self.save_count += 1;
        if self.fail_saves {
            return Err(PersistenceError::Unavailable {
                message: "injected failure".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl SheetStore for InMemoryStore {
    fn persist_sheet_cuts(&mut self, sheet_id: u64, cuts: &[Cut]) -> Result<()> {
        self.check()?;
        let json = encode_cuts(cuts).map_err(|e| PersistenceError::Rejected {
            reason: e.to_string(),
        })?;
        let stored = decode_cuts(&json).map_err(|e| PersistenceError::Rejected {
            reason: e.to_string(),
        })?;
        self.cuts.insert(sheet_id, stored);
        Ok(())
    }

    fn persist_sheet_transform(&mut self, sheet_id: u64, placement: &SheetPlacement) -> Result<()> {
        self.check()?;
        self.placements.insert(sheet_id, *placement);
        Ok(())
    }

    fn persist_calibration(&mut self, record: &CalibrationRecord) -> Result<()> {
        self.check()?;
        self.calibration = Some(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cut_list_wire_round_trip() {
        let cuts = vec![
            Cut::new(Point::new(-500.0, 0.0), Point::new(500.0, 0.0)),
            Cut {
                p1: Point::new(0.0, -300.0),
                p2: Point::new(0.0, 300.0),
                flipped: true,
            },
        ];
        let json = encode_cuts(&cuts).unwrap();
        let decoded = decode_cuts(&json).unwrap();
        assert_eq!(decoded, cuts);
    }

    #[test]
    fn test_decode_legacy_rows_without_flipped() {
        let decoded =
            decode_cuts(r#"[{"p1":{"x":1,"y":2},"p2":{"x":3,"y":4}}]"#).unwrap();
        assert_eq!(decoded.len(), 1);
        assert!(!decoded[0].flipped);
    }

    #[test]
    fn test_store_round_trips_cuts_through_wire_format() {
        let mut store = InMemoryStore::new();
        let cuts = vec![Cut {
            p1: Point::new(-500.0, -200.0),
            p2: Point::new(500.0, -200.0),
            flipped: true,
        }];
        store.persist_sheet_cuts(7, &cuts).unwrap();
        assert_eq!(store.cuts[&7], cuts);
    }

    #[test]
    fn test_in_memory_store_failure_injection() {
        let mut store = InMemoryStore::new();
        store.fail_saves = true;
        let err = store.persist_sheet_cuts(1, &[]).unwrap_err();
        assert!(err.to_string().contains("Backend unavailable"));
        assert_eq!(store.save_count, 1);
        assert!(store.cuts.is_empty());
    }
}
