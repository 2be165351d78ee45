//! Join marks pairing sheets along their printed match lines.
//!
//! Large plans are split across sheets, and each sheet carries printed
//! labels like "JOIN TO SHEET B-3" where a neighbor continues. A mark
//! sits at a sheet-local position, so it follows its sheet around the
//! canvas, and may be linked to the matching mark on the other sheet.
//! Links are symmetric: both marks point at each other, and dissolving
//! one side clears the other.

use serde::{Deserialize, Serialize};

use sheetalign_core::Point;

/// A labeled join mark on a sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinMark {
    pub mark_id: u64,
    /// Sheet the mark sits on.
    pub sheet_id: u64,
    /// Position in sheet-local coordinates.
    pub position: Point,
    /// Printed reference text, e.g. "JOIN TO SHEET B-3".
    pub reference_label: String,
    /// The matching mark on another sheet, once paired.
    pub linked_mark_id: Option<u64>,
}

impl JoinMark {
    /// Creates an unlinked mark.
    pub fn new(
        mark_id: u64,
        sheet_id: u64,
        position: Point,
        reference_label: impl Into<String>,
    ) -> Self {
        Self {
            mark_id,
            sheet_id,
            position,
            reference_label: reference_label.into(),
            linked_mark_id: None,
        }
    }

    /// Whether the mark has been paired with its counterpart.
    pub fn is_linked(&self) -> bool {
        self.linked_mark_id.is_some()
    }
}
