//! Bounded undo history over sheet transform and cut operations.
//!
//! One entry is pushed per completed user gesture (mouse-down to
//! mouse-up), never per intermediate frame. The stack is a bounded ring:
//! past capacity the oldest entries are dropped silently, and popping an
//! empty stack is a no-op, not an error.

use std::collections::VecDeque;

use sheetalign_core::constants::UNDO_CAPACITY;

use crate::cuts::Cut;
use crate::sheet::SheetPlacement;

/// A reversible record of one completed gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoEntry {
    /// The sheet was dragged, rotated, or edited; stores the placement
    /// before the gesture.
    Transform {
        sheet_id: u64,
        prev_placement: SheetPlacement,
    },
    /// A cut was appended or the last cut toggled; stores the cut list
    /// before the gesture, or `None` when this was the first cut on a
    /// previously uncut sheet.
    Cut {
        sheet_id: u64,
        prev_cuts: Option<Vec<Cut>>,
    },
    /// The whole cut list was cleared; stores the removed list.
    ClearCut { sheet_id: u64, prev_cuts: Vec<Cut> },
}

/// Bounded stack of undo entries.
#[derive(Debug, Clone)]
pub struct UndoStack {
    entries: VecDeque<UndoEntry>,
    capacity: usize,
}

impl UndoStack {
    /// Creates a stack with the default capacity of 50 entries.
    pub fn new() -> Self {
        Self::with_capacity(UNDO_CAPACITY)
    }

    /// Creates a stack with an explicit capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an entry, evicting the oldest once past capacity.
    pub fn push(&mut self, entry: UndoEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Pops the most recent entry, or `None` when the history is empty.
    pub fn pop(&mut self) -> Option<UndoEntry> {
        self.entries.pop_back()
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the history is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clears the history.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform_entry(sheet_id: u64) -> UndoEntry {
        UndoEntry::Transform {
            sheet_id,
            prev_placement: SheetPlacement::default(),
        }
    }

    #[test]
    fn test_pop_order_is_lifo() {
        let mut stack = UndoStack::new();
        stack.push(transform_entry(1));
        stack.push(transform_entry(2));
        assert!(matches!(
            stack.pop(),
            Some(UndoEntry::Transform { sheet_id: 2, .. })
        ));
        assert!(matches!(
            stack.pop(),
            Some(UndoEntry::Transform { sheet_id: 1, .. })
        ));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut stack = UndoStack::with_capacity(3);
        for id in 1..=5 {
            stack.push(transform_entry(id));
        }
        assert_eq!(stack.len(), 3);
        // Entries 1 and 2 were dropped; the newest three remain.
        let ids: Vec<u64> = std::iter::from_fn(|| stack.pop())
            .map(|e| match e {
                UndoEntry::Transform { sheet_id, .. } => sheet_id,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(ids, vec![5, 4, 3]);
    }

    #[test]
    fn test_default_capacity() {
        let mut stack = UndoStack::new();
        for id in 0..80 {
            stack.push(transform_entry(id));
        }
        assert_eq!(stack.len(), 50);
    }

    #[test]
    fn test_empty_pop_is_noop() {
        let mut stack = UndoStack::new();
        assert!(!stack.can_undo());
        assert_eq!(stack.pop(), None);
    }
}
