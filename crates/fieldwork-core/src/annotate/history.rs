//! Bounded undo history of layer snapshots.

use std::collections::VecDeque;

use image::RgbaImage;

/// Snapshots kept per page; the oldest is dropped beyond this.
pub const MAX_UNDO_SNAPSHOTS: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoHistory {
    snapshots: VecDeque<RgbaImage>,
}

impl UndoHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, snapshot: RgbaImage) {
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > MAX_UNDO_SNAPSHOTS {
            self.snapshots.pop_front();
        }
    }

    pub fn pop(&mut self) -> Option<RgbaImage> {
        self.snapshots.pop_back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
