//! Undo/redo history over document snapshots.

use crate::model::{Annotation, AnnotationThread, FormField, RedactionArea};

/// Maximum number of snapshots retained. Older entries are evicted.
pub const MAX_HISTORY: usize = 50;

/// A full copy of the mutable document state at one point in time.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub annotations: Vec<Annotation>,
    pub threads: Vec<AnnotationThread>,
    pub redactions: Vec<RedactionArea>,
    pub form_fields: Vec<FormField>,
}

/// A bounded snapshot list with a cursor.
///
/// The cursor points at the snapshot representing current state. Undo moves
/// it back, redo moves it forward. Pushing a new snapshot truncates any
/// redo tail, then evicts the oldest entry when the cap is exceeded.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<Snapshot>,
    cursor: usize,
}

impl History {
    /// Start history with an initial snapshot of loaded state.
    pub fn new(initial: Snapshot) -> Self {
        Self {
            snapshots: vec![initial],
            cursor: 0,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Record a new state after a mutation.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(snapshot);
        if self.snapshots.len() > MAX_HISTORY {
            self.snapshots.remove(0);
        }
        self.cursor = self.snapshots.len() - 1;
    }

    /// Step back one snapshot. Returns the state to restore.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(&self.snapshots[self.cursor])
    }

    /// Step forward one snapshot. Returns the state to restore.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(&self.snapshots[self.cursor])
    }

    /// Replace all history with a single snapshot. Used after operations
    /// that invalidate prior states, like structural page edits.
    pub fn reset(&mut self, snapshot: Snapshot) {
        self.snapshots = vec![snapshot];
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
