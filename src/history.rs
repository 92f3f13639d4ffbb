//! Linear undo/redo history of full decoration snapshots.
//!
//! Entries are deep copies; the live store never shares data with them.
//! Placeholder text (the sentinel the text tool inserts before anything is
//! typed) is never restored: restored states are stripped of it. An entry that
//! differs from the current state or from its neighbour only by placeholders
//! is skipped, so it never costs the user an undo or redo step.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use tracing::debug;

use crate::doc::FaceDecorations;

/// One recorded state.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    pub decorations: FaceDecorations,
    pub timestamp_ms: f64,
}

/// Bounded linear history with a cursor.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistorySnapshot>,
    index: usize,
    max_entries: usize,
    placeholder: String,
}

impl History {
    /// Start a history whose first entry is `initial`.
    #[must_use]
    pub fn new(initial: FaceDecorations, max_entries: usize, placeholder: impl Into<String>, now_ms: f64) -> Self {
        Self {
            entries: vec![HistorySnapshot { decorations: initial, timestamp_ms: now_ms }],
            index: 0,
            max_entries: max_entries.max(1),
            placeholder: placeholder.into(),
        }
    }

    /// Drop every entry and start over from `initial`.
    pub fn reset(&mut self, initial: FaceDecorations, now_ms: f64) {
        self.entries.clear();
        self.entries.push(HistorySnapshot { decorations: initial, timestamp_ms: now_ms });
        self.index = 0;
    }

    /// Record `decorations` as the newest entry.
    ///
    /// Anything after the cursor (the redo branch) is discarded first. A state
    /// identical to the current entry is not recorded again. When the cap is
    /// exceeded the oldest entries are dropped.
    pub fn push(&mut self, decorations: FaceDecorations, now_ms: f64) {
        if self.entries.get(self.index).is_some_and(|e| e.decorations == decorations) {
            return;
        }
        self.entries.truncate(self.index + 1);
        self.entries.push(HistorySnapshot { decorations, timestamp_ms: now_ms });
        if self.entries.len() > self.max_entries {
            let overflow = self.entries.len() - self.max_entries;
            self.entries.drain(..overflow);
            debug!(dropped = overflow, retained = self.entries.len(), "history trimmed");
        }
        self.index = self.entries.len() - 1;
    }

    /// Move the cursor back and return the state to restore.
    pub fn undo(&mut self) -> Option<FaceDecorations> {
        if self.index == 0 {
            return None;
        }
        let current = self.stripped(self.index);
        let mut target = self.index - 1;
        while target > 0 && self.stripped(target) == current {
            target -= 1;
        }
        while target > 0 && self.stripped(target) == self.stripped(target - 1) {
            target -= 1;
        }
        self.index = target;
        Some(self.stripped(target))
    }

    /// Move the cursor forward and return the state to restore.
    pub fn redo(&mut self) -> Option<FaceDecorations> {
        let last = self.entries.len() - 1;
        if self.index >= last {
            return None;
        }
        let current = self.stripped(self.index);
        let mut target = self.index + 1;
        while target < last && self.stripped(target) == current {
            target += 1;
        }
        while target < last && self.stripped(target) == self.stripped(target + 1) {
            target += 1;
        }
        self.index = target;
        Some(self.stripped(target))
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Cursor position.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: a history holds at least its initial entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&HistorySnapshot> {
        self.entries.get(self.index)
    }

    /// All retained entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[HistorySnapshot] {
        &self.entries
    }

    fn stripped(&self, index: usize) -> FaceDecorations {
        self.entries
            .get(index)
            .map(|e| e.decorations.without_placeholders(&self.placeholder))
            .unwrap_or_default()
    }
}
