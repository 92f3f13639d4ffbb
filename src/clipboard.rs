//! Single-slot decoration clipboard.
//!
//! Copy stores a deep copy of the selection. Duplicate and paste both produce
//! an offset copy with a fresh id; the controller inserts it through the
//! historied store path and selects it.

#[cfg(test)]
#[path = "clipboard_test.rs"]
mod clipboard_test;

use crate::doc::{Decoration, DecorationId};

/// Holds at most one copied decoration.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    slot: Option<Decoration>,
}

impl Clipboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the slot with a copy of `decoration`.
    pub fn copy(&mut self, decoration: &Decoration) {
        self.slot = Some(decoration.clone());
    }

    /// The copied decoration, if any.
    #[must_use]
    pub fn peek(&self) -> Option<&Decoration> {
        self.slot.as_ref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    /// A pasteable copy of the slot, shifted by `offset`, or `None` when empty.
    #[must_use]
    pub fn paste_copy(&self, offset: f64) -> Option<Decoration> {
        self.slot.as_ref().map(|d| offset_copy(d, offset))
    }
}

/// Copy `source` with a fresh id, moved by `(offset, offset)`. Drawing strokes
/// shift along with the position.
#[must_use]
pub fn offset_copy(source: &Decoration, offset: f64) -> Decoration {
    let mut copy = source.clone();
    copy.id = DecorationId::generate(source.kind());
    copy.move_to(source.x + offset, source.y + offset);
    copy
}
