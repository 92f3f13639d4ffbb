//! Card persistence seam.
//!
//! The engine itself never talks to a database. Hosts implement [`CardStore`]
//! over whatever document store they use; records go through [`crate::codec`]
//! so nested stroke arrays survive stores that cannot hold them.
//! [`MemoryCardStore`] keeps encoded documents in a map and backs tests and
//! offline previews.

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;

use std::collections::HashMap;

use serde_json::{Value, json};
use tracing::debug;
use uuid::Uuid;

use crate::clock;
use crate::codec::{self, CodecError};
use crate::doc::FaceDecorations;

/// Error from a card store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("card not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("storage backend: {0}")]
    Backend(String),
}

/// A saved card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardRecord {
    pub decorations: FaceDecorations,
    pub created_at_ms: f64,
}

/// Save and load whole cards by id.
pub trait CardStore {
    /// Persist `decorations` as a new card and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Codec`] if the card cannot be encoded, or
    /// [`StoreError::Backend`] if the store rejects it.
    fn save(&mut self, decorations: &FaceDecorations) -> Result<String, StoreError>;

    /// Fetch a saved card.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id, or
    /// [`StoreError::Backend`] if the store fails.
    fn load(&self, id: &str) -> Result<CardRecord, StoreError>;

    /// Fetch only a card's decorations.
    ///
    /// # Errors
    ///
    /// See [`CardStore::load`].
    fn load_decorations(&self, id: &str) -> Result<FaceDecorations, StoreError> {
        self.load(id).map(|record| record.decorations)
    }
}

/// Build the stored document for a card.
///
/// # Errors
///
/// Returns [`CodecError`] if the decorations cannot be encoded.
pub fn to_document(decorations: &FaceDecorations, created_at_ms: f64) -> Result<Value, CodecError> {
    Ok(json!({
        "decorations": codec::encode(decorations)?,
        "createdAt": created_at_ms,
    }))
}

/// Read a stored document back, normalizing malformed content.
#[must_use]
pub fn from_document(mut document: Value) -> CardRecord {
    let decorations = document
        .get_mut("decorations")
        .map(Value::take)
        .map(codec::decode)
        .unwrap_or_default();
    let created_at_ms = document.get("createdAt").and_then(Value::as_f64).unwrap_or(0.0);
    CardRecord { decorations, created_at_ms }
}

/// In-memory store of encoded card documents.
#[derive(Debug, Default)]
pub struct MemoryCardStore {
    documents: HashMap<String, Value>,
}

impl MemoryCardStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored document, as a backend would hold it.
    #[must_use]
    pub fn document(&self, id: &str) -> Option<&Value> {
        self.documents.get(id)
    }

    /// Store a raw document under `id` (e.g. a legacy card).
    pub fn insert_document(&mut self, id: impl Into<String>, document: Value) {
        self.documents.insert(id.into(), document);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl CardStore for MemoryCardStore {
    fn save(&mut self, decorations: &FaceDecorations) -> Result<String, StoreError> {
        let document = to_document(decorations, clock::now_ms())?;
        let id = Uuid::new_v4().simple().to_string();
        debug!(%id, decorations = decorations.len(), "card saved");
        self.documents.insert(id.clone(), document);
        Ok(id)
    }

    fn load(&self, id: &str) -> Result<CardRecord, StoreError> {
        let document = self.documents.get(id).ok_or_else(|| StoreError::NotFound(id.to_owned()))?;
        Ok(from_document(document.clone()))
    }
}
