//! Storage encoding for [`FaceDecorations`].
//!
//! Some document stores reject arrays nested inside arrays, which is exactly
//! the shape of drawing strokes (`paths: [[[x, y], ...], ...]`). [`encode`]
//! rewrites every array as an object keyed by decimal index (`{"0": .., "1": ..}`)
//! and [`decode`] reverses it.
//!
//! Decoding is lenient, because stored cards predate the current model:
//! a face that is not a sequence becomes empty (or the values of a keyed
//! object), an empty object where a sequence belongs becomes an empty
//! sequence, and individual decorations that still fail to parse are dropped
//! with a warning instead of failing the whole card.

#[cfg(test)]
#[path = "codec_test.rs"]
mod codec_test;

use serde_json::{Map, Value};
use tracing::warn;

use crate::doc::{Decoration, Face, FaceDecorations};

/// Error from the JSON helpers.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("card json: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================
// Generic array <-> keyed-object transform
// =============================================================

/// Rewrite every array in `value` (recursively) as an index-keyed object.
#[must_use]
pub fn encode_value(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Object(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| (i.to_string(), encode_value(item)))
                .collect(),
        ),
        Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, encode_value(v))).collect()),
        other => other,
    }
}

/// Turn index-keyed objects (recursively) back into arrays.
///
/// An object qualifies when it is non-empty and every key is a decimal index.
/// Entries are ordered by index; gaps are closed.
#[must_use]
pub fn decode_value(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(decode_value).collect()),
        Value::Object(map) => match indexed_entries(&map) {
            Some(order) => {
                let mut map = map;
                Value::Array(
                    order
                        .into_iter()
                        .filter_map(|key| map.remove(&key))
                        .map(decode_value)
                        .collect(),
                )
            }
            None => Value::Object(map.into_iter().map(|(k, v)| (k, decode_value(v))).collect()),
        },
        other => other,
    }
}

/// Keys of an index-keyed object in index order, or `None` if it isn't one.
fn indexed_entries(map: &Map<String, Value>) -> Option<Vec<String>> {
    if map.is_empty() {
        return None;
    }
    let mut keyed = Vec::with_capacity(map.len());
    for key in map.keys() {
        if !key.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let Ok(index) = key.parse::<usize>() else {
            return None;
        };
        keyed.push((index, key.clone()));
    }
    keyed.sort_unstable_by_key(|(index, _)| *index);
    Some(keyed.into_iter().map(|(_, key)| key).collect())
}

// =============================================================
// Typed encode / decode
// =============================================================

/// Storage form of `decorations`.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if serialization fails. Non-finite numbers do
/// not fail here; they are written as `null` and that decoration is dropped
/// on decode.
pub fn encode(decorations: &FaceDecorations) -> Result<Value, CodecError> {
    Ok(encode_value(serde_json::to_value(decorations)?))
}

/// Decode a stored value, normalizing anything malformed. Never fails.
#[must_use]
pub fn decode(value: Value) -> FaceDecorations {
    let mut root = match decode_value(value) {
        Value::Object(root) => root,
        Value::Null => return FaceDecorations::new(),
        other => {
            warn!(found = kind_name(&other), "stored decorations are not an object; using empty card");
            return FaceDecorations::new();
        }
    };
    FaceDecorations {
        front: decode_face(Face::Front, root.remove("front")),
        back: decode_face(Face::Back, root.remove("back")),
    }
}

/// Encode straight to a JSON string.
///
/// # Errors
///
/// See [`encode`].
pub fn to_json_string(decorations: &FaceDecorations) -> Result<String, CodecError> {
    Ok(serde_json::to_string(&encode(decorations)?)?)
}

/// Decode from a JSON string.
///
/// # Errors
///
/// Returns [`CodecError::Json`] only for text that is not JSON at all.
pub fn from_json_str(raw: &str) -> Result<FaceDecorations, CodecError> {
    Ok(decode(serde_json::from_str(raw)?))
}

fn decode_face(face: Face, value: Option<Value>) -> Vec<Decoration> {
    let entries = match value {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        // A keyed object that was not index-keyed, e.g. push-ids.
        Some(Value::Object(map)) => map.into_iter().map(|(_, v)| v).collect(),
        Some(other) => {
            warn!(face = face.as_str(), found = kind_name(&other), "face is not a sequence; using empty face");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let entry = repair_paths(entry);
            match serde_json::from_value::<Decoration>(entry) {
                Ok(dec) => Some(dec),
                Err(err) => {
                    warn!(face = face.as_str(), index, error = %err, "dropping malformed decoration");
                    None
                }
            }
        })
        .collect()
}

/// Empty arrays encode as `{}`, which [`decode_value`] cannot tell from an
/// empty object. Restore them where a drawing expects sequences.
fn repair_paths(mut entry: Value) -> Value {
    let Some(paths) = entry.get_mut("data").and_then(|d| d.get_mut("paths")) else {
        return entry;
    };
    if is_empty_object(paths) {
        *paths = Value::Array(Vec::new());
    }
    if let Value::Array(strokes) = paths {
        for stroke in strokes.iter_mut().filter(|s| is_empty_object(s)) {
            *stroke = Value::Array(Vec::new());
        }
    }
    entry
}

fn is_empty_object(value: &Value) -> bool {
    value.as_object().is_some_and(Map::is_empty)
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
