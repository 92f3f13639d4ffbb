//! Document model: decorations, their per-type payloads, and the decoration store.
//!
//! This module defines what is on a card face (`Decoration`, `DecorationData`),
//! the two-face container (`FaceDecorations`), and the runtime store that owns
//! the live collections together with their undo history (`DecorationStore`).
//!
//! Order within a face is z-order: later entries paint on top and win hit
//! tests. The store is the only place that mutates the collections; every
//! other component reads through it.
//!
//! The JSON shape (`{ "type", "id", "x", "y", "data", "scale"?, "rotation"? }`)
//! matches what previously saved cards contain, so decoding accepts missing
//! payload fields and legacy encodings and fills in defaults.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::clock;
use crate::consts::DEFAULT_STICKER_SCALE;
use crate::history::History;

// =============================================================
// Faces
// =============================================================

/// One side of the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    #[default]
    Front,
    Back,
}

impl Face {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
        }
    }

    /// The opposite face.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

/// Error returned when a face name is neither `"front"` nor `"back"`.
#[derive(Debug, thiserror::Error)]
#[error("invalid face name: {0:?}")]
pub struct FaceParseError(pub String);

impl FromStr for Face {
    type Err = FaceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "front" => Ok(Self::Front),
            "back" => Ok(Self::Back),
            other => Err(FaceParseError(other.to_owned())),
        }
    }
}

// =============================================================
// Identifiers and kinds
// =============================================================

/// Opaque decoration identifier, stable for the decoration's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecorationId(String);

impl DecorationId {
    /// Wrap an existing identifier (e.g. one read back from storage).
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh identifier: the kind name followed by a time-ordered UUID with a
    /// random tail, so rapid creation never collides.
    #[must_use]
    pub fn generate(kind: DecorationKind) -> Self {
        Self(format!("{}-{}", kind.as_str(), Uuid::now_v7().simple()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DecorationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decoration type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecorationKind {
    Sticker,
    Text,
    Drawing,
}

impl DecorationKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sticker => "sticker",
            Self::Text => "text",
            Self::Drawing => "drawing",
        }
    }
}

// =============================================================
// Payloads
// =============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
}

/// Sticker payload. `color` fills the fallback circle when `url` fails to load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StickerData {
    pub url: String,
    pub color: String,
    pub scale: f64,
}

impl Default for StickerData {
    fn default() -> Self {
        Self { url: String::new(), color: "#ff6b6b".to_owned(), scale: DEFAULT_STICKER_SCALE }
    }
}

/// Text payload. `text` may contain newlines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTextData", rename_all = "camelCase")]
pub struct TextData {
    pub text: String,
    pub font_size: f64,
    pub font_family: String,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub color: String,
    pub text_decoration: TextDecoration,
}

impl Default for TextData {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: 24.0,
            font_family: "Arial, sans-serif".to_owned(),
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            color: "#000000".to_owned(),
            text_decoration: TextDecoration::None,
        }
    }
}

/// Lenient decode shape for [`TextData`].
///
/// Older cards stored italics as `fontWeight: "italic"` with no `fontStyle`.
#[derive(Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawTextData {
    text: String,
    font_size: f64,
    font_family: String,
    font_weight: String,
    font_style: Option<FontStyle>,
    color: String,
    text_decoration: TextDecoration,
}

impl Default for RawTextData {
    fn default() -> Self {
        let base = TextData::default();
        Self {
            text: base.text,
            font_size: base.font_size,
            font_family: base.font_family,
            font_weight: "normal".to_owned(),
            font_style: None,
            color: base.color,
            text_decoration: base.text_decoration,
        }
    }
}

impl From<RawTextData> for TextData {
    fn from(raw: RawTextData) -> Self {
        let font_weight = if raw.font_weight == "bold" { FontWeight::Bold } else { FontWeight::Normal };
        let font_style = raw.font_style.unwrap_or(if raw.font_weight == "italic" {
            FontStyle::Italic
        } else {
            FontStyle::Normal
        });
        Self {
            text: raw.text,
            font_size: raw.font_size,
            font_family: raw.font_family,
            font_weight,
            font_style,
            color: raw.color,
            text_decoration: raw.text_decoration,
        }
    }
}

/// One freehand stroke: ordered `[x, y]` points in absolute card space.
pub type Stroke = Vec<[f64; 2]>;

/// Freehand drawing payload. Each stroke is painted as its own polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DrawingData {
    pub paths: Vec<Stroke>,
    pub color: String,
    pub line_width: f64,
}

impl Default for DrawingData {
    fn default() -> Self {
        Self { paths: Vec::new(), color: "#000000".to_owned(), line_width: 2.0 }
    }
}

/// Type-specific payload. The variant is the decoration's type.
#[derive(Debug, Clone, PartialEq)]
pub enum DecorationData {
    Sticker(StickerData),
    Text(TextData),
    Drawing(DrawingData),
}

impl DecorationData {
    #[must_use]
    pub fn kind(&self) -> DecorationKind {
        match self {
            Self::Sticker(_) => DecorationKind::Sticker,
            Self::Text(_) => DecorationKind::Text,
            Self::Drawing(_) => DecorationKind::Drawing,
        }
    }
}

// =============================================================
// Decoration
// =============================================================

/// A sticker, text block or drawing placed on a card face.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawDecoration")]
pub struct Decoration {
    pub id: DecorationId,
    /// Card-space x (origin at card center).
    pub x: f64,
    /// Card-space y (origin at card center).
    pub y: f64,
    pub data: DecorationData,
    /// Optional uniform scale override (stickers).
    pub scale: Option<f64>,
    /// Carried through persistence; not rendered.
    pub rotation: Option<f64>,
}

impl Decoration {
    /// New decoration with a freshly generated id.
    #[must_use]
    pub fn new(x: f64, y: f64, data: DecorationData) -> Self {
        Self { id: DecorationId::generate(data.kind()), x, y, data, scale: None, rotation: None }
    }

    #[must_use]
    pub fn kind(&self) -> DecorationKind {
        self.data.kind()
    }

    /// Move to `(x, y)`. Drawing strokes hold absolute card-space points, so
    /// they travel by the same delta.
    pub fn move_to(&mut self, x: f64, y: f64) {
        let (dx, dy) = (x - self.x, y - self.y);
        if let DecorationData::Drawing(data) = &mut self.data {
            for point in data.paths.iter_mut().flatten() {
                point[0] += dx;
                point[1] += dy;
            }
        }
        self.x = x;
        self.y = y;
    }

    /// Text payload, if this is a text decoration.
    #[must_use]
    pub fn text(&self) -> Option<&TextData> {
        match &self.data {
            DecorationData::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Whether this is a text decoration still holding the placeholder sentinel.
    #[must_use]
    pub fn is_placeholder(&self, placeholder: &str) -> bool {
        self.text().is_some_and(|t| t.text == placeholder)
    }

    /// Effective sticker scale: the per-decoration override, else the payload scale.
    #[must_use]
    pub fn sticker_scale(&self, data: &StickerData) -> f64 {
        self.scale.unwrap_or(data.scale)
    }
}

impl Serialize for Decoration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 5 + usize::from(self.scale.is_some()) + usize::from(self.rotation.is_some());
        let mut st = serializer.serialize_struct("Decoration", len)?;
        st.serialize_field("type", &self.kind())?;
        st.serialize_field("id", &self.id)?;
        st.serialize_field("x", &self.x)?;
        st.serialize_field("y", &self.y)?;
        match &self.data {
            DecorationData::Sticker(data) => st.serialize_field("data", data)?,
            DecorationData::Text(data) => st.serialize_field("data", data)?,
            DecorationData::Drawing(data) => st.serialize_field("data", data)?,
        }
        match self.scale {
            Some(scale) => st.serialize_field("scale", &scale)?,
            None => st.skip_field("scale")?,
        }
        match self.rotation {
            Some(rotation) => st.serialize_field("rotation", &rotation)?,
            None => st.skip_field("rotation")?,
        }
        st.end()
    }
}

/// Wire shape of a decoration before its payload is interpreted.
#[derive(Deserialize)]
struct RawDecoration {
    #[serde(rename = "type")]
    kind: DecorationKind,
    id: DecorationId,
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default)]
    scale: Option<f64>,
    #[serde(default)]
    rotation: Option<f64>,
}

impl TryFrom<RawDecoration> for Decoration {
    type Error = serde_json::Error;

    fn try_from(raw: RawDecoration) -> Result<Self, Self::Error> {
        let payload = if raw.data.is_null() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            raw.data
        };
        let data = match raw.kind {
            DecorationKind::Sticker => DecorationData::Sticker(serde_json::from_value(payload)?),
            DecorationKind::Text => DecorationData::Text(serde_json::from_value(payload)?),
            DecorationKind::Drawing => DecorationData::Drawing(serde_json::from_value(payload)?),
        };
        Ok(Self { id: raw.id, x: raw.x, y: raw.y, data, scale: raw.scale, rotation: raw.rotation })
    }
}

// =============================================================
// FaceDecorations
// =============================================================

/// Both faces' decorations, each in z-order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceDecorations {
    pub front: Vec<Decoration>,
    pub back: Vec<Decoration>,
}

impl FaceDecorations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decorations of one face.
    #[must_use]
    pub fn face(&self, face: Face) -> &[Decoration] {
        match face {
            Face::Front => &self.front,
            Face::Back => &self.back,
        }
    }

    fn face_mut(&mut self, face: Face) -> &mut Vec<Decoration> {
        match face {
            Face::Front => &mut self.front,
            Face::Back => &mut self.back,
        }
    }

    /// Copy with every placeholder text decoration removed.
    #[must_use]
    pub fn without_placeholders(&self, placeholder: &str) -> Self {
        let keep = |d: &&Decoration| !d.is_placeholder(placeholder);
        Self {
            front: self.front.iter().filter(keep).cloned().collect(),
            back: self.back.iter().filter(keep).cloned().collect(),
        }
    }

    /// Total decoration count across both faces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.front.len() + self.back.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.front.is_empty() && self.back.is_empty()
    }
}

// =============================================================
// DecorationStore
// =============================================================

/// Authoritative per-face decoration collections plus their undo history.
///
/// Historied mutators apply the change and then push the resulting state, so
/// the current history entry always reflects the live state once a gesture
/// settles. Non-historied mutators are for high-frequency updates (drag,
/// live typing) that are later committed as a single step.
pub struct DecorationStore {
    decorations: FaceDecorations,
    history: History,
    generation: u64,
}

impl DecorationStore {
    /// Create an empty store whose history holds at most `max_history` entries.
    #[must_use]
    pub fn new(max_history: usize, placeholder: impl Into<String>) -> Self {
        let decorations = FaceDecorations::new();
        let history = History::new(decorations.clone(), max_history, placeholder, clock::now_ms());
        Self { decorations, history, generation: 0 }
    }

    /// Replace both faces wholesale (card load). History restarts from this state.
    pub fn replace_all(&mut self, decorations: FaceDecorations) {
        debug!(front = decorations.front.len(), back = decorations.back.len(), "decorations replaced");
        self.history.reset(decorations.clone(), clock::now_ms());
        self.decorations = decorations;
        self.generation += 1;
    }

    /// Counter bumped on every wholesale replacement.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn decorations(&self) -> &FaceDecorations {
        &self.decorations
    }

    /// Decorations of one face in z-order.
    #[must_use]
    pub fn face(&self, face: Face) -> &[Decoration] {
        self.decorations.face(face)
    }

    /// Look up a decoration by id.
    #[must_use]
    pub fn get(&self, face: Face, id: &DecorationId) -> Option<&Decoration> {
        self.face(face).iter().find(|d| &d.id == id)
    }

    /// Z-order index of a decoration.
    #[must_use]
    pub fn index_of(&self, face: Face, id: &DecorationId) -> Option<usize> {
        self.face(face).iter().position(|d| &d.id == id)
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    // --- Historied mutators ---

    /// Append a decoration on top of the face. Returns false if the id is already used.
    pub fn add_decoration(&mut self, face: Face, decoration: Decoration) -> bool {
        if self.get(face, &decoration.id).is_some() {
            warn!(face = face.as_str(), id = %decoration.id, "duplicate decoration id; not added");
            return false;
        }
        self.decorations.face_mut(face).push(decoration);
        self.commit();
        true
    }

    /// Remove a decoration. Absent ids are a no-op.
    pub fn remove_decoration(&mut self, face: Face, id: &DecorationId) -> Option<Decoration> {
        let index = self.index_of(face, id)?;
        let removed = self.decorations.face_mut(face).remove(index);
        self.commit();
        Some(removed)
    }

    /// Replace a decoration's payload and record a history entry.
    pub fn update_decoration(&mut self, face: Face, id: &DecorationId, data: DecorationData) -> bool {
        if !self.replace_data(face, id, data) {
            return false;
        }
        self.commit();
        true
    }

    /// Commit the current state as one history entry (end of a drag or nudge).
    pub fn save_decoration_position_to_history(&mut self, face: Face, id: &DecorationId) -> bool {
        if self.get(face, id).is_none() {
            return false;
        }
        self.commit();
        true
    }

    // --- Non-historied mutators ---

    /// Replace a decoration's payload without touching history.
    pub fn update_decoration_without_history(&mut self, face: Face, id: &DecorationId, data: DecorationData) -> bool {
        self.replace_data(face, id, data)
    }

    /// Move a decoration. A drawing's stroke points move with it.
    pub fn update_decoration_position(&mut self, face: Face, id: &DecorationId, x: f64, y: f64) -> bool {
        let Some(dec) = self.find_mut(face, id) else {
            return false;
        };
        dec.move_to(x, y);
        true
    }

    /// Set a decoration's uniform scale override.
    pub fn update_decoration_scale(&mut self, face: Face, id: &DecorationId, scale: f64) -> bool {
        let Some(dec) = self.find_mut(face, id) else {
            return false;
        };
        dec.scale = Some(scale);
        true
    }

    /// Set a decoration's rotation.
    pub fn update_decoration_rotation(&mut self, face: Face, id: &DecorationId, rotation: f64) -> bool {
        let Some(dec) = self.find_mut(face, id) else {
            return false;
        };
        dec.rotation = Some(rotation);
        true
    }

    /// Put a decoration back exactly as captured (cancelled drag). Not historied.
    pub fn restore_decoration(&mut self, face: Face, original: &Decoration) -> bool {
        let Some(dec) = self.find_mut(face, &original.id) else {
            return false;
        };
        dec.clone_from(original);
        true
    }

    // --- History ---

    /// Step back one meaningful history entry. Returns false at the oldest entry.
    pub fn undo(&mut self) -> bool {
        let Some(restored) = self.history.undo() else {
            return false;
        };
        self.decorations = restored;
        true
    }

    /// Step forward one meaningful history entry. Returns false at the newest entry.
    pub fn redo(&mut self) -> bool {
        let Some(restored) = self.history.redo() else {
            return false;
        };
        self.decorations = restored;
        true
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // --- Internals ---

    fn find_mut(&mut self, face: Face, id: &DecorationId) -> Option<&mut Decoration> {
        self.decorations.face_mut(face).iter_mut().find(|d| &d.id == id)
    }

    fn replace_data(&mut self, face: Face, id: &DecorationId, data: DecorationData) -> bool {
        let Some(dec) = self.find_mut(face, id) else {
            return false;
        };
        if dec.kind() != data.kind() {
            warn!(id = %id, from = dec.kind().as_str(), to = data.kind().as_str(), "payload type mismatch; ignored");
            return false;
        }
        dec.data = data;
        true
    }

    fn commit(&mut self) {
        self.history.push(self.decorations.clone(), clock::now_ms());
    }
}
