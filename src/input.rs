//! Input model: tools, modifier keys, pointer samples, and the gesture state machine.
//!
//! `Tool` and `Modifiers` capture the user's intent at the time of a pointer
//! event. `UiState` is the persistent, renderer-visible UI state (active tool,
//! selection, armed sticker, style settings). `InputState` is the gesture in
//! progress between pointer-down and pointer-up, carrying everything needed to
//! apply deltas against the original position and commit once on release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::config::{DrawSettings, TextSettings};
use crate::coords::Point;
use crate::doc::{Decoration, DecorationId, Face, StickerData};
use crate::stroke::LiveStroke;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Select and move decorations ("grab").
    #[default]
    #[serde(rename = "grab")]
    Select,
    /// Stamp the armed sticker.
    Sticker,
    /// Create and edit text.
    Text,
    /// Freehand ink.
    Draw,
}

impl Tool {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Select => "grab",
            Self::Sticker => "sticker",
            Self::Text => "text",
            Self::Draw => "draw",
        }
    }

    /// Parse a tool name as sent by UI chrome. `"select"` is accepted for `"grab"`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "grab" | "select" => Some(Self::Select),
            "sticker" => Some(Self::Sticker),
            "text" => Some(Self::Text),
            "draw" => Some(Self::Draw),
            _ => None,
        }
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Button {
    /// Left mouse button or a single-finger touch.
    #[default]
    Primary,
    Middle,
    Secondary,
}

/// A keyboard key, holding the key name as reported by the browser
/// (e.g. `"Delete"`, `"ArrowLeft"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0 == name
    }

    /// Case-insensitive single-letter match (shortcut keys arrive as `"z"` or `"Z"`).
    #[must_use]
    pub fn is_letter(&self, letter: char) -> bool {
        let mut chars = self.0.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if c.eq_ignore_ascii_case(&letter))
    }

    /// Unit nudge direction for arrow keys.
    #[must_use]
    pub fn arrow_direction(&self) -> Option<(f64, f64)> {
        match self.0.as_str() {
            "ArrowLeft" => Some((-1.0, 0.0)),
            "ArrowRight" => Some((1.0, 0.0)),
            "ArrowUp" => Some((0.0, -1.0)),
            "ArrowDown" => Some((0.0, 1.0)),
            _ => None,
        }
    }
}

/// One pointer event as delivered by the host.
#[derive(Debug, Clone, Copy)]
pub struct PointerSample {
    /// Pointer position in screen (client) coordinates.
    pub screen: Point,
    /// Active touch points; `1` for a mouse.
    pub touches: usize,
    /// Event timestamp in milliseconds.
    pub time_ms: f64,
    pub button: Button,
    pub modifiers: Modifiers,
}

impl PointerSample {
    /// Mouse sample with the primary button and no modifiers.
    #[must_use]
    pub fn mouse(screen: Point, time_ms: f64) -> Self {
        Self { screen, touches: 1, time_ms, button: Button::Primary, modifiers: Modifiers::default() }
    }

    /// Touch sample with `touches` fingers down.
    #[must_use]
    pub fn touch(screen: Point, touches: usize, time_ms: f64) -> Self {
        Self { screen, touches, time_ms, button: Button::Primary, modifiers: Modifiers::default() }
    }
}

/// A selected decoration on a specific face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub face: Face,
    pub id: DecorationId,
}

/// The sticker the sticker tool will stamp.
#[derive(Debug, Clone, PartialEq)]
pub struct ArmedSticker {
    /// Catalog id, or `None` for a custom URL.
    pub catalog_id: Option<String>,
    pub data: StickerData,
}

/// Last tap, for double-tap detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tap {
    pub at: Point,
    pub time_ms: f64,
}

/// Arrow-key nudge waiting to be committed on key release.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingNudge {
    pub face: Face,
    pub id: DecorationId,
}

/// Persistent UI state visible to the renderer and UI chrome.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub tool: Tool,
    pub selection: Option<Selection>,
    pub armed_sticker: Option<ArmedSticker>,
    pub draw: DrawSettings,
    pub text: TextSettings,
    pub last_tap: Option<Tap>,
    /// Decoration under the pointer while idle in select mode.
    pub hover: Option<DecorationId>,
    pub pending_nudge: Option<PendingNudge>,
}

impl UiState {
    /// Selected id if the selection is on `face`.
    #[must_use]
    pub fn selected_on(&self, face: Face) -> Option<&DecorationId> {
        self.selection.as_ref().filter(|s| s.face == face).map(|s| &s.id)
    }
}

/// Gesture state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Moving a decoration. Deltas apply to `original`'s position.
    Dragging {
        face: Face,
        /// Deep copy of the decoration at pointer-down.
        original: Decoration,
        /// Card-space pointer position at pointer-down.
        origin: Point,
        /// Whether the pointer has moved the decoration yet.
        moved: bool,
    },
    /// Capturing a freehand stroke.
    Drawing { face: Face, stroke: LiveStroke },
    /// In-place text editing.
    EditingText {
        face: Face,
        id: DecorationId,
        /// Text as last typed.
        value: String,
    },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Id of the decoration being edited in place, if any.
    #[must_use]
    pub fn editing_id(&self) -> Option<&DecorationId> {
        match self {
            Self::EditingText { id, .. } => Some(id),
            _ => None,
        }
    }

    /// In-progress stroke, if drawing.
    #[must_use]
    pub fn live_stroke(&self) -> Option<&LiveStroke> {
        match self {
            Self::Drawing { stroke, .. } => Some(stroke),
            _ => None,
        }
    }
}
