//! Shared numeric constants for the card canvas crate.

// ── Card geometry ───────────────────────────────────────────────

/// Logical card width in card units. Persisted coordinates depend on this.
pub const CARD_WIDTH: f64 = 480.0;

/// Logical card height in card units. Persisted coordinates depend on this.
pub const CARD_HEIGHT: f64 = 320.0;

/// Nominal square edge of a sticker image before scaling.
pub const STICKER_BASE_SIZE: f64 = 64.0;

/// Scale applied to freshly stamped stickers.
pub const DEFAULT_STICKER_SCALE: f64 = 0.5;

/// Line height multiplier for multi-line text.
pub const TEXT_LINE_HEIGHT: f64 = 1.2;

// ── Hit-testing ─────────────────────────────────────────────────

/// Extra radius around a sticker's circular hit region.
pub const STICKER_HIT_PADDING: f64 = 5.0;

/// Extra radius around a text decoration's circular hit region.
pub const TEXT_HIT_PADDING: f64 = 10.0;

/// Bounding-box expansion and per-point slop for freehand drawings.
pub const DRAWING_HIT_PADDING: f64 = 10.0;

/// Gap between a decoration's bounds and its selection outline.
pub const SELECTION_PADDING: f64 = 8.0;

/// Radius of the delete affordance drawn at the outline's top-right corner.
pub const DELETE_AFFORDANCE_RADIUS: f64 = 10.0;

// ── Interaction ─────────────────────────────────────────────────

/// Offset applied to duplicated or pasted decorations.
pub const PASTE_OFFSET: f64 = 20.0;

/// Arrow-key nudge distance.
pub const NUDGE_STEP: f64 = 1.0;

/// Arrow-key nudge distance with Shift held.
pub const NUDGE_STEP_LARGE: f64 = 10.0;

/// Maximum delay between two taps that still counts as a double tap.
pub const DOUBLE_TAP_MS: f64 = 300.0;

/// Maximum distance between two taps that still counts as a double tap.
pub const DOUBLE_TAP_DISTANCE: f64 = 50.0;

/// Duration of the front/back flip transition.
pub const FLIP_DURATION_MS: f64 = 600.0;

// ── History / render ────────────────────────────────────────────

/// Maximum number of retained history snapshots.
pub const MAX_HISTORY: usize = 50;

/// Above this many dirty regions an incremental frame becomes a full redraw.
pub const MAX_DIRTY_REGIONS: usize = 12;

/// Sentinel text inserted by the text tool before the user types anything.
pub const PLACEHOLDER_TEXT: &str = "Your text…";

/// Card background fill.
pub const BACKGROUND_COLOR: &str = "#FFFFFF";

/// Selection outline and delete-affordance color.
pub const SELECTION_COLOR: &str = "#6a9c89";
