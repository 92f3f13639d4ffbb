//! Engine configuration and per-tool style settings.
//!
//! `EngineConfig` gathers every tunable the engine consults. Hosts can ship it
//! as JSON (`EngineConfig::from_json`); any field left out keeps its default
//! from [`crate::consts`]. Style settings are the state the UI chrome edits
//! (draw color/width, text font/size/weight/color) and the controller reads
//! when it creates decorations.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts;
use crate::doc::{FontStyle, FontWeight, TextDecoration};

/// Error returned by [`EngineConfig::from_json`] and [`EngineConfig::validate`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

/// Tunables for geometry, interaction and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub card_width: f64,
    pub card_height: f64,
    pub max_history: usize,
    pub paste_offset: f64,
    pub nudge_step: f64,
    pub nudge_step_large: f64,
    pub sticker_base_size: f64,
    pub default_sticker_scale: f64,
    pub sticker_hit_padding: f64,
    pub text_hit_padding: f64,
    pub drawing_hit_padding: f64,
    pub selection_padding: f64,
    pub delete_affordance_radius: f64,
    pub double_tap_ms: f64,
    pub double_tap_distance: f64,
    pub flip_duration_ms: f64,
    pub max_dirty_regions: usize,
    pub background_color: String,
    pub selection_color: String,
    pub placeholder_text: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            card_width: consts::CARD_WIDTH,
            card_height: consts::CARD_HEIGHT,
            max_history: consts::MAX_HISTORY,
            paste_offset: consts::PASTE_OFFSET,
            nudge_step: consts::NUDGE_STEP,
            nudge_step_large: consts::NUDGE_STEP_LARGE,
            sticker_base_size: consts::STICKER_BASE_SIZE,
            default_sticker_scale: consts::DEFAULT_STICKER_SCALE,
            sticker_hit_padding: consts::STICKER_HIT_PADDING,
            text_hit_padding: consts::TEXT_HIT_PADDING,
            drawing_hit_padding: consts::DRAWING_HIT_PADDING,
            selection_padding: consts::SELECTION_PADDING,
            delete_affordance_radius: consts::DELETE_AFFORDANCE_RADIUS,
            double_tap_ms: consts::DOUBLE_TAP_MS,
            double_tap_distance: consts::DOUBLE_TAP_DISTANCE,
            flip_duration_ms: consts::FLIP_DURATION_MS,
            max_dirty_regions: consts::MAX_DIRTY_REGIONS,
            background_color: consts::BACKGROUND_COLOR.to_owned(),
            selection_color: consts::SELECTION_COLOR.to_owned(),
            placeholder_text: consts::PLACEHOLDER_TEXT.to_owned(),
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON, filling absent fields with defaults, and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed JSON and
    /// [`ConfigError::Invalid`] when a value is out of range.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("cardWidth", self.card_width)?;
        positive("cardHeight", self.card_height)?;
        positive("stickerBaseSize", self.sticker_base_size)?;
        positive("defaultStickerScale", self.default_sticker_scale)?;
        positive("flipDurationMs", self.flip_duration_ms)?;
        non_negative("doubleTapMs", self.double_tap_ms)?;
        non_negative("doubleTapDistance", self.double_tap_distance)?;
        non_negative("nudgeStep", self.nudge_step)?;
        non_negative("nudgeStepLarge", self.nudge_step_large)?;
        if self.max_history == 0 {
            return Err(ConfigError::Invalid { field: "maxHistory", reason: "must be at least 1" });
        }
        if self.placeholder_text.is_empty() {
            return Err(ConfigError::Invalid { field: "placeholderText", reason: "must not be empty" });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason: "must be a positive number" })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason: "must be zero or positive" })
    }
}

/// Pen settings for the draw tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DrawSettings {
    pub color: String,
    pub line_width: f64,
    /// Moving-average radius applied to finished strokes; `0` keeps raw points.
    pub smoothing: usize,
}

impl Default for DrawSettings {
    fn default() -> Self {
        Self { color: "#000000".to_owned(), line_width: 2.0, smoothing: 0 }
    }
}

/// Font settings for the text tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextSettings {
    pub font_family: String,
    pub font_size: f64,
    pub color: String,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub text_decoration: TextDecoration,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            font_family: "Arial, sans-serif".to_owned(),
            font_size: 24.0,
            color: "#000000".to_owned(),
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            text_decoration: TextDecoration::None,
        }
    }
}
