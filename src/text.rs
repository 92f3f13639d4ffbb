//! Text measurement and multi-line layout.
//!
//! Layout is shared by the renderer (glyph placement, underline, selection
//! outline) and the hit tester (delete affordance, measured text bounds), so
//! both always agree on where a text decoration is.

#[cfg(test)]
#[path = "text_test.rs"]
mod text_test;

use crate::consts::TEXT_LINE_HEIGHT;
use crate::coords::{Point, Rect};
use crate::doc::{FontStyle, FontWeight, TextData, TextDecoration};

/// Measures rendered text width in card units.
pub trait TextMeasure {
    /// Advance width of `line` drawn with `font` (a CSS font shorthand).
    fn line_width(&self, font: &str, font_size: f64, line: &str) -> f64;
}

/// Width estimate from character count, used when no real font metrics exist
/// (headless rendering and tests).
#[derive(Debug, Clone, Copy)]
pub struct EstimatedTextMeasure {
    /// Average glyph advance as a fraction of the font size.
    pub advance: f64,
}

impl Default for EstimatedTextMeasure {
    fn default() -> Self {
        Self { advance: 0.5 }
    }
}

impl TextMeasure for EstimatedTextMeasure {
    #[allow(clippy::cast_precision_loss)]
    fn line_width(&self, _font: &str, font_size: f64, line: &str) -> f64 {
        line.chars().count() as f64 * font_size * self.advance
    }
}

/// CSS font shorthand for a text payload, e.g. `"italic bold 24px Georgia, serif"`.
#[must_use]
pub fn font_string(data: &TextData) -> String {
    let style = match data.font_style {
        FontStyle::Normal => "normal",
        FontStyle::Italic => "italic",
    };
    let weight = match data.font_weight {
        FontWeight::Normal => "normal",
        FontWeight::Bold => "bold",
    };
    format!("{style} {weight} {}px {}", data.font_size, data.font_family)
}

/// One laid-out line, centered horizontally on the decoration.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub width: f64,
    /// Vertical center of the line (text is drawn with a middle baseline).
    pub center_y: f64,
}

/// Horizontal rule under the last line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Underline {
    pub from: Point,
    pub to: Point,
}

/// Placement of a text decoration's lines in card space.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub font: String,
    pub center: Point,
    pub lines: Vec<TextLine>,
    pub line_height: f64,
    /// Widest line width.
    pub width: f64,
    /// Total block height.
    pub height: f64,
    pub underline: Option<Underline>,
}

impl TextLayout {
    /// Rectangle covering every line, centered on the decoration.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::centered(self.center, self.width, self.height)
    }
}

/// Lay out `data` centered on `center`.
///
/// Lines split on `\n`; each is centered horizontally, stacked at
/// `font_size * 1.2`, and the block is vertically centered on `center.y`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn layout(data: &TextData, center: Point, measure: &dyn TextMeasure) -> TextLayout {
    let font = font_string(data);
    let line_height = data.font_size * TEXT_LINE_HEIGHT;
    let raw_lines: Vec<&str> = data.text.split('\n').collect();
    let height = line_height * raw_lines.len() as f64;
    let first_center = center.y - height / 2.0 + line_height / 2.0;

    let lines: Vec<TextLine> = raw_lines
        .iter()
        .enumerate()
        .map(|(idx, line)| TextLine {
            text: (*line).to_owned(),
            width: measure.line_width(&font, data.font_size, line),
            center_y: first_center + line_height * idx as f64,
        })
        .collect();
    let width = lines.iter().map(|l| l.width).fold(0.0, f64::max);

    let underline = match data.text_decoration {
        TextDecoration::Underline => lines.last().map(|last| {
            let y = last.center_y + data.font_size / 2.0 + 1.0;
            Underline { from: Point::new(center.x - width / 2.0, y), to: Point::new(center.x + width / 2.0, y) }
        }),
        TextDecoration::None => None,
    };

    TextLayout { font, center, lines, line_height, width, height, underline }
}
