//! Per-type decoration geometry.
//!
//! This is the single bounds helper behind the selection outline, the delete
//! affordance hit test, and dirty-region erasure. Every match here is
//! exhaustive over [`DecorationData`], so a new decoration type has to be
//! handled before the crate compiles.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use crate::config::EngineConfig;
use crate::coords::{Point, Rect};
use crate::doc::{Decoration, DecorationData, StickerData, Stroke};
use crate::text::{self, TextMeasure};

/// Extra margin around painted pixels to cover anti-aliasing.
const ANTIALIAS_MARGIN: f64 = 2.0;

/// A circle in card space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        self.center.distance(pt) <= self.radius
    }

    /// Bounding square.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::centered(self.center, self.radius * 2.0, self.radius * 2.0)
    }
}

/// Rendered sticker edge length.
#[must_use]
pub fn sticker_size(dec: &Decoration, data: &StickerData, config: &EngineConfig) -> f64 {
    config.sticker_base_size * dec.sticker_scale(data)
}

/// Card-space bounds of a stroke set. Points are absolute, so the decoration
/// position plays no part.
#[must_use]
pub fn strokes_bounds(paths: &[Stroke]) -> Option<Rect> {
    let mut points = paths.iter().flatten();
    let first = points.next()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first[0], first[1], first[0], first[1]);
    for p in points {
        min_x = min_x.min(p[0]);
        min_y = min_y.min(p[1]);
        max_x = max_x.max(p[0]);
        max_y = max_y.max(p[1]);
    }
    Some(Rect::from_corners(Point::new(min_x, min_y), Point::new(max_x, max_y)))
}

/// Tight bounds of a decoration's content. `None` for an empty drawing.
#[must_use]
pub fn content_bounds(dec: &Decoration, config: &EngineConfig, measure: &dyn TextMeasure) -> Option<Rect> {
    let origin = Point::new(dec.x, dec.y);
    match &dec.data {
        DecorationData::Sticker(data) => {
            let size = sticker_size(dec, data, config);
            Some(Rect::centered(origin, size, size))
        }
        DecorationData::Text(data) => {
            let layout = text::layout(data, origin, measure);
            let mut bounds = layout.bounds();
            if let Some(underline) = layout.underline {
                let rule = Rect::from_corners(underline.from, underline.to.offset(0.0, 1.0));
                bounds = bounds.union(&rule);
            }
            Some(bounds)
        }
        DecorationData::Drawing(data) => strokes_bounds(&data.paths),
    }
}

/// Every pixel a decoration's content can touch, including stroke width.
#[must_use]
pub fn paint_bounds(dec: &Decoration, config: &EngineConfig, measure: &dyn TextMeasure) -> Option<Rect> {
    let bounds = content_bounds(dec, config, measure)?;
    let stroke_pad = match &dec.data {
        DecorationData::Drawing(data) => data.line_width / 2.0,
        DecorationData::Sticker(_) | DecorationData::Text(_) => 0.0,
    };
    Some(bounds.expand(stroke_pad + ANTIALIAS_MARGIN))
}

/// Dashed selection outline rectangle.
#[must_use]
pub fn selection_bounds(dec: &Decoration, config: &EngineConfig, measure: &dyn TextMeasure) -> Option<Rect> {
    content_bounds(dec, config, measure).map(|b| b.expand(config.selection_padding))
}

/// Delete affordance anchored at the selection outline's top-right corner.
#[must_use]
pub fn delete_affordance(dec: &Decoration, config: &EngineConfig, measure: &dyn TextMeasure) -> Option<Circle> {
    selection_bounds(dec, config, measure)
        .map(|b| Circle { center: b.top_right(), radius: config.delete_affordance_radius })
}
