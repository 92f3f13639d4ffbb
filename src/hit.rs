//! Hit-testing decorations and the delete affordance.
//!
//! Decorations are tested topmost first (reverse z-order). Each type has its
//! own hit geometry:
//!
//! - sticker: circle of radius `size / 2 + padding`
//! - text: circle of radius `font_size / 2 + padding`, or anywhere inside the
//!   padded measured text block (long lines stay grabbable at their ends)
//! - drawing: padded bounding box, then a per-point distance check against
//!   `line_width / 2 + padding`

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::config::EngineConfig;
use crate::coords::Point;
use crate::doc::{Decoration, DecorationData};
use crate::geometry;
use crate::text::{self, TextMeasure};

/// Which part of a decoration was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    DeleteAffordance,
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    pub decoration: &'a Decoration,
    pub part: HitPart,
}

/// Topmost decoration under `pt`, if any.
#[must_use]
pub fn find_decoration_at_point<'a>(
    decorations: &'a [Decoration],
    pt: Point,
    config: &EngineConfig,
    measure: &dyn TextMeasure,
) -> Option<&'a Decoration> {
    decorations
        .iter()
        .rev()
        .find(|dec| decoration_contains(dec, pt, config, measure))
}

/// Test the selected decoration's delete affordance first, then bodies.
#[must_use]
pub fn hit_test<'a>(
    decorations: &'a [Decoration],
    pt: Point,
    selected: Option<&Decoration>,
    config: &EngineConfig,
    measure: &dyn TextMeasure,
) -> Option<Hit<'a>> {
    if let Some(sel) = selected {
        if hit_delete_affordance(sel, pt, config, measure) {
            if let Some(decoration) = decorations.iter().find(|d| d.id == sel.id) {
                return Some(Hit { decoration, part: HitPart::DeleteAffordance });
            }
        }
    }
    find_decoration_at_point(decorations, pt, config, measure).map(|decoration| Hit { decoration, part: HitPart::Body })
}

/// Whether `pt` lands on the delete affordance drawn for `dec`.
#[must_use]
pub fn hit_delete_affordance(dec: &Decoration, pt: Point, config: &EngineConfig, measure: &dyn TextMeasure) -> bool {
    geometry::delete_affordance(dec, config, measure).is_some_and(|c| c.contains(pt))
}

/// Per-type body hit test.
#[must_use]
pub fn decoration_contains(dec: &Decoration, pt: Point, config: &EngineConfig, measure: &dyn TextMeasure) -> bool {
    let center = Point::new(dec.x, dec.y);
    match &dec.data {
        DecorationData::Sticker(data) => {
            let radius = geometry::sticker_size(dec, data, config) / 2.0 + config.sticker_hit_padding;
            center.distance(pt) < radius
        }
        DecorationData::Text(data) => {
            let radius = data.font_size / 2.0 + config.text_hit_padding;
            if center.distance(pt) < radius {
                return true;
            }
            text::layout(data, center, measure)
                .bounds()
                .expand(config.text_hit_padding)
                .contains(pt)
        }
        DecorationData::Drawing(data) => {
            let pad = config.drawing_hit_padding;
            let Some(bounds) = geometry::strokes_bounds(&data.paths) else {
                return false;
            };
            if !bounds.expand(pad).contains(pt) {
                return false;
            }
            let radius = data.line_width / 2.0 + pad;
            data.paths
                .iter()
                .flatten()
                .any(|p| Point::new(p[0], p[1]).distance(pt) < radius)
        }
    }
}
