//! Rendering: classifies each pending frame and paints it through a [`Surface`].
//!
//! The pipeline never mutates application state. It receives a read-only
//! [`Scene`] and decides, against what it painted last, how much work the
//! frame needs:
//!
//! - **Full**: first frame, face change, wholesale replacement (card load),
//!   flip start/end, resize, z-order change, too many dirty regions, or after
//!   a failed frame.
//! - **Chrome only**: decorations identical; selection, tool or live stroke
//!   changed. The cached content bitmap is restored and chrome redrawn on top.
//! - **Incremental**: a bounded set of decorations changed. Each affected
//!   padded bounding box is cleared to the background and every decoration
//!   intersecting it is repainted in z-order, clipped to the box.
//! - **Skip**: nothing relevant changed.
//!
//! After a full or incremental pass the content (without chrome) is cached on
//! the surface so chrome-only frames never repaint decorations.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::collections::HashMap;
use std::f64::consts::PI;

use tracing::trace;

use crate::config::EngineConfig;
use crate::coords::{Point, Rect, Resolution};
use crate::doc::{Decoration, DecorationData, DecorationId, DecorationKind, DrawingData, Face, StickerData, TextData};
use crate::geometry;
use crate::images::{ImageCache, ImageLookup};
use crate::input::Tool;
use crate::stroke::LiveStroke;
use crate::surface::{Surface, SurfaceError};
use crate::text::{self, TextMeasure};

/// Selection dash segment length in card units.
const SELECTION_DASH: f64 = 4.0;

/// Selection outline width in card units.
const SELECTION_LINE_WIDTH: f64 = 2.0;

/// Half-length of each stroke of the delete affordance's cross.
const DELETE_CROSS_HALF: f64 = 4.0;

/// How much a frame has to repaint.
#[derive(Debug, Clone, PartialEq)]
pub enum RedrawKind {
    Full,
    ChromeOnly,
    Incremental(Vec<Rect>),
    Skip,
}

/// Read-only view of everything a frame depends on.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    /// Face being displayed (lags the requested face during a flip).
    pub face: Face,
    pub decorations: &'a [Decoration],
    /// Store generation; a change means the collections were replaced wholesale.
    pub generation: u64,
    pub selection: Option<&'a DecorationId>,
    pub tool: Tool,
    /// Text decoration being edited in place; its glyphs are not painted.
    pub editing: Option<&'a DecorationId>,
    pub flipping: bool,
    pub live_stroke: Option<&'a LiveStroke>,
    pub resolution: Resolution,
}

/// What the previous successful frame showed.
#[derive(Debug, Clone)]
struct FrameState {
    face: Face,
    generation: u64,
    flipping: bool,
    resolution: Resolution,
    decorations: Vec<Decoration>,
    selection: Option<DecorationId>,
    tool: Tool,
    editing: Option<DecorationId>,
    live_stroke: Option<LiveStroke>,
}

impl FrameState {
    fn capture(scene: &Scene<'_>) -> Self {
        Self {
            face: scene.face,
            generation: scene.generation,
            flipping: scene.flipping,
            resolution: scene.resolution,
            decorations: scene.decorations.to_vec(),
            selection: scene.selection.cloned(),
            tool: scene.tool,
            editing: scene.editing.cloned(),
            live_stroke: scene.live_stroke.cloned(),
        }
    }
}

/// Frame-to-frame render state for one interactive surface.
#[derive(Debug, Default)]
pub struct Renderer {
    last: Option<FrameState>,
}

impl Renderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Force the next frame to be a full redraw.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Decide how much of `scene` needs repainting. `resolved` lists image
    /// URLs that finished loading since the last frame.
    #[must_use]
    pub fn classify(
        &self,
        scene: &Scene<'_>,
        resolved: &[String],
        config: &EngineConfig,
        measure: &dyn TextMeasure,
    ) -> RedrawKind {
        let Some(last) = &self.last else {
            return RedrawKind::Full;
        };
        if last.face != scene.face
            || last.generation != scene.generation
            || last.flipping != scene.flipping
            || last.resolution != scene.resolution
        {
            return RedrawKind::Full;
        }
        if scene.flipping {
            return RedrawKind::Skip;
        }
        if !same_relative_order(&last.decorations, scene.decorations) {
            return RedrawKind::Full;
        }

        let mut regions = dirty_regions(&last.decorations, scene.decorations, config, measure);

        if last.editing.as_ref() != scene.editing {
            for id in last.editing.iter().chain(scene.editing) {
                if let Some(rect) = find(scene.decorations, id).and_then(|d| geometry::paint_bounds(d, config, measure)) {
                    regions.push(rect);
                }
            }
        }

        if !resolved.is_empty() {
            for dec in scene.decorations {
                let DecorationData::Sticker(data) = &dec.data else {
                    continue;
                };
                if resolved.iter().any(|url| *url == data.url) {
                    regions.extend(geometry::paint_bounds(dec, config, measure));
                }
            }
        }

        if regions.len() > config.max_dirty_regions {
            return RedrawKind::Full;
        }
        if !regions.is_empty() {
            return RedrawKind::Incremental(regions);
        }

        if last.selection.as_ref() != scene.selection
            || last.tool != scene.tool
            || last.live_stroke.as_ref() != scene.live_stroke
        {
            return RedrawKind::ChromeOnly;
        }
        RedrawKind::Skip
    }

    /// Classify and paint one frame.
    ///
    /// # Errors
    ///
    /// Propagates the first surface failure. The next frame is then a full
    /// redraw so a half-painted cache is never reused.
    pub fn render<S: Surface>(
        &mut self,
        surface: &mut S,
        scene: &Scene<'_>,
        images: &mut ImageCache<S::Image>,
        config: &EngineConfig,
        measure: &dyn TextMeasure,
    ) -> Result<RedrawKind, SurfaceError> {
        let resolved = images.take_resolved();
        let kind = self.classify(scene, &resolved, config, measure);
        trace!(?kind, face = scene.face.as_str(), decorations = scene.decorations.len(), "frame classified");

        let resized = self.last.as_ref().is_none_or(|last| last.resolution != scene.resolution);
        let result = paint_frame(surface, scene, &kind, resized, images, config, measure);
        match result {
            Ok(()) => {
                if kind != RedrawKind::Skip {
                    self.last = Some(FrameState::capture(scene));
                }
                Ok(kind)
            }
            Err(err) => {
                self.last = None;
                Err(err)
            }
        }
    }
}

// =============================================================
// Classification helpers
// =============================================================

fn find<'a>(decorations: &'a [Decoration], id: &DecorationId) -> Option<&'a Decoration> {
    decorations.iter().find(|d| &d.id == id)
}

/// Whether the decorations present in both lists appear in the same order.
fn same_relative_order(old: &[Decoration], new: &[Decoration]) -> bool {
    let new_ids: HashMap<&DecorationId, usize> = new.iter().enumerate().map(|(i, d)| (&d.id, i)).collect();
    let mut last_index = None;
    for dec in old {
        let Some(&index) = new_ids.get(&dec.id) else {
            continue;
        };
        if last_index.is_some_and(|prev| index < prev) {
            return false;
        }
        last_index = Some(index);
    }
    true
}

/// Paint bounds of every added, removed or modified decoration (old and new).
fn dirty_regions(old: &[Decoration], new: &[Decoration], config: &EngineConfig, measure: &dyn TextMeasure) -> Vec<Rect> {
    let old_by_id: HashMap<&DecorationId, &Decoration> = old.iter().map(|d| (&d.id, d)).collect();
    let new_by_id: HashMap<&DecorationId, &Decoration> = new.iter().map(|d| (&d.id, d)).collect();
    let mut regions = Vec::new();

    for dec in new {
        match old_by_id.get(&dec.id) {
            Some(prev) if *prev == dec => {}
            Some(prev) => {
                regions.extend(geometry::paint_bounds(prev, config, measure));
                regions.extend(geometry::paint_bounds(dec, config, measure));
            }
            None => regions.extend(geometry::paint_bounds(dec, config, measure)),
        }
    }
    for dec in old {
        if !new_by_id.contains_key(&dec.id) {
            regions.extend(geometry::paint_bounds(dec, config, measure));
        }
    }
    regions
}

// =============================================================
// Frame painting
// =============================================================

fn paint_frame<S: Surface>(
    surface: &mut S,
    scene: &Scene<'_>,
    kind: &RedrawKind,
    resized: bool,
    images: &mut ImageCache<S::Image>,
    config: &EngineConfig,
    measure: &dyn TextMeasure,
) -> Result<(), SurfaceError> {
    if *kind == RedrawKind::Skip {
        return Ok(());
    }
    if resized {
        let (w, h) = scene.resolution.backing_size();
        surface.resize(w, h)?;
    }
    let dpr = scene.resolution.dpr;
    surface.set_transform(dpr, 0.0, 0.0, dpr, dpr * config.card_width / 2.0, dpr * config.card_height / 2.0)?;

    match kind {
        RedrawKind::Full => {
            let card = Rect::centered(Point::new(0.0, 0.0), config.card_width, config.card_height);
            fill_background(surface, card, config);
            if !scene.flipping {
                for dec in scene.decorations {
                    paint_decoration(surface, dec, scene.editing, images, config, measure)?;
                }
            }
            surface.cache_content()?;
        }
        RedrawKind::Incremental(regions) => {
            surface.restore_cached_content()?;
            for region in regions {
                repaint_region(surface, scene, *region, images, config, measure)?;
            }
            surface.cache_content()?;
        }
        RedrawKind::ChromeOnly => surface.restore_cached_content()?,
        RedrawKind::Skip => {}
    }

    if scene.flipping {
        return Ok(());
    }
    if let Some(id) = scene.selection {
        if let Some(dec) = find(scene.decorations, id) {
            if chrome_visible(scene.tool, dec.kind()) && scene.editing != Some(id) {
                paint_selection(surface, dec, config, measure)?;
            }
        }
    }
    if let Some(stroke) = scene.live_stroke {
        paint_polyline(surface, &stroke.points, &stroke.color, stroke.line_width);
    }
    Ok(())
}

fn fill_background<S: Surface>(surface: &mut S, rect: Rect, config: &EngineConfig) {
    surface.set_fill_style(&config.background_color);
    surface.fill_rect(rect.x, rect.y, rect.width, rect.height);
}

fn repaint_region<S: Surface>(
    surface: &mut S,
    scene: &Scene<'_>,
    region: Rect,
    images: &mut ImageCache<S::Image>,
    config: &EngineConfig,
    measure: &dyn TextMeasure,
) -> Result<(), SurfaceError> {
    surface.save();
    surface.clip_rect(region.x, region.y, region.width, region.height);
    fill_background(surface, region, config);
    for dec in scene.decorations {
        let touches = geometry::paint_bounds(dec, config, measure).is_some_and(|b| b.intersects(&region));
        if touches {
            paint_decoration(surface, dec, scene.editing, images, config, measure)?;
        }
    }
    surface.restore();
    Ok(())
}

/// Whether selection chrome is shown for a decoration of `kind` under `tool`.
#[must_use]
pub fn chrome_visible(tool: Tool, kind: DecorationKind) -> bool {
    match tool {
        Tool::Select => true,
        Tool::Text => kind == DecorationKind::Text,
        Tool::Sticker | Tool::Draw => false,
    }
}

// =============================================================
// Decoration painters
// =============================================================

fn paint_decoration<S: Surface>(
    surface: &mut S,
    dec: &Decoration,
    editing: Option<&DecorationId>,
    images: &mut ImageCache<S::Image>,
    config: &EngineConfig,
    measure: &dyn TextMeasure,
) -> Result<(), SurfaceError> {
    match &dec.data {
        DecorationData::Sticker(data) => paint_sticker(surface, dec, data, images, config),
        DecorationData::Text(data) => {
            if editing == Some(&dec.id) {
                return Ok(());
            }
            paint_text(surface, dec, data, measure)
        }
        DecorationData::Drawing(data) => {
            paint_drawing(surface, data);
            Ok(())
        }
    }
}

fn paint_sticker<S: Surface>(
    surface: &mut S,
    dec: &Decoration,
    data: &StickerData,
    images: &mut ImageCache<S::Image>,
    config: &EngineConfig,
) -> Result<(), SurfaceError> {
    let size = geometry::sticker_size(dec, data, config);
    let lookup = if data.url.is_empty() { ImageLookup::Failed } else { images.lookup(&data.url) };
    match lookup {
        ImageLookup::Ready(image) => surface.draw_image(image, dec.x - size / 2.0, dec.y - size / 2.0, size, size),
        // Repainted once the load resolves.
        ImageLookup::Pending => Ok(()),
        ImageLookup::Failed => {
            surface.set_fill_style(&data.color);
            surface.begin_path();
            surface.arc(dec.x, dec.y, size / 2.0, 0.0, 2.0 * PI)?;
            surface.fill();
            Ok(())
        }
    }
}

fn paint_text<S: Surface>(
    surface: &mut S,
    dec: &Decoration,
    data: &TextData,
    measure: &dyn TextMeasure,
) -> Result<(), SurfaceError> {
    let layout = text::layout(data, Point::new(dec.x, dec.y), measure);
    surface.set_font(&layout.font);
    surface.set_fill_style(&data.color);
    surface.set_text_align("center");
    surface.set_text_baseline("middle");
    for line in &layout.lines {
        surface.fill_text(&line.text, layout.center.x, line.center_y)?;
    }
    if let Some(underline) = layout.underline {
        surface.set_stroke_style(&data.color);
        surface.set_line_width(1.0);
        surface.begin_path();
        surface.move_to(underline.from.x, underline.from.y);
        surface.line_to(underline.to.x, underline.to.y);
        surface.stroke();
    }
    Ok(())
}

fn paint_drawing<S: Surface>(surface: &mut S, data: &DrawingData) {
    for path in &data.paths {
        let points: Vec<Point> = path.iter().map(|p| Point::new(p[0], p[1])).collect();
        paint_polyline(surface, &points, &data.color, data.line_width);
    }
}

/// Stroke one polyline with round caps and joins. A single point paints a dot.
fn paint_polyline<S: Surface>(surface: &mut S, points: &[Point], color: &str, line_width: f64) {
    let Some(first) = points.first() else {
        return;
    };
    surface.set_stroke_style(color);
    surface.set_line_width(line_width);
    surface.set_line_cap("round");
    surface.set_line_join("round");
    surface.begin_path();
    surface.move_to(first.x, first.y);
    if points.len() == 1 {
        surface.line_to(first.x, first.y);
    }
    for p in &points[1..] {
        surface.line_to(p.x, p.y);
    }
    surface.stroke();
}

fn paint_selection<S: Surface>(
    surface: &mut S,
    dec: &Decoration,
    config: &EngineConfig,
    measure: &dyn TextMeasure,
) -> Result<(), SurfaceError> {
    let Some(outline) = geometry::selection_bounds(dec, config, measure) else {
        return Ok(());
    };
    surface.save();
    surface.set_stroke_style(&config.selection_color);
    surface.set_line_width(SELECTION_LINE_WIDTH);
    surface.set_line_dash(&[SELECTION_DASH, SELECTION_DASH])?;
    surface.stroke_rect(outline.x, outline.y, outline.width, outline.height);
    surface.set_line_dash(&[])?;

    if let Some(affordance) = geometry::delete_affordance(dec, config, measure) {
        let c = affordance.center;
        surface.set_fill_style(&config.selection_color);
        surface.begin_path();
        surface.arc(c.x, c.y, affordance.radius, 0.0, 2.0 * PI)?;
        surface.fill();

        surface.set_stroke_style(&config.background_color);
        surface.begin_path();
        surface.move_to(c.x - DELETE_CROSS_HALF, c.y - DELETE_CROSS_HALF);
        surface.line_to(c.x + DELETE_CROSS_HALF, c.y + DELETE_CROSS_HALF);
        surface.move_to(c.x + DELETE_CROSS_HALF, c.y - DELETE_CROSS_HALF);
        surface.line_to(c.x - DELETE_CROSS_HALF, c.y + DELETE_CROSS_HALF);
        surface.stroke();
    }
    surface.restore();
    Ok(())
}

// =============================================================
// Offscreen rasterization
// =============================================================

/// Paint one face onto a `target_width × target_height` surface with the same
/// paint rules as the interactive canvas, minus chrome. Used as the texture
/// source for the 3D card viewer.
///
/// Stickers whose images are still pending are left out; callers re-rasterize
/// after [`ImageCache::take_resolved`] reports new images.
///
/// # Errors
///
/// Propagates the first surface failure.
pub fn rasterize_face<S: Surface>(
    surface: &mut S,
    decorations: &[Decoration],
    images: &mut ImageCache<S::Image>,
    config: &EngineConfig,
    measure: &dyn TextMeasure,
    target_width: u32,
    target_height: u32,
) -> Result<(), SurfaceError> {
    surface.resize(target_width, target_height)?;
    let sx = f64::from(target_width) / config.card_width;
    let sy = f64::from(target_height) / config.card_height;
    surface.set_transform(sx, 0.0, 0.0, sy, f64::from(target_width) / 2.0, f64::from(target_height) / 2.0)?;
    let card = Rect::centered(Point::new(0.0, 0.0), config.card_width, config.card_height);
    fill_background(surface, card, config);
    for dec in decorations {
        paint_decoration(surface, dec, None, images, config, measure)?;
    }
    Ok(())
}
