//! Browser backend: [`Surface`] over a `<canvas>` 2D context, font metrics
//! from the same context, and sticker image loading.
//!
//! This module is the only place that touches `web_sys`. The host keeps one
//! [`WebSurface`] per interactive canvas, forwards DOM events to
//! [`crate::engine::EngineCore`], and on every animation frame calls
//! [`pump_images`] followed by [`crate::engine::Engine::frame`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement};

use crate::coords::SurfaceRect;
use crate::engine::{Action, Engine};
use crate::surface::{Surface, SurfaceError};
use crate::text::{EstimatedTextMeasure, TextMeasure};

fn backend(op: &'static str) -> impl Fn(JsValue) -> SurfaceError {
    move |err| SurfaceError::Backend { op, message: format!("{err:?}") }
}

fn document() -> Result<Document, SurfaceError> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or(SurfaceError::ContextUnavailable)
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, SurfaceError> {
    let Ok(Some(value)) = canvas.get_context("2d") else {
        return Err(SurfaceError::ContextUnavailable);
    };
    value
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| SurfaceError::ContextUnavailable)
}

/// Create a detached canvas, e.g. the rasterization target for the 3D viewer.
///
/// # Errors
///
/// Returns [`SurfaceError::ContextUnavailable`] outside a browser document.
pub fn create_canvas() -> Result<HtmlCanvasElement, SurfaceError> {
    document()?
        .create_element("canvas")
        .map_err(backend("create_element"))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| SurfaceError::ContextUnavailable)
}

/// Where `canvas` sits on screen, for [`crate::engine::EngineCore::set_viewport`].
#[must_use]
pub fn surface_rect(canvas: &HtmlCanvasElement) -> SurfaceRect {
    let rect = canvas.get_bounding_client_rect();
    SurfaceRect::new(rect.left(), rect.top(), rect.width(), rect.height())
}

/// Current device pixel ratio, `1.0` outside a window.
#[must_use]
pub fn device_pixel_ratio() -> f64 {
    web_sys::window().map_or(1.0, |w| w.device_pixel_ratio())
}

// =============================================================
// Surface
// =============================================================

/// A visible canvas plus a same-sized offscreen canvas holding the content cache.
pub struct WebSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    cache: HtmlCanvasElement,
    cache_ctx: CanvasRenderingContext2d,
}

impl WebSurface {
    /// Bind to `canvas`.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::ContextUnavailable`] if either canvas has no 2D context.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, SurfaceError> {
        let ctx = context_2d(&canvas)?;
        let cache = create_canvas()?;
        let cache_ctx = context_2d(&cache)?;
        Ok(Self { canvas, ctx, cache, cache_ctx })
    }

    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Text metrics backed by this surface's context.
    #[must_use]
    pub fn text_measure(&self) -> CanvasTextMeasure {
        CanvasTextMeasure { ctx: self.ctx.clone() }
    }

    /// Copy `from` onto `to` pixel for pixel, ignoring the current transform.
    fn blit(to: &CanvasRenderingContext2d, from: &HtmlCanvasElement, op: &'static str) -> Result<(), SurfaceError> {
        to.save();
        let result = to
            .set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
            .and_then(|()| to.draw_image_with_html_canvas_element(from, 0.0, 0.0));
        to.restore();
        result.map_err(backend(op))
    }
}

impl Surface for WebSurface {
    type Image = HtmlImageElement;

    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.cache.set_width(width);
        self.cache.set_height(height);
        Ok(())
    }

    fn set_transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Result<(), SurfaceError> {
        self.ctx.set_transform(a, b, c, d, e, f).map_err(backend("set_transform"))
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn clip_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.begin_path();
        self.ctx.rect(x, y, width, height);
        self.ctx.clip();
    }

    fn set_fill_style(&mut self, color: &str) {
        self.ctx.set_fill_style_str(color);
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.ctx.set_stroke_style_str(color);
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn set_line_cap(&mut self, cap: &str) {
        self.ctx.set_line_cap(cap);
    }

    fn set_line_join(&mut self, join: &str) {
        self.ctx.set_line_join(join);
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), SurfaceError> {
        let dash: js_sys::Array = segments.iter().map(|s| JsValue::from_f64(*s)).collect();
        self.ctx.set_line_dash(&dash).map_err(backend("set_line_dash"))
    }

    fn set_font(&mut self, font: &str) {
        self.ctx.set_font(font);
    }

    fn set_text_align(&mut self, align: &str) {
        self.ctx.set_text_align(align);
    }

    fn set_text_baseline(&mut self, baseline: &str) {
        self.ctx.set_text_baseline(baseline);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.fill_rect(x, y, width, height);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.stroke_rect(x, y, width, height);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), SurfaceError> {
        self.ctx.arc(x, y, radius, start, end).map_err(backend("arc"))
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), SurfaceError> {
        self.ctx.fill_text(text, x, y).map_err(backend("fill_text"))
    }

    fn draw_image(&mut self, image: &HtmlImageElement, x: f64, y: f64, width: f64, height: f64) -> Result<(), SurfaceError> {
        self.ctx
            .draw_image_with_html_image_element_and_dw_and_dh(image, x, y, width, height)
            .map_err(backend("draw_image"))
    }

    fn cache_content(&mut self) -> Result<(), SurfaceError> {
        self.cache_ctx.clear_rect(0.0, 0.0, f64::from(self.cache.width()), f64::from(self.cache.height()));
        Self::blit(&self.cache_ctx, &self.canvas, "cache_content")
    }

    fn restore_cached_content(&mut self) -> Result<(), SurfaceError> {
        Self::blit(&self.ctx, &self.cache, "restore_cached_content")
    }
}

// =============================================================
// Text metrics
// =============================================================

/// [`TextMeasure`] using the canvas' own font metrics.
pub struct CanvasTextMeasure {
    ctx: CanvasRenderingContext2d,
}

impl TextMeasure for CanvasTextMeasure {
    fn line_width(&self, font: &str, font_size: f64, line: &str) -> f64 {
        self.ctx.save();
        self.ctx.set_font(font);
        let measured = self.ctx.measure_text(line);
        self.ctx.restore();
        match measured {
            Ok(metrics) => metrics.width(),
            Err(_) => EstimatedTextMeasure::default().line_width(font, font_size, line),
        }
    }
}

// =============================================================
// Image loading
// =============================================================

/// Outcome of one image load.
pub enum ImageEvent {
    Loaded { url: String, image: HtmlImageElement },
    Failed { url: String },
}

type LoadCallback = Closure<dyn FnMut()>;

/// Starts `<img>` loads and queues their completions for the next frame.
///
/// Callbacks only push onto a shared queue; the engine is never touched from
/// inside a DOM callback.
#[derive(Default)]
pub struct ImageLoader {
    events: Rc<RefCell<Vec<ImageEvent>>>,
    /// Callbacks kept alive until their load settles.
    in_flight: HashMap<String, (LoadCallback, LoadCallback)>,
}

impl ImageLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin loading `url`. Failures to even start are queued as failed loads.
    pub fn load(&mut self, url: &str) {
        let image = match HtmlImageElement::new() {
            Ok(image) => image,
            Err(err) => {
                warn!(error = ?err, "image element unavailable");
                self.events.borrow_mut().push(ImageEvent::Failed { url: url.to_owned() });
                return;
            }
        };

        let on_load = {
            let events = Rc::clone(&self.events);
            let image = image.clone();
            let url = url.to_owned();
            Closure::wrap(Box::new(move || {
                events.borrow_mut().push(ImageEvent::Loaded { url: url.clone(), image: image.clone() });
            }) as Box<dyn FnMut()>)
        };
        let on_error = {
            let events = Rc::clone(&self.events);
            let url = url.to_owned();
            Closure::wrap(Box::new(move || {
                events.borrow_mut().push(ImageEvent::Failed { url: url.clone() });
            }) as Box<dyn FnMut()>)
        };

        image.set_onload(Some(on_load.as_ref().unchecked_ref()));
        image.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        image.set_src(url);
        self.in_flight.insert(url.to_owned(), (on_load, on_error));
    }

    /// Completed loads since the last call.
    pub fn drain(&mut self) -> Vec<ImageEvent> {
        let events = std::mem::take(&mut *self.events.borrow_mut());
        for event in &events {
            let url = match event {
                ImageEvent::Loaded { url, .. } | ImageEvent::Failed { url } => url,
            };
            self.in_flight.remove(url);
        }
        events
    }

    /// Loads started but not yet settled.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

/// Start loads the engine asked for and hand it finished ones.
pub fn pump_images<S>(engine: &mut Engine<S>, loader: &mut ImageLoader) -> Vec<Action>
where
    S: Surface<Image = HtmlImageElement>,
{
    for url in engine.take_image_requests() {
        loader.load(&url);
    }
    let mut actions = Vec::new();
    for event in loader.drain() {
        match event {
            ImageEvent::Loaded { url, image } => actions.extend(engine.image_loaded(&url, image)),
            ImageEvent::Failed { url } => actions.extend(engine.image_failed(&url, "image failed to decode")),
        }
    }
    actions
}
