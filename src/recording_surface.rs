//! Test surface that records every call instead of painting.

use super::{Surface, SurfaceError};

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Resize(u32, u32),
    SetTransform([f64; 6]),
    Save,
    Restore,
    ClipRect(f64, f64, f64, f64),
    FillStyle(String),
    StrokeStyle(String),
    LineWidth(f64),
    LineCap(String),
    LineJoin(String),
    LineDash(Vec<f64>),
    Font(String),
    TextAlign(String),
    TextBaseline(String),
    FillRect(f64, f64, f64, f64),
    StrokeRect(f64, f64, f64, f64),
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    Arc { x: f64, y: f64, radius: f64 },
    Fill,
    Stroke,
    FillText { text: String, x: f64, y: f64 },
    DrawImage { image: String, x: f64, y: f64, width: f64, height: f64 },
    CacheContent,
    RestoreCachedContent,
}

/// Records calls; images are identified by their URL.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<Op>,
    /// Make the next fallible call fail once.
    pub fail_next: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    pub fn count(&self, pred: impl Fn(&Op) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }

    pub fn texts(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::FillText { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn images(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::DrawImage { image, .. } => Some(image.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn arcs(&self) -> usize {
        self.count(|op| matches!(op, Op::Arc { .. }))
    }

    pub fn strokes(&self) -> usize {
        self.count(|op| matches!(op, Op::Stroke))
    }

    fn fallible(&mut self, op: Op, name: &'static str) -> Result<(), SurfaceError> {
        if std::mem::take(&mut self.fail_next) {
            return Err(SurfaceError::Backend { op: name, message: "injected failure".to_owned() });
        }
        self.ops.push(op);
        Ok(())
    }
}

impl Surface for RecordingSurface {
    type Image = String;

    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        self.fallible(Op::Resize(width, height), "resize")
    }

    fn set_transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Result<(), SurfaceError> {
        self.fallible(Op::SetTransform([a, b, c, d, e, f]), "set_transform")
    }

    fn save(&mut self) {
        self.ops.push(Op::Save);
    }

    fn restore(&mut self) {
        self.ops.push(Op::Restore);
    }

    fn clip_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(Op::ClipRect(x, y, width, height));
    }

    fn set_fill_style(&mut self, color: &str) {
        self.ops.push(Op::FillStyle(color.to_owned()));
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.ops.push(Op::StrokeStyle(color.to_owned()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.ops.push(Op::LineWidth(width));
    }

    fn set_line_cap(&mut self, cap: &str) {
        self.ops.push(Op::LineCap(cap.to_owned()));
    }

    fn set_line_join(&mut self, join: &str) {
        self.ops.push(Op::LineJoin(join.to_owned()));
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), SurfaceError> {
        self.fallible(Op::LineDash(segments.to_vec()), "set_line_dash")
    }

    fn set_font(&mut self, font: &str) {
        self.ops.push(Op::Font(font.to_owned()));
    }

    fn set_text_align(&mut self, align: &str) {
        self.ops.push(Op::TextAlign(align.to_owned()));
    }

    fn set_text_baseline(&mut self, baseline: &str) {
        self.ops.push(Op::TextBaseline(baseline.to_owned()));
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(Op::FillRect(x, y, width, height));
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(Op::StrokeRect(x, y, width, height));
    }

    fn begin_path(&mut self) {
        self.ops.push(Op::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ops.push(Op::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ops.push(Op::LineTo(x, y));
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, _start: f64, _end: f64) -> Result<(), SurfaceError> {
        self.fallible(Op::Arc { x, y, radius }, "arc")
    }

    fn fill(&mut self) {
        self.ops.push(Op::Fill);
    }

    fn stroke(&mut self) {
        self.ops.push(Op::Stroke);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), SurfaceError> {
        self.fallible(Op::FillText { text: text.to_owned(), x, y }, "fill_text")
    }

    fn draw_image(&mut self, image: &String, x: f64, y: f64, width: f64, height: f64) -> Result<(), SurfaceError> {
        self.fallible(Op::DrawImage { image: image.clone(), x, y, width, height }, "draw_image")
    }

    fn cache_content(&mut self) -> Result<(), SurfaceError> {
        self.fallible(Op::CacheContent, "cache_content")
    }

    fn restore_cached_content(&mut self) -> Result<(), SurfaceError> {
        self.fallible(Op::RestoreCachedContent, "restore_cached_content")
    }
}
