//! The drawing-surface seam.
//!
//! The render pipeline paints through [`Surface`] and never names a concrete
//! backend. The browser backend lives in [`crate::web`]; tests use a
//! recording surface that logs every call so paint work can be counted.
//!
//! Calls that can fail on a real 2D context (transforms, arcs, text, images,
//! dash patterns, cached-content transfers) return `Result`; plain state
//! setters and path building do not.

#[cfg(test)]
#[path = "recording_surface.rs"]
pub(crate) mod recording;

/// Error from a drawing backend.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("drawing context unavailable")]
    ContextUnavailable,
    #[error("{op} failed: {message}")]
    Backend { op: &'static str, message: String },
}

/// A 2D drawing surface with a retained content cache.
///
/// Coordinates passed to paint calls are in whatever space the last
/// [`Surface::set_transform`] established.
pub trait Surface {
    /// Decoded image handle accepted by [`Surface::draw_image`].
    type Image;

    /// Resize the backing pixel buffer. Clears content and the content cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot allocate the buffer.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError>;

    /// Replace the current transform with `[a c e; b d f]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the matrix.
    fn set_transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Result<(), SurfaceError>;

    fn save(&mut self);
    fn restore(&mut self);

    /// Restrict subsequent painting to a rectangle.
    fn clip_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    fn set_fill_style(&mut self, color: &str);
    fn set_stroke_style(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    fn set_line_cap(&mut self, cap: &str);
    fn set_line_join(&mut self, join: &str);

    /// Dash pattern for strokes; empty for solid.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the pattern.
    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), SurfaceError>;

    fn set_font(&mut self, font: &str);
    fn set_text_align(&mut self, align: &str);
    fn set_text_baseline(&mut self, baseline: &str);

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);

    /// Add a circular arc to the current path.
    ///
    /// # Errors
    ///
    /// Returns an error for a negative radius.
    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), SurfaceError>;

    fn fill(&mut self);
    fn stroke(&mut self);

    /// # Errors
    ///
    /// Returns an error if the backend cannot shape the text.
    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), SurfaceError>;

    /// # Errors
    ///
    /// Returns an error if the image is not drawable.
    fn draw_image(&mut self, image: &Self::Image, x: f64, y: f64, width: f64, height: f64) -> Result<(), SurfaceError>;

    /// Copy the current pixels into the content cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be written.
    fn cache_content(&mut self) -> Result<(), SurfaceError>;

    /// Replace the current pixels with the content cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be read.
    fn restore_cached_content(&mut self) -> Result<(), SurfaceError>;
}
