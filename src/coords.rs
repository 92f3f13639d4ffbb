//! Coordinate spaces: screen/pointer, canvas pixels, and card space.
//!
//! Card space is canvas pixel space with the origin moved to the card center.
//! Every stored position (decoration `x,y`, stroke points) is in card space, so
//! the data model stays valid whatever size the surface is displayed at.
//! Device pixel ratio only affects the backing store size; it never reaches
//! stored coordinates.

#[cfg(test)]
#[path = "coords_test.rs"]
mod coords_test;

/// A point in screen, pixel or card space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// This point shifted by `(dx, dy)`.
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }
}

/// Axis-aligned rectangle, `x,y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle of the given size centered on `center`.
    #[must_use]
    pub fn centered(center: Point, width: f64, height: f64) -> Self {
        Self { x: center.x - width / 2.0, y: center.y - height / 2.0, width, height }
    }

    /// Smallest rectangle containing both corners.
    #[must_use]
    pub fn from_corners(min: Point, max: Point) -> Self {
        Self { x: min.x, y: min.y, width: max.x - min.x, height: max.y - min.y }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Grow every edge outward by `pad`.
    #[must_use]
    pub fn expand(&self, pad: f64) -> Self {
        Self { x: self.x - pad, y: self.y - pad, width: self.width + pad * 2.0, height: self.height + pad * 2.0 }
    }

    /// Inclusive point containment.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.right() && pt.y >= self.y && pt.y <= self.bottom()
    }

    /// Whether the two rectangles overlap (touching edges count).
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.right() && other.x <= self.right() && self.y <= other.bottom() && other.y <= self.bottom()
    }

    /// Smallest rectangle covering both.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self { x, y, width: self.right().max(other.right()) - x, height: self.bottom().max(other.bottom()) - y }
    }

    /// Top-right corner.
    #[must_use]
    pub fn top_right(&self) -> Point {
        Point::new(self.right(), self.y)
    }
}

/// Bounding rectangle of the drawing surface as laid out on screen (CSS pixels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl SurfaceRect {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }
}

/// The fixed logical coordinate space of one card face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardSpace {
    pub width: f64,
    pub height: f64,
}

impl CardSpace {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Map a pointer position to card space.
    ///
    /// Returns `None` when more than one touch point is active (a viewport
    /// gesture, not a decoration interaction), when the surface has no size,
    /// or when the pointer lies outside the surface.
    #[must_use]
    pub fn to_card_space(&self, screen: Point, rect: SurfaceRect, touch_count: usize) -> Option<Point> {
        if touch_count > 1 {
            return None;
        }
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return None;
        }
        let px = (screen.x - rect.left) / rect.width * self.width;
        let py = (screen.y - rect.top) / rect.height * self.height;
        if !(0.0..=self.width).contains(&px) || !(0.0..=self.height).contains(&py) {
            return None;
        }
        Some(self.pixel_to_card(Point::new(px, py)))
    }

    /// Canvas pixel space (top-left origin) to card space (center origin).
    #[must_use]
    pub fn pixel_to_card(&self, pixel: Point) -> Point {
        Point { x: pixel.x - self.width / 2.0, y: pixel.y - self.height / 2.0 }
    }

    /// Card space to canvas pixel space.
    #[must_use]
    pub fn card_to_pixel(&self, card: Point) -> Point {
        Point { x: card.x + self.width / 2.0, y: card.y + self.height / 2.0 }
    }

    /// The whole card as a card-space rectangle.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::centered(Point::new(0.0, 0.0), self.width, self.height)
    }
}

/// Backing-store resolution of a surface: logical size times device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub logical_width: f64,
    pub logical_height: f64,
    pub dpr: f64,
}

impl Resolution {
    /// Build a resolution, treating a non-finite or non-positive ratio as `1.0`.
    #[must_use]
    pub fn new(logical_width: f64, logical_height: f64, dpr: f64) -> Self {
        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        Self { logical_width, logical_height, dpr }
    }

    /// Pixel buffer size in device pixels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn backing_size(&self) -> (u32, u32) {
        let w = (self.logical_width * self.dpr).round().max(1.0) as u32;
        let h = (self.logical_height * self.dpr).round().max(1.0) as u32;
        (w, h)
    }
}
