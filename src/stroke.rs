//! Freehand ink strokes: in-progress capture and moving-average smoothing.

#[cfg(test)]
#[path = "stroke_test.rs"]
mod stroke_test;

use crate::coords::Point;
use crate::doc::Stroke;

/// Points of a stroke being drawn, in card space, not yet committed.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveStroke {
    pub points: Vec<Point>,
    pub color: String,
    pub line_width: f64,
}

impl LiveStroke {
    #[must_use]
    pub fn new(start: Point, color: impl Into<String>, line_width: f64) -> Self {
        Self { points: vec![start], color: color.into(), line_width }
    }

    /// Append a point, skipping exact repeats of the last one.
    pub fn push(&mut self, pt: Point) -> bool {
        if self.points.last() == Some(&pt) {
            return false;
        }
        self.points.push(pt);
        true
    }

    /// Enough points to commit as a drawing.
    #[must_use]
    pub fn is_committable(&self) -> bool {
        self.points.len() >= 2
    }
}

/// Moving-average smoothing with a window of `radius` points on each side.
///
/// Endpoints are kept fixed so the stroke still starts and ends where the
/// user put the pen. `radius == 0` or fewer than three points returns the
/// input unchanged.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn smooth(points: &[Point], radius: usize) -> Vec<Point> {
    if radius == 0 || points.len() < 3 {
        return points.to_vec();
    }
    let last = points.len() - 1;
    points
        .iter()
        .enumerate()
        .map(|(i, pt)| {
            if i == 0 || i == last {
                return *pt;
            }
            let lo = i.saturating_sub(radius);
            let hi = (i + radius).min(last);
            let window = &points[lo..=hi];
            let n = window.len() as f64;
            let (sx, sy) = window.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
            Point::new(sx / n, sy / n)
        })
        .collect()
}

/// Convert points to the stored `[x, y]` stroke form.
#[must_use]
pub fn to_stroke(points: &[Point]) -> Stroke {
    points.iter().map(|p| [p.x, p.y]).collect()
}
