use glam::DVec2;

use crate::vector::{Point, Uv};

/// Converts between integer pixel positions and normalized UVs for one
/// image size. UVs address pixel centres.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UvMap {
    pub width: u32,
    pub height: u32,
}

impl UvMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn size(&self) -> DVec2 {
        DVec2::new(self.width as f64, self.height as f64)
    }

    /// UV of the centre of pixel `(x, y)`.
    pub fn uv(&self, x: u32, y: u32) -> Uv {
        Uv((DVec2::new(x as f64, y as f64) + 0.5) / self.size())
    }

    /// Pixel containing `uv`. Out-of-range UVs are clamped first, so the
    /// result is always in bounds for a non-empty image.
    pub fn point(&self, uv: Uv) -> (u32, u32) {
        let scaled = (uv.clamped().0 * self.size()).floor();
        (
            (scaled.x as u32).min(self.width.saturating_sub(1)),
            (scaled.y as u32).min(self.height.saturating_sub(1)),
        )
    }

    /// `uv` scaled to pixel space without flooring.
    pub fn scale(&self, uv: Uv) -> Point {
        Point(uv.0 * self.size())
    }
}
