use glam::DVec2;

use crate::error::RenderError;
use crate::pixels::{Color, ImageBuffer};
use crate::quad::{Quad, QuadProjector};
use crate::uv_map::UvMap;
use crate::vector::{Coord, Point, Uv};

/// Per-pixel colour hook applied after sampling, given the texture UV.
pub type Filter<'a> = &'a dyn Fn(Color, Uv) -> Color;

/// Upper bound on coverage samples per axis; larger values are clamped.
pub const MAX_SAMPLES_PER_AXIS: u32 = 16;

/// Canvas renderer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    /// Coverage samples per pixel along each axis, clamped to
    /// `1..=MAX_SAMPLES_PER_AXIS`. 1 disables antialiasing.
    pub samples_per_axis: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_axis: 4,
        }
    }
}

/// Coverage of a quad over a rectangular pixel window, 0..=255 per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    x0: u32,
    y0: u32,
    width: u32,
    height: u32,
    coverage: Vec<u8>,
}

impl Mask {
    /// Coverage at absolute pixel `(x, y)`; zero outside the window.
    pub fn coverage(&self, x: u32, y: u32) -> u8 {
        if x < self.x0 || y < self.y0 || x >= self.x0 + self.width || y >= self.y0 + self.height {
            return 0;
        }
        let i = (y - self.y0) as usize * self.width as usize + (x - self.x0) as usize;
        self.coverage[i]
    }

    /// Pixels with non-zero coverage, row-major.
    pub fn covered(&self) -> impl Iterator<Item = (u32, u32, u8)> + '_ {
        self.coverage.iter().enumerate().filter_map(|(i, &c)| {
            (c > 0).then(|| {
                let i = i as u32;
                (self.x0 + i % self.width, self.y0 + i / self.width, c)
            })
        })
    }

    pub fn covered_count(&self) -> usize {
        self.coverage.iter().filter(|&&c| c > 0).count()
    }
}

/// Rasterize a convex quad in pixel space into a coverage mask clipped to
/// `width` x `height`. Only the quad's bounding box is scanned.
pub fn rasterize(quad: &Quad<Point>, width: u32, height: u32, samples_per_axis: u32) -> Mask {
    let poly = quad.perimeter().map(|p| p.vec());
    let min = poly.iter().fold(DVec2::INFINITY, |m, p| m.min(*p));
    let max = poly.iter().fold(DVec2::NEG_INFINITY, |m, p| m.max(*p));

    let clip = |v: f64, limit: u32| v.clamp(0.0, limit as f64) as u32;
    let (x0, y0) = (clip(min.x.floor(), width), clip(min.y.floor(), height));
    let (x1, y1) = (clip(max.x.ceil(), width), clip(max.y.ceil(), height));
    let (mw, mh) = (x1.saturating_sub(x0), y1.saturating_sub(y0));

    let n = samples_per_axis.clamp(1, MAX_SAMPLES_PER_AXIS);
    let step = 1.0 / n as f64;
    let total = (n as f64).powi(2);
    let mut coverage = vec![0u8; mw as usize * mh as usize];

    for y in y0..y1 {
        for x in x0..x1 {
            let mut inside = 0u32;
            for j in 0..n {
                for i in 0..n {
                    let p = DVec2::new(
                        x as f64 + (i as f64 + 0.5) * step,
                        y as f64 + (j as f64 + 0.5) * step,
                    );
                    if contains(&poly, p) {
                        inside += 1;
                    }
                }
            }
            let idx = (y - y0) as usize * mw as usize + (x - x0) as usize;
            coverage[idx] = (255.0 * inside as f64 / total).round() as u8;
        }
    }

    Mask {
        x0,
        y0,
        width: mw,
        height: mh,
        coverage,
    }
}

/// Edge-function test; either winding is accepted, boundary counts as inside.
fn contains(poly: &[DVec2; 4], p: DVec2) -> bool {
    let mut pos = false;
    let mut neg = false;
    for i in 0..4 {
        let a = poly[i];
        let b = poly[(i + 1) % 4];
        let cross = (b - a).perp_dot(p - a);
        pos |= cross > 0.0;
        neg |= cross < 0.0;
        if pos && neg {
            return false;
        }
    }
    true
}

/// Draws textures onto quads of a target image by inverse UV projection.
///
/// Holds a scratch buffer reused across calls; one renderer per thread.
#[derive(Debug, Default)]
pub struct CanvasRenderer {
    config: RenderConfig,
    buffer: ImageBuffer,
}

impl CanvasRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            buffer: ImageBuffer::default(),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Draw `texture` deformed onto `quad` and composite it over `target`.
    ///
    /// `quad` is in the target's UV space. Pixels outside the quad are not
    /// touched. The filter receives each sampled colour with its texture UV.
    pub fn render_quad(
        &mut self,
        target: &mut ImageBuffer,
        quad: &Quad<Uv>,
        texture: &ImageBuffer,
        filter: Option<Filter<'_>>,
    ) -> Result<(), RenderError> {
        let (width, height) = (target.width(), target.height());
        let _span = tracing::info_span!("render_quad", width, height).entered();

        let projector = QuadProjector::new(quad)?;
        self.buffer.resize(width, height);

        let target_map = UvMap::new(width, height);
        let texture_map = UvMap::new(texture.width(), texture.height());
        let mask = rasterize(
            &quad.map(|uv| target_map.scale(uv)),
            width,
            height,
            self.config.samples_per_axis,
        );

        let mut clamped = 0usize;
        for (x, y, coverage) in mask.covered() {
            let texture_uv = projector.project(target_map.uv(x, y))?;
            if !texture_uv.is_normalized() {
                clamped += 1;
            }
            let (tx, ty) = texture_map.point(texture_uv);
            let mut color = texture.get_pixel(tx, ty)?;
            if let Some(filter) = filter {
                color = filter(color, texture_uv);
            }
            color.a = color.a * coverage as f64 / 255.0;
            self.buffer.set_pixel(x, y, color)?;
        }

        if clamped > 0 {
            tracing::debug!(clamped, "texture UVs outside [0, 1] were clamped");
        }
        tracing::trace!(covered = mask.covered_count(), "quad rasterized");

        target.blit_over(&self.buffer);
        Ok(())
    }
}
