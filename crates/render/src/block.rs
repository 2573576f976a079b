use crate::canvas::{CanvasRenderer, RenderConfig};
use crate::error::RenderError;
use crate::pixels::{Color, ImageBuffer, brightness};
use crate::quad::Quad;
use crate::vector::Uv;

/// Brightness factor per visible face of an isometric block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingConfig {
    pub top: f64,
    pub left: f64,
    pub right: f64,
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            top: 1.0,
            left: 0.8,
            right: 0.6,
        }
    }
}

/// Textures for the three faces visible in an inventory icon.
#[derive(Debug, Clone, Copy)]
pub struct BlockFaces<'a> {
    pub top: &'a ImageBuffer,
    pub left: &'a ImageBuffer,
    pub right: &'a ImageBuffer,
}

impl<'a> BlockFaces<'a> {
    /// Same texture on all faces.
    pub fn uniform(texture: &'a ImageBuffer) -> Self {
        Self {
            top: texture,
            left: texture,
            right: texture,
        }
    }

    /// Separate top texture, shared side texture.
    pub fn top_and_side(top: &'a ImageBuffer, side: &'a ImageBuffer) -> Self {
        Self {
            top,
            left: side,
            right: side,
        }
    }
}

/// Canvas-space quads for the top, left and right faces of a cube seen
/// from above at the standard isometric angle, filling a square canvas.
pub fn isometric_quads() -> [Quad<Uv>; 3] {
    let top = Quad::new(
        Uv::new(0.0, 0.25),
        Uv::new(0.5, 0.0),
        Uv::new(0.5, 0.5),
        Uv::new(1.0, 0.25),
    );
    let left = Quad::new(
        Uv::new(0.0, 0.25),
        Uv::new(0.5, 0.5),
        Uv::new(0.0, 0.75),
        Uv::new(0.5, 1.0),
    );
    let right = Quad::new(
        Uv::new(0.5, 0.5),
        Uv::new(1.0, 0.25),
        Uv::new(0.5, 1.0),
        Uv::new(1.0, 0.75),
    );
    [top, left, right]
}

/// Draws isometric block icons from face textures.
#[derive(Debug, Default)]
pub struct BlockIconRenderer {
    canvas: CanvasRenderer,
    shading: ShadingConfig,
    layer: ImageBuffer,
}

impl BlockIconRenderer {
    pub fn new(config: RenderConfig, shading: ShadingConfig) -> Self {
        Self {
            canvas: CanvasRenderer::new(config),
            shading,
            layer: ImageBuffer::default(),
        }
    }

    /// Render a `size` x `size` icon on a transparent background.
    ///
    /// Each face is drawn on its own layer and accumulated into the icon, so
    /// the antialiased edges the faces share add up to an opaque cube.
    pub fn render(&mut self, faces: BlockFaces<'_>, size: u32) -> Result<ImageBuffer, RenderError> {
        let mut icon = ImageBuffer::new(size, size);
        let [top, left, right] = isometric_quads();
        for (quad, texture, factor) in [
            (top, faces.top, self.shading.top),
            (left, faces.left, self.shading.left),
            (right, faces.right, self.shading.right),
        ] {
            let shade = move |c: Color, _: Uv| brightness(c, factor);
            self.layer.resize(size, size);
            self.canvas
                .render_quad(&mut self.layer, &quad, texture, Some(&shade))?;
            icon.blit_add(&self.layer);
        }
        tracing::debug!(size, "block icon rendered");
        Ok(icon)
    }
}
