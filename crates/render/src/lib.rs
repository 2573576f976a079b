//! Software renderer that draws textures onto arbitrary convex quads.
//!
//! Each covered target pixel is mapped back to a texture coordinate by
//! inverse bilinear projection against the quad, sampled nearest-neighbour,
//! optionally filtered, and composited over the target.
//!
//! # Invariants
//! - The axis-aligned unit quad projects every interior point to itself.
//! - Projection is invariant under uniform scale and translation of quad and
//!   query point together.
//! - Degenerate geometry is an error, never `NaN` in the output.
//! - Colours are clamped and rounded exactly once, when written to a buffer.

mod block;
mod canvas;
mod error;
mod pixels;
mod quad;
mod texture;
mod uv_map;
mod vector;

pub use block::{BlockFaces, BlockIconRenderer, ShadingConfig, isometric_quads};
pub use canvas::{CanvasRenderer, Filter, MAX_SAMPLES_PER_AXIS, Mask, RenderConfig, rasterize};
pub use error::RenderError;
pub use pixels::{Color, ImageBuffer, PixelError, brightness};
pub use quad::{Quad, QuadProjector, uv_projection};
pub use texture::{TextureCache, decode_png, encode_png, load_png, save_png};
pub use uv_map::UvMap;
pub use vector::{Coord, GeometryError, Point, Uv, VectorExt};

pub fn crate_info() -> &'static str {
    "mcstats-render v0.1.0"
}
