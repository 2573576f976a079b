use crate::pixels::PixelError;
use crate::vector::GeometryError;

/// Errors from rendering a quad or loading its texture.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("geometry: {0}")]
    Geometry(#[from] GeometryError),
    #[error("pixel access: {0}")]
    Pixel(#[from] PixelError),
    #[error("decode: {0}")]
    Decode(#[from] image::ImageError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
