use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageEncoder;
use image::codecs::png::PngEncoder;

use crate::error::RenderError;
use crate::pixels::ImageBuffer;

/// Decode PNG bytes into an RGBA buffer.
pub fn decode_png(bytes: &[u8]) -> Result<ImageBuffer, RenderError> {
    let rgba = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(ImageBuffer::from_raw(width, height, rgba.into_raw())?)
}

pub fn encode_png(img: &ImageBuffer) -> Result<Vec<u8>, RenderError> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out).write_image(
        img.data(),
        img.width(),
        img.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(out)
}

pub fn load_png(path: &Path) -> Result<ImageBuffer, RenderError> {
    decode_png(&std::fs::read(path)?)
}

pub fn save_png(path: &Path, img: &ImageBuffer) -> Result<(), RenderError> {
    std::fs::write(path, encode_png(img)?)?;
    Ok(())
}

/// Decoded textures keyed by path.
///
/// Unbounded: entries live until evicted or cleared. Pass one cache to every
/// renderer that should share decoded textures.
#[derive(Debug, Default)]
pub struct TextureCache {
    entries: HashMap<PathBuf, Arc<ImageBuffer>>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<Arc<ImageBuffer>> {
        self.entries.get(path).cloned()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, texture: ImageBuffer) -> Arc<ImageBuffer> {
        let texture = Arc::new(texture);
        self.entries.insert(path.into(), Arc::clone(&texture));
        texture
    }

    /// Cached texture for `path`, decoding it from disk on a miss. Failed
    /// loads are not cached.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<ImageBuffer>, RenderError> {
        if let Some(texture) = self.get(path) {
            return Ok(texture);
        }
        let texture = load_png(path)?;
        tracing::debug!(path = %path.display(), width = texture.width(), height = texture.height(), "texture loaded");
        Ok(self.insert(path, texture))
    }

    pub fn evict(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
