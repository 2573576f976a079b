/// Errors from raw pixel access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PixelError {
    #[error("pixel ({x}, {y}) out of range for {width}x{height} image")]
    IndexOutOfRange {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    #[error("buffer holds {actual} bytes, {width}x{height} RGBA needs {expected}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// An RGBA colour with channels on the 0..=255 scale.
///
/// Channels are kept unclamped so filters can be chained; clamping and
/// rounding happen once, when the colour is written to a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_bytes([r, g, b, a]: [u8; 4]) -> Self {
        Self::rgba(r as f64, g as f64, b as f64, a as f64)
    }

    pub fn to_bytes(self) -> [u8; 4] {
        [
            channel(self.r),
            channel(self.g),
            channel(self.b),
            channel(self.a),
        ]
    }
}

fn channel(value: f64) -> u8 {
    // NaN maps to 0 through the saturating cast.
    value.clamp(0.0, 255.0).round() as u8
}

/// Scale the colour channels by `factor`. Alpha is untouched.
pub fn brightness(color: Color, factor: f64) -> Color {
    Color {
        r: color.r * factor,
        g: color.g * factor,
        b: color.b * factor,
        a: color.a,
    }
}

/// Row-major RGBA8 pixels, 4 bytes per pixel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl ImageBuffer {
    /// A fully transparent image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; byte_len(width, height)],
        }
    }

    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, PixelError> {
        let expected = byte_len(width, height);
        if data.len() != expected {
            return Err(PixelError::BufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    fn offset(&self, x: u32, y: u32) -> Result<usize, PixelError> {
        if x >= self.width || y >= self.height {
            return Err(PixelError::IndexOutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(4 * (self.width as usize * y as usize + x as usize))
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Result<Color, PixelError> {
        let i = self.offset(x, y)?;
        let px = &self.data[i..i + 4];
        Ok(Color::from_bytes([px[0], px[1], px[2], px[3]]))
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) -> Result<(), PixelError> {
        let i = self.offset(x, y)?;
        self.data[i..i + 4].copy_from_slice(&color.to_bytes());
        Ok(())
    }

    /// Make every pixel transparent black.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Change dimensions and clear. Reuses the allocation when possible.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(byte_len(width, height), 0);
    }

    pub fn fill(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&bytes);
        }
    }

    /// Composite `src` over `self` at the origin using straight-alpha
    /// source-over. Pixels outside the overlap are left alone.
    pub fn blit_over(&mut self, src: &ImageBuffer) {
        self.blit_with(src, source_over);
    }

    /// Accumulate `src` into `self`: coverage adds up, capped at opaque, and
    /// colours are averaged by coverage. Shapes that meet along an edge sum
    /// to full coverage there instead of leaving a translucent seam.
    pub fn blit_add(&mut self, src: &ImageBuffer) {
        self.blit_with(src, additive);
    }

    fn blit_with(&mut self, src: &ImageBuffer, op: fn(Color, Color) -> Color) {
        let w = self.width.min(src.width);
        let h = self.height.min(src.height);
        for y in 0..h {
            for x in 0..w {
                let s = 4 * (src.width as usize * y as usize + x as usize);
                let d = 4 * (self.width as usize * y as usize + x as usize);
                let sa = src.data[s + 3];
                if sa == 0 {
                    continue;
                }
                let src_px = Color::from_bytes([
                    src.data[s],
                    src.data[s + 1],
                    src.data[s + 2],
                    sa,
                ]);
                let dst_px = Color::from_bytes([
                    self.data[d],
                    self.data[d + 1],
                    self.data[d + 2],
                    self.data[d + 3],
                ]);
                self.data[d..d + 4].copy_from_slice(&op(src_px, dst_px).to_bytes());
            }
        }
    }
}

fn byte_len(width: u32, height: u32) -> usize {
    4 * width as usize * height as usize
}

fn source_over(src: Color, dst: Color) -> Color {
    let sa = src.a / 255.0;
    let da = dst.a / 255.0;
    let oa = sa + da * (1.0 - sa);
    if oa <= 0.0 {
        return Color::TRANSPARENT;
    }
    let mix = |s: f64, d: f64| (s * sa + d * da * (1.0 - sa)) / oa;
    Color {
        r: mix(src.r, dst.r),
        g: mix(src.g, dst.g),
        b: mix(src.b, dst.b),
        a: oa * 255.0,
    }
}

fn additive(src: Color, dst: Color) -> Color {
    let sa = src.a / 255.0;
    let da = dst.a / 255.0;
    let total = sa + da;
    if total <= 0.0 {
        return Color::TRANSPARENT;
    }
    let mix = |s: f64, d: f64| (s * sa + d * da) / total;
    Color {
        r: mix(src.r, dst.r),
        g: mix(src.g, dst.g),
        b: mix(src.b, dst.b),
        a: total.min(1.0) * 255.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brightness_scales_rgb_only() {
        let c = brightness(Color::rgba(200.0, 100.0, 50.0, 255.0), 0.5);
        assert_eq!(c, Color::rgba(100.0, 50.0, 25.0, 255.0));
    }

    #[test]
    fn brightness_does_not_clamp_until_written() {
        let c = brightness(Color::rgba(200.0, 10.0, 0.0, 255.0), 1.5);
        assert_eq!(c.r, 300.0);
        assert_eq!(c.to_bytes(), [255, 15, 0, 255]);
    }

    #[test]
    fn set_then_get_rounds_and_clamps() {
        let mut img = ImageBuffer::new(2, 2);
        img.set_pixel(1, 0, Color::rgba(10.4, 10.5, -3.0, 300.0)).unwrap();
        assert_eq!(
            img.get_pixel(1, 0).unwrap(),
            Color::rgba(10.0, 11.0, 0.0, 255.0)
        );
        assert_eq!(&img.data()[4..8], &[10, 11, 0, 255]);
        assert_eq!(img.get_pixel(0, 0).unwrap(), Color::TRANSPARENT);
    }

    #[test]
    fn out_of_range_access_is_an_error() {
        let mut img = ImageBuffer::new(2, 3);
        assert_eq!(
            img.get_pixel(2, 0),
            Err(PixelError::IndexOutOfRange {
                x: 2,
                y: 0,
                width: 2,
                height: 3
            })
        );
        assert!(img.set_pixel(0, 3, Color::TRANSPARENT).is_err());
    }

    #[test]
    fn from_raw_checks_length() {
        assert!(ImageBuffer::from_raw(2, 2, vec![0; 16]).is_ok());
        assert!(matches!(
            ImageBuffer::from_raw(2, 2, vec![0; 15]),
            Err(PixelError::BufferSize { expected: 16, actual: 15, .. })
        ));
    }

    #[test]
    fn resize_clears() {
        let mut img = ImageBuffer::new(1, 1);
        img.fill(Color::rgba(1.0, 2.0, 3.0, 4.0));
        img.resize(3, 2);
        assert_eq!(img.data().len(), 24);
        assert!(img.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn blit_opaque_replaces_and_transparent_skips() {
        let mut dst = ImageBuffer::new(2, 1);
        dst.fill(Color::rgba(0.0, 0.0, 255.0, 255.0));
        let mut src = ImageBuffer::new(2, 1);
        src.set_pixel(0, 0, Color::rgba(255.0, 0.0, 0.0, 255.0)).unwrap();
        dst.blit_over(&src);
        assert_eq!(dst.get_pixel(0, 0).unwrap(), Color::rgba(255.0, 0.0, 0.0, 255.0));
        assert_eq!(dst.get_pixel(1, 0).unwrap(), Color::rgba(0.0, 0.0, 255.0, 255.0));
    }

    #[test]
    fn blit_half_alpha_blends() {
        let mut dst = ImageBuffer::new(1, 1);
        dst.fill(Color::rgba(0.0, 0.0, 0.0, 255.0));
        let mut src = ImageBuffer::new(1, 1);
        src.fill(Color::rgba(255.0, 255.0, 255.0, 127.5));
        dst.blit_over(&src);
        // 127.5 is written as 128.
        let px = dst.get_pixel(0, 0).unwrap();
        assert_eq!(px.a, 255.0);
        assert_eq!(px.r, 128.0);
    }

    #[test]
    fn blit_onto_transparent_keeps_source() {
        let mut dst = ImageBuffer::new(1, 1);
        let mut src = ImageBuffer::new(1, 1);
        src.fill(Color::rgba(40.0, 80.0, 120.0, 100.0));
        dst.blit_over(&src);
        assert_eq!(dst, src);
    }

    #[test]
    fn blit_add_sums_complementary_coverage() {
        let mut dst = ImageBuffer::new(2, 1);
        dst.fill(Color::rgba(255.0, 0.0, 0.0, 64.0));
        let mut src = ImageBuffer::new(2, 1);
        src.fill(Color::rgba(0.0, 0.0, 255.0, 191.0));
        src.set_pixel(1, 0, Color::rgba(0.0, 0.0, 255.0, 200.0)).unwrap();
        dst.set_pixel(1, 0, Color::rgba(255.0, 0.0, 0.0, 200.0)).unwrap();
        dst.blit_add(&src);

        assert_eq!(
            dst.get_pixel(0, 0).unwrap(),
            Color::rgba(64.0, 0.0, 191.0, 255.0)
        );
        // Overlap beyond full coverage is capped.
        assert_eq!(dst.get_pixel(1, 0).unwrap().a, 255.0);
    }
}
