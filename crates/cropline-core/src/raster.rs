//! The decoded pixel surface shared by every engine stage.

/// Bytes per RGBA8 pixel.
pub const CHANNELS: usize = 4;

/// Largest edge a surface may have, matching common canvas limits.
pub const MAX_SURFACE_SIDE: u32 = 32_767;

/// Largest area a surface may have (16384 x 16384).
pub const MAX_SURFACE_PIXELS: u64 = 268_435_456;

/// Memory ceiling applied to every surface the engine allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceLimits {
    pub max_side: u32,
    pub max_pixels: u64,
}

impl Default for SurfaceLimits {
    fn default() -> Self {
        Self {
            max_side: MAX_SURFACE_SIDE,
            max_pixels: MAX_SURFACE_PIXELS,
        }
    }
}

impl SurfaceLimits {
    /// Ok when a `width x height` surface is non-empty and within the ceiling.
    /// The error carries the rejected dimensions.
    pub fn check(&self, width: u32, height: u32) -> Result<(), (u32, u32)> {
        let area = width as u64 * height as u64;
        if width == 0
            || height == 0
            || width > self.max_side
            || height > self.max_side
            || area > self.max_pixels
        {
            return Err((width, height));
        }
        Ok(())
    }
}

/// A decoded image with RGBA pixel data.
///
/// Alpha is carried through the whole pipeline: sampling outside the source
/// bounds and the rounded-corner clip both leave transparent pixels behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGBA pixel data in row-major order (4 bytes per pixel).
    /// Length should be width * height * 4.
    pub pixels: Vec<u8>,
}

impl Raster {
    /// Create a new Raster with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * CHANNELS,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Allocate a fully transparent surface.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * CHANNELS],
        }
    }

    /// Create a Raster from an image::RgbaImage.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Convert to an image::RgbaImage for further processing.
    ///
    /// Returns `None` if the pixel buffer does not match the dimensions.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Read one pixel. Panics if the coordinates are out of range.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Write one pixel. Panics if the coordinates are out of range.
    #[inline]
    pub fn put_pixel(&mut self, x: u32, y: u32, value: [u8; 4]) {
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        self.pixels[idx..idx + CHANNELS].copy_from_slice(&value);
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Get the size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    /// True when every pixel is fully opaque.
    pub fn is_opaque(&self) -> bool {
        self.pixels.chunks_exact(CHANNELS).all(|p| p[3] == 255)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_creation() {
        let img = Raster::new(100, 50, vec![0u8; 100 * 50 * 4]);

        assert_eq!(img.width, 100);
        assert_eq!(img.height, 50);
        assert_eq!(img.pixel_count(), 5000);
        assert_eq!(img.byte_size(), 20000);
        assert!(!img.is_empty());
    }

    #[test]
    fn test_raster_empty() {
        let img = Raster::new(0, 0, vec![]);
        assert!(img.is_empty());
    }

    #[test]
    fn test_transparent_surface() {
        let img = Raster::transparent(3, 2);
        assert_eq!(img.pixels.len(), 24);
        assert!(img.pixels.iter().all(|&b| b == 0));
        assert!(!img.is_opaque());
    }

    #[test]
    fn test_pixel_roundtrip_through_rgba_image() {
        let mut img = Raster::transparent(2, 2);
        img.put_pixel(1, 0, [10, 20, 30, 255]);

        let rgba = img.to_rgba_image().unwrap();
        assert_eq!(rgba.get_pixel(1, 0).0, [10, 20, 30, 255]);

        let back = Raster::from_rgba_image(rgba);
        assert_eq!(back, img);
        assert_eq!(back.pixel(1, 0), [10, 20, 30, 255]);
    }

    #[test]
    fn test_surface_limits() {
        let limits = SurfaceLimits::default();
        assert!(limits.check(1, 1).is_ok());
        assert!(limits.check(16384, 16384).is_ok());
        assert_eq!(limits.check(0, 10), Err((0, 10)));
        assert_eq!(limits.check(10, 0), Err((10, 0)));
        assert!(limits.check(32_768, 1).is_err());
        assert!(limits.check(20000, 20000).is_err());
    }

    #[test]
    fn test_mismatched_buffer_has_no_rgba_image() {
        let img = Raster {
            width: 4,
            height: 4,
            pixels: vec![0u8; 10],
        };
        assert!(img.to_rgba_image().is_none());
    }
}
