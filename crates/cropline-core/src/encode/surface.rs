//! Lossless intermediate encoding between the geometry and codec stages.
//!
//! Transform output is always handed over as PNG so the crop and resize math
//! never depends on the export codec.

use std::io::Cursor;

use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, ImageFormat};

use super::EncodeError;
use crate::raster::Raster;

/// PNG-encoded RGBA surface produced by the transform stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceBytes {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl SurfaceBytes {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Encode a raster as the lossless intermediate surface.
pub fn encode_surface(raster: &Raster) -> Result<SurfaceBytes, EncodeError> {
    check_buffer(raster)?;

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new_with_quality(&mut buffer, CompressionType::Fast, PngFilter::Adaptive)
        .write_image(
            &raster.pixels,
            raster.width,
            raster.height,
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(SurfaceBytes {
        bytes: buffer.into_inner(),
        width: raster.width,
        height: raster.height,
    })
}

/// Decode an intermediate surface back into a raster.
pub fn decode_surface(surface: &SurfaceBytes) -> Result<Raster, EncodeError> {
    let img = image::load_from_memory_with_format(&surface.bytes, ImageFormat::Png)
        .map_err(|e| EncodeError::Decode(e.to_string()))?;
    Ok(Raster::from_rgba_image(img.into_rgba8()))
}

pub(crate) fn check_buffer(raster: &Raster) -> Result<(), EncodeError> {
    if raster.width == 0 || raster.height == 0 {
        return Err(EncodeError::InvalidDimensions {
            width: raster.width,
            height: raster.height,
        });
    }

    let expected = raster.width as usize * raster.height as usize * 4;
    if raster.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: raster.pixels.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_is_png() {
        let raster = Raster::new(3, 2, vec![7u8; 24]);
        let surface = encode_surface(&raster).unwrap();

        assert_eq!(&surface.bytes[0..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!((surface.width, surface.height), (3, 2));
    }

    #[test]
    fn test_surface_is_lossless_including_alpha() {
        let pixels: Vec<u8> = (0..5 * 4 * 4).map(|i| (i * 13 % 256) as u8).collect();
        let raster = Raster::new(5, 4, pixels);

        let surface = encode_surface(&raster).unwrap();
        assert_eq!(decode_surface(&surface).unwrap(), raster);
    }

    #[test]
    fn test_surface_rejects_bad_buffers() {
        let raster = Raster {
            width: 0,
            height: 3,
            pixels: vec![],
        };
        assert!(matches!(
            encode_surface(&raster),
            Err(EncodeError::InvalidDimensions { .. })
        ));

        let raster = Raster {
            width: 2,
            height: 2,
            pixels: vec![0; 15],
        };
        assert!(matches!(
            encode_surface(&raster),
            Err(EncodeError::InvalidPixelData {
                expected: 16,
                actual: 15
            })
        ));
    }

    #[test]
    fn test_decode_surface_rejects_garbage() {
        let surface = SurfaceBytes {
            bytes: vec![1, 2, 3],
            width: 1,
            height: 1,
        };
        assert!(matches!(decode_surface(&surface), Err(EncodeError::Decode(_))));
    }
}
