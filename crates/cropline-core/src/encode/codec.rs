//! Final-format encoding for export.
//!
//! The intermediate surface is decoded and re-encoded with the `image`
//! crate's codecs:
//! - **JPEG**: quality 1-100; alpha is composited onto white first
//! - **PNG**: compression level 0-9 mapped onto the encoder's presets
//! - **WebP**: lossy libwebp encoder at quality 1-100, alpha kept. On
//!   wasm32, where libwebp is not built, the `image` crate's lossless encoder
//!   is used and quality has no effect.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
#[cfg(target_arch = "wasm32")]
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

use super::surface::{check_buffer, decode_surface, SurfaceBytes};
use super::{OutputFormat, OutputSettings};
use crate::raster::Raster;

/// Background used when flattening transparent pixels for JPEG.
const JPEG_MATTE: [u8; 3] = [255, 255, 255];

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Quality outside the format's range
    #[error("Invalid {format} quality {quality}: expected {min}-{max}")]
    InvalidQuality {
        format: OutputFormat,
        quality: u8,
        min: u8,
        max: u8,
    },

    /// Format name not recognized
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// The intermediate surface could not be read back
    #[error("Failed to decode intermediate surface: {0}")]
    Decode(String),

    /// Encoding failed
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encoded export bytes plus the tag the export collaborator needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Re-encode an intermediate surface into the requested output format.
///
/// Quality is clamped to the format's range before use.
pub fn encode(surface: &SurfaceBytes, settings: &OutputSettings) -> Result<EncodedImage, EncodeError> {
    let raster = decode_surface(surface)?;
    encode_raster(&raster, settings.format, settings.effective_quality())
}

/// Encode a raster directly, skipping the intermediate surface.
pub fn encode_raster(
    raster: &Raster,
    format: OutputFormat,
    quality: u8,
) -> Result<EncodedImage, EncodeError> {
    check_buffer(raster)?;
    let quality = format.clamp_quality(quality);

    let bytes = match format {
        OutputFormat::Jpg => encode_jpeg(raster, quality)?,
        OutputFormat::Png => encode_png(raster, quality)?,
        OutputFormat::Webp => encode_webp(raster, quality)?,
    };

    tracing::trace!(
        format = %format,
        quality,
        width = raster.width,
        height = raster.height,
        bytes = bytes.len(),
        "encoded image"
    );

    Ok(EncodedImage {
        bytes,
        format,
        width: raster.width,
        height: raster.height,
    })
}

fn encode_jpeg(raster: &Raster, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let rgb = flatten_onto_matte(raster);
    let mut buffer = Cursor::new(Vec::new());

    JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(&rgb, raster.width, raster.height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

fn encode_png(raster: &Raster, level: u8) -> Result<Vec<u8>, EncodeError> {
    let compression = match level {
        0..=2 => CompressionType::Fast,
        3..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    };
    let mut buffer = Cursor::new(Vec::new());

    PngEncoder::new_with_quality(&mut buffer, compression, PngFilter::Adaptive)
        .write_image(
            &raster.pixels,
            raster.width,
            raster.height,
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

#[cfg(not(target_arch = "wasm32"))]
fn encode_webp(raster: &Raster, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let encoded = webp::Encoder::from_rgba(&raster.pixels, raster.width, raster.height)
        .encode_simple(false, f32::from(quality))
        .map_err(|e| EncodeError::EncodingFailed(format!("webp: {e:?}")))?;

    Ok(encoded.to_vec())
}

#[cfg(target_arch = "wasm32")]
fn encode_webp(raster: &Raster, _quality: u8) -> Result<Vec<u8>, EncodeError> {
    let mut buffer = Cursor::new(Vec::new());

    WebPEncoder::new_lossless(&mut buffer)
        .write_image(
            &raster.pixels,
            raster.width,
            raster.height,
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

/// Composite RGBA over the JPEG matte, returning packed RGB.
fn flatten_onto_matte(raster: &Raster) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(raster.pixel_count() as usize * 3);
    for px in raster.pixels.chunks_exact(4) {
        let a = px[3] as u32;
        for i in 0..3 {
            let c = (px[i] as u32 * a + JPEG_MATTE[i] as u32 * (255 - a) + 127) / 255;
            rgb.push(c as u8);
        }
    }
    rgb
}


// ============================================================================
// Property-Based Tests
// ============================================================================
