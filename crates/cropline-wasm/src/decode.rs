//! Image decoding WASM bindings.
//!
//! # Functions
//!
//! - [`decode_image`] - Decode JPEG, PNG or WebP bytes into an upright RGBA raster
//! - [`decode_image_no_orientation`] - Decode without applying EXIF orientation
//! - [`probe_dimensions`] - Read width and height from the header only
//! - [`probe_upright_dimensions`] - Header size after EXIF orientation
//! - [`get_orientation`] - EXIF orientation value (1-8)
//!
//! # Example
//!
//! ```typescript
//! import { decode_image, probe_dimensions } from '@cropline/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const [width, height] = probe_dimensions(bytes);
//! const image = decode_image(bytes);
//! ```

use crate::types::{js_error, JsRaster};
use cropline_core::decode;
use wasm_bindgen::prelude::*;

/// Decode an image and rotate it upright according to its EXIF orientation.
///
/// # Errors
///
/// Returns an error if the format is not recognized, the data is corrupted, or
/// the image exceeds the surface size limits.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsRaster, JsValue> {
    decode::decode_image(bytes)
        .map(JsRaster::from_raster)
        .map_err(js_error)
}

/// Decode an image exactly as stored.
#[wasm_bindgen]
pub fn decode_image_no_orientation(bytes: &[u8]) -> Result<JsRaster, JsValue> {
    decode::decode_image_no_orientation(bytes)
        .map(JsRaster::from_raster)
        .map_err(js_error)
}

/// Width and height as stored, without decoding pixels.
#[wasm_bindgen]
pub fn probe_dimensions(bytes: &[u8]) -> Result<Vec<u32>, JsValue> {
    decode::probe_dimensions(bytes)
        .map(|(width, height)| vec![width, height])
        .map_err(js_error)
}

/// Width and height as `decode_image` will return them, without decoding
/// pixels.
#[wasm_bindgen]
pub fn probe_upright_dimensions(bytes: &[u8]) -> Result<Vec<u32>, JsValue> {
    decode::probe_upright_dimensions(bytes)
        .map(|(width, height)| vec![width, height])
        .map_err(js_error)
}

/// EXIF orientation value, 1 when absent.
#[wasm_bindgen]
pub fn get_orientation(bytes: &[u8]) -> u8 {
    decode::get_orientation(bytes) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([1, 2, 3, 255]));
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, image::ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let raster = decode_image(&png_bytes(6, 4)).unwrap();
        assert_eq!((raster.width(), raster.height()), (6, 4));
        assert_eq!(raster.byte_length(), 6 * 4 * 4);
        assert_eq!(&raster.pixels()[0..4], &[1, 2, 3, 255]);
    }

    #[test]
    fn test_probe_dimensions() {
        assert_eq!(probe_dimensions(&png_bytes(9, 7)).unwrap(), vec![9, 7]);
        assert_eq!(probe_upright_dimensions(&png_bytes(9, 7)).unwrap(), vec![9, 7]);
    }

    #[test]
    fn test_orientation_defaults_to_normal() {
        assert_eq!(get_orientation(&png_bytes(2, 2)), 1);
    }
}
