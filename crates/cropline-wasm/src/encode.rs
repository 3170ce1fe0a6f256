//! Final-format encoding WASM bindings.
//!
//! ```typescript
//! import { crop, encode } from '@cropline/wasm';
//!
//! const surface = crop(image, geometry, null);
//! const output = encode(surface, { format: 'webp', quality: 85 });
//! const blob = new Blob([output.bytes()], { type: output.mime_type });
//! ```

use crate::types::{js_error, JsEncodedImage, JsRaster, JsSurface};
use cropline_core::encode::{self, OutputFormat, OutputSettings};
use wasm_bindgen::prelude::*;

/// Re-encode a crop or resize surface with the given output settings.
///
/// Quality is clamped to the format's range (PNG 0-9, JPEG/WebP 1-100).
#[wasm_bindgen]
pub fn encode(surface: &JsSurface, settings: JsValue) -> Result<JsEncodedImage, JsValue> {
    let settings: OutputSettings = serde_wasm_bindgen::from_value(settings)
        .map_err(|e| JsValue::from_str(&format!("Invalid output settings: {}", e)))?;

    encode::encode(surface.inner(), &settings)
        .map(JsEncodedImage::new)
        .map_err(js_error)
}

/// Encode a raster directly as `format` ("jpg", "jpeg", "png" or "webp").
#[wasm_bindgen]
pub fn encode_raster(image: &JsRaster, format: &str, quality: u8) -> Result<JsEncodedImage, JsValue> {
    let format: OutputFormat = format.parse().map_err(js_error)?;
    encode::encode_raster(&image.to_raster(), format, quality)
        .map(JsEncodedImage::new)
        .map_err(js_error)
}
