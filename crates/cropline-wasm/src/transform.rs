//! WASM bindings for the transform engine.
//!
//! Geometry and resize parameters are passed as plain objects and read with
//! `serde-wasm-bindgen`, using the same camelCase field names as the core
//! types:
//!
//! ```typescript
//! const geometry = {
//!   x: 0, y: 0, width: 800, height: 600,
//!   rotationDegrees: 12.5,
//!   flipHorizontal: false, flipVertical: false,
//!   borderRadiusFraction: 0.1,
//! };
//! const surface = crop(image, geometry, { enabled: true, width: 400, height: 300 });
//! const preview = generate_preview(image, geometry);
//! ```

use crate::types::{js_error, JsEncodedImage, JsRaster, JsSurface};
use cropline_core::transform::{self, CropGeometry, ResizeTarget};
use wasm_bindgen::prelude::*;

fn read_geometry(value: JsValue) -> Result<CropGeometry, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Invalid crop geometry: {}", e)))
}

/// Crop with rotation, flips and rounded corners, then apply the optional
/// resize target (`null`/`undefined` to skip).
#[wasm_bindgen]
pub fn crop(
    image: &JsRaster,
    geometry: JsValue,
    resize_target: JsValue,
) -> Result<JsSurface, JsValue> {
    let geometry = read_geometry(geometry)?;
    let resize_target: Option<ResizeTarget> = serde_wasm_bindgen::from_value(resize_target)
        .map_err(|e| JsValue::from_str(&format!("Invalid resize target: {}", e)))?;

    transform::crop(&image.to_raster(), &geometry, resize_target)
        .map(JsSurface::new)
        .map_err(js_error)
}

/// Resize by `round(dimension / scale_factor)`.
#[wasm_bindgen]
pub fn resize_proportional(image: &JsRaster, scale_factor: f64) -> Result<JsSurface, JsValue> {
    transform::resize_proportional(&image.to_raster(), scale_factor)
        .map(JsSurface::new)
        .map_err(js_error)
}

/// Low-quality JPEG of the crop, at most 300px on the longest edge.
#[wasm_bindgen]
pub fn generate_preview(image: &JsRaster, geometry: JsValue) -> Result<JsEncodedImage, JsValue> {
    let geometry = read_geometry(geometry)?;
    transform::generate_preview(&image.to_raster(), &geometry)
        .map(JsEncodedImage::new)
        .map_err(js_error)
}

/// Bounding box `[width, height]` of a rotated rectangle, rounded up.
#[wasm_bindgen]
pub fn calculate_rotated_size(width: u32, height: u32, rotation_degrees: f64) -> Vec<u32> {
    let (w, h) = transform::calculate_rotated_size(width, height, rotation_degrees);
    vec![w, h]
}
