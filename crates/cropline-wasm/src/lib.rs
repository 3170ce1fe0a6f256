//! Cropline WASM - WebAssembly bindings for the Cropline transform engine
//!
//! This crate exposes decoding, the crop/resize/preview operations and the
//! final encode to JavaScript. Batch orchestration stays on the host side.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrappers for rasters, surfaces and encoded output
//! - `decode` - Image decoding bindings (JPEG, PNG, WebP)
//! - `transform` - Crop, proportional resize, preview and rotated-size helper
//! - `encode` - Final-format encoding
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_image, crop, encode } from '@cropline/wasm';
//!
//! await init();
//!
//! const image = decode_image(new Uint8Array(await file.arrayBuffer()));
//! const surface = crop(image, geometry, null);
//! const output = encode(surface, { format: 'jpg', quality: 90 });
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod encode;
mod transform;
mod types;

// Re-export public types
pub use decode::{
    decode_image, decode_image_no_orientation, get_orientation, probe_dimensions,
    probe_upright_dimensions,
};
pub use encode::{encode, encode_raster};
pub use transform::{calculate_rotated_size, crop, generate_preview, resize_proportional};
pub use types::{JsEncodedImage, JsRaster, JsSurface};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
