//! WASM-compatible wrapper types for rasters, surfaces and encoded output.
//!
//! Pixel and byte buffers live in WASM memory. Getters that return buffers
//! copy them into JavaScript memory as `Uint8Array`s.

use cropline_core::encode::{EncodedImage, SurfaceBytes};
use cropline_core::raster::Raster;
use wasm_bindgen::prelude::*;

/// A decoded RGBA image.
#[wasm_bindgen]
pub struct JsRaster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsRaster {
    /// Create a raster from dimensions and RGBA pixel data (4 bytes per pixel,
    /// row-major order).
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<JsRaster, JsValue> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(JsValue::from_str(&format!(
                "Pixel buffer has {} bytes, expected {}",
                pixels.len(),
                expected
            )));
        }
        Ok(JsRaster {
            width,
            height,
            pixels,
        })
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGBA pixel data as Uint8Array (copied).
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    pub fn free(self) {}
}

impl JsRaster {
    pub(crate) fn from_raster(raster: Raster) -> Self {
        Self {
            width: raster.width,
            height: raster.height,
            pixels: raster.pixels,
        }
    }

    /// Borrowing view as a core raster. Clones the pixel data.
    pub(crate) fn to_raster(&self) -> Raster {
        Raster::new(self.width, self.height, self.pixels.clone())
    }
}

/// Lossless intermediate produced by crop and resize, ready for `encode`.
#[wasm_bindgen]
pub struct JsSurface {
    inner: SurfaceBytes,
}

#[wasm_bindgen]
impl JsSurface {
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// PNG bytes of the surface (copied).
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.bytes.clone()
    }
}

impl JsSurface {
    pub(crate) fn new(inner: SurfaceBytes) -> Self {
        Self { inner }
    }

    pub(crate) fn inner(&self) -> &SurfaceBytes {
        &self.inner
    }
}

/// Final encoded bytes plus the tag the export side needs.
#[wasm_bindgen]
pub struct JsEncodedImage {
    inner: EncodedImage,
}

#[wasm_bindgen]
impl JsEncodedImage {
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        self.inner.mime_type().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn extension(&self) -> String {
        self.inner.format.extension().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.len()
    }

    /// Encoded bytes (copied).
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.bytes.clone()
    }
}

impl JsEncodedImage {
    pub(crate) fn new(inner: EncodedImage) -> Self {
        Self { inner }
    }
}

/// Turn any core error into a JS string error.
pub(crate) fn js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}
