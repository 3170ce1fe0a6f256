//! Cropline Core - crop, resize and re-encode pipeline
//!
//! This crate provides the image side of Cropline: decoding uploads into an
//! RGBA raster, the geometric transform engine (crop with rotation, flips and
//! rounded corners, absolute and proportional resize), the two-stage encoder,
//! and a sequential batch orchestrator with pause, cancel and retry.
//!
//! The `batch` feature (on by default) pulls in the async runtime pieces. The
//! WebAssembly bindings build without it.

pub mod decode;
pub mod encode;
pub mod raster;
pub mod transform;

#[cfg(feature = "batch")]
pub mod batch;

pub use decode::{decode_image, DecodeError};
pub use encode::{encode, EncodeError, EncodedImage, OutputFormat, OutputSettings, SurfaceBytes};
pub use raster::Raster;
pub use transform::{
    calculate_rotated_size, crop, generate_preview, resize_proportional, CropGeometry,
    ProportionalResizeSettings, ResizeTarget, TransformError,
};
