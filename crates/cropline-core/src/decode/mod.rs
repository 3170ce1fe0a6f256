//! Image decoding for Cropline.
//!
//! This module turns encoded bytes into an upright RGBA [`Raster`]:
//! - Container sniffing (JPEG, PNG, WebP)
//! - EXIF orientation correction
//! - Header-only dimension probing
//!
//! Decoding is synchronous; the batch orchestrator moves it onto a blocking
//! worker.
//!
//! [`Raster`]: crate::raster::Raster

mod reader;
mod types;

pub use reader::{
    decode_image, decode_image_no_orientation, get_orientation, probe_dimensions,
    probe_upright_dimensions,
};
pub use types::{DecodeError, Orientation};
