//! Image encoding pipeline for Cropline.
//!
//! Encoding happens in two stages:
//! - The transform stage hands over a lossless PNG [`SurfaceBytes`]
//! - [`encode`] decodes that surface and re-encodes it to the requested
//!   [`OutputFormat`] at the requested quality
//!
//! Keeping the stages apart means the crop and resize math never depends on
//! the output codec.
//!
//! # Examples
//!
//! ```ignore
//! use cropline_core::encode::{encode, encode_surface, OutputFormat, OutputSettings};
//!
//! let surface = encode_surface(&raster)?;
//! let jpeg = encode(&surface, &OutputSettings::new(OutputFormat::Jpg, 90))?;
//! println!("Encoded {} bytes as {}", jpeg.len(), jpeg.mime_type());
//! ```

mod codec;
mod format;
mod surface;

pub use codec::{encode, encode_raster, EncodeError, EncodedImage};
pub use format::{OutputFormat, OutputSettings};
pub use surface::{decode_surface, encode_surface, SurfaceBytes};
