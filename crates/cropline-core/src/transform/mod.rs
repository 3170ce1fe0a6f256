//! Geometric transform engine: crop with rotation, flips and rounded corners,
//! absolute and proportional resize, and low-quality previews.
//!
//! Every operation is a pure function of its inputs. Export operations return
//! [`SurfaceBytes`](crate::encode::SurfaceBytes), a lossless intermediate that
//! the encode stage converts into the final format.
//!
//! # Pipeline Order
//!
//! For a crop:
//! 1. Allocate the output surface (`geometry.width x geometry.height`)
//! 2. Map each output pixel through translate, rotate and flip into the source
//! 3. Clip to the rounded rectangle (output space)
//! 4. Resample into the resize target, when enabled
//! 5. Encode the intermediate surface

mod clip;
mod crop;
mod error;
mod geometry;
mod resize;
mod sample;

pub use clip::RoundedRect;
pub use crop::{crop, crop_raster, generate_preview, PREVIEW_MAX_EDGE, PREVIEW_QUALITY};
pub use error::TransformError;
pub use geometry::{
    calculate_rotated_size, CropGeometry, ProportionalResizeSettings, ResizeMode, ResizeTarget,
};
pub use resize::{
    proportional_dimensions, resize, resize_proportional, resize_proportional_raster,
    resize_to_fit, FilterType,
};
pub use sample::InterpolationFilter;
