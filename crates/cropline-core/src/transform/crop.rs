//! Crop compositing: sample a source rectangle into a rotated, flipped and
//! optionally round-cornered output frame.
//!
//! The output surface is `geometry.width x geometry.height`. Each output pixel
//! center is mapped back through the frame transform into source space and
//! sampled there, so the sampled rectangle's center always lands on the
//! output center. Anything that maps outside the source stays transparent.
//!
//! # Example
//!
//! ```ignore
//! let geometry = CropGeometry::rect(0.0, 0.0, 100.0, 200.0).with_rotation(15.0);
//! let surface = crop(&source, &geometry, None)?;
//! let final_bytes = encode(&surface, &settings)?;
//! ```

use super::clip::RoundedRect;
use super::geometry::{CropGeometry, FrameMapping, ResizeTarget};
use super::resize::{resize, FilterType};
use super::sample::InterpolationFilter;
use super::TransformError;
use crate::encode::{encode_raster, encode_surface, EncodedImage, OutputFormat, SurfaceBytes};
use crate::raster::{Raster, SurfaceLimits};

/// Longest edge of a preview surface.
pub const PREVIEW_MAX_EDGE: u32 = 300;

/// JPEG quality used for previews.
pub const PREVIEW_QUALITY: u8 = 60;

/// Crop, then apply the optional absolute resize target, and hand the result
/// over as the lossless intermediate surface.
///
/// # Errors
///
/// - `InvalidGeometry` for non-finite values or a radius fraction outside [0, 1]
/// - `SurfaceAllocation` when the crop or resize size is empty or too large
pub fn crop(
    source: &Raster,
    geometry: &CropGeometry,
    resize_target: Option<ResizeTarget>,
) -> Result<SurfaceBytes, TransformError> {
    let raster = crop_raster(source, geometry, resize_target)?;
    Ok(encode_surface(&raster)?)
}

/// [`crop`] without the intermediate encode.
pub fn crop_raster(
    source: &Raster,
    geometry: &CropGeometry,
    resize_target: Option<ResizeTarget>,
) -> Result<Raster, TransformError> {
    geometry.validate()?;
    let (width, height) = checked_output_size(geometry.output_size())?;

    tracing::debug!(
        src_width = source.width,
        src_height = source.height,
        width,
        height,
        rotation = geometry.rotation_degrees,
        flip_h = geometry.flip_horizontal,
        flip_v = geometry.flip_vertical,
        radius = geometry.border_radius_fraction,
        "crop"
    );

    let cropped = render(
        source,
        geometry,
        width,
        height,
        1.0,
        InterpolationFilter::Lanczos3,
    );

    match resize_target {
        Some(target) if target.enabled => {
            resize(&cropped, target.width, target.height, FilterType::HIGH_QUALITY)
        }
        _ => Ok(cropped),
    }
}

/// Render the crop onto a canvas no larger than [`PREVIEW_MAX_EDGE`] and
/// encode it as a low-quality JPEG.
///
/// The scale factor is computed once from the crop size and applied to the
/// whole frame, so rotation and flips look the same as in the full-size
/// crop. Resize targets are ignored.
pub fn generate_preview(
    source: &Raster,
    geometry: &CropGeometry,
) -> Result<EncodedImage, TransformError> {
    geometry.validate()?;
    let (full_w, full_h) = checked_output_size(geometry.output_size())?;

    let longest = full_w.max(full_h) as f64;
    let scale = (PREVIEW_MAX_EDGE as f64 / longest).min(1.0);
    let width = ((full_w as f64 * scale).round() as u32).max(1);
    let height = ((full_h as f64 * scale).round() as u32).max(1);

    let preview = render(
        source,
        geometry,
        width,
        height,
        scale,
        InterpolationFilter::Bilinear,
    );
    Ok(encode_raster(&preview, OutputFormat::Jpg, PREVIEW_QUALITY)?)
}

fn checked_output_size((width, height): (i64, i64)) -> Result<(u32, u32), TransformError> {
    let limits = SurfaceLimits::default();
    if width <= 0
        || height <= 0
        || width > limits.max_side as i64
        || height > limits.max_side as i64
    {
        return Err(TransformError::SurfaceAllocation { width, height });
    }
    let (w, h) = (width as u32, height as u32);
    limits
        .check(w, h)
        .map_err(|_| TransformError::SurfaceAllocation { width, height })?;
    Ok((w, h))
}

/// Sample the frame into a fresh `width x height` surface.
fn render(
    source: &Raster,
    geometry: &CropGeometry,
    width: u32,
    height: u32,
    scale: f64,
    filter: InterpolationFilter,
) -> Raster {
    let mapping = FrameMapping::new(geometry, width, height, scale);
    let clip = RoundedRect::for_surface(width, height, geometry.border_radius_fraction);
    let mut output = Raster::transparent(width, height);

    for py in 0..height {
        for px in 0..width {
            let coverage = clip.map_or(1.0, |c| c.coverage(px, py));
            if coverage <= 0.0 {
                continue;
            }

            let (sx, sy) = mapping.source_point(px, py);
            let mut pixel = filter.sample(source, sx - 0.5, sy - 0.5);
            if coverage < 1.0 {
                pixel[3] = (pixel[3] as f64 * coverage).round() as u8;
            }
            output.put_pixel(px, py, pixel);
        }
    }

    output
}
