//! Resampling: absolute targets, fit-to-edge and proportional scale factors.
//!
//! All functions return new `Raster` instances without modifying the input and
//! use the `image` crate's separable filters.

use serde::{Deserialize, Serialize};

use super::geometry::validate_scale_factor;
use super::TransformError;
use crate::encode::{encode_surface, SurfaceBytes};
use crate::raster::{Raster, SurfaceLimits};

/// Filter type for image resizing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    Bilinear,
    /// Catmull-Rom bicubic interpolation.
    CatmullRom,
    /// Lanczos3 interpolation (slower, highest quality).
    #[default]
    Lanczos3,
}

impl FilterType {
    /// Filter used by every export-quality resample.
    pub const HIGH_QUALITY: FilterType = FilterType::Lanczos3;

    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::CatmullRom => image::imageops::FilterType::CatmullRom,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Resize an image to exact dimensions.
///
/// # Errors
///
/// Returns `TransformError::SurfaceAllocation` if the target is empty or
/// beyond the surface ceiling.
pub fn resize(
    image: &Raster,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<Raster, TransformError> {
    SurfaceLimits::default()
        .check(width, height)
        .map_err(|(w, h)| TransformError::SurfaceAllocation {
            width: w as i64,
            height: h as i64,
        })?;

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgba = image
        .to_rgba_image()
        .ok_or(TransformError::SurfaceAllocation {
            width: image.width as i64,
            height: image.height as i64,
        })?;

    let resized = image::imageops::resize(&rgba, width, height, filter.to_image_filter());
    Ok(Raster::from_rgba_image(resized))
}

/// Resize an image to fit within a maximum edge length while preserving aspect ratio.
///
/// Images already within `max_edge` are returned unchanged.
pub fn resize_to_fit(
    image: &Raster,
    max_edge: u32,
    filter: FilterType,
) -> Result<Raster, TransformError> {
    if max_edge == 0 {
        return Err(TransformError::SurfaceAllocation {
            width: 0,
            height: 0,
        });
    }

    if image.width <= max_edge && image.height <= max_edge {
        return Ok(image.clone());
    }

    let (new_width, new_height) = calculate_fit_dimensions(image.width, image.height, max_edge);
    resize(image, new_width, new_height, filter)
}

/// Output size of a proportional resize: `round(dim / scale_factor)`,
/// floored at 1.
pub fn proportional_dimensions(
    width: u32,
    height: u32,
    scale_factor: f64,
) -> Result<(u32, u32), TransformError> {
    validate_scale_factor(scale_factor)?;

    let scale = |dim: u32| -> i64 {
        let v = (dim as f64 / scale_factor).round();
        if v >= i64::MAX as f64 {
            i64::MAX
        } else {
            (v as i64).max(1)
        }
    };
    let (w, h) = (scale(width), scale(height));

    let limits = SurfaceLimits::default();
    if w > limits.max_side as i64 || h > limits.max_side as i64 {
        return Err(TransformError::SurfaceAllocation {
            width: w,
            height: h,
        });
    }
    Ok((w as u32, h as u32))
}

/// Proportional resize returning the raster.
pub fn resize_proportional_raster(
    source: &Raster,
    scale_factor: f64,
) -> Result<Raster, TransformError> {
    let (width, height) = proportional_dimensions(source.width, source.height, scale_factor)?;
    tracing::debug!(
        src_width = source.width,
        src_height = source.height,
        width,
        height,
        scale_factor,
        "proportional resize"
    );
    resize(source, width, height, FilterType::HIGH_QUALITY)
}

/// Proportional resize: `new = round(old / scale_factor)`, both sides floored
/// at 1, resampled with the high-quality filter and handed over as the
/// lossless intermediate surface.
///
/// # Errors
///
/// `InvalidScaleFactor` when `scale_factor <= 0` (or non-finite),
/// `SurfaceAllocation` when the result would exceed the ceiling.
pub fn resize_proportional(source: &Raster, scale_factor: f64) -> Result<SurfaceBytes, TransformError> {
    let raster = resize_proportional_raster(source, scale_factor)?;
    Ok(encode_surface(&raster)?)
}

/// Calculate dimensions to fit within max_edge while preserving aspect ratio.
pub(crate) fn calculate_fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let ratio = width as f64 / height as f64;

    if width >= height {
        let new_height = (max_edge as f64 / ratio).round() as u32;
        (max_edge, new_height.max(1))
    } else {
        let new_width = (max_edge as f64 * ratio).round() as u32;
        (new_width.max(1), max_edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_image(width: u32, height: u32) -> Raster {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(((x * 255) / width.max(1)) as u8);
                pixels.push(((y * 255) / height.max(1)) as u8);
                pixels.push(128);
                pixels.push(255);
            }
        }
        Raster::new(width, height, pixels)
    }

    #[test]
    fn test_resize_basic() {
        let img = create_test_image(100, 50);
        let resized = resize(&img, 50, 25, FilterType::Bilinear).unwrap();

        assert_eq!(resized.width, 50);
        assert_eq!(resized.height, 25);
        assert_eq!(resized.pixels.len(), 50 * 25 * 4);
    }

    #[test]
    fn test_resize_same_dimensions() {
        let img = create_test_image(100, 50);
        let resized = resize(&img, 100, 50, FilterType::Bilinear).unwrap();
        assert_eq!(resized, img);
    }

    #[test]
    fn test_resize_upscale() {
        let img = create_test_image(50, 25);
        let resized = resize(&img, 100, 50, FilterType::Lanczos3).unwrap();

        assert_eq!(resized.width, 100);
        assert_eq!(resized.height, 50);
    }

    #[test]
    fn test_resize_zero_dimensions_error() {
        let img = create_test_image(100, 50);

        assert!(matches!(
            resize(&img, 0, 50, FilterType::Bilinear),
            Err(TransformError::SurfaceAllocation { .. })
        ));
        assert!(resize(&img, 50, 0, FilterType::Bilinear).is_err());
    }

    #[test]
    fn test_resize_to_fit_landscape() {
        let img = create_test_image(600, 400);
        let resized = resize_to_fit(&img, 256, FilterType::Bilinear).unwrap();

        assert_eq!(resized.width, 256);
        assert_eq!(resized.height, 171); // 400 * (256/600) ≈ 170.7
    }

    #[test]
    fn test_resize_to_fit_already_smaller() {
        let img = create_test_image(100, 50);
        let resized = resize_to_fit(&img, 256, FilterType::Bilinear).unwrap();

        assert_eq!(resized.width, 100);
        assert_eq!(resized.height, 50);
    }

    #[test]
    fn test_proportional_scenario_3000_by_1_5() {
        assert_eq!(proportional_dimensions(3000, 3000, 1.5).unwrap(), (2000, 2000));
    }

    #[test]
    fn test_proportional_rounds_and_floors_at_one() {
        assert_eq!(proportional_dimensions(101, 3, 2.0).unwrap(), (51, 2));
        assert_eq!(proportional_dimensions(10, 1, 100.0).unwrap(), (1, 1));
    }

    #[test]
    fn test_proportional_upscale_factor_below_one() {
        assert_eq!(proportional_dimensions(100, 40, 0.5).unwrap(), (200, 80));
    }

    #[test]
    fn test_proportional_rejects_non_positive_factor() {
        for factor in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                proportional_dimensions(100, 100, factor),
                Err(TransformError::InvalidScaleFactor(_))
            ));
        }
    }

    #[test]
    fn test_proportional_rejects_huge_output() {
        assert!(matches!(
            proportional_dimensions(1000, 1000, 0.0001),
            Err(TransformError::SurfaceAllocation { .. })
        ));
    }

    #[test]
    fn test_resize_proportional_raster() {
        let img = create_test_image(300, 150);
        let resized = resize_proportional_raster(&img, 1.5).unwrap();
        assert_eq!((resized.width, resized.height), (200, 100));
    }

    #[test]
    fn test_resize_proportional_surface() {
        let img = create_test_image(40, 20);
        let surface = resize_proportional(&img, 4.0).unwrap();
        assert_eq!((surface.width, surface.height), (10, 5));
        assert_eq!(&surface.bytes[0..4], b"\x89PNG");
    }

    #[test]
    fn test_calculate_fit_dimensions() {
        assert_eq!(calculate_fit_dimensions(6000, 4000, 2560), (2560, 1707));
        assert_eq!(calculate_fit_dimensions(4000, 6000, 2560), (1707, 2560));
        assert_eq!(calculate_fit_dimensions(4000, 4000, 256), (256, 256));
        assert_eq!(calculate_fit_dimensions(0, 0, 256), (0, 0));
    }

    #[test]
    fn test_all_filter_types() {
        let img = create_test_image(100, 50);

        for filter in [
            FilterType::Nearest,
            FilterType::Bilinear,
            FilterType::CatmullRom,
            FilterType::Lanczos3,
        ] {
            let resized = resize(&img, 50, 25, filter).unwrap();
            assert_eq!(resized.width, 50);
            assert_eq!(resized.height, 25);
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: A larger scale factor never produces a larger output.
        #[test]
        fn prop_proportional_is_monotonic(
            width in 1u32..=8000,
            height in 1u32..=8000,
            f1 in 0.05f64..20.0,
            delta in 0.0001f64..20.0,
        ) {
            let f2 = f1 + delta;
            let (w1, h1) = proportional_dimensions(width, height, f1).unwrap_or((u32::MAX, u32::MAX));
            let (w2, h2) = proportional_dimensions(width, height, f2).unwrap();
            prop_assert!(w2 <= w1 && h2 <= h1, "f1={} -> {}x{}, f2={} -> {}x{}", f1, w1, h1, f2, w2, h2);
        }

        /// Property: Output dimensions are always at least 1x1.
        #[test]
        fn prop_proportional_never_zero(
            width in 1u32..=5000,
            height in 1u32..=5000,
            factor in 1.0f64..100000.0,
        ) {
            let (w, h) = proportional_dimensions(width, height, factor).unwrap();
            prop_assert!(w >= 1 && h >= 1);
        }
    }
}
