//! Crop geometry, resize parameters and the output-to-source mapping.
//!
//! # Coordinate System
//!
//! - Crop rectangles are in source pixels, origin top-left, y down
//! - Rotation is in degrees, positive = clockwise on screen (y-down axes)
//! - Pixel `(px, py)` covers the area `[px, px+1) x [py, py+1)`; samples are
//!   taken at pixel centers

use serde::{Deserialize, Serialize};

use super::TransformError;

/// Tolerance used when snapping angles and sample positions.
const EPSILON: f64 = 1e-9;

/// The sampling rectangle plus the rotation/flip/corner parameters of one
/// crop operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropGeometry {
    /// Left edge of the sampling rectangle in source pixels (may be negative).
    pub x: f64,
    /// Top edge of the sampling rectangle in source pixels (may be negative).
    pub y: f64,
    /// Width of the sampling rectangle, which is also the output width.
    pub width: f64,
    /// Height of the sampling rectangle, which is also the output height.
    pub height: f64,
    #[serde(default)]
    pub rotation_degrees: f64,
    #[serde(default)]
    pub flip_horizontal: bool,
    #[serde(default)]
    pub flip_vertical: bool,
    /// Fraction (0 to 1) of `min(width, height) / 2` used as corner radius.
    #[serde(default)]
    pub border_radius_fraction: f64,
}

impl CropGeometry {
    /// A plain axis-aligned crop.
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation_degrees: 0.0,
            flip_horizontal: false,
            flip_vertical: false,
            border_radius_fraction: 0.0,
        }
    }

    /// Geometry covering the whole `width x height` source.
    pub fn full(width: u32, height: u32) -> Self {
        Self::rect(0.0, 0.0, width as f64, height as f64)
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation_degrees = degrees;
        self
    }

    pub fn with_flip(mut self, horizontal: bool, vertical: bool) -> Self {
        self.flip_horizontal = horizontal;
        self.flip_vertical = vertical;
        self
    }

    pub fn with_border_radius(mut self, fraction: f64) -> Self {
        self.border_radius_fraction = fraction;
        self
    }

    /// Check the numeric invariants.
    ///
    /// Output sizes are checked separately against the surface ceiling, so a
    /// zero or negative width is not a geometry error here.
    pub fn validate(&self) -> Result<(), TransformError> {
        let fields = [
            ("x", self.x),
            ("y", self.y),
            ("width", self.width),
            ("height", self.height),
            ("rotationDegrees", self.rotation_degrees),
            ("borderRadiusFraction", self.border_radius_fraction),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(TransformError::InvalidGeometry(format!(
                "{name} must be finite, got {value}"
            )));
        }

        if !(0.0..=1.0).contains(&self.border_radius_fraction) {
            return Err(TransformError::InvalidGeometry(format!(
                "borderRadiusFraction must be within [0, 1], got {}",
                self.border_radius_fraction
            )));
        }

        Ok(())
    }

    /// Output surface dimensions before any resize target is applied.
    ///
    /// Values are rounded to the nearest pixel and may be zero or negative;
    /// callers check them against [`SurfaceLimits`](crate::raster::SurfaceLimits).
    pub fn output_size(&self) -> (i64, i64) {
        (self.width.round() as i64, self.height.round() as i64)
    }
}

/// Absolute post-scale applied after the crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeTarget {
    pub enabled: bool,
    pub width: u32,
    pub height: u32,
}

impl ResizeTarget {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            enabled: true,
            width,
            height,
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }
}

/// How the user arrived at a scale factor. The engine treats both alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    /// One of the fixed factors offered by the host (e.g. 1.5x, 2x).
    #[default]
    Preset,
    /// A free-form factor typed by the user.
    Custom,
}

/// Scale-factor-driven resize: `new = round(old / scale_factor)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProportionalResizeSettings {
    pub scale_factor: f64,
    #[serde(default)]
    pub mode: ResizeMode,
}

impl Default for ProportionalResizeSettings {
    fn default() -> Self {
        Self {
            scale_factor: 2.0,
            mode: ResizeMode::Preset,
        }
    }
}

impl ProportionalResizeSettings {
    pub fn new(scale_factor: f64) -> Self {
        Self {
            scale_factor,
            mode: ResizeMode::Custom,
        }
    }

    /// Rejects non-positive and non-finite factors.
    pub fn validate(&self) -> Result<(), TransformError> {
        validate_scale_factor(self.scale_factor)
    }
}

pub(crate) fn validate_scale_factor(scale_factor: f64) -> Result<(), TransformError> {
    if !scale_factor.is_finite() || scale_factor <= 0.0 {
        return Err(TransformError::InvalidScaleFactor(scale_factor));
    }
    Ok(())
}

/// Reduce an angle to the range (-360, 360).
fn normalized_degrees(degrees: f64) -> f64 {
    let d = degrees % 360.0;
    if (d.abs() - 360.0).abs() < EPSILON {
        0.0
    } else {
        d
    }
}

/// Bounding box of a `width x height` rectangle rotated by `rotation_degrees`.
///
/// Both dimensions are rounded up:
/// ```text
/// w = ceil(width * |cos θ| + height * |sin θ|)
/// h = ceil(width * |sin θ| + height * |cos θ|)
/// ```
/// Quarter turns are exact, so 90 degrees swaps the dimensions.
pub fn calculate_rotated_size(width: u32, height: u32, rotation_degrees: f64) -> (u32, u32) {
    let angle = normalized_degrees(rotation_degrees).abs();

    // Fast path: exact multiples of 90 degrees
    for (quarter, swap) in [
        (0.0, false),
        (90.0, true),
        (180.0, false),
        (270.0, true),
        (360.0, false),
    ] {
        if (angle - quarter).abs() < 0.001 {
            return if swap { (height, width) } else { (width, height) };
        }
    }

    let rad = rotation_degrees.to_radians();
    let cos = rad.cos().abs();
    let sin = rad.sin().abs();
    let (w, h) = (width as f64, height as f64);

    // Shave float noise so an exact integer is not bumped to the next one
    let new_w = (w * cos + h * sin - EPSILON).ceil().max(0.0) as u32;
    let new_h = (w * sin + h * cos - EPSILON).ceil().max(0.0) as u32;
    (new_w, new_h)
}

/// Inverse mapping from an output pixel center to a source position.
///
/// The forward transform draws the sampling rectangle centered on the output
/// surface: translate to the output center, rotate, flip, then scale by the
/// preview factor. Inverting it gives, for an output offset `d` from center:
/// ```text
/// local = flip(R(-θ) · d) / scale
/// src   = crop_center + local
/// ```
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrameMapping {
    out_cx: f64,
    out_cy: f64,
    cos: f64,
    sin: f64,
    flip_x: f64,
    flip_y: f64,
    inv_scale: f64,
    src_cx: f64,
    src_cy: f64,
}

impl FrameMapping {
    pub(crate) fn new(geometry: &CropGeometry, out_w: u32, out_h: u32, scale: f64) -> Self {
        let rad = normalized_degrees(geometry.rotation_degrees).to_radians();
        Self {
            out_cx: out_w as f64 / 2.0,
            out_cy: out_h as f64 / 2.0,
            cos: rad.cos(),
            sin: rad.sin(),
            flip_x: if geometry.flip_horizontal { -1.0 } else { 1.0 },
            flip_y: if geometry.flip_vertical { -1.0 } else { 1.0 },
            inv_scale: 1.0 / scale,
            src_cx: geometry.x + geometry.width / 2.0,
            src_cy: geometry.y + geometry.height / 2.0,
        }
    }

    /// Source position (continuous, pixel centers at `k + 0.5`) for the
    /// center of output pixel `(px, py)`.
    #[inline]
    pub(crate) fn source_point(&self, px: u32, py: u32) -> (f64, f64) {
        let dx = px as f64 + 0.5 - self.out_cx;
        let dy = py as f64 + 0.5 - self.out_cy;

        let lx = (self.cos * dx + self.sin * dy) * self.inv_scale * self.flip_x;
        let ly = (-self.sin * dx + self.cos * dy) * self.inv_scale * self.flip_y;

        (self.src_cx + lx, self.src_cy + ly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotated_size_zero() {
        assert_eq!(calculate_rotated_size(100, 50, 0.0), (100, 50));
    }

    #[test]
    fn test_rotated_size_quarter_turns() {
        assert_eq!(calculate_rotated_size(100, 50, 90.0), (50, 100));
        assert_eq!(calculate_rotated_size(100, 50, 180.0), (100, 50));
        assert_eq!(calculate_rotated_size(100, 50, 270.0), (50, 100));
        assert_eq!(calculate_rotated_size(100, 50, -90.0), (50, 100));
    }

    #[test]
    fn test_rotated_size_large_angles() {
        assert_eq!(calculate_rotated_size(100, 50, 720.0), (100, 50));
        assert_eq!(calculate_rotated_size(100, 50, 450.0), (50, 100));
        assert_eq!(calculate_rotated_size(100, 50, 360.0), (100, 50));
    }

    #[test]
    fn test_rotated_size_45_degrees_rounds_up() {
        // Diagonal of 100x100 square is ~141.42
        assert_eq!(calculate_rotated_size(100, 100, 45.0), (142, 142));
    }

    #[test]
    fn test_rotated_size_symmetry() {
        assert_eq!(
            calculate_rotated_size(100, 80, 30.0),
            calculate_rotated_size(100, 80, -30.0)
        );
        assert_eq!(
            calculate_rotated_size(100, 50, 30.0),
            calculate_rotated_size(100, 50, 150.0)
        );
    }

    #[test]
    fn test_validate_accepts_plain_rect() {
        assert!(CropGeometry::rect(0.0, 0.0, 10.0, 10.0).validate().is_ok());
        assert!(CropGeometry::rect(-50.0, -50.0, 10.0, 10.0)
            .with_border_radius(1.0)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let geometry = CropGeometry::rect(f64::NAN, 0.0, 10.0, 10.0);
        assert!(matches!(
            geometry.validate(),
            Err(TransformError::InvalidGeometry(_))
        ));

        let geometry = CropGeometry::rect(0.0, 0.0, 10.0, 10.0).with_rotation(f64::INFINITY);
        assert!(geometry.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_radius_out_of_range() {
        let geometry = CropGeometry::rect(0.0, 0.0, 10.0, 10.0).with_border_radius(1.5);
        assert!(geometry.validate().is_err());

        let geometry = CropGeometry::rect(0.0, 0.0, 10.0, 10.0).with_border_radius(-0.1);
        assert!(geometry.validate().is_err());
    }

    #[test]
    fn test_scale_factor_validation() {
        assert!(ProportionalResizeSettings::new(1.5).validate().is_ok());
        assert!(ProportionalResizeSettings::new(0.0).validate().is_err());
        assert!(ProportionalResizeSettings::new(-2.0).validate().is_err());
        assert!(ProportionalResizeSettings::new(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_identity_mapping_hits_pixel_centers() {
        let geometry = CropGeometry::rect(10.0, 20.0, 4.0, 2.0);
        let mapping = FrameMapping::new(&geometry, 4, 2, 1.0);

        assert_eq!(mapping.source_point(0, 0), (10.5, 20.5));
        assert_eq!(mapping.source_point(3, 1), (13.5, 21.5));
    }

    #[test]
    fn test_horizontal_flip_mirrors_columns() {
        let geometry = CropGeometry::rect(0.0, 0.0, 4.0, 1.0).with_flip(true, false);
        let mapping = FrameMapping::new(&geometry, 4, 1, 1.0);

        assert_eq!(mapping.source_point(0, 0), (3.5, 0.5));
        assert_eq!(mapping.source_point(3, 0), (0.5, 0.5));
    }

    #[test]
    fn test_half_scale_mapping_spans_whole_rect() {
        let geometry = CropGeometry::rect(0.0, 0.0, 8.0, 8.0);
        let mapping = FrameMapping::new(&geometry, 4, 4, 0.5);

        // Output pixel 0 center (0.5) maps to source 1.0
        assert_eq!(mapping.source_point(0, 0), (1.0, 1.0));
        assert_eq!(mapping.source_point(3, 3), (7.0, 7.0));
    }

    #[test]
    fn test_geometry_deserializes_camel_case() {
        let json = r#"{"x":1,"y":2,"width":30,"height":40,"rotationDegrees":90,
            "flipHorizontal":true,"borderRadiusFraction":0.5}"#;
        let geometry: CropGeometry = serde_json::from_str(json).unwrap();
        assert_eq!(geometry.width, 30.0);
        assert_eq!(geometry.rotation_degrees, 90.0);
        assert!(geometry.flip_horizontal);
        assert!(!geometry.flip_vertical);
        assert_eq!(geometry.border_radius_fraction, 0.5);
    }
}
