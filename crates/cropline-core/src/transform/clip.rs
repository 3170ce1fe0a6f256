//! Rounded-rectangle clip over the output surface.
//!
//! The clip lives in output space, so it stays axis-aligned no matter how the
//! sampled content is rotated or flipped underneath it. Edges are antialiased
//! with a one-pixel linear ramp.

/// Rounded-rectangle region covering a `width x height` surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedRect {
    width: f64,
    height: f64,
    radius: f64,
}

impl RoundedRect {
    /// Build the clip for a surface, or `None` when the fraction is zero.
    ///
    /// `radius = min(width, height) * fraction / 2`, clamped to half of
    /// each side.
    pub fn for_surface(width: u32, height: u32, fraction: f64) -> Option<Self> {
        if fraction <= 0.0 {
            return None;
        }
        let (w, h) = (width as f64, height as f64);
        let radius = (w.min(h) * fraction / 2.0).min(w / 2.0).min(h / 2.0);
        if radius <= 0.0 {
            return None;
        }
        Some(Self {
            width: w,
            height: h,
            radius,
        })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Fraction of output pixel `(px, py)` inside the region, 0.0 to 1.0.
    #[inline]
    pub fn coverage(&self, px: u32, py: u32) -> f64 {
        let x = px as f64 + 0.5;
        let y = py as f64 + 0.5;
        let r = self.radius;

        // Only the four corner squares are curved
        let cx = if x < r {
            r
        } else if x > self.width - r {
            self.width - r
        } else {
            return 1.0;
        };
        let cy = if y < r {
            r
        } else if y > self.height - r {
            self.height - r
        } else {
            return 1.0;
        };

        let dist = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt();
        (r - dist + 0.5).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_fraction_has_no_clip() {
        assert!(RoundedRect::for_surface(100, 100, 0.0).is_none());
    }

    #[test]
    fn test_radius_formula() {
        let clip = RoundedRect::for_surface(100, 200, 0.5).unwrap();
        // min(100, 200) * 0.5 / 2 = 25
        assert_eq!(clip.radius(), 25.0);

        let clip = RoundedRect::for_surface(100, 200, 1.0).unwrap();
        assert_eq!(clip.radius(), 50.0);
    }

    #[test]
    fn test_corners_are_cut_and_center_is_kept() {
        let clip = RoundedRect::for_surface(100, 100, 1.0).unwrap();

        assert_eq!(clip.coverage(0, 0), 0.0);
        assert_eq!(clip.coverage(99, 0), 0.0);
        assert_eq!(clip.coverage(0, 99), 0.0);
        assert_eq!(clip.coverage(99, 99), 0.0);
        assert_eq!(clip.coverage(50, 50), 1.0);
        // Edge midpoints touch the circle and stay (almost) fully inside
        assert!(clip.coverage(50, 0) > 0.99);
        assert!(clip.coverage(0, 50) > 0.99);
    }

    #[test]
    fn test_straight_edges_are_fully_covered() {
        let clip = RoundedRect::for_surface(200, 100, 0.2).unwrap();
        // radius = 10; x = 100 is outside both corner columns
        for y in 0..100 {
            assert_eq!(clip.coverage(100, y), 1.0);
        }
    }

    #[test]
    fn test_coverage_is_within_unit_range() {
        let clip = RoundedRect::for_surface(37, 23, 0.7).unwrap();
        for y in 0..23 {
            for x in 0..37 {
                let c = clip.coverage(x, y);
                assert!((0.0..=1.0).contains(&c), "coverage {} at {},{}", c, x, y);
            }
        }
    }
}
