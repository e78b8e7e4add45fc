//! Viewport tracking and camera-derived world-unit conversions.

use crate::mat4::Mat4;

/// Fallback world-units-per-pixel when the derivation is non-finite.
const WORLD_PER_PIXEL_FALLBACK: f32 = 1e-3;

/// Window size in physical pixels.
///
/// Degenerate (zero) dimensions are representable; they are floored at the
/// point of derivation so resize transients never propagate NaN or Infinity
/// into geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    pub width_px: u32,
    pub height_px: u32,
}

impl Viewport {
    pub fn new(width_px: u32, height_px: u32) -> Self {
        Self { width_px, height_px }
    }

    /// Width/height ratio with both dimensions floored to 1 px.
    pub fn aspect(&self) -> f32 {
        self.width_px.max(1) as f32 / self.height_px.max(1) as f32
    }
}

/// Perspective camera parameters, constant for a session.
///
/// The camera sits at `(0, 0, distance)` looking at the origin; the monitor's
/// front face lives at Z = 0, so `distance` is also the depth at which pixel
/// sizes convert to world units.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CameraParams {
    pub fov_y_degrees: f32,
    pub distance: f32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self { fov_y_degrees: 75.0, distance: 5.0 }
    }
}

impl CameraParams {
    /// World units per pixel at the Z depth of the screen:
    /// `2 * distance * tan(fov / 2) / height_px`.
    ///
    /// Height is floored to 1 px and a non-finite or non-positive result is
    /// replaced with a small positive fallback, so the value is always safe
    /// to multiply into geometry.
    pub fn world_per_pixel(&self, viewport: Viewport) -> f32 {
        let height = viewport.height_px.max(1) as f32;
        let fov = self.fov_y_degrees.to_radians();
        let wpp = 2.0 * self.distance * (fov * 0.5).tan() / height;

        if wpp.is_finite() && wpp > 0.0 {
            wpp
        } else {
            tracing::debug!(wpp, "world_per_pixel degenerate, using fallback");
            WORLD_PER_PIXEL_FALLBACK
        }
    }

    /// Camera world position.
    pub fn position(&self) -> [f32; 3] {
        [0.0, 0.0, self.distance]
    }

    pub(crate) fn projection(&self, viewport: Viewport) -> Mat4 {
        let fov = self.fov_y_degrees.clamp(1.0, 179.0).to_radians();
        Mat4::perspective(fov, viewport.aspect(), 0.1, 100.0)
    }

    pub(crate) fn view(&self) -> Mat4 {
        Mat4::translation(0.0, 0.0, -self.distance)
    }

    pub(crate) fn view_projection(&self, viewport: Viewport) -> Mat4 {
        self.projection(viewport).multiply(&self.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_per_pixel_is_positive_and_finite() {
        let camera = CameraParams::default();
        for height in [1u32, 2, 100, 1080, 10_000] {
            for fov in [1.0f32, 30.0, 75.0, 120.0, 179.0] {
                let camera = CameraParams { fov_y_degrees: fov, ..camera };
                let wpp = camera.world_per_pixel(Viewport::new(100, height));
                assert!(wpp.is_finite() && wpp > 0.0, "fov={fov} h={height} wpp={wpp}");
            }
        }
    }

    #[test]
    fn zero_height_viewport_uses_the_one_pixel_floor() {
        let camera = CameraParams::default();
        let degenerate = camera.world_per_pixel(Viewport::new(0, 0));
        let one = camera.world_per_pixel(Viewport::new(1, 1));
        assert_eq!(degenerate, one);
        assert!(degenerate.is_finite());
    }

    #[test]
    fn matches_the_analytic_formula() {
        let camera = CameraParams { fov_y_degrees: 75.0, distance: 5.0 };
        let wpp = camera.world_per_pixel(Viewport::new(1920, 1080));
        let expected = 2.0 * 5.0 * (75f32.to_radians() / 2.0).tan() / 1080.0;
        assert!((wpp - expected).abs() < 1e-9);
    }
}
