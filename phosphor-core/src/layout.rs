//! Responsive geometry: converts pixel dimensions and camera parameters into
//! world-space monitor geometry.
//!
//! [`GeometryLayout::compute`] is a pure function of its inputs with no
//! hidden state; callers may invoke it every frame. [`crate::MonitorScene`]
//! memoizes it on its inputs. Every derived extent is clamped to a small
//! positive epsilon before mesh construction, so resize transients (including
//! a momentary 0x0 viewport) never panic and never emit non-finite geometry.

use crate::camera::{CameraParams, Viewport};

/// Fixed thickness of the monitor housing, front face to back.
pub const HOUSING_DEPTH: f32 = 0.3;

/// Minimum bezel thickness per side, in pixels.
pub const MIN_FRAME_PX: f32 = 8.0;

/// Smallest extent allowed to reach mesh construction, in world units.
pub const MIN_GEOMETRY_SIZE: f32 = 1e-3;

/// Frame pieces are this much thicker than the margins so the solid housing
/// fully overlaps the screen edges regardless of tessellation.
const FRAME_THICKNESS_FACTOR: f32 = 5.0;

/// Slight padding added to the screen mesh so it tucks under the bezel rim.
const SCREEN_MESH_PADDING: f32 = 0.01;

/// LED center offset from the screen's bottom-right corner, in pixels.
const LED_OFFSET_PX: (f32, f32) = (8.0, -18.0);

/// Pixel insets defining the bezel thickness per side.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Margins {
    pub top_px: f32,
    pub right_px: f32,
    pub bottom_px: f32,
    pub left_px: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self { top_px: 12.0, right_px: 12.0, bottom_px: 36.0, left_px: 12.0 }
    }
}

/// Key light placement, expressed relative to housing size and camera
/// distance so illumination tracks the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyLight {
    pub intensity: f32,
    pub x_rel: f32,
    pub y_rel: f32,
    pub z_rel: f32,
    pub distance_rel: f32,
}

impl Default for KeyLight {
    fn default() -> Self {
        Self {
            intensity: 4.0,
            x_rel: -0.33,
            y_rel: 0.412,
            z_rel: 1.923,
            distance_rel: 1.0,
        }
    }
}

/// Geometry tunables that are not per-side margins.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonitorStyle {
    /// How far the screen recesses behind the housing front face.
    pub screen_z: f32,
    /// Corner radius of the screen cutout, world units.
    pub cutout_radius: f32,
    /// Bevel size on the cutout's front rim, world units.
    pub bevel_size: f32,
    pub led_radius_px: f32,
    /// LED inset behind the housing front face, world units.
    pub led_inset: f32,
    pub key_light: KeyLight,
    /// Gap between screen and glass overlay, world units.
    pub glass_z_offset: f32,
    pub glass_thickness: f32,
    /// Housing base color.
    pub frame_color: [f32; 3],
    /// World-space frequency of the housing surface grain.
    pub frame_noise_scale: f32,
    /// Strength of the grain's normal perturbation.
    pub frame_noise_strength: f32,
    pub led_color: [f32; 3],
}

impl Default for MonitorStyle {
    fn default() -> Self {
        Self {
            screen_z: -0.05,
            cutout_radius: 0.05,
            bevel_size: 0.01,
            led_radius_px: 6.0,
            led_inset: 0.02,
            key_light: KeyLight::default(),
            glass_z_offset: 0.005,
            glass_thickness: 0.01,
            frame_color: [0.616, 0.553, 0.486],
            frame_noise_scale: 40.0,
            frame_noise_strength: 0.15,
            led_color: [1.0, 0.941, 0.78],
        }
    }
}

/// World-space monitor geometry derived from viewport, margins and camera.
///
/// Positions are in monitor-group space: the group origin sits at the center
/// of the housing front face region, translated by `(x_offset, y_offset,
/// -housing_depth / 2)` from the world origin so the front face lands at
/// world Z = 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryLayout {
    pub world_per_pixel: f32,
    /// Screen size in pixels after margins, floored to 1 px per axis.
    pub screen_px: (u32, u32),
    /// Screen size in world units, clamped to [`MIN_GEOMETRY_SIZE`].
    pub screen_world: (f32, f32),
    /// Screen mesh size (screen plus rim padding).
    pub screen_mesh: (f32, f32),
    /// Thickened frame extents per side, world units.
    pub frame_top: f32,
    pub frame_bottom: f32,
    pub frame_left: f32,
    pub frame_right: f32,
    /// Full housing size including frames.
    pub housing_size: (f32, f32),
    pub housing_depth: f32,
    /// Group centering offsets so inner edges align with the margins.
    pub x_offset: f32,
    pub y_offset: f32,
    pub led_position: [f32; 3],
    pub led_radius: f32,
    pub key_light_position: [f32; 3],
    pub key_light_range: f32,
}

impl GeometryLayout {
    /// Derives the full layout. Pure; recompute whenever any input changes.
    pub fn compute(
        viewport: Viewport,
        margins: &Margins,
        camera: &CameraParams,
        style: &MonitorStyle,
    ) -> Self {
        let wpp = camera.world_per_pixel(viewport);

        let raw_width = viewport.width_px as f32 - margins.left_px - margins.right_px;
        let raw_height = viewport.height_px as f32 - margins.top_px - margins.bottom_px;
        let screen_px = (raw_width.max(1.0) as u32, raw_height.max(1.0) as u32);

        let screen_w = clamp_extent(screen_px.0 as f32 * wpp);
        let screen_h = clamp_extent(screen_px.1 as f32 * wpp);

        // margins floored so degenerate insets never collapse the bezel
        let frame_left_thin = margins.left_px.max(MIN_FRAME_PX) * wpp;
        let frame_right_thin = margins.right_px.max(MIN_FRAME_PX) * wpp;
        let frame_top_thin = margins.top_px.max(MIN_FRAME_PX) * wpp;
        let frame_bottom_thin = margins.bottom_px.max(MIN_FRAME_PX) * wpp;

        let frame_left = clamp_extent(frame_left_thin * FRAME_THICKNESS_FACTOR);
        let frame_right = clamp_extent(frame_right_thin * FRAME_THICKNESS_FACTOR);
        let frame_top = clamp_extent(frame_top_thin * FRAME_THICKNESS_FACTOR);
        let frame_bottom = clamp_extent(frame_bottom_thin * FRAME_THICKNESS_FACTOR);

        // center offsets so the inner cutout edges align with the margins
        let x_offset = (frame_right_thin - frame_left_thin) / 2.0;
        let y_offset = (frame_bottom_thin - frame_top_thin) / 2.0;

        let housing_w = screen_w + frame_left + frame_right;
        let housing_h = screen_h + frame_top + frame_bottom;
        let housing_depth = HOUSING_DEPTH * 2.0;

        let led_radius = (style.led_radius_px * wpp).max(MIN_GEOMETRY_SIZE);
        let led_position = [
            screen_w / 2.0 + LED_OFFSET_PX.0 * wpp,
            -screen_h / 2.0 + LED_OFFSET_PX.1 * wpp,
            housing_depth / 2.0 - style.led_inset,
        ];

        // hybrid base + proportional range keeps falloff visually consistent
        // from tiny to huge viewports
        let key = &style.key_light;
        let diagonal = (housing_w * housing_w + housing_h * housing_h).sqrt();
        let key_light_range = (5.0 + diagonal * 0.8) * key.distance_rel;
        let key_light_position = [
            housing_w * key.x_rel,
            housing_h * key.y_rel,
            camera.distance * key.z_rel,
        ];

        Self {
            world_per_pixel: wpp,
            screen_px,
            screen_world: (screen_w, screen_h),
            screen_mesh: (
                clamp_extent(screen_w + SCREEN_MESH_PADDING),
                clamp_extent(screen_h + SCREEN_MESH_PADDING),
            ),
            frame_top,
            frame_bottom,
            frame_left,
            frame_right,
            housing_size: (housing_w, housing_h),
            housing_depth,
            x_offset,
            y_offset,
            led_position,
            led_radius,
            key_light_position,
            key_light_range,
        }
    }

    /// Scanline spacing converted from pixels to world units.
    pub fn world_line_spacing(&self, line_spacing_px: f32) -> f32 {
        (line_spacing_px.max(1.0) * self.world_per_pixel).max(MIN_GEOMETRY_SIZE)
    }

    /// True when every derived value is finite (always holds; checked in
    /// tests and debug builds).
    pub fn all_finite(&self) -> bool {
        let values = [
            self.world_per_pixel,
            self.screen_world.0,
            self.screen_world.1,
            self.screen_mesh.0,
            self.screen_mesh.1,
            self.frame_top,
            self.frame_bottom,
            self.frame_left,
            self.frame_right,
            self.housing_size.0,
            self.housing_size.1,
            self.housing_depth,
            self.x_offset,
            self.y_offset,
            self.led_radius,
            self.key_light_range,
        ];
        values.iter().all(|v| v.is_finite())
            && self.led_position.iter().all(|v| v.is_finite())
            && self.key_light_position.iter().all(|v| v.is_finite())
    }
}

/// Clamps an extent to the mesh-construction minimum, replacing non-finite
/// values outright.
fn clamp_extent(v: f32) -> f32 {
    if v.is_finite() { v.max(MIN_GEOMETRY_SIZE) } else { MIN_GEOMETRY_SIZE }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(viewport: Viewport) -> GeometryLayout {
        GeometryLayout::compute(
            viewport,
            &Margins::default(),
            &CameraParams::default(),
            &MonitorStyle::default(),
        )
    }

    #[test]
    fn all_dimensions_positive_and_finite() {
        for (w, h) in [(1u32, 1u32), (100, 100), (1920, 1080), (20, 4000), (8000, 8000)] {
            let l = layout(Viewport::new(w, h));
            assert!(l.all_finite(), "{w}x{h}");
            assert!(l.screen_world.0 >= MIN_GEOMETRY_SIZE);
            assert!(l.screen_world.1 >= MIN_GEOMETRY_SIZE);
            assert!(l.frame_top >= MIN_GEOMETRY_SIZE);
            assert!(l.frame_bottom >= MIN_GEOMETRY_SIZE);
            assert!(l.frame_left >= MIN_GEOMETRY_SIZE);
            assert!(l.frame_right >= MIN_GEOMETRY_SIZE);
            assert!(l.housing_size.0 > 0.0 && l.housing_size.1 > 0.0);
        }
    }

    #[test]
    fn degenerate_viewport_does_not_panic_or_poison() {
        for (w, h) in [(0u32, 0u32), (0, 1080), (1920, 0), (1, 1)] {
            let l = layout(Viewport::new(w, h));
            assert!(l.all_finite(), "{w}x{h}");
            assert!(l.screen_px.0 >= 1 && l.screen_px.1 >= 1);
        }
    }

    #[test]
    fn margins_smaller_than_viewport_subtract_exactly() {
        let l = layout(Viewport::new(1920, 1080));
        // margins {12, 12, 36, 12}
        assert_eq!(l.screen_px, (1896, 1032));
    }

    #[test]
    fn oversized_margins_floor_screen_to_one_pixel() {
        let l = GeometryLayout::compute(
            Viewport::new(100, 100),
            &Margins { top_px: 80.0, right_px: 80.0, bottom_px: 80.0, left_px: 80.0 },
            &CameraParams::default(),
            &MonitorStyle::default(),
        );
        assert_eq!(l.screen_px, (1, 1));
        assert!(l.all_finite());
    }

    #[test]
    fn zero_margins_are_floored_to_the_minimum_frame() {
        let l = GeometryLayout::compute(
            Viewport::new(800, 600),
            &Margins { top_px: 0.0, right_px: 0.0, bottom_px: 0.0, left_px: 0.0 },
            &CameraParams::default(),
            &MonitorStyle::default(),
        );
        let wpp = l.world_per_pixel;
        let expected = MIN_FRAME_PX * wpp * 5.0;
        assert!((l.frame_top - expected).abs() < 1e-6);
        // screen uses the raw (unfloored) margins
        assert_eq!(l.screen_px, (800, 600));
    }

    #[test]
    fn key_light_range_scales_with_the_housing_diagonal() {
        let small = layout(Viewport::new(200, 200));
        let large = layout(Viewport::new(4000, 4000));
        assert!(small.key_light_range >= 5.0);
        assert!(large.key_light_range > small.key_light_range);
    }

    #[test]
    fn centering_offsets_reflect_margin_asymmetry() {
        let l = layout(Viewport::new(1920, 1080));
        let wpp = l.world_per_pixel;
        // bottom margin 36 vs top 12: group shifts up by half the difference
        assert!((l.y_offset - (36.0 - 12.0) * wpp / 2.0).abs() < 1e-6);
        assert!((l.x_offset).abs() < 1e-6);
    }

    #[test]
    fn led_sits_outside_the_screen_bottom_right() {
        let l = layout(Viewport::new(1920, 1080));
        assert!(l.led_position[0] > l.screen_world.0 / 2.0);
        assert!(l.led_position[1] < -l.screen_world.1 / 2.0);
        assert!(l.led_position[2] < l.housing_depth / 2.0);
    }
}
