//! Shader parameter sets.
//!
//! Every parameter has a defined valid range; [`ScreenParams::clamped`] and
//! [`GlassParams::clamped`] bring out-of-range inputs into range rather than
//! rejecting them. The debug/tuning surface reads and writes these structs;
//! no other core state is externally mutable.

/// Debug visualization selector for the screen fragment stage.
///
/// Dispatched once per draw call as an integer uniform; the fragment shader
/// branches on it instead of comparing ad-hoc numbers per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum DebugMode {
    /// Normal composited output.
    #[default]
    Off = 0,
    /// Raw bubble falloff map.
    BubbleMap = 1,
    /// Raw scanline map.
    ScanlineMap = 2,
    /// Checkerboard calibration pattern.
    Checkerboard = 3,
    /// White screen with scanlines applied.
    ScannedWhite = 4,
}

impl DebugMode {
    pub fn as_uniform(self) -> i32 {
        self as i32
    }
}

/// Screen shader stack parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScreenParams {
    /// Corner radius interpolation factor for the bubble map, 0..1.
    pub corner_roundness: f32,
    /// Bubble extent as a fraction of the screen, 0..1.
    pub bubble_size: f32,
    /// Width of the smoothed falloff band, 0.001..1.
    pub edge_transition: f32,
    /// Peak outward displacement along the normal, 0..0.5 world units.
    pub displacement: f32,
    /// Scanline darkening, 0..1.
    pub scanline_strength: f32,
    /// Scanline spacing in pixels, 1..200; converted to world units through
    /// the layout so spacing is tessellation- and aspect-independent.
    pub line_spacing_px: f32,
    /// Brightness multiplier so the screen reads as a light source, 0..8.
    pub emissive_boost: f32,
    /// Squares per axis of the calibration checkerboard, 2..64.
    pub checker_squares: f32,
    pub debug_mode: DebugMode,
}

impl Default for ScreenParams {
    fn default() -> Self {
        Self {
            corner_roundness: 0.4,
            bubble_size: 0.99,
            edge_transition: 0.15,
            displacement: 0.07,
            scanline_strength: 0.4,
            line_spacing_px: 25.0,
            emissive_boost: 2.5,
            checker_squares: 8.0,
            debug_mode: DebugMode::Off,
        }
    }
}

impl ScreenParams {
    /// Returns a copy with every field brought into its valid range.
    pub fn clamped(mut self) -> Self {
        self.corner_roundness = self.corner_roundness.clamp(0.0, 1.0);
        self.bubble_size = self.bubble_size.clamp(0.0, 1.0);
        self.edge_transition = self.edge_transition.clamp(1e-3, 1.0);
        self.displacement = self.displacement.clamp(0.0, 0.5);
        self.scanline_strength = self.scanline_strength.clamp(0.0, 1.0);
        self.line_spacing_px = self.line_spacing_px.clamp(1.0, 200.0);
        self.emissive_boost = self.emissive_boost.clamp(0.0, 8.0);
        self.checker_squares = self.checker_squares.clamp(2.0, 64.0);
        self
    }
}

/// Glass overlay compositor parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlassParams {
    /// Transmission mix, 0..1. Controls tint strength only; overall mesh
    /// visibility is a fixed alpha in the shader.
    pub opacity: f32,
    /// Transmission tint color, each channel 0..1.
    pub tint: [f32; 3],
    /// Index of refraction, 1..3. Plumbed to the shader for the tuning
    /// surface; the current layer math does not consume it.
    pub refraction_index: f32,
    /// Fresnel exponent, 0.1..10.
    pub fresnel_power: f32,
    /// Environment reflection mix, 0..1.
    pub reflection_strength: f32,
    /// Lower bound of the inverted bubble map driving reflections, 0..1,
    /// so the screen center keeps a faint reflection instead of going black.
    pub reflection_clamp: f32,
    /// Black level of the chromatic-aberration falloff remap, 0..1.
    pub ca_black_level: f32,
    /// White level of the chromatic-aberration falloff remap, 0..1; kept
    /// strictly above the black level.
    pub ca_white_level: f32,
    /// Chromatic aberration strength, 0..10. Zero skips the layer exactly.
    pub ca_strength: f32,
    /// Per-channel sample shift directions, each component -4..4.
    pub ca_red_shift: [f32; 2],
    pub ca_green_shift: [f32; 2],
    pub ca_blue_shift: [f32; 2],
}

impl Default for GlassParams {
    fn default() -> Self {
        Self {
            opacity: 0.1,
            tint: [0.9, 0.95, 1.0],
            refraction_index: 1.5,
            fresnel_power: 2.0,
            reflection_strength: 0.3,
            reflection_clamp: 0.1,
            ca_black_level: 0.0,
            ca_white_level: 1.0,
            ca_strength: 0.0,
            ca_red_shift: [-1.0, 0.0],
            ca_green_shift: [0.0, 0.0],
            ca_blue_shift: [1.0, 0.0],
        }
    }
}

impl GlassParams {
    /// Returns a copy with every field brought into its valid range.
    pub fn clamped(mut self) -> Self {
        self.opacity = self.opacity.clamp(0.0, 1.0);
        for ch in &mut self.tint {
            *ch = ch.clamp(0.0, 1.0);
        }
        self.refraction_index = self.refraction_index.clamp(1.0, 3.0);
        self.fresnel_power = self.fresnel_power.clamp(0.1, 10.0);
        self.reflection_strength = self.reflection_strength.clamp(0.0, 1.0);
        self.reflection_clamp = self.reflection_clamp.clamp(0.0, 1.0);
        self.ca_black_level = self.ca_black_level.clamp(0.0, 1.0 - 2e-3);
        self.ca_white_level = self
            .ca_white_level
            .clamp(0.0, 1.0)
            .max(self.ca_black_level + 1e-3);
        self.ca_strength = self.ca_strength.clamp(0.0, 10.0);
        for shift in [&mut self.ca_red_shift, &mut self.ca_green_shift, &mut self.ca_blue_shift] {
            shift[0] = shift[0].clamp(-4.0, 4.0);
            shift[1] = shift[1].clamp(-4.0, 4.0);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_screen_params_are_clamped_not_rejected() {
        let p = ScreenParams {
            corner_roundness: -1.0,
            bubble_size: 7.0,
            edge_transition: 0.0,
            displacement: 100.0,
            scanline_strength: 2.0,
            line_spacing_px: 0.0,
            emissive_boost: -3.0,
            checker_squares: 1000.0,
            debug_mode: DebugMode::Off,
        }
        .clamped();

        assert_eq!(p.corner_roundness, 0.0);
        assert_eq!(p.bubble_size, 1.0);
        assert_eq!(p.edge_transition, 1e-3);
        assert_eq!(p.displacement, 0.5);
        assert_eq!(p.scanline_strength, 1.0);
        assert_eq!(p.line_spacing_px, 1.0);
        assert_eq!(p.emissive_boost, 0.0);
        assert_eq!(p.checker_squares, 64.0);
    }

    #[test]
    fn defaults_are_fixed_points_of_clamping() {
        assert_eq!(ScreenParams::default().clamped(), ScreenParams::default());
        assert_eq!(GlassParams::default().clamped(), GlassParams::default());
    }

    #[test]
    fn white_level_stays_above_black_level() {
        let p = GlassParams {
            ca_black_level: 0.9,
            ca_white_level: 0.1,
            ..GlassParams::default()
        }
        .clamped();
        assert!(p.ca_white_level > p.ca_black_level);
    }

    #[test]
    fn debug_mode_maps_to_the_shader_selector() {
        assert_eq!(DebugMode::Off.as_uniform(), 0);
        assert_eq!(DebugMode::BubbleMap.as_uniform(), 1);
        assert_eq!(DebugMode::ScanlineMap.as_uniform(), 2);
        assert_eq!(DebugMode::Checkerboard.as_uniform(), 3);
        assert_eq!(DebugMode::ScannedWhite.as_uniform(), 4);
    }
}
