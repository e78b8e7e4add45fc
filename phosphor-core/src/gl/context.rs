use glow::HasContext;

/// Manages simple GL state to reduce redundant state changes
#[derive(Debug)]
pub struct GlState {
    // Viewport dimensions
    viewport: [i32; 4], // [x, y, width, height]

    // Clear color
    clear_color: [f32; 4],

    // Blend enable + function state
    blend_enabled: bool,
    blend_func: (u32, u32), // (src_factor, dst_factor)

    // Depth test enable
    depth_test: bool,

    // Active texture unit
    active_texture_unit: u32,
}

impl GlState {
    /// Create a new GlState object with GL defaults
    pub fn new(_gl: &glow::Context) -> Self {
        Self {
            viewport: [0, 0, 0, 0],
            clear_color: [0.0, 0.0, 0.0, 0.0],
            blend_enabled: false,
            blend_func: (glow::ONE, glow::ZERO),
            depth_test: false,
            active_texture_unit: glow::TEXTURE0,
        }
    }

    /// Set viewport dimensions
    pub fn viewport(
        &mut self,
        gl: &glow::Context,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> &mut Self {
        let new_viewport = [x, y, width, height];
        if self.viewport != new_viewport {
            unsafe { gl.viewport(x, y, width, height) };
            self.viewport = new_viewport;
        }
        self
    }

    /// Set clear color
    pub fn clear_color(&mut self, gl: &glow::Context, r: f32, g: f32, b: f32, a: f32) -> &mut Self {
        let new_color = [r, g, b, a];
        if self.clear_color != new_color {
            unsafe { gl.clear_color(r, g, b, a) };
            self.clear_color = new_color;
        }
        self
    }

    /// Set active texture unit
    pub fn active_texture(&mut self, gl: &glow::Context, texture_unit: u32) -> &mut Self {
        if self.active_texture_unit != texture_unit {
            unsafe { gl.active_texture(texture_unit) };
            self.active_texture_unit = texture_unit;
        }
        self
    }

    /// Enable alpha blending with the given source/destination factors
    pub fn blend(&mut self, gl: &glow::Context, src: u32, dst: u32) -> &mut Self {
        if !self.blend_enabled {
            unsafe { gl.enable(glow::BLEND) };
            self.blend_enabled = true;
        }
        if self.blend_func != (src, dst) {
            unsafe { gl.blend_func(src, dst) };
            self.blend_func = (src, dst);
        }
        self
    }

    /// Enable or disable the depth test
    pub fn depth_test(&mut self, gl: &glow::Context, enable: bool) -> &mut Self {
        if self.depth_test != enable {
            if enable {
                unsafe { gl.enable(glow::DEPTH_TEST) };
            } else {
                unsafe { gl.disable(glow::DEPTH_TEST) };
            }
            self.depth_test = enable;
        }
        self
    }

    /// Disable blending
    pub fn no_blend(&mut self, gl: &glow::Context) -> &mut Self {
        if self.blend_enabled {
            unsafe { gl.disable(glow::BLEND) };
            self.blend_enabled = false;
        }
        self
    }

    /// Reset all tracked state to GL defaults
    pub fn reset(&mut self, gl: &glow::Context) {
        self.no_blend(gl);

        if self.blend_func != (glow::ONE, glow::ZERO) {
            unsafe { gl.blend_func(glow::ONE, glow::ZERO) };
            self.blend_func = (glow::ONE, glow::ZERO);
        }

        if self.active_texture_unit != glow::TEXTURE0 {
            unsafe { gl.active_texture(glow::TEXTURE0) };
            self.active_texture_unit = glow::TEXTURE0;
        }

        // Note: We don't reset viewport or clear_color as these are typically
        // set based on surface dimensions or application needs
    }
}
