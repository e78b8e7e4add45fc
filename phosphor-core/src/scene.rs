//! Scene assembly: housing, screen, LED and glass as one monitor.
//!
//! `MonitorScene` memoizes [`GeometryLayout`] on its inputs, rebuilds GPU
//! meshes when the layout changes, uploads the synthesizer's frame buffer
//! into the screen texture, and renders back-to-front with the blended glass
//! last. Geometry recomputation is idempotent and side-effect-free.

use phosphor_term::FrameBuffer;

use crate::{
    GlslVersion,
    camera::{CameraParams, Viewport},
    error::Error,
    gl::{
        Drawable, GlState, GlassSurface, HousingSurface, RenderContext, ScreenSurface,
        SolidSurface, housing_surface::HousingLighting,
    },
    housing::housing_mesh,
    layout::{GeometryLayout, Margins, MonitorStyle},
    mat4::Mat4,
    mesh::MeshData,
    uniforms::{GlassParams, ScreenParams},
};

/// Grid subdivision of the displaced screen and glass meshes.
const MESH_SUBDIVISION: u32 = 64;

/// LED sphere tessellation.
const LED_SEGMENTS: u32 = 36;
const LED_RINGS: u32 = 18;

/// Spill intensity of the LED onto the bezel.
const LED_SPILL: f32 = 0.1;

/// The simulated monitor: geometry layout plus the four drawables.
#[must_use = "call `delete(gl)` before dropping to avoid GPU resource leaks"]
pub struct MonitorScene {
    viewport: Viewport,
    camera: CameraParams,
    margins: Margins,
    style: MonitorStyle,
    screen_params: ScreenParams,
    glass_params: GlassParams,
    layout: GeometryLayout,
    housing: HousingSurface,
    screen: ScreenSurface,
    glass: GlassSurface,
    led: SolidSurface,
}

impl MonitorScene {
    pub fn new(
        gl: &glow::Context,
        viewport: Viewport,
        camera: CameraParams,
        margins: Margins,
        style: MonitorStyle,
        glsl_version: &GlslVersion,
    ) -> Result<Self, Error> {
        let layout = GeometryLayout::compute(viewport, &margins, &camera, &style);
        debug_assert!(layout.all_finite());

        let screen_mesh = Self::screen_mesh(&layout);
        Ok(Self {
            housing: HousingSurface::new(gl, &housing_mesh(&layout, &style), glsl_version)?,
            screen: ScreenSurface::new(gl, &screen_mesh, glsl_version)?,
            glass: GlassSurface::new(gl, &screen_mesh, glsl_version)?,
            led: SolidSurface::new(gl, &Self::led_mesh(&layout), glsl_version)?,
            viewport,
            camera,
            margins,
            style,
            screen_params: ScreenParams::default(),
            glass_params: GlassParams::default(),
            layout,
        })
    }

    fn screen_mesh(layout: &GeometryLayout) -> MeshData {
        MeshData::plane(
            layout.screen_mesh.0,
            layout.screen_mesh.1,
            MESH_SUBDIVISION,
            MESH_SUBDIVISION,
        )
    }

    fn led_mesh(layout: &GeometryLayout) -> MeshData {
        MeshData::uv_sphere(layout.led_radius, LED_SEGMENTS, LED_RINGS)
    }

    /// The current geometry layout.
    pub fn layout(&self) -> &GeometryLayout {
        &self.layout
    }

    /// Pixel dimensions the synthesizer should raster at.
    pub fn screen_pixel_size(&self) -> (u32, u32) {
        self.layout.screen_px
    }

    /// Applies a viewport change, recomputing layout and rebuilding meshes
    /// only when something actually changed.
    pub fn set_viewport(&mut self, gl: &glow::Context, viewport: Viewport) -> Result<(), Error> {
        if viewport == self.viewport {
            return Ok(());
        }
        tracing::debug!(?viewport, "viewport changed");
        self.viewport = viewport;
        self.rebuild(gl)
    }

    /// Applies a margin change.
    pub fn set_margins(&mut self, gl: &glow::Context, margins: Margins) -> Result<(), Error> {
        if margins == self.margins {
            return Ok(());
        }
        self.margins = margins;
        self.rebuild(gl)
    }

    /// Applies a camera change.
    pub fn set_camera(&mut self, gl: &glow::Context, camera: CameraParams) -> Result<(), Error> {
        if camera == self.camera {
            return Ok(());
        }
        self.camera = camera;
        self.rebuild(gl)
    }

    /// Applies a geometry-style change.
    pub fn set_style(&mut self, gl: &glow::Context, style: MonitorStyle) -> Result<(), Error> {
        if style == self.style {
            return Ok(());
        }
        self.style = style;
        self.rebuild(gl)
    }

    /// Updates screen shader parameters; out-of-range values are clamped.
    pub fn set_screen_params(&mut self, params: ScreenParams) {
        self.screen_params = params.clamped();
    }

    /// Updates glass shader parameters; out-of-range values are clamped.
    pub fn set_glass_params(&mut self, params: GlassParams) {
        self.glass_params = params.clamped();
    }

    pub fn screen_params(&self) -> &ScreenParams {
        &self.screen_params
    }

    pub fn glass_params(&self) -> &GlassParams {
        &self.glass_params
    }

    fn rebuild(&mut self, gl: &glow::Context) -> Result<(), Error> {
        self.layout =
            GeometryLayout::compute(self.viewport, &self.margins, &self.camera, &self.style);
        debug_assert!(self.layout.all_finite());

        let screen_mesh = Self::screen_mesh(&self.layout);
        self.housing
            .rebuild_mesh(gl, &housing_mesh(&self.layout, &self.style))?;
        self.screen.rebuild_mesh(gl, &screen_mesh)?;
        self.glass.rebuild_mesh(gl, &screen_mesh)?;
        self.led.rebuild_mesh(gl, &Self::led_mesh(&self.layout))?;
        Ok(())
    }

    /// Uploads the synthesizer's frame into the screen texture when dirty.
    pub fn sync_frame(&mut self, gl: &glow::Context, frame: &mut FrameBuffer) -> Result<(), Error> {
        self.screen.sync_frame(gl, frame)
    }

    /// Drops the terminal texture; the screen falls back to its calibration
    /// pattern.
    pub fn clear_terminal_texture(&mut self, gl: &glow::Context) {
        self.screen.clear_terminal_texture(gl);
    }

    /// Uploads uniforms and renders one frame: housing, screen, LED, then
    /// the blended glass on top.
    pub fn render(&mut self, gl: &glow::Context, state: &mut GlState) -> Result<(), Error> {
        let layout = &self.layout;
        let vp = self.camera.view_projection(self.viewport);

        let group = [layout.x_offset, layout.y_offset, -layout.housing_depth / 2.0];
        let monitor = Mat4::translation(group[0], group[1], group[2]);
        let screen_model = monitor.multiply(&Mat4::translation(0.0, 0.0, self.style.screen_z));
        let glass_z =
            self.style.screen_z + self.style.glass_z_offset + self.style.glass_thickness / 2.0;
        let glass_model = monitor.multiply(&Mat4::translation(0.0, 0.0, glass_z));
        let led_model = monitor.multiply(&Mat4::translation(
            layout.led_position[0],
            layout.led_position[1],
            layout.led_position[2],
        ));

        self.housing.upload_uniforms(
            gl,
            &vp.multiply(&monitor),
            &monitor,
            &HousingLighting {
                key_position: offset_by(layout.key_light_position, group),
                key_intensity: self.style.key_light.intensity,
                key_range: layout.key_light_range,
                noise_scale: self.style.frame_noise_scale,
                noise_strength: self.style.frame_noise_strength,
                led_position: offset_by(layout.led_position, group),
                led_intensity: LED_SPILL,
                camera_position: self.camera.position(),
                albedo: self.style.frame_color,
            },
        );
        self.screen.upload_uniforms(
            gl,
            &vp.multiply(&screen_model),
            &screen_model,
            &self.screen_params,
            layout.world_line_spacing(self.screen_params.line_spacing_px),
        );
        self.glass.set_screen_texture(self.screen.active_texture());
        self.glass.upload_uniforms(
            gl,
            &vp.multiply(&glass_model),
            &glass_model,
            &self.screen_params,
            &self.glass_params,
            layout.screen_world,
            self.camera.position(),
        );
        self.led
            .upload_uniforms(gl, &vp.multiply(&led_model), self.style.led_color);

        state.depth_test(gl, true);
        let mut context = RenderContext { gl, state };
        render_one(&mut context, &self.housing)?;
        render_one(&mut context, &self.screen)?;
        render_one(&mut context, &self.led)?;
        // glass last: it blends over everything behind it
        render_one(&mut context, &self.glass)?;
        Ok(())
    }

    /// Deletes all GPU resources owned by the scene.
    pub fn delete(self, gl: &glow::Context) {
        self.housing.delete(gl);
        self.screen.delete(gl);
        self.glass.delete(gl);
        self.led.delete(gl);
    }
}

fn render_one(context: &mut RenderContext, drawable: &impl Drawable) -> Result<(), Error> {
    drawable.prepare(context)?;
    drawable.draw(context);
    drawable.cleanup(context);
    Ok(())
}

fn offset_by(position: [f32; 3], offset: [f32; 3]) -> [f32; 3] {
    [
        position[0] + offset[0],
        position[1] + offset[1],
        position[2] + offset[2],
    ]
}
