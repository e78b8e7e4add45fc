//! The screen drawable: displaced plane sampling the synthesized terminal
//! texture.

use glow::HasContext;
use phosphor_term::FrameBuffer;

use crate::{
    GlslVersion,
    error::Error,
    gl::{
        MeshBuffers, ShaderProgram,
        renderer::{Drawable, RenderContext},
        texture::{Texture2d, checkerboard_texture},
        ubo::UniformBufferObject,
    },
    mat4::Mat4,
    mesh::MeshData,
    uniforms::ScreenParams,
};

/// GPU resources for the screen stage.
#[derive(Debug)]
struct GpuResources {
    shader: ShaderProgram,
    buffers: MeshBuffers,
    ubo_vertex: UniformBufferObject,
    ubo_fragment: UniformBufferObject,
    sampler_loc: glow::UniformLocation,
}

impl GpuResources {
    const BUBBLE_CHUNK: &'static str = include_str!("../shaders/bubble_map.glsl");
    const FRAGMENT_GLSL: &'static str = include_str!("../shaders/screen.frag");
    const VERTEX_GLSL: &'static str = include_str!("../shaders/screen.vert");

    fn new(gl: &glow::Context, mesh: &MeshData, glsl_version: &GlslVersion) -> Result<Self, Error> {
        let shader = ShaderProgram::assemble(
            gl,
            glsl_version,
            &[Self::BUBBLE_CHUNK],
            Self::VERTEX_GLSL,
            Self::FRAGMENT_GLSL,
        )?;
        shader.use_program(gl);

        let buffers = MeshBuffers::create(gl, mesh)?;

        let ubo_vertex = UniformBufferObject::new(gl, ScreenVertUbo::BINDING_POINT)?;
        ubo_vertex.bind_to_shader(gl, &shader, "ScreenVertUbo")?;
        let ubo_fragment = UniformBufferObject::new(gl, ScreenFragUbo::BINDING_POINT)?;
        ubo_fragment.bind_to_shader(gl, &shader, "ScreenFragUbo")?;

        let sampler_loc = unsafe { gl.get_uniform_location(shader.program, "u_screen_tex") }
            .ok_or(Error::uniform_location_failed("u_screen_tex"))?;

        Ok(Self { shader, buffers, ubo_vertex, ubo_fragment, sampler_loc })
    }

    fn delete(&self, gl: &glow::Context) {
        self.shader.delete(gl);
        self.buffers.delete(gl);
        self.ubo_vertex.delete(gl);
        self.ubo_fragment.delete(gl);
    }
}

#[derive(Clone, Copy)]
#[repr(C, align(16))] // std140 layout requires proper alignment
struct ScreenVertUbo {
    mvp: [f32; 16],
    model: [f32; 16],
    bubble: [f32; 4], // roundness, size, transition, displacement
}

#[derive(Clone, Copy)]
#[repr(C, align(16))] // std140 layout requires proper alignment
struct ScreenFragUbo {
    bubble: [f32; 4], // roundness, size, transition, displacement
    scan: [f32; 4],   // strength, world line spacing, emissive boost, checker squares
    debug: [i32; 4],  // x: debug mode selector
}

impl ScreenVertUbo {
    const BINDING_POINT: u32 = 0;
}

impl ScreenFragUbo {
    const BINDING_POINT: u32 = 1;
}

/// The recessed CRT screen surface.
///
/// Samples the terminal texture uploaded from the synthesizer's frame
/// buffer; when no terminal texture exists (e.g. the synthesizer could not
/// start), it falls back to a generated checkerboard calibration pattern so
/// the pipeline always renders something.
#[derive(Debug)]
#[must_use = "call `delete(gl)` before dropping to avoid GPU resource leaks"]
pub struct ScreenSurface {
    gpu: GpuResources,
    terminal: Option<Texture2d>,
    checkerboard: Texture2d,
}

impl ScreenSurface {
    pub fn new(
        gl: &glow::Context,
        mesh: &MeshData,
        glsl_version: &GlslVersion,
    ) -> Result<Self, Error> {
        Ok(Self {
            gpu: GpuResources::new(gl, mesh, glsl_version)?,
            terminal: None,
            checkerboard: checkerboard_texture(gl, 64, 8)?,
        })
    }

    /// Replaces the screen mesh after a layout change.
    pub fn rebuild_mesh(&mut self, gl: &glow::Context, mesh: &MeshData) -> Result<(), Error> {
        self.gpu.buffers.delete(gl);
        self.gpu.buffers = MeshBuffers::create(gl, mesh)?;
        Ok(())
    }

    /// Uploads the synthesizer's frame when dirty, recreating the texture on
    /// dimension changes. This is the only path by which screen content
    /// changes.
    pub fn sync_frame(&mut self, gl: &glow::Context, frame: &mut FrameBuffer) -> Result<(), Error> {
        let texture = match self.terminal.take() {
            Some(texture) => texture.sync_frame(gl, frame)?,
            None => {
                let texture = Texture2d::new(gl, frame.width(), frame.height())?;
                frame.take_dirty();
                texture.upload_pixels(gl, frame.pixels());
                texture
            },
        };
        self.terminal = Some(texture);
        Ok(())
    }

    /// Drops the terminal texture; subsequent frames show the calibration
    /// pattern.
    pub fn clear_terminal_texture(&mut self, gl: &glow::Context) {
        if let Some(texture) = self.terminal.take() {
            texture.delete(gl);
        }
    }

    /// The texture the screen currently samples (terminal or fallback).
    pub(crate) fn active_texture(&self) -> glow::Texture {
        self.terminal
            .as_ref()
            .unwrap_or(&self.checkerboard)
            .raw()
    }

    /// Uploads uniform data for both shader stages.
    pub(crate) fn upload_uniforms(
        &self,
        gl: &glow::Context,
        mvp: &Mat4,
        model: &Mat4,
        params: &ScreenParams,
        world_line_spacing: f32,
    ) {
        let bubble = [
            params.corner_roundness,
            params.bubble_size,
            params.edge_transition,
            params.displacement,
        ];
        self.gpu.ubo_vertex.upload_data(
            gl,
            &ScreenVertUbo { mvp: mvp.data, model: model.data, bubble },
        );
        self.gpu.ubo_fragment.upload_data(
            gl,
            &ScreenFragUbo {
                bubble,
                scan: [
                    params.scanline_strength,
                    world_line_spacing,
                    params.emissive_boost,
                    params.checker_squares,
                ],
                debug: [params.debug_mode.as_uniform(), 0, 0, 0],
            },
        );
    }

    pub fn delete(self, gl: &glow::Context) {
        self.gpu.delete(gl);
        self.checkerboard.delete(gl);
        if let Some(texture) = self.terminal {
            texture.delete(gl);
        }
    }
}

impl Drawable for ScreenSurface {
    fn prepare(&self, context: &mut RenderContext) -> Result<(), crate::Error> {
        let gl = context.gl;

        self.gpu.shader.use_program(gl);
        self.gpu.buffers.bind(gl);

        context.state.active_texture(gl, glow::TEXTURE0);
        unsafe {
            gl.bind_texture(glow::TEXTURE_2D, Some(self.active_texture()));
            gl.uniform_1_i32(Some(&self.gpu.sampler_loc), 0);
        }

        self.gpu.ubo_vertex.bind(gl);
        self.gpu.ubo_fragment.bind(gl);

        Ok(())
    }

    fn draw(&self, context: &mut RenderContext) {
        self.gpu.buffers.draw(context.gl);
    }

    fn cleanup(&self, context: &mut RenderContext) {
        let gl = context.gl;
        MeshBuffers::unbind(gl);
        unsafe {
            gl.bind_texture(glow::TEXTURE_2D, None);
            gl.use_program(None);
        }
        self.gpu.ubo_vertex.unbind(gl);
        self.gpu.ubo_fragment.unbind(gl);
    }
}
