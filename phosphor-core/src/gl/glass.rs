//! The glass overlay drawable: a second displaced mesh in front of the
//! screen compositing tinted transmission, chromatic aberration and
//! environment reflections.

use glow::HasContext;

use crate::{
    GlslVersion,
    error::Error,
    gl::{
        MeshBuffers, ShaderProgram,
        renderer::{Drawable, RenderContext},
        texture::{CubeMap, environment_cube_map},
        ubo::UniformBufferObject,
    },
    mat4::Mat4,
    mesh::MeshData,
    uniforms::{GlassParams, ScreenParams},
};

#[derive(Debug)]
struct GpuResources {
    shader: ShaderProgram,
    buffers: MeshBuffers,
    ubo_vertex: UniformBufferObject,
    ubo_fragment: UniformBufferObject,
    screen_sampler_loc: glow::UniformLocation,
    env_sampler_loc: glow::UniformLocation,
}

impl GpuResources {
    const BUBBLE_CHUNK: &'static str = include_str!("../shaders/bubble_map.glsl");
    const FRAGMENT_GLSL: &'static str = include_str!("../shaders/glass.frag");
    const VERTEX_GLSL: &'static str = include_str!("../shaders/glass.vert");

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

        let ubo_vertex = UniformBufferObject::new(gl, GlassVertUbo::BINDING_POINT)?;
        ubo_vertex.bind_to_shader(gl, &shader, "GlassVertUbo")?;
        let ubo_fragment = UniformBufferObject::new(gl, GlassFragUbo::BINDING_POINT)?;
        ubo_fragment.bind_to_shader(gl, &shader, "GlassFragUbo")?;

        let screen_sampler_loc =
            unsafe { gl.get_uniform_location(shader.program, "u_screen_tex") }
                .ok_or(Error::uniform_location_failed("u_screen_tex"))?;
        let env_sampler_loc = unsafe { gl.get_uniform_location(shader.program, "u_env_map") }
            .ok_or(Error::uniform_location_failed("u_env_map"))?;

        Ok(Self {
            shader,
            buffers,
            ubo_vertex,
            ubo_fragment,
            screen_sampler_loc,
            env_sampler_loc,
        })
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
struct GlassVertUbo {
    mvp: [f32; 16],
    model: [f32; 16],
    bubble: [f32; 4], // roundness, size, transition, displacement
    screen: [f32; 4], // screen world width, height
}

#[derive(Clone, Copy)]
#[repr(C, align(16))] // std140 layout requires proper alignment
struct GlassFragUbo {
    bubble: [f32; 4],      // roundness, size, transition, displacement
    screen: [f32; 4],      // world width, world height, refraction index, fresnel power
    glass: [f32; 4],       // opacity, reflection strength, reflection clamp, ca strength
    tint: [f32; 4],        // tint rgb, ca black level
    ca_shift_rg: [f32; 4], // red shift xy, green shift xy
    ca_shift_b: [f32; 4],  // blue shift xy, ca white level
    camera: [f32; 4],      // camera position xyz
}

impl GlassVertUbo {
    const BINDING_POINT: u32 = 2;
}

impl GlassFragUbo {
    const BINDING_POINT: u32 = 3;
}

/// The transparent glass layer in front of the screen.
///
/// Blended over the already-drawn screen; draw it last. The vertex stage
/// reuses the screen's bubble silhouette while the fragment layers invert it
/// so reflectivity peaks at the rim.
#[derive(Debug)]
#[must_use = "call `delete(gl)` before dropping to avoid GPU resource leaks"]
pub struct GlassSurface {
    gpu: GpuResources,
    env_map: CubeMap,
    screen_texture: Option<glow::Texture>,
}

impl GlassSurface {
    pub fn new(
        gl: &glow::Context,
        mesh: &MeshData,
        glsl_version: &GlslVersion,
    ) -> Result<Self, Error> {
        Ok(Self {
            gpu: GpuResources::new(gl, mesh, glsl_version)?,
            env_map: environment_cube_map(gl, 64)?,
            screen_texture: None,
        })
    }

    /// Replaces the glass mesh after a layout change.
    pub fn rebuild_mesh(&mut self, gl: &glow::Context, mesh: &MeshData) -> Result<(), Error> {
        self.gpu.buffers.delete(gl);
        self.gpu.buffers = MeshBuffers::create(gl, mesh)?;
        Ok(())
    }

    /// Points the chromatic-aberration layer at the screen's current
    /// texture; call once per frame before rendering.
    pub(crate) fn set_screen_texture(&mut self, texture: glow::Texture) {
        self.screen_texture = Some(texture);
    }

    /// Uploads uniform data for both shader stages. The bubble parameters
    /// come from the screen so both meshes displace the same silhouette.
    pub(crate) fn upload_uniforms(
        &self,
        gl: &glow::Context,
        mvp: &Mat4,
        model: &Mat4,
        screen_params: &ScreenParams,
        params: &GlassParams,
        screen_world: (f32, f32),
        camera_position: [f32; 3],
    ) {
        let bubble = [
            screen_params.corner_roundness,
            screen_params.bubble_size,
            screen_params.edge_transition,
            screen_params.displacement,
        ];
        let screen = [
            screen_world.0,
            screen_world.1,
            params.refraction_index,
            params.fresnel_power,
        ];

        self.gpu.ubo_vertex.upload_data(
            gl,
            &GlassVertUbo { mvp: mvp.data, model: model.data, bubble, screen },
        );
        self.gpu.ubo_fragment.upload_data(
            gl,
            &GlassFragUbo {
                bubble,
                screen,
                glass: [
                    params.opacity,
                    params.reflection_strength,
                    params.reflection_clamp,
                    params.ca_strength,
                ],
                tint: [params.tint[0], params.tint[1], params.tint[2], params.ca_black_level],
                ca_shift_rg: [
                    params.ca_red_shift[0],
                    params.ca_red_shift[1],
                    params.ca_green_shift[0],
                    params.ca_green_shift[1],
                ],
                ca_shift_b: [
                    params.ca_blue_shift[0],
                    params.ca_blue_shift[1],
                    params.ca_white_level,
                    0.0,
                ],
                camera: [camera_position[0], camera_position[1], camera_position[2], 0.0],
            },
        );
    }

    pub fn delete(self, gl: &glow::Context) {
        self.gpu.delete(gl);
        self.env_map.delete(gl);
    }
}

impl Drawable for GlassSurface {
    fn prepare(&self, context: &mut RenderContext) -> Result<(), crate::Error> {
        let gl = context.gl;

        self.gpu.shader.use_program(gl);
        self.gpu.buffers.bind(gl);

        context
            .state
            .blend(gl, glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);

        context.state.active_texture(gl, glow::TEXTURE1);
        unsafe {
            gl.bind_texture(glow::TEXTURE_CUBE_MAP, Some(self.env_map.raw()));
            gl.uniform_1_i32(Some(&self.gpu.env_sampler_loc), 1);
        }
        context.state.active_texture(gl, glow::TEXTURE0);
        unsafe {
            gl.bind_texture(glow::TEXTURE_2D, self.screen_texture);
            gl.uniform_1_i32(Some(&self.gpu.screen_sampler_loc), 0);
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
        context.state.active_texture(gl, glow::TEXTURE1);
        unsafe { gl.bind_texture(glow::TEXTURE_CUBE_MAP, None) };
        context.state.active_texture(gl, glow::TEXTURE0);
        unsafe {
            gl.bind_texture(glow::TEXTURE_2D, None);
            gl.use_program(None);
        }
        context.state.no_blend(gl);
        self.gpu.ubo_vertex.unbind(gl);
        self.gpu.ubo_fragment.unbind(gl);
    }
}
