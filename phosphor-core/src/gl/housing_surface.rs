//! The carved housing drawable, lit by the key light and LED spill.

use glow::HasContext;

use crate::{
    GlslVersion,
    error::Error,
    gl::{
        MeshBuffers, ShaderProgram,
        renderer::{Drawable, RenderContext},
        ubo::UniformBufferObject,
    },
    mat4::Mat4,
    mesh::MeshData,
};

/// World-space lighting inputs for the housing shader, assembled by the
/// scene from the layout and style.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HousingLighting {
    pub key_position: [f32; 3],
    pub key_intensity: f32,
    pub key_range: f32,
    pub noise_scale: f32,
    pub noise_strength: f32,
    pub led_position: [f32; 3],
    pub led_intensity: f32,
    pub camera_position: [f32; 3],
    pub albedo: [f32; 3],
}

#[derive(Debug)]
struct GpuResources {
    shader: ShaderProgram,
    buffers: MeshBuffers,
    ubo_vertex: UniformBufferObject,
    ubo_fragment: UniformBufferObject,
}

impl GpuResources {
    const FRAGMENT_GLSL: &'static str = include_str!("../shaders/housing.frag");
    const VERTEX_GLSL: &'static str = include_str!("../shaders/housing.vert");

    fn new(gl: &glow::Context, mesh: &MeshData, glsl_version: &GlslVersion) -> Result<Self, Error> {
        let shader = ShaderProgram::assemble(
            gl,
            glsl_version,
            &[],
            Self::VERTEX_GLSL,
            Self::FRAGMENT_GLSL,
        )?;
        shader.use_program(gl);

        let buffers = MeshBuffers::create(gl, mesh)?;

        let ubo_vertex = UniformBufferObject::new(gl, HousingVertUbo::BINDING_POINT)?;
        ubo_vertex.bind_to_shader(gl, &shader, "HousingVertUbo")?;
        let ubo_fragment = UniformBufferObject::new(gl, HousingFragUbo::BINDING_POINT)?;
        ubo_fragment.bind_to_shader(gl, &shader, "HousingFragUbo")?;

        Ok(Self { shader, buffers, ubo_vertex, ubo_fragment })
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
struct HousingVertUbo {
    mvp: [f32; 16],
    model: [f32; 16],
}

#[derive(Clone, Copy)]
#[repr(C, align(16))] // std140 layout requires proper alignment
struct HousingFragUbo {
    key_light: [f32; 4],  // position xyz, intensity
    key_params: [f32; 4], // range, noise scale, noise strength
    led: [f32; 4],        // position xyz, intensity
    camera: [f32; 4],     // camera position xyz
    albedo: [f32; 4],     // base color rgb
}

impl HousingVertUbo {
    const BINDING_POINT: u32 = 4;
}

impl HousingFragUbo {
    const BINDING_POINT: u32 = 5;
}

/// The monitor housing with its carved screen cutout.
#[derive(Debug)]
#[must_use = "call `delete(gl)` before dropping to avoid GPU resource leaks"]
pub struct HousingSurface {
    gpu: GpuResources,
}

impl HousingSurface {
    pub fn new(
        gl: &glow::Context,
        mesh: &MeshData,
        glsl_version: &GlslVersion,
    ) -> Result<Self, Error> {
        Ok(Self { gpu: GpuResources::new(gl, mesh, glsl_version)? })
    }

    /// Replaces the housing mesh after a layout change.
    pub fn rebuild_mesh(&mut self, gl: &glow::Context, mesh: &MeshData) -> Result<(), Error> {
        self.gpu.buffers.delete(gl);
        self.gpu.buffers = MeshBuffers::create(gl, mesh)?;
        Ok(())
    }

    pub(crate) fn upload_uniforms(
        &self,
        gl: &glow::Context,
        mvp: &Mat4,
        model: &Mat4,
        lighting: &HousingLighting,
    ) {
        self.gpu
            .ubo_vertex
            .upload_data(gl, &HousingVertUbo { mvp: mvp.data, model: model.data });

        let l = lighting;
        self.gpu.ubo_fragment.upload_data(
            gl,
            &HousingFragUbo {
                key_light: [l.key_position[0], l.key_position[1], l.key_position[2], l.key_intensity],
                key_params: [l.key_range, l.noise_scale, l.noise_strength, 0.0],
                led: [l.led_position[0], l.led_position[1], l.led_position[2], l.led_intensity],
                camera: [l.camera_position[0], l.camera_position[1], l.camera_position[2], 0.0],
                albedo: [l.albedo[0], l.albedo[1], l.albedo[2], 0.0],
            },
        );
    }

    pub fn delete(self, gl: &glow::Context) {
        self.gpu.delete(gl);
    }
}

impl Drawable for HousingSurface {
    fn prepare(&self, context: &mut RenderContext) -> Result<(), crate::Error> {
        let gl = context.gl;
        self.gpu.shader.use_program(gl);
        self.gpu.buffers.bind(gl);
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
        unsafe { gl.use_program(None) };
        self.gpu.ubo_vertex.unbind(gl);
        self.gpu.ubo_fragment.unbind(gl);
    }
}
