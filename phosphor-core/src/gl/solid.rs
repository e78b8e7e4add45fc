//! Minimal emissive drawable, used for the power LED sphere.

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

#[derive(Clone, Copy)]
#[repr(C, align(16))] // std140 layout requires proper alignment
struct SolidVertUbo {
    mvp: [f32; 16],
}

#[derive(Clone, Copy)]
#[repr(C, align(16))] // std140 layout requires proper alignment
struct SolidFragUbo {
    color: [f32; 4],
}

impl SolidVertUbo {
    const BINDING_POINT: u32 = 6;
}

impl SolidFragUbo {
    const BINDING_POINT: u32 = 7;
}

/// Unlit constant-color mesh.
#[derive(Debug)]
#[must_use = "call `delete(gl)` before dropping to avoid GPU resource leaks"]
pub struct SolidSurface {
    shader: ShaderProgram,
    buffers: MeshBuffers,
    ubo_vertex: UniformBufferObject,
    ubo_fragment: UniformBufferObject,
}

impl SolidSurface {
    const FRAGMENT_GLSL: &'static str = include_str!("../shaders/solid.frag");
    const VERTEX_GLSL: &'static str = include_str!("../shaders/solid.vert");

    pub fn new(
        gl: &glow::Context,
        mesh: &MeshData,
        glsl_version: &GlslVersion,
    ) -> Result<Self, Error> {
        let shader = ShaderProgram::assemble(
            gl,
            glsl_version,
            &[],
            Self::VERTEX_GLSL,
            Self::FRAGMENT_GLSL,
        )?;
        shader.use_program(gl);

        let buffers = MeshBuffers::create(gl, mesh)?;

        let ubo_vertex = UniformBufferObject::new(gl, SolidVertUbo::BINDING_POINT)?;
        ubo_vertex.bind_to_shader(gl, &shader, "SolidVertUbo")?;
        let ubo_fragment = UniformBufferObject::new(gl, SolidFragUbo::BINDING_POINT)?;
        ubo_fragment.bind_to_shader(gl, &shader, "SolidFragUbo")?;

        Ok(Self { shader, buffers, ubo_vertex, ubo_fragment })
    }

    /// Replaces the mesh after a layout change.
    pub fn rebuild_mesh(&mut self, gl: &glow::Context, mesh: &MeshData) -> Result<(), Error> {
        self.buffers.delete(gl);
        self.buffers = MeshBuffers::create(gl, mesh)?;
        Ok(())
    }

    pub(crate) fn upload_uniforms(&self, gl: &glow::Context, mvp: &Mat4, color: [f32; 3]) {
        self.ubo_vertex
            .upload_data(gl, &SolidVertUbo { mvp: mvp.data });
        self.ubo_fragment
            .upload_data(gl, &SolidFragUbo { color: [color[0], color[1], color[2], 1.0] });
    }

    pub fn delete(self, gl: &glow::Context) {
        self.shader.delete(gl);
        self.buffers.delete(gl);
        self.ubo_vertex.delete(gl);
        self.ubo_fragment.delete(gl);
    }
}

impl Drawable for SolidSurface {
    fn prepare(&self, context: &mut RenderContext) -> Result<(), crate::Error> {
        let gl = context.gl;
        self.shader.use_program(gl);
        self.buffers.bind(gl);
        self.ubo_vertex.bind(gl);
        self.ubo_fragment.bind(gl);
        Ok(())
    }

    fn draw(&self, context: &mut RenderContext) {
        self.buffers.draw(context.gl);
    }

    fn cleanup(&self, context: &mut RenderContext) {
        let gl = context.gl;
        MeshBuffers::unbind(gl);
        unsafe { gl.use_program(None) };
        self.ubo_vertex.unbind(gl);
        self.ubo_fragment.unbind(gl);
    }
}
