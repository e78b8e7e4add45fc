use glow::HasContext;

use crate::{error::Error, mesh::MeshData};

/// Vertex attribute locations shared by all shaders.
pub(crate) mod attrib {
    pub const POS: u32 = 0;
    pub const NORMAL: u32 = 1;
    pub const UV: u32 = 2;
}

/// Uploads a slice of plain-old-data values to the bound buffer target.
///
/// # Safety
/// `T` must be a `#[repr(C)]` type with no padding requirements beyond its
/// byte representation; a buffer must be bound to `target`.
pub(crate) unsafe fn buffer_upload_array<T: Copy>(
    gl: &glow::Context,
    target: u32,
    data: &[T],
    usage: u32,
) {
    let bytes = unsafe {
        std::slice::from_raw_parts(data.as_ptr() as *const u8, std::mem::size_of_val(data))
    };
    unsafe { gl.buffer_data_u8_slice(target, bytes, usage) };
}

/// Uploads a single plain-old-data struct to the bound buffer target.
///
/// # Safety
/// Same requirements as [`buffer_upload_array`].
pub(crate) unsafe fn buffer_upload_struct<T>(
    gl: &glow::Context,
    target: u32,
    data: &T,
    usage: u32,
) {
    let bytes = unsafe {
        std::slice::from_raw_parts(data as *const T as *const u8, size_of::<T>())
    };
    unsafe { gl.buffer_data_u8_slice(target, bytes, usage) };
}

/// Interleaved position/normal/uv vertex buffer with an index buffer,
/// wrapped in a VAO.
#[derive(Debug)]
pub(crate) struct MeshBuffers {
    vao: glow::VertexArray,
    vertices: glow::Buffer,
    indices: glow::Buffer,
    index_count: i32,
}

impl MeshBuffers {
    /// floats per vertex: pos.xyz + normal.xyz + uv.xy
    const STRIDE: i32 = 8 * 4;

    pub fn create(gl: &glow::Context, mesh: &MeshData) -> Result<Self, Error> {
        let vao =
            unsafe { gl.create_vertex_array() }.map_err(Error::vertex_array_creation_failed)?;
        unsafe { gl.bind_vertex_array(Some(vao)) };

        let vertices = unsafe { gl.create_buffer() }
            .map_err(|e| Error::buffer_creation_failed("mesh-vertex", e))?;
        unsafe {
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vertices));
            buffer_upload_array(gl, glow::ARRAY_BUFFER, &mesh.interleaved(), glow::STATIC_DRAW);
        }

        enable_vertex_attrib(gl, attrib::POS, 3, 0);
        enable_vertex_attrib(gl, attrib::NORMAL, 3, 12);
        enable_vertex_attrib(gl, attrib::UV, 2, 24);

        let indices = unsafe { gl.create_buffer() }
            .map_err(|e| Error::buffer_creation_failed("mesh-index", e))?;
        unsafe {
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(indices));
            buffer_upload_array(
                gl,
                glow::ELEMENT_ARRAY_BUFFER,
                &mesh.indices,
                glow::STATIC_DRAW,
            );
            gl.bind_vertex_array(None);
        }

        Ok(Self {
            vao,
            vertices,
            indices,
            index_count: mesh.indices.len() as i32,
        })
    }

    pub fn bind(&self, gl: &glow::Context) {
        unsafe { gl.bind_vertex_array(Some(self.vao)) };
    }

    pub fn unbind(gl: &glow::Context) {
        unsafe { gl.bind_vertex_array(None) };
    }

    /// Issues the indexed draw call; the VAO must be bound.
    pub fn draw(&self, gl: &glow::Context) {
        unsafe {
            gl.draw_elements(glow::TRIANGLES, self.index_count, glow::UNSIGNED_INT, 0);
        }
    }

    pub fn delete(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_vertex_array(self.vao);
            gl.delete_buffer(self.vertices);
            gl.delete_buffer(self.indices);
        }
    }
}

fn enable_vertex_attrib(gl: &glow::Context, index: u32, size: i32, offset: i32) {
    unsafe {
        gl.enable_vertex_attrib_array(index);
        gl.vertex_attrib_pointer_f32(
            index,
            size,
            glow::FLOAT,
            false,
            MeshBuffers::STRIDE,
            offset,
        );
    }
}
