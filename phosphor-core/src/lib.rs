//! Procedural CRT monitor renderer.
//!
//! phosphor-core turns window pixel dimensions and camera parameters into a
//! world-space monitor (housing with a carved screen cutout, recessed screen,
//! power LED, key light), samples the terminal texture synthesized by
//! `phosphor-term`, and composites the layered optical stack: bubble-map
//! vertex displacement, world-space scanlines, emissive boost, and a glass
//! overlay with tinted transmission, chromatic aberration and environment
//! reflections.
//!
//! The crate is platform-agnostic over [`glow`]: the host owns the GL
//! context and the frame loop, hands the crate a [`camera::Viewport`] on
//! resize, and calls [`MonitorScene::render`] once per frame.

pub mod bubble;
pub mod camera;
mod error;
mod gl;
pub mod housing;
pub mod layout;
mod mat4;
pub mod mesh;
mod scene;
mod uniforms;

pub use camera::{CameraParams, Viewport};
pub use error::Error;
pub use gl::{Drawable, GlState, GlassSurface, HousingSurface, RenderContext, ScreenSurface, SolidSurface};
pub use layout::{GeometryLayout, KeyLight, Margins, MonitorStyle};
pub use mesh::MeshData;
pub use scene::MonitorScene;
pub use uniforms::{DebugMode, GlassParams, ScreenParams};

/// GL shader language target for version injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlslVersion {
    /// WebGL2 / OpenGL ES 3.0: `#version 300 es`
    Es300,
    /// OpenGL 3.3 Core: `#version 330 core`
    Gl330,
}

impl GlslVersion {
    pub fn vertex_preamble(&self) -> &'static str {
        match self {
            Self::Es300 => "#version 300 es\nprecision highp float;\n",
            Self::Gl330 => "#version 330 core\n",
        }
    }

    pub fn fragment_preamble(&self) -> &'static str {
        match self {
            Self::Es300 => "#version 300 es\nprecision mediump float;\n",
            Self::Gl330 => "#version 330 core\n",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preambles_declare_a_version() {
        for version in [GlslVersion::Es300, GlslVersion::Gl330] {
            assert!(version.vertex_preamble().starts_with("#version"));
            assert!(version.fragment_preamble().starts_with("#version"));
        }
    }
}
