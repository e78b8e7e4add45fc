pub(crate) mod buffer;
pub(crate) mod context;
pub(crate) mod glass;
pub(crate) mod housing_surface;
mod program;
pub(crate) mod renderer;
pub(crate) mod screen;
pub(crate) mod solid;
pub(crate) mod texture;
mod ubo;

// Primary API re-exports
pub use context::GlState;
pub use glass::GlassSurface;
pub use housing_surface::HousingSurface;
pub use renderer::{Drawable, RenderContext};
pub use screen::ScreenSurface;
pub use solid::SolidSurface;

// Crate-internal re-exports
use buffer::*;
pub(crate) use program::*;
