mod buffer;
mod camera;
mod context;
mod pipeline;
mod renderer;
mod scene_cache;
mod uniform;
mod vertex;

pub use buffer::*;
pub use camera::*;
pub use context::*;
pub use pipeline::*;
pub use renderer::*;
pub use scene_cache::*;
pub use uniform::*;
