mod attributes;
mod bounds;
mod glyph;
mod mesh;
mod normals;
pub mod obj;
mod primitives;
mod small_vec;

pub use attributes::*;
pub use bounds::*;
pub use glyph::*;
pub use mesh::*;
pub use normals::*;
pub use obj::{load_obj, save_obj, try_load_obj, ObjError, ObjResult};
pub use primitives::*;
pub use small_vec::*;
