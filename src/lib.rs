//! Mesh and glyph visualization core.
//!
//! [`geometry`] holds the CPU-side data model (polygon meshes, primitives,
//! normals, bounds, vertex expansion and glyph placement). [`scene`] groups
//! meshes, point clouds and line networks with their overlay properties, and
//! [`render`] draws a scene with wgpu.

pub mod geometry;
pub mod render;
pub mod scene;
pub mod util;
