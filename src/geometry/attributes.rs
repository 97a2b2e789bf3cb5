//! Flattening meshes into triangle-list vertex buffers.
//!
//! Faces of any arity are fan-triangulated on the fly. Each corner carries a
//! one-hot barycentric coordinate and a per-triangle edge mask so the mesh
//! shader can draw a wireframe of the original polygon edges only.

use glam::Vec3;

use super::Mesh;

/// Edge mask value for an edge of the source polygon (drawn in wireframe).
pub const EDGE_BOUNDARY: f32 = 0.0;
/// Edge mask value for a diagonal introduced by the fan split (suppressed).
pub const EDGE_INTERNAL: f32 = 1.0;

const BARY_CENTER: [f32; 3] = [1.0, 0.0, 0.0];
const BARY_FIRST: [f32; 3] = [0.0, 1.0, 0.0];
const BARY_SECOND: [f32; 3] = [0.0, 0.0, 1.0];

/// One triangle corner for the mesh pipeline.
///
/// Field order and types are part of the shader contract: five tightly packed
/// `vec3<f32>` attributes at locations 0..=4.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// One-hot: which corner of its triangle this is.
    pub barycentric: [f32; 3],
    /// Entry `k` describes the edge opposite corner `k`.
    pub edge_mask: [f32; 3],
    pub color: [f32; 3],
}

/// One triangle corner of a glyph mesh drawn with instancing.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlyphVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Edge mask for triangle `j` of a fan with `num_triangles` triangles.
///
/// The triangle is `(center, j + 1, j + 2)`. The edge opposite the center is
/// always on the polygon boundary; the edge `(j + 2, center)` only for the
/// last triangle, and `(center, j + 1)` only for the first.
pub fn fan_edge_mask(j: usize, num_triangles: usize) -> [f32; 3] {
    let mut mask = [EDGE_INTERNAL; 3];
    mask[0] = EDGE_BOUNDARY;
    if j + 1 == num_triangles {
        mask[1] = EDGE_BOUNDARY;
    }
    if j == 0 {
        mask[2] = EDGE_BOUNDARY;
    }
    mask
}

/// Number of triangle-list corners `mesh` expands to.
pub fn expanded_vertex_count(mesh: &Mesh) -> usize {
    mesh.position_faces.iter().map(|f| 3 * (f.len() - 2)).sum()
}

/// Expand `mesh` into triangle corners with a uniform color.
///
/// # Panics
/// If the mesh has no normal channel; generate flat or smooth normals first.
pub fn expand_vertex_attributes(mesh: &Mesh, color: Vec3) -> Vec<MeshVertex> {
    expand_vertex_attributes_with(mesh, |_| color)
}

/// Expand `mesh` into triangle corners, coloring each source face with
/// `face_color(face_index)`.
///
/// Output is face by face, fan triangle by fan triangle, in input order.
pub fn expand_vertex_attributes_with<F>(mesh: &Mesh, face_color: F) -> Vec<MeshVertex>
where
    F: Fn(usize) -> Vec3,
{
    assert!(
        mesh.position_faces.is_empty() || !mesh.normal_faces.is_empty(),
        "mesh normals must be generated before expansion"
    );
    assert_eq!(mesh.normal_faces.len(), mesh.position_faces.len());

    let mut out = Vec::with_capacity(expanded_vertex_count(mesh));
    for (f, (face, normal_face)) in mesh
        .position_faces
        .iter()
        .zip(&mesh.normal_faces)
        .enumerate()
    {
        assert!(face.len() >= 3);
        assert_eq!(face.len(), normal_face.len());

        let color = face_color(f).to_array();
        let corner = |k: usize, barycentric: [f32; 3], edge_mask: [f32; 3]| MeshVertex {
            position: mesh.positions[face[k] as usize].to_array(),
            normal: mesh.normals[normal_face[k] as usize].to_array(),
            barycentric,
            edge_mask,
            color,
        };

        let num_triangles = face.len() - 2;
        for j in 0..num_triangles {
            let mask = fan_edge_mask(j, num_triangles);
            out.push(corner(0, BARY_CENTER, mask));
            out.push(corner(j + 1, BARY_FIRST, mask));
            out.push(corner(j + 2, BARY_SECOND, mask));
        }
    }
    out
}

/// Overwrite corner colors in an expanded buffer with one color per face.
///
/// `vertices` must come from expanding `mesh`; the fan layout is used to find
/// each face's corners.
pub fn apply_face_colors(vertices: &mut [MeshVertex], mesh: &Mesh, colors: &[Vec3]) {
    assert_eq!(colors.len(), mesh.num_faces());
    assert_eq!(vertices.len(), expanded_vertex_count(mesh));

    let mut start = 0;
    for (face, color) in mesh.position_faces.iter().zip(colors) {
        let end = start + 3 * (face.len() - 2);
        for v in &mut vertices[start..end] {
            v.color = color.to_array();
        }
        start = end;
    }
}

/// Expand a glyph mesh into position/normal corners for instanced drawing.
pub fn expand_glyph_vertices(mesh: &Mesh) -> Vec<GlyphVertex> {
    assert!(
        mesh.position_faces.is_empty() || !mesh.normal_faces.is_empty(),
        "mesh normals must be generated before expansion"
    );

    let mut out = Vec::with_capacity(expanded_vertex_count(mesh));
    for (face, normal_face) in mesh.position_faces.iter().zip(&mesh.normal_faces) {
        assert_eq!(face.len(), normal_face.len());
        let corner = |k: usize| GlyphVertex {
            position: mesh.positions[face[k] as usize].to_array(),
            normal: mesh.normals[normal_face[k] as usize].to_array(),
        };
        for j in 0..face.len() - 2 {
            out.push(corner(0));
            out.push(corner(j + 1));
            out.push(corner(j + 2));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{create_box, set_flat_normals, Face};

    fn single_face(n: u32) -> Mesh {
        let mut mesh = Mesh::new();
        for i in 0..n {
            let a = i as f32 / n as f32 * std::f32::consts::TAU;
            mesh.positions.push(Vec3::new(a.cos(), a.sin(), 0.0));
        }
        mesh.position_faces.push((0..n).collect::<Face>());
        set_flat_normals(&mut mesh);
        mesh
    }

    /// Source-vertex pairs whose edge is marked as boundary.
    fn boundary_edges(mesh: &Mesh, vertices: &[MeshVertex]) -> Vec<(u32, u32)> {
        let index_of = |p: [f32; 3]| {
            mesh.positions
                .iter()
                .position(|q| q.to_array() == p)
                .unwrap() as u32
        };
        let mut edges = Vec::new();
        for tri in vertices.chunks(3) {
            let ids: Vec<u32> = tri.iter().map(|v| index_of(v.position)).collect();
            let mask = tri[0].edge_mask;
            for k in 0..3 {
                if mask[k] == EDGE_BOUNDARY {
                    let (a, b) = (ids[(k + 1) % 3], ids[(k + 2) % 3]);
                    edges.push((a.min(b), a.max(b)));
                }
            }
        }
        edges.sort();
        edges
    }

    #[test]
    fn test_triangle_all_edges_boundary() {
        let mesh = single_face(3);
        let verts = expand_vertex_attributes(&mesh, Vec3::ONE);
        assert_eq!(verts.len(), 3);
        assert_eq!(verts[0].edge_mask, [EDGE_BOUNDARY; 3]);
    }

    #[test]
    fn test_quad_edge_mask() {
        let mesh = single_face(4);
        let verts = expand_vertex_attributes(&mesh, Vec3::ONE);
        assert_eq!(verts.len(), 6);

        // Triangle 0 is (0, 1, 2): edge (1,2) and (0,1) are real, (2,0) is the diagonal.
        assert_eq!(verts[0].edge_mask, [EDGE_BOUNDARY, EDGE_INTERNAL, EDGE_BOUNDARY]);
        // Triangle 1 is (0, 2, 3): edge (2,3) and (3,0) are real, (0,2) is the diagonal.
        assert_eq!(verts[3].edge_mask, [EDGE_BOUNDARY, EDGE_BOUNDARY, EDGE_INTERNAL]);

        let edges = boundary_edges(&mesh, &verts);
        assert_eq!(edges, vec![(0, 1), (0, 3), (1, 2), (2, 3)]);
    }

    #[test]
    fn test_ngon_boundary_edges_match_polygon() {
        let mesh = single_face(7);
        let verts = expand_vertex_attributes(&mesh, Vec3::ONE);
        assert_eq!(verts.len(), 3 * 5);
        let edges = boundary_edges(&mesh, &verts);
        let mut expected: Vec<(u32, u32)> = (0..7u32)
            .map(|i| {
                let j = (i + 1) % 7;
                (i.min(j), i.max(j))
            })
            .collect();
        expected.sort();
        assert_eq!(edges, expected);
    }

    #[test]
    fn test_barycentric_one_hot() {
        let mesh = single_face(5);
        let verts = expand_vertex_attributes(&mesh, Vec3::ONE);
        for tri in verts.chunks(3) {
            assert_eq!(tri[0].barycentric, BARY_CENTER);
            assert_eq!(tri[1].barycentric, BARY_FIRST);
            assert_eq!(tri[2].barycentric, BARY_SECOND);
        }
    }

    #[test]
    fn test_box_expands_to_36_with_shared_face_normals() {
        let mesh = create_box();
        let verts = expand_vertex_attributes(&mesh, Vec3::new(0.8, 0.8, 0.8));
        assert_eq!(verts.len(), 36);
        for (f, face_verts) in verts.chunks(6).enumerate() {
            let n = mesh.normals[f].to_array();
            assert!(face_verts.iter().all(|v| v.normal == n));
        }
    }

    #[test]
    fn test_face_colors_follow_source_faces() {
        let mesh = create_box();
        let colors: Vec<Vec3> = (0..6).map(|f| Vec3::splat(f as f32)).collect();
        let from_closure = expand_vertex_attributes_with(&mesh, |f| colors[f]);

        let mut recolored = expand_vertex_attributes(&mesh, Vec3::ZERO);
        apply_face_colors(&mut recolored, &mesh, &colors);
        assert_eq!(from_closure, recolored);
        assert_eq!(recolored[35].color, [5.0; 3]);
    }

    #[test]
    #[should_panic(expected = "normals must be generated")]
    fn test_expansion_without_normals_panics() {
        let mesh = Mesh::from_triangles(vec![Vec3::ZERO, Vec3::X, Vec3::Y], &[[0, 1, 2]]);
        expand_vertex_attributes(&mesh, Vec3::ONE);
    }

    #[test]
    fn test_glyph_vertices() {
        let mesh = create_box();
        let verts = expand_glyph_vertices(&mesh);
        assert_eq!(verts.len(), 36);
        assert_eq!(std::mem::size_of::<GlyphVertex>(), 24);
        assert_eq!(std::mem::size_of::<MeshVertex>(), 60);
    }
}
