//! Flat and smooth normal generation.

use glam::Vec3;

use super::{Face, Mesh};

/// Unit normal of face `f`, from the cross product of its first two edges.
///
/// Only the first three corners are used, so n-gons are assumed planar.
/// Degenerate (collinear) corners yield the zero vector.
pub fn face_normal(mesh: &Mesh, f: usize) -> Vec3 {
    let face = &mesh.position_faces[f];
    let v0 = mesh.positions[face[0] as usize];
    let v1 = mesh.positions[face[1] as usize];
    let v2 = mesh.positions[face[2] as usize];
    (v1 - v0).cross(v2 - v0).normalize_or_zero()
}

/// One unit normal per face, in face order.
pub fn compute_face_normals(mesh: &Mesh) -> Vec<Vec3> {
    (0..mesh.num_faces()).map(|f| face_normal(mesh, f)).collect()
}

/// Store one normal per face.
///
/// `normal_faces[f]` has the arity of `position_faces[f]` with every corner
/// pointing at normal `f`, so all corners of a face read the same value.
pub fn set_flat_normals(mesh: &mut Mesh) {
    mesh.normals = compute_face_normals(mesh);
    mesh.normal_faces = mesh
        .position_faces
        .iter()
        .enumerate()
        .map(|(f, face)| Face::from_elem(f as u32, face.len()))
        .collect();
}

/// Store one normal per vertex, accumulated from incident face normals.
///
/// The normal channel shares the position topology. A vertex with no incident
/// faces, or whose face normals cancel exactly, keeps the zero vector.
pub fn set_smooth_normals(mesh: &mut Mesh) {
    let mut normals = vec![Vec3::ZERO; mesh.num_vertices()];
    for (f, face) in mesh.position_faces.iter().enumerate() {
        let n = face_normal(mesh, f);
        for &i in face {
            normals[i as usize] += n;
        }
    }
    for n in &mut normals {
        *n = n.normalize_or_zero();
    }
    mesh.normals = normals;
    mesh.normal_faces = mesh.position_faces.clone();
}

/// True when every face has exactly three corners.
pub fn is_triangulated(mesh: &Mesh) -> bool {
    mesh.position_faces.iter().all(|f| f.len() == 3)
}
