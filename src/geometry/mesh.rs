use glam::{Mat3, Mat4, Vec2, Vec3};

use super::SmallVec;

/// Indices of one polygon. Triangles and quads stay inline.
pub type Face = SmallVec<u32, 4>;

/// A polygon mesh with independent topology per attribute channel.
///
/// Positions, normals and uvs each carry their own coordinate array and
/// face-index array. The three face arrays are parallel: face `f` of every
/// populated channel describes the same polygon, with the same arity, but the
/// indices point into that channel's own coordinate array. This lets a
/// flat-shaded mesh store one normal per face while sharing positions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub position_faces: Vec<Face>,

    pub normals: Vec<Vec3>,
    pub normal_faces: Vec<Face>,

    pub uvs: Vec<Vec2>,
    pub uv_faces: Vec<Face>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a triangle mesh from raw positions and index triples.
    pub fn from_triangles(positions: Vec<Vec3>, triangles: &[[u32; 3]]) -> Self {
        let position_faces = triangles.iter().map(|t| Face::from(*t)).collect();
        Self {
            positions,
            position_faces,
            ..Default::default()
        }
    }

    pub fn num_faces(&self) -> usize {
        self.position_faces.len()
    }

    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    pub fn has_normals(&self) -> bool {
        !self.normal_faces.is_empty()
    }

    /// Offset every position by `offset`.
    pub fn translate(&mut self, offset: Vec3) -> &mut Self {
        for p in &mut self.positions {
            *p += offset;
        }
        self
    }

    /// Multiply every position component-wise by `factor`.
    ///
    /// Normals are left untouched; regenerate them after a non-uniform scale.
    pub fn scale(&mut self, factor: Vec3) -> &mut Self {
        for p in &mut self.positions {
            *p *= factor;
        }
        self
    }

    /// Fan-triangulate every face with more than three corners.
    ///
    /// Face `[v0, v1, .., vk]` becomes `[v0, v(i+1), v(i+2)]` for `i in 0..k-1`.
    /// The normal and uv channels are split by corner position, not by value,
    /// so all channels stay parallel.
    ///
    /// # Panics
    /// If a populated normal or uv channel does not match the position faces
    /// face for face, in count and arity.
    pub fn triangulate(&mut self) -> &mut Self {
        let has_normals = !self.normal_faces.is_empty();
        let has_uvs = !self.uv_faces.is_empty();
        if has_normals {
            assert_eq!(self.normal_faces.len(), self.position_faces.len());
        }
        if has_uvs {
            assert_eq!(self.uv_faces.len(), self.position_faces.len());
        }

        let mut position_faces = Vec::with_capacity(self.position_faces.len() * 2);
        let mut normal_faces = Vec::new();
        let mut uv_faces = Vec::new();

        for (f, face) in self.position_faces.iter().enumerate() {
            fan_split(face, &mut position_faces);
            if has_normals {
                let normal_face = &self.normal_faces[f];
                assert_eq!(face.len(), normal_face.len(), "normal face {f} arity mismatch");
                fan_split(normal_face, &mut normal_faces);
            }
            if has_uvs {
                let uv_face = &self.uv_faces[f];
                assert_eq!(face.len(), uv_face.len(), "uv face {f} arity mismatch");
                fan_split(uv_face, &mut uv_faces);
            }
        }

        self.position_faces = position_faces;
        if has_normals {
            self.normal_faces = normal_faces;
        }
        if has_uvs {
            self.uv_faces = uv_faces;
        }
        self
    }

    /// Append `other` transformed by `transform`, offsetting its indices.
    ///
    /// Normals go through the inverse-transpose of the upper 3x3 and are
    /// renormalized. Channels only carry over when both meshes populate them
    /// (or `self` is still empty).
    pub fn append(&mut self, other: &Mesh, transform: Mat4) -> &mut Self {
        let was_empty = self.position_faces.is_empty();
        let keep_normals = other.has_normals() && (was_empty || self.has_normals());
        let keep_uvs = !other.uv_faces.is_empty() && (was_empty || !self.uv_faces.is_empty());

        let position_base = self.positions.len() as u32;
        self.positions
            .extend(other.positions.iter().map(|&p| transform.transform_point3(p)));
        self.position_faces
            .extend(other.position_faces.iter().map(|f| offset_face(f, position_base)));

        if keep_normals {
            let normal_matrix = Mat3::from_mat4(transform).inverse().transpose();
            let normal_base = self.normals.len() as u32;
            self.normals.extend(
                other
                    .normals
                    .iter()
                    .map(|&n| (normal_matrix * n).normalize_or_zero()),
            );
            self.normal_faces
                .extend(other.normal_faces.iter().map(|f| offset_face(f, normal_base)));
        } else {
            self.normals.clear();
            self.normal_faces.clear();
        }

        if keep_uvs {
            let uv_base = self.uvs.len() as u32;
            self.uvs.extend_from_slice(&other.uvs);
            self.uv_faces
                .extend(other.uv_faces.iter().map(|f| offset_face(f, uv_base)));
        } else {
            self.uvs.clear();
            self.uv_faces.clear();
        }
        self
    }

    /// Centroid of face `f`: the mean of its corner positions.
    pub fn face_centroid(&self, f: usize) -> Vec3 {
        let face = &self.position_faces[f];
        let sum: Vec3 = face.iter().map(|&i| self.positions[i as usize]).sum();
        sum / face.len() as f32
    }
}

fn fan_split(face: &Face, out: &mut Vec<Face>) {
    assert!(face.len() >= 3, "face with {} corners", face.len());
    for i in 0..face.len() - 2 {
        out.push(Face::from([face[0], face[i + 1], face[i + 2]]));
    }
}

fn offset_face(face: &Face, base: u32) -> Face {
    face.iter().map(|&i| i + base).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn polygon_mesh(sizes: &[usize]) -> Mesh {
        let mut mesh = Mesh::new();
        for &n in sizes {
            let base = mesh.positions.len() as u32;
            for i in 0..n {
                let a = i as f32 / n as f32 * std::f32::consts::TAU;
                mesh.positions.push(Vec3::new(a.cos(), a.sin(), 0.0));
            }
            mesh.position_faces.push((base..base + n as u32).collect());
        }
        mesh
    }

    #[test]
    fn test_from_triangles() {
        let mesh = Mesh::from_triangles(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z],
            &[[0, 1, 2], [0, 2, 3]],
        );
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.position_faces[1].as_slice(), &[0, 2, 3]);
        assert!(!mesh.has_normals());
    }

    #[test]
    fn test_translate_and_scale_chain() {
        let mut mesh = Mesh::from_triangles(vec![Vec3::ONE, Vec3::X, Vec3::Y], &[[0, 1, 2]]);
        mesh.translate(Vec3::new(1.0, 0.0, 0.0))
            .scale(Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(mesh.positions[0], Vec3::new(4.0, 3.0, 4.0));
        assert_eq!(mesh.positions[1], Vec3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn test_triangulate_counts() {
        let mut mesh = polygon_mesh(&[3, 4, 5]);
        mesh.triangulate();
        assert_eq!(mesh.num_faces(), 1 + 2 + 3);
        assert!(mesh.position_faces.iter().all(|f| f.len() == 3));
    }

    #[test]
    fn test_triangulate_fan_order() {
        let mut mesh = polygon_mesh(&[5]);
        mesh.triangulate();
        let faces: Vec<&[u32]> = mesh.position_faces.iter().map(|f| f.as_slice()).collect();
        assert_eq!(faces, vec![&[0, 1, 2][..], &[0, 2, 3][..], &[0, 3, 4][..]]);
    }

    #[test]
    fn test_triangulate_preserves_vertex_set() {
        let mut mesh = polygon_mesh(&[3, 6, 4, 8]);
        let before: HashSet<u32> = mesh.position_faces.iter().flatten().copied().collect();
        mesh.triangulate();
        let after: HashSet<u32> = mesh.position_faces.iter().flatten().copied().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_triangulate_mirrors_normal_and_uv_channels() {
        let mut mesh = polygon_mesh(&[4]);
        mesh.normals = vec![Vec3::Z, Vec3::X];
        mesh.normal_faces = vec![Face::from([1, 1, 0, 1])];
        mesh.uvs = vec![Vec2::ZERO; 4];
        mesh.uv_faces = vec![Face::from([3, 2, 1, 0])];
        mesh.triangulate();

        assert_eq!(mesh.normal_faces.len(), 2);
        assert_eq!(mesh.normal_faces[0].as_slice(), &[1, 1, 0]);
        assert_eq!(mesh.normal_faces[1].as_slice(), &[1, 0, 1]);
        assert_eq!(mesh.uv_faces[0].as_slice(), &[3, 2, 1]);
        assert_eq!(mesh.uv_faces[1].as_slice(), &[3, 1, 0]);
    }

    #[test]
    #[should_panic(expected = "normal face 0 arity mismatch")]
    fn test_triangulate_rejects_mismatched_normal_arity() {
        let mut mesh = polygon_mesh(&[4]);
        mesh.normals = vec![Vec3::Z];
        mesh.normal_faces = vec![Face::from([0, 0, 0])];
        mesh.triangulate();
    }

    #[test]
    #[should_panic(expected = "uv face 0 arity mismatch")]
    fn test_triangulate_rejects_mismatched_uv_arity() {
        let mut mesh = polygon_mesh(&[3]);
        mesh.uvs = vec![Vec2::ZERO];
        mesh.uv_faces = vec![Face::from([0, 0, 0, 0])];
        mesh.triangulate();
    }

    #[test]
    fn test_triangulate_passes_triangles_through() {
        let mut mesh = Mesh::from_triangles(vec![Vec3::ZERO, Vec3::X, Vec3::Y], &[[2, 0, 1]]);
        let before = mesh.clone();
        mesh.triangulate();
        assert_eq!(mesh, before);
    }

    #[test]
    fn test_append_offsets_indices() {
        let tri = Mesh::from_triangles(vec![Vec3::ZERO, Vec3::X, Vec3::Y], &[[0, 1, 2]]);
        let mut combined = tri.clone();
        combined.append(&tri, Mat4::from_translation(Vec3::Z));
        assert_eq!(combined.num_vertices(), 6);
        assert_eq!(combined.position_faces[1].as_slice(), &[3, 4, 5]);
        assert_eq!(combined.positions[3], Vec3::Z);
    }

    #[test]
    fn test_face_centroid() {
        let mesh = polygon_mesh(&[4]);
        assert!(mesh.face_centroid(0).length() < 1e-6);
    }
}
