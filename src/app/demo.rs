//! Built-in scenes for running without an input file.

use std::f32::consts::TAU;

use glam::{Mat4, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use meshlens::geometry::{
    compute_face_normals, create_arrow, create_box, create_cone, create_cylinder, create_sphere,
    set_smooth_normals, Mesh,
};
use meshlens::scene::Scene;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Demo {
    /// A sphere with per-face vectors and height-based face colors.
    Mesh,
    /// The twelve edges of a cube.
    Network,
    /// Random samples on a torus.
    Points,
    /// Every primitive side by side.
    Primitives,
}

/// Property name of the face-normal overlay.
pub const FACE_NORMALS: &str = "face normals";

const POINT_COUNT: usize = 2000;
const POINT_SEED: u64 = 7;

/// Populate `scene` and return the names of meshes that carry face vectors.
pub fn build(scene: &mut Scene, demo: Demo, smooth: bool, face_vectors: bool) -> Vec<String> {
    match demo {
        Demo::Mesh => {
            let mut sphere = create_sphere(12, 18);
            sphere.scale(Vec3::splat(2.0));
            add_mesh(scene, "sphere", sphere, smooth, face_vectors, true);
            // The mesh demo always shows vectors.
            if !face_vectors {
                attach_face_normals(scene, "sphere");
            }
            vec!["sphere".to_string()]
        }
        Demo::Primitives => {
            let shapes = [
                ("box", create_box()),
                ("sphere", create_sphere(16, 24)),
                ("cylinder", create_cylinder(24)),
                ("cone", create_cone(24)),
                ("arrow", create_arrow(16)),
            ];
            let mut names = Vec::new();
            for (i, (name, mut mesh)) in shapes.into_iter().enumerate() {
                mesh.translate(Vec3::new(i as f32 * 1.5, 0.0, 0.0));
                add_mesh(scene, name, mesh, smooth, face_vectors, false);
                if face_vectors {
                    names.push(name.to_string());
                }
            }
            names
        }
        Demo::Network => {
            let positions = vec![
                Vec3::new(-0.5, -0.5, -0.5),
                Vec3::new(0.5, -0.5, -0.5),
                Vec3::new(0.5, 0.5, -0.5),
                Vec3::new(-0.5, 0.5, -0.5),
                Vec3::new(-0.5, -0.5, 0.5),
                Vec3::new(0.5, -0.5, 0.5),
                Vec3::new(0.5, 0.5, 0.5),
                Vec3::new(-0.5, 0.5, 0.5),
            ];
            #[rustfmt::skip]
            let edges = vec![
                [0, 1], [1, 2], [2, 3], [3, 0],
                [4, 5], [5, 6], [6, 7], [7, 4],
                [0, 4], [1, 5], [2, 6], [3, 7],
            ];
            scene.add_line_network("cube", positions, edges);
            Vec::new()
        }
        Demo::Points => {
            scene.add_point_cloud("torus", torus_samples(POINT_COUNT, POINT_SEED));
            Vec::new()
        }
    }
}

/// Register `mesh`, optionally with smooth normals, face-normal vectors and
/// height-based face colors.
pub fn add_mesh(
    scene: &mut Scene,
    name: &str,
    mut mesh: Mesh,
    smooth: bool,
    face_vectors: bool,
    height_colors: bool,
) {
    if smooth {
        set_smooth_normals(&mut mesh);
    }
    let colors = height_colors.then(|| face_height_colors(&mesh));

    let visual = scene.add_mesh(name, mesh);
    if let Some(colors) = colors {
        visual.add_face_colors("height", colors);
    }
    if face_vectors {
        attach_face_normals(scene, name);
    }
}

/// Show the face normals of mesh `name` as arrows.
pub fn attach_face_normals(scene: &mut Scene, name: &str) {
    if let Some(visual) = scene.mesh_mut(name) {
        let normals = compute_face_normals(visual.mesh());
        visual
            .add_face_vectors(FACE_NORMALS, &normals)
            .set_length(0.8)
            .set_radius(0.6);
    }
}

/// Blue-to-red ramp over face centroid height.
fn face_height_colors(mesh: &Mesh) -> Vec<Vec3> {
    let heights: Vec<f32> = (0..mesh.num_faces())
        .map(|f| mesh.face_centroid(f).y)
        .collect();
    let (lo, hi) = heights
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| (lo.min(h), hi.max(h)));
    let span = (hi - lo).max(f32::EPSILON);
    heights
        .into_iter()
        .map(|h| {
            let t = (h - lo) / span;
            Vec3::new(0.3 + 0.6 * t, 0.35, 0.9 - 0.6 * t)
        })
        .collect()
}

fn torus_samples(count: usize, seed: u64) -> Vec<Vec3> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (major, minor) = (1.0, 0.35);
    let tilt = Mat4::from_rotation_x(0.5);
    (0..count)
        .map(|_| {
            let u: f32 = rng.gen_range(0.0..TAU);
            let v: f32 = rng.gen_range(0.0..TAU);
            let ring = major + minor * v.cos();
            tilt.transform_point3(Vec3::new(ring * u.cos(), minor * v.sin(), ring * u.sin()))
        })
        .collect()
}
