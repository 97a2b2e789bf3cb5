//! End-to-end checks of the CPU side: loading, normals, expansion, scene
//! registration and glyph placement.

use glam::{Mat4, Vec3, Vec4};
use meshlens::geometry::obj::parse_obj;
use meshlens::geometry::{
    compute_face_normals, create_arrow, create_box, expand_vertex_attributes,
    expanded_vertex_count, face_vector_glyphs, segment_glyphs, set_flat_normals,
    set_smooth_normals, Mesh, RunningMean,
};
use meshlens::scene::{Drawable, Scene};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const EPS: f32 = 1e-5;

const OCTAHEDRON: &str = "\
# unit octahedron
v 1 0 0
v -1 0 0
v 0 1 0
v 0 -1 0
v 0 0 1
v 0 0 -1
f 1 3 5
f 3 2 5
f 2 4 5
f 4 1 5
f 3 1 6
f 2 3 6
f 4 2 6
f 1 4 6
";

#[test]
fn test_box_expands_to_36_corners_with_axis_normals() {
    let mut mesh = create_box();
    set_flat_normals(&mut mesh);
    let vertices = expand_vertex_attributes(&mesh, Vec3::splat(0.5));

    assert_eq!(vertices.len(), 36);
    for v in &vertices {
        let n = Vec3::from(v.normal);
        assert!((n.length() - 1.0).abs() < EPS);
        // Axis aligned: exactly one non-zero component.
        let nonzero = v.normal.iter().filter(|c| c.abs() > EPS).count();
        assert_eq!(nonzero, 1);
        // The normal points away from the box center.
        assert!(Vec3::from(v.position).dot(n) > 0.0);
    }
}

#[test]
fn test_box_wireframe_hides_quad_diagonals() {
    let mesh = create_box();
    let vertices = expand_vertex_attributes(&mesh, Vec3::ONE);

    // Each quad splits into two triangles with two real edges apiece.
    for tri in vertices.chunks(3) {
        let real = tri[0].edge_mask.iter().filter(|&&m| m == 0.0).count();
        assert_eq!(real, 2);
    }
}

#[test]
fn test_obj_to_expanded_vertices() {
    let mut mesh = parse_obj(OCTAHEDRON.as_bytes()).unwrap();
    assert_eq!(mesh.num_vertices(), 6);
    assert_eq!(mesh.num_faces(), 8);

    set_smooth_normals(&mut mesh);
    let vertices = expand_vertex_attributes(&mesh, Vec3::ONE);
    assert_eq!(vertices.len(), expanded_vertex_count(&mesh));
    assert_eq!(vertices.len(), 24);

    // Smooth octahedron normals are the radial directions.
    for v in &vertices {
        let p = Vec3::from(v.position);
        let n = Vec3::from(v.normal);
        assert!((p - n).length() < EPS, "{p:?} vs {n:?}");
    }
}

#[test]
fn test_scene_bounds_and_vertex_colors() {
    let mut scene = Scene::new();
    let mesh = parse_obj(OCTAHEDRON.as_bytes()).unwrap();
    let faces = mesh.num_faces();
    let visual = scene.add_mesh("octahedron", mesh);
    let colors: Vec<Vec3> = (0..faces).map(|f| Vec3::new(f as f32, 0.0, 0.0)).collect();
    visual.add_face_colors("index", colors);

    let mut cube = create_box();
    cube.translate(Vec3::new(3.0, 0.0, 0.0));
    scene.add_mesh("cube", cube);

    let bounds = scene.bounds();
    assert_eq!(bounds.lower, Vec3::new(-1.0, -1.0, -1.0));
    assert_eq!(bounds.upper, Vec3::new(3.5, 1.0, 1.0));

    let Some(Drawable::Mesh(octahedron)) = scene.get("octahedron") else {
        panic!("octahedron should be a mesh");
    };
    let vertices = octahedron.vertices();
    for (f, tri) in vertices.chunks(3).enumerate() {
        for v in tri {
            assert_eq!(v.color, [f as f32, 0.0, 0.0]);
        }
    }
}

#[test]
fn test_face_vector_glyphs_on_box() {
    let mesh = create_box();
    let normals = compute_face_normals(&mesh);
    let mut glyphs = face_vector_glyphs(&mesh, &normals);
    assert_eq!(glyphs.len(), 6);
    assert!((glyphs.base_scale - 1.0).abs() < EPS);

    glyphs.length = 0.5;
    let instances = glyphs.instance_data(Vec4::ONE);
    assert_eq!(instances.len(), 6);

    // The arrow tip (0, 1, 0) lands half a unit out along each face normal.
    for (f, (instance, normal)) in instances.iter().zip(&normals).enumerate() {
        let transform = Mat4::from_cols_array_2d(&instance.transform);
        let tip = transform.transform_point3(Vec3::Y);
        let expected = mesh.face_centroid(f) + *normal * 0.5;
        assert!((tip - expected).length() < EPS, "face {f}: {tip} vs {expected}");
    }
}

#[test]
fn test_arrow_glyph_spans_unit_height() {
    let arrow = create_arrow(8);
    let (lo, hi) = arrow
        .positions
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
    assert!(lo.abs() < EPS);
    assert!((hi - 1.0).abs() < EPS);
}

#[test]
fn test_segment_glyphs_connect_endpoints() {
    let positions = vec![Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.0, 0.0, 2.0)];
    let glyphs = segment_glyphs(&positions, &[[0, 1], [1, 2]]);
    assert_eq!(glyphs.len(), 1);

    let transform = glyphs.transforms()[0];
    // Unit cylinder spans y in [-0.5, 0.5]; it must reach both endpoints.
    let bottom = transform.transform_point3(Vec3::new(0.0, -0.5, 0.0));
    let top = transform.transform_point3(Vec3::new(0.0, 0.5, 0.0));
    assert!(bottom.distance(positions[0]) < EPS);
    assert!(top.distance(positions[1]) < EPS);
}

#[test]
fn test_running_mean_matches_batch_mean() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let samples: Vec<f64> = (0..10_000).map(|_| rng.gen_range(0.0..5.0)).collect();

    let mut mean = RunningMean::new();
    for &s in &samples {
        mean.push(s);
    }
    let batch = samples.iter().sum::<f64>() / samples.len() as f64;

    assert_eq!(mean.count(), 10_000);
    assert!((mean.mean() - batch).abs() < 1e-9);
}

#[test]
fn test_empty_mesh_expands_to_nothing() {
    let mut mesh = Mesh::new();
    set_flat_normals(&mut mesh);
    assert!(expand_vertex_attributes(&mesh, Vec3::ONE).is_empty());
}
