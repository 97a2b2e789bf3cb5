//! Parametric base shapes.
//!
//! All shapes are unit-sized around the origin (radius 0.5, spanning
//! `-0.5..=0.5` along Y) and come with exact normals. Callers scale them.

use std::f32::consts::{PI, TAU};

use glam::{Mat4, Vec3};

use super::{set_flat_normals, Face, Mesh};

/// Radius shared by every primitive.
pub const PRIMITIVE_RADIUS: f32 = 0.5;

const HALF_HEIGHT: f32 = 0.5;

/// Arrow proportions, relative to a unit-length arrow along +Y.
const ARROW_SHAFT_RADIUS: f32 = 0.05;
const ARROW_SHAFT_LENGTH: f32 = 0.7;
const ARROW_HEAD_RADIUS: f32 = 0.15;
const ARROW_HEAD_LENGTH: f32 = 0.3;

/// Point on a ring of the given radius at angle `theta`, measured from +Z
/// towards +X.
fn ring_point(radius: f32, theta: f32, y: f32) -> Vec3 {
    Vec3::new(radius * theta.sin(), y, radius * theta.cos())
}

/// Axis-aligned cube with side 1, six quads, flat normals.
pub fn create_box() -> Mesh {
    let h = 0.5;
    let mut mesh = Mesh::new();
    mesh.positions = vec![
        Vec3::new(-h, -h, h), // front bottom left
        Vec3::new(h, -h, h),  // front bottom right
        Vec3::new(h, h, h),   // front top right
        Vec3::new(-h, h, h),  // front top left
        Vec3::new(-h, -h, -h),
        Vec3::new(h, -h, -h),
        Vec3::new(h, h, -h),
        Vec3::new(-h, h, -h),
    ];
    mesh.position_faces = vec![
        Face::from([0, 1, 2, 3]), // front
        Face::from([5, 4, 7, 6]), // back
        Face::from([3, 2, 6, 7]), // top
        Face::from([4, 5, 1, 0]), // bottom
        Face::from([1, 5, 6, 2]), // right
        Face::from([4, 0, 3, 7]), // left
    ];
    set_flat_normals(&mut mesh);
    mesh
}

/// UV sphere with two poles, triangle-fan caps and a quad body.
///
/// Produces `2 + (latitudes - 1) * longitudes` vertices. Normals are smooth
/// (the radial direction).
pub fn create_sphere(latitudes: u32, longitudes: u32) -> Mesh {
    assert!(latitudes >= 2 && longitudes >= 3);
    let r = PRIMITIVE_RADIUS;
    let mut mesh = Mesh::new();

    mesh.positions.push(Vec3::new(0.0, r, 0.0));
    for lat in 1..latitudes {
        let phi = PI * lat as f32 / latitudes as f32;
        for lon in 0..longitudes {
            let theta = TAU * lon as f32 / longitudes as f32;
            mesh.positions
                .push(ring_point(r * phi.sin(), theta, r * phi.cos()));
        }
    }
    mesh.positions.push(Vec3::new(0.0, -r, 0.0));

    let ring = |lat: u32, lon: u32| 1 + lat * longitudes + lon % longitudes;

    // Top cap
    for lon in 0..longitudes {
        mesh.position_faces
            .push(Face::from([0, ring(0, lon), ring(0, lon + 1)]));
    }

    // Body, walking down from the top ring
    for lat in 0..latitudes - 2 {
        for lon in 0..longitudes {
            mesh.position_faces.push(Face::from([
                ring(lat, lon),
                ring(lat + 1, lon),
                ring(lat + 1, lon + 1),
                ring(lat, lon + 1),
            ]));
        }
    }

    // Bottom cap
    let bottom = mesh.positions.len() as u32 - 1;
    let last = latitudes - 2;
    for lon in 0..longitudes {
        mesh.position_faces
            .push(Face::from([ring(last, lon + 1), ring(last, lon), bottom]));
    }

    mesh.normals = mesh.positions.iter().map(|p| p.normalize()).collect();
    mesh.normal_faces = mesh.position_faces.clone();
    mesh
}

/// Capped cylinder along Y.
///
/// Side quads use per-vertex radial normals; each cap is a single n-gon with
/// one shared normal (+Y on top, -Y on the bottom).
pub fn create_cylinder(segments: u32) -> Mesh {
    assert!(segments >= 3);
    let n = segments;
    let mut mesh = Mesh::new();

    // Bottom ring 0..n, top ring n..2n
    for y in [-HALF_HEIGHT, HALF_HEIGHT] {
        for i in 0..n {
            let theta = TAU * i as f32 / n as f32;
            mesh.positions.push(ring_point(PRIMITIVE_RADIUS, theta, y));
        }
    }

    // Side normals 0..n, then top and bottom cap normals
    for i in 0..n {
        let theta = TAU * i as f32 / n as f32;
        mesh.normals.push(ring_point(1.0, theta, 0.0));
    }
    let top_normal = n;
    let bottom_normal = n + 1;
    mesh.normals.push(Vec3::Y);
    mesh.normals.push(Vec3::NEG_Y);

    for i in 0..n {
        let j = (i + 1) % n;
        mesh.position_faces.push(Face::from([i, j, n + j, n + i]));
        mesh.normal_faces.push(Face::from([i, j, j, i]));
    }

    mesh.position_faces.push((n..2 * n).collect());
    mesh.normal_faces.push(Face::from_elem(top_normal, n as usize));

    mesh.position_faces.push((0..n).rev().collect());
    mesh.normal_faces
        .push(Face::from_elem(bottom_normal, n as usize));

    mesh
}

/// Cone along Y with its base at `y = -0.5` and apex at `y = 0.5`.
///
/// The side is smooth shaded: base corners carry slanted normals and the apex
/// gets one normal per segment, aimed at the middle of that segment, so the
/// shared apex position still shades correctly on every side triangle. The
/// base is one n-gon with a single downward normal.
pub fn create_cone(segments: u32) -> Mesh {
    assert!(segments >= 3);
    let n = segments;
    let mut mesh = Mesh::new();

    for i in 0..n {
        let theta = TAU * i as f32 / n as f32;
        mesh.positions
            .push(ring_point(PRIMITIVE_RADIUS, theta, -HALF_HEIGHT));
    }
    let apex = n;
    mesh.positions.push(Vec3::new(0.0, HALF_HEIGHT, 0.0));

    // The side surface tilts up by the half-angle of the cone.
    let half_angle = (PRIMITIVE_RADIUS / (2.0 * HALF_HEIGHT)).atan();
    let (rise, run) = half_angle.sin_cos();
    let slanted = |theta: f32| ring_point(run, theta, rise);

    for i in 0..n {
        mesh.normals.push(slanted(TAU * i as f32 / n as f32));
    }
    for i in 0..n {
        mesh.normals.push(slanted(TAU * (i as f32 + 0.5) / n as f32));
    }
    let base_normal = 2 * n;
    mesh.normals.push(Vec3::NEG_Y);

    for i in 0..n {
        let j = (i + 1) % n;
        mesh.position_faces.push(Face::from([i, j, apex]));
        mesh.normal_faces.push(Face::from([i, j, n + i]));
    }

    mesh.position_faces.push((0..n).rev().collect());
    mesh.normal_faces
        .push(Face::from_elem(base_normal, n as usize));

    mesh
}

/// Unit-length arrow along +Y starting at the origin: a thin cylinder shaft
/// with a cone head. Fully triangulated.
pub fn create_arrow(segments: u32) -> Mesh {
    let mut shaft = create_cylinder(segments);
    shaft.triangulate();
    let mut head = create_cone(segments);
    head.triangulate();

    let shaft_transform = Mat4::from_translation(Vec3::new(0.0, ARROW_SHAFT_LENGTH * 0.5, 0.0))
        * Mat4::from_scale(Vec3::new(
            ARROW_SHAFT_RADIUS / PRIMITIVE_RADIUS,
            ARROW_SHAFT_LENGTH,
            ARROW_SHAFT_RADIUS / PRIMITIVE_RADIUS,
        ));
    let head_transform = Mat4::from_translation(Vec3::new(
        0.0,
        ARROW_SHAFT_LENGTH + ARROW_HEAD_LENGTH * 0.5,
        0.0,
    )) * Mat4::from_scale(Vec3::new(
        ARROW_HEAD_RADIUS / PRIMITIVE_RADIUS,
        ARROW_HEAD_LENGTH,
        ARROW_HEAD_RADIUS / PRIMITIVE_RADIUS,
    ));

    let mut arrow = Mesh::new();
    arrow.append(&shaft, shaft_transform);
    arrow.append(&head, head_transform);
    arrow
}
