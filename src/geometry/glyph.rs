//! Instance transforms for glyph overlays.
//!
//! A glyph is a shared mesh (arrow, cylinder, sphere) modeled along +Y in its
//! local space. Each instance gets a 4x4 transform: a cached rigid part that
//! moves the glyph to its anchor and turns +Y onto the target direction, and
//! a non-uniform scale `(radius, length, radius)` that is reapplied whenever
//! the user changes glyph size.

use glam::{Mat4, Vec3, Vec4};

use super::Mesh;

/// Below this, a cross product is treated as zero (parallel vectors).
const PARALLEL_EPSILON: f32 = 1e-6;

/// Line segments shorter than this produce no glyph.
pub const MIN_SEGMENT_LENGTH: f32 = 1e-6;

/// Per-instance record uploaded to the GPU: transform columns, then RGBA.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceData {
    pub transform: [[f32; 4]; 4],
    pub color: [f32; 4],
}

const _: () = assert!(std::mem::size_of::<InstanceData>() == 80);
const _: () = assert!(std::mem::size_of::<InstanceData>() % 16 == 0);

impl InstanceData {
    pub fn new(transform: Mat4, color: Vec4) -> Self {
        Self {
            transform: transform.to_cols_array_2d(),
            color: color.to_array(),
        }
    }
}

/// Streaming arithmetic mean (Welford's update).
///
/// Each sample moves the mean by `(x - mean) / count`, so the accumulator
/// never grows with the number of samples.
#[derive(Clone, Copy, Debug, Default)]
pub struct RunningMean {
    count: u64,
    mean: f64,
}

impl RunningMean {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.mean += (value - self.mean) / self.count as f64;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Current mean, zero before any sample.
    pub fn mean(&self) -> f64 {
        self.mean
    }
}

/// Face anchors and characteristic length of a mesh.
#[derive(Clone, Debug)]
pub struct FaceFrame {
    /// Centroid of every face, in face order.
    pub centroids: Vec<Vec3>,
    /// Mean length over every face edge (shared edges count once per face).
    pub mean_edge_length: f32,
}

impl FaceFrame {
    pub fn from_mesh(mesh: &Mesh) -> Self {
        let mut centroids = Vec::with_capacity(mesh.num_faces());
        let mut edge_mean = RunningMean::new();

        for face in &mesh.position_faces {
            let corner = |k: usize| mesh.positions[face[k % face.len()] as usize];
            let sum: Vec3 = (0..face.len()).map(corner).sum();
            centroids.push(sum / face.len() as f32);

            for k in 0..face.len() {
                edge_mean.push(corner(k).distance(corner(k + 1)) as f64);
            }
        }

        log::debug!(
            "face frame: {} faces, {} edges, mean edge length {:.6}",
            centroids.len(),
            edge_mean.count(),
            edge_mean.mean()
        );

        Self {
            centroids,
            mean_edge_length: edge_mean.mean() as f32,
        }
    }
}

/// Rotation taking +Y onto the unit vector `direction`.
///
/// When `direction` is (anti-)parallel to +Y the rotation axis is undefined;
/// +X is used, with angle 0 or pi.
pub fn rotation_from_y(direction: Vec3) -> Mat4 {
    let axis = Vec3::Y.cross(direction);
    let sin = axis.length();
    let cos = Vec3::Y.dot(direction);

    if sin < PARALLEL_EPSILON {
        let angle = if cos < 0.0 { std::f32::consts::PI } else { 0.0 };
        Mat4::from_axis_angle(Vec3::X, angle)
    } else {
        Mat4::from_axis_angle(axis / sin, sin.atan2(cos))
    }
}

/// Cached rigid part of one glyph instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphPlacement {
    /// Translation to the anchor composed with the rotation from +Y.
    pub rigid: Mat4,
    /// Magnitude of the source vector.
    pub length: f32,
}

impl GlyphPlacement {
    /// Place a glyph at `anchor` pointing along `vector`.
    ///
    /// A zero vector keeps the +Y orientation and gets zero length.
    pub fn new(anchor: Vec3, vector: Vec3) -> Self {
        let length = vector.length();
        let direction = if length > 0.0 { vector / length } else { Vec3::Y };
        Self {
            rigid: Mat4::from_translation(anchor) * rotation_from_y(direction),
            length,
        }
    }

    /// `rigid * scale(radius, length, radius)`, by scaling the basis columns.
    pub fn transform(&self, radius_scale: f32, length_scale: f32) -> Mat4 {
        let mut m = self.rigid;
        m.x_axis *= radius_scale;
        m.y_axis *= length_scale;
        m.z_axis *= radius_scale;
        m
    }
}

/// A set of placed glyphs sharing one size configuration.
#[derive(Clone, Debug)]
pub struct GlyphSet {
    pub placements: Vec<GlyphPlacement>,
    /// Characteristic length the multipliers are relative to.
    pub base_scale: f32,
    /// Glyph thickness multiplier.
    pub radius: f32,
    /// Glyph length multiplier.
    pub length: f32,
    /// Whether glyph length follows the source vector magnitude times
    /// `base_scale * length`, or just the magnitude times `length`.
    pub length_mode: LengthMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LengthMode {
    /// Vector fields: length is relative to the mesh scale.
    Relative,
    /// Line segments: length is the exact segment length.
    Absolute,
}

impl GlyphSet {
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Recompute every instance transform from the cached rigid parts.
    pub fn transforms(&self) -> Vec<Mat4> {
        let radius_scale = self.radius * self.base_scale;
        self.placements
            .iter()
            .map(|p| {
                let length_scale = match self.length_mode {
                    LengthMode::Relative => p.length * self.base_scale * self.length,
                    LengthMode::Absolute => p.length * self.length,
                };
                p.transform(radius_scale, length_scale)
            })
            .collect()
    }

    /// Instance records with a uniform color.
    pub fn instance_data(&self, color: Vec4) -> Vec<InstanceData> {
        self.transforms()
            .into_iter()
            .map(|t| InstanceData::new(t, color))
            .collect()
    }
}

/// One arrow per face of `mesh`, anchored at the face centroid.
///
/// Arrow length is `|v| * mean_edge_length * length` and thickness is
/// `mean_edge_length * radius`, so glyphs stay proportionate to the mesh.
pub fn face_vector_glyphs(mesh: &Mesh, vectors: &[Vec3]) -> GlyphSet {
    assert_eq!(
        vectors.len(),
        mesh.num_faces(),
        "one vector per face expected"
    );
    let frame = FaceFrame::from_mesh(mesh);
    vector_glyphs(&frame.centroids, vectors, frame.mean_edge_length)
}

/// Arrows at arbitrary anchors.
pub fn vector_glyphs(anchors: &[Vec3], vectors: &[Vec3], base_scale: f32) -> GlyphSet {
    assert_eq!(anchors.len(), vectors.len());
    GlyphSet {
        placements: anchors
            .iter()
            .zip(vectors)
            .map(|(&a, &v)| GlyphPlacement::new(a, v))
            .collect(),
        base_scale,
        radius: 1.0,
        length: 1.0,
        length_mode: LengthMode::Relative,
    }
}

/// One cylinder per edge of a line network, centered on the edge midpoint.
///
/// The canonical cylinder spans `-0.5..=0.5` along Y, so its length scale is
/// the exact edge length. Coincident endpoints emit nothing. Thickness is
/// relative to the mean segment length.
pub fn segment_glyphs(positions: &[Vec3], edges: &[[u32; 2]]) -> GlyphSet {
    let mut placements = Vec::with_capacity(edges.len());
    let mut segment_mean = RunningMean::new();

    for &[a, b] in edges {
        let p1 = positions[a as usize];
        let p2 = positions[b as usize];
        let delta = p2 - p1;
        let length = delta.length();
        if length < MIN_SEGMENT_LENGTH {
            continue;
        }
        segment_mean.push(length as f64);
        placements.push(GlyphPlacement::new((p1 + p2) * 0.5, delta));
    }

    GlyphSet {
        placements,
        base_scale: segment_mean.mean() as f32,
        radius: 1.0,
        length: 1.0,
        length_mode: LengthMode::Absolute,
    }
}

/// Uniformly scaled, unrotated transforms for point glyphs.
///
/// `glyph_radius` is the radius of the glyph mesh itself, `radius` the
/// desired on-screen radius.
pub fn point_transforms(points: &[Vec3], radius: f32, glyph_radius: f32) -> Vec<Mat4> {
    let scale = Vec3::splat(radius / glyph_radius);
    points
        .iter()
        .map(|&p| Mat4::from_translation(p) * Mat4::from_scale(scale))
        .collect()
}
