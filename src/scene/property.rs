//! Per-face overlays attached to a [`VisualMesh`](super::VisualMesh).

use glam::Vec3;

use crate::geometry::{face_vector_glyphs, GlyphSet, InstanceData, Mesh};

pub const DEFAULT_VECTOR_COLOR: Vec3 = Vec3::new(0.882, 0.902, 0.376);

/// One arrow per face, anchored at the face centroid.
///
/// Radius and length are multipliers of the mesh's mean edge length, so the
/// defaults look reasonable regardless of model size.
#[derive(Clone, Debug)]
pub struct FaceVectorProperty {
    glyphs: GlyphSet,
    color: Vec3,
    visible: bool,
    version: u64,
}

impl FaceVectorProperty {
    pub fn new(mesh: &Mesh, vectors: &[Vec3]) -> Self {
        Self {
            glyphs: face_vector_glyphs(mesh, vectors),
            color: DEFAULT_VECTOR_COLOR,
            visible: true,
            version: 0,
        }
    }

    pub fn set_radius(&mut self, radius: f32) -> &mut Self {
        self.glyphs.radius = radius;
        self.touch()
    }

    pub fn set_length(&mut self, length: f32) -> &mut Self {
        self.glyphs.length = length;
        self.touch()
    }

    pub fn set_color(&mut self, color: Vec3) -> &mut Self {
        self.color = color;
        self.touch()
    }

    pub fn set_visible(&mut self, visible: bool) -> &mut Self {
        self.visible = visible;
        self.touch()
    }

    pub fn radius(&self) -> f32 {
        self.glyphs.radius
    }

    pub fn length(&self) -> f32 {
        self.glyphs.length
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Mean edge length of the owning mesh.
    pub fn base_scale(&self) -> f32 {
        self.glyphs.base_scale
    }

    pub fn num_glyphs(&self) -> usize {
        self.glyphs.len()
    }

    /// Bumped on every change that affects instance data.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn instance_data(&self) -> Vec<InstanceData> {
        self.glyphs.instance_data(self.color.extend(1.0))
    }

    fn touch(&mut self) -> &mut Self {
        self.version += 1;
        self
    }
}

/// One RGB color per source face, replacing the mesh base color.
#[derive(Clone, Debug)]
pub struct FaceColorProperty {
    colors: Vec<Vec3>,
    visible: bool,
    version: u64,
}

impl FaceColorProperty {
    pub fn new(mesh: &Mesh, colors: Vec<Vec3>) -> Self {
        assert_eq!(colors.len(), mesh.num_faces(), "one color per face expected");
        Self {
            colors,
            visible: true,
            version: 0,
        }
    }

    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    /// Replace all colors; the face count must not change.
    pub fn set_colors(&mut self, colors: Vec<Vec3>) -> &mut Self {
        assert_eq!(colors.len(), self.colors.len());
        self.colors = colors;
        self.version += 1;
        self
    }

    pub fn set_visible(&mut self, visible: bool) -> &mut Self {
        self.visible = visible;
        self.version += 1;
        self
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

/// The closed set of mesh overlays.
#[derive(Clone, Debug)]
pub enum Property {
    FaceVectors(FaceVectorProperty),
    FaceColors(FaceColorProperty),
}

impl Property {
    pub fn visible(&self) -> bool {
        match self {
            Property::FaceVectors(p) => p.visible(),
            Property::FaceColors(p) => p.visible(),
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        match self {
            Property::FaceVectors(p) => {
                p.set_visible(visible);
            }
            Property::FaceColors(p) => {
                p.set_visible(visible);
            }
        }
    }

    pub fn version(&self) -> u64 {
        match self {
            Property::FaceVectors(p) => p.version(),
            Property::FaceColors(p) => p.version(),
        }
    }

    pub fn as_face_vectors_mut(&mut self) -> Option<&mut FaceVectorProperty> {
        match self {
            Property::FaceVectors(p) => Some(p),
            _ => None,
        }
    }
}
