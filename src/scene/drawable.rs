use glam::Vec3;

use super::property::{FaceColorProperty, FaceVectorProperty, Property};
use crate::geometry::{
    apply_face_colors, expand_vertex_attributes, point_transforms, segment_glyphs,
    set_flat_normals, BoundingBox, GlyphSet, InstanceData, Mesh, MeshVertex, PRIMITIVE_RADIUS,
};
use crate::util::Timed;

pub const DEFAULT_MESH_COLOR: Vec3 = Vec3::new(0.5, 0.5, 0.5);
pub const DEFAULT_POINT_COLOR: Vec3 = Vec3::new(1.0, 0.0, 0.0);
pub const DEFAULT_LINE_COLOR: Vec3 = Vec3::new(0.25, 0.45, 0.85);

/// Point radius as a fraction of the cloud's bounding-box diagonal.
const POINT_RADIUS_FRACTION: f32 = 0.005;
/// Segment thickness multiplier relative to mean segment length.
const LINE_RADIUS: f32 = 0.05;
/// Node spheres are a bit wider than the segments they join.
const NODE_RADIUS_FACTOR: f32 = 1.5;

/// A polygon mesh with shading style and named overlays.
#[derive(Clone, Debug)]
pub struct VisualMesh {
    mesh: Mesh,
    bounds: BoundingBox,
    color: Vec3,
    show_mesh: bool,
    show_wireframe: bool,
    properties: Vec<(String, Property)>,
    property_revision: u64,
    version: u64,
}

impl VisualMesh {
    /// Wrap `mesh`, generating flat normals when it has none.
    pub fn new(mut mesh: Mesh) -> Self {
        if !mesh.has_normals() {
            set_flat_normals(&mut mesh);
        }
        Self {
            bounds: BoundingBox::from_points(&mesh.positions),
            mesh,
            color: DEFAULT_MESH_COLOR,
            show_mesh: true,
            show_wireframe: true,
            properties: Vec::new(),
            property_revision: 0,
            version: 0,
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn set_color(&mut self, color: Vec3) {
        self.color = color;
        self.version += 1;
    }

    pub fn show_mesh(&self) -> bool {
        self.show_mesh
    }

    pub fn set_mesh_visible(&mut self, visible: bool) {
        self.show_mesh = visible;
        self.version += 1;
    }

    pub fn show_wireframe(&self) -> bool {
        self.show_wireframe
    }

    pub fn set_wireframe_visible(&mut self, visible: bool) {
        self.show_wireframe = visible;
        self.version += 1;
    }

    /// Changes whenever expanded vertices or style would change.
    pub fn version(&self) -> u64 {
        let colors: u64 = self
            .properties
            .iter()
            .filter(|(_, p)| matches!(p, Property::FaceColors(_)))
            .map(|(_, p)| p.version())
            .sum();
        self.version + colors
    }

    /// Attach one arrow per face. Replaces a property of the same name.
    pub fn add_face_vectors(&mut self, name: &str, vectors: &[Vec3]) -> &mut FaceVectorProperty {
        let property = Property::FaceVectors(FaceVectorProperty::new(&self.mesh, vectors));
        match self.insert_property(name, property) {
            Property::FaceVectors(p) => p,
            Property::FaceColors(_) => unreachable!(),
        }
    }

    /// Attach one color per face. Replaces a property of the same name.
    pub fn add_face_colors(&mut self, name: &str, colors: Vec<Vec3>) -> &mut FaceColorProperty {
        let property = Property::FaceColors(FaceColorProperty::new(&self.mesh, colors));
        self.version += 1;
        match self.insert_property(name, property) {
            Property::FaceColors(p) => p,
            Property::FaceVectors(_) => unreachable!(),
        }
    }

    fn insert_property(&mut self, name: &str, property: Property) -> &mut Property {
        log::debug!("Adding property '{name}'");
        self.property_revision += 1;
        let index = match self.properties.iter().position(|(n, _)| n == name) {
            Some(i) => {
                // Keep the summed version monotonic across the swap.
                self.version += self.properties[i].1.version();
                self.properties[i].1 = property;
                i
            }
            None => {
                self.properties.push((name.to_string(), property));
                self.properties.len() - 1
            }
        };
        &mut self.properties[index].1
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    pub fn property_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.properties.iter().map(|(n, p)| (n.as_str(), p))
    }

    pub fn properties_mut(&mut self) -> impl Iterator<Item = (&str, &mut Property)> {
        self.properties.iter_mut().map(|(n, p)| (n.as_str(), p))
    }

    pub fn remove_property(&mut self, name: &str) -> Option<Property> {
        let index = self.properties.iter().position(|(n, _)| n == name)?;
        let (_, removed) = self.properties.remove(index);
        self.version += 1 + removed.version();
        self.property_revision += 1;
        Some(removed)
    }

    /// Bumped when properties are added, replaced or removed.
    pub fn property_revision(&self) -> u64 {
        self.property_revision
    }

    /// Face vector overlays, for the renderer.
    pub fn face_vectors(&self) -> impl Iterator<Item = (&str, &FaceVectorProperty)> {
        self.properties.iter().filter_map(|(n, p)| match p {
            Property::FaceVectors(v) => Some((n.as_str(), v)),
            _ => None,
        })
    }

    /// Expanded triangle corners, colored by the last visible face color
    /// overlay or the base color.
    pub fn vertices(&self) -> Vec<MeshVertex> {
        let _t = Timed::debug("Expand mesh vertices");
        let mut vertices = expand_vertex_attributes(&self.mesh, self.color);
        let overlay = self.properties.iter().rev().find_map(|(_, p)| match p {
            Property::FaceColors(c) if c.visible() => Some(c),
            _ => None,
        });
        if let Some(colors) = overlay {
            apply_face_colors(&mut vertices, &self.mesh, colors.colors());
        }
        vertices
    }
}

/// A set of points drawn as small spheres.
#[derive(Clone, Debug)]
pub struct VisualPointCloud {
    points: Vec<Vec3>,
    bounds: BoundingBox,
    radius: f32,
    color: Vec3,
    visible: bool,
    version: u64,
}

impl VisualPointCloud {
    pub fn new(points: Vec<Vec3>) -> Self {
        let bounds = BoundingBox::from_points(&points);
        let diagonal = bounds.diagonal();
        let radius = if diagonal > 0.0 {
            diagonal * POINT_RADIUS_FRACTION
        } else {
            POINT_RADIUS_FRACTION
        };
        Self {
            points,
            bounds,
            radius,
            color: DEFAULT_POINT_COLOR,
            visible: true,
            version: 0,
        }
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f32) -> &mut Self {
        self.radius = radius;
        self.version += 1;
        self
    }

    pub fn set_color(&mut self, color: Vec3) -> &mut Self {
        self.color = color;
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

    /// One sphere instance per point.
    pub fn instance_data(&self) -> Vec<InstanceData> {
        let color = self.color.extend(1.0);
        point_transforms(&self.points, self.radius, PRIMITIVE_RADIUS)
            .into_iter()
            .map(|t| InstanceData::new(t, color))
            .collect()
    }
}

/// Points joined by straight segments, drawn as cylinders with sphere joints.
#[derive(Clone, Debug)]
pub struct VisualLineNetwork {
    positions: Vec<Vec3>,
    edges: Vec<[u32; 2]>,
    segments: GlyphSet,
    bounds: BoundingBox,
    color: Vec3,
    visible: bool,
    version: u64,
}

impl VisualLineNetwork {
    /// # Panics
    /// If an edge references a position that does not exist.
    pub fn new(positions: Vec<Vec3>, edges: Vec<[u32; 2]>) -> Self {
        let count = positions.len();
        assert!(
            edges.iter().flatten().all(|&i| (i as usize) < count),
            "edge index out of range"
        );
        let mut segments = segment_glyphs(&positions, &edges);
        segments.radius = LINE_RADIUS;
        if segments.len() < edges.len() {
            log::debug!(
                "Skipped {} zero-length segments",
                edges.len() - segments.len()
            );
        }
        Self {
            bounds: BoundingBox::from_points(&positions),
            positions,
            edges,
            segments,
            color: DEFAULT_LINE_COLOR,
            visible: true,
            version: 0,
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn edges(&self) -> &[[u32; 2]] {
        &self.edges
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    /// Thickness relative to the mean segment length.
    pub fn set_radius(&mut self, radius: f32) -> &mut Self {
        self.segments.radius = radius;
        self.version += 1;
        self
    }

    pub fn radius(&self) -> f32 {
        self.segments.radius
    }

    pub fn set_color(&mut self, color: Vec3) -> &mut Self {
        self.color = color;
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

    /// Cylinder instances, one per non-degenerate edge.
    pub fn segment_instances(&self) -> Vec<InstanceData> {
        self.segments.instance_data(self.color.extend(1.0))
    }

    /// Sphere instances, one per position.
    pub fn node_instances(&self) -> Vec<InstanceData> {
        // Cylinder radius in world units is half its radius scale.
        let node_radius = PRIMITIVE_RADIUS
            * self.segments.radius
            * self.segments.base_scale
            * NODE_RADIUS_FACTOR;
        let color = self.color.extend(1.0);
        point_transforms(&self.positions, node_radius, PRIMITIVE_RADIUS)
            .into_iter()
            .map(|t| InstanceData::new(t, color))
            .collect()
    }
}

/// Everything the scene can hold.
#[derive(Clone, Debug)]
pub enum Drawable {
    Mesh(VisualMesh),
    PointCloud(VisualPointCloud),
    LineNetwork(VisualLineNetwork),
}

impl Drawable {
    pub fn bounds(&self) -> BoundingBox {
        match self {
            Drawable::Mesh(m) => m.bounds(),
            Drawable::PointCloud(p) => p.bounds(),
            Drawable::LineNetwork(l) => l.bounds(),
        }
    }

    pub fn version(&self) -> u64 {
        match self {
            Drawable::Mesh(m) => m.version(),
            Drawable::PointCloud(p) => p.version(),
            Drawable::LineNetwork(l) => l.version(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Drawable::Mesh(_) => "mesh",
            Drawable::PointCloud(_) => "point cloud",
            Drawable::LineNetwork(_) => "line network",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{create_box, EDGE_BOUNDARY};

    #[test]
    fn test_visual_mesh_generates_flat_normals() {
        let mesh = Mesh::from_triangles(vec![Vec3::ZERO, Vec3::X, Vec3::Y], &[[0, 1, 2]]);
        let visual = VisualMesh::new(mesh);
        assert!(visual.mesh().has_normals());
        assert_eq!(visual.vertices().len(), 3);
        assert_eq!(visual.vertices()[0].edge_mask, [EDGE_BOUNDARY; 3]);
    }

    #[test]
    fn test_face_colors_override_base_color() {
        let mut visual = VisualMesh::new(create_box());
        let before = visual.version();
        let colors: Vec<Vec3> = (0..6).map(|f| Vec3::new(f as f32 / 5.0, 0.0, 0.0)).collect();
        visual.add_face_colors("heat", colors);
        assert!(visual.version() > before);

        let vertices = visual.vertices();
        assert_eq!(vertices[0].color, [0.0, 0.0, 0.0]);
        assert_eq!(vertices[35].color, [1.0, 0.0, 0.0]);

        let before = visual.version();
        visual.property_mut("heat").unwrap().set_visible(false);
        assert!(visual.version() > before);
        assert_eq!(visual.vertices()[35].color, DEFAULT_MESH_COLOR.to_array());
    }

    #[test]
    fn test_replacing_property_keeps_one_entry() {
        let mut visual = VisualMesh::new(create_box());
        let vectors = vec![Vec3::Y; 6];
        visual.add_face_vectors("v", &vectors);
        visual.add_face_vectors("v", &vectors).set_length(2.0);
        assert_eq!(visual.face_vectors().count(), 1);
        assert_eq!(visual.face_vectors().next().unwrap().1.length(), 2.0);
        assert!(visual.remove_property("v").is_some());
        assert!(visual.property("v").is_none());
    }

    #[test]
    fn test_version_advances_when_colors_replaced_or_removed() {
        let mut visual = VisualMesh::new(create_box());
        visual.add_face_colors("c", vec![Vec3::ONE; 6]).set_visible(false);

        let before = visual.version();
        visual.add_face_colors("c", vec![Vec3::ZERO; 6]);
        assert!(visual.version() > before);

        visual.property_mut("c").unwrap().set_visible(false);
        let before = visual.version();
        visual.remove_property("c");
        assert!(visual.version() > before);
    }

    #[test]
    fn test_point_cloud_radius() {
        let mut cloud = VisualPointCloud::new(vec![Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0)]);
        assert!((cloud.radius() - 5.0 * POINT_RADIUS_FRACTION).abs() < 1e-6);

        cloud.set_radius(0.5);
        let data = cloud.instance_data();
        // Glyph radius equals the requested radius, so the scale is 1.
        assert_eq!(data[1].transform[0][0], 1.0);
        assert_eq!(data[1].transform[3], [3.0, 4.0, 0.0, 1.0]);
        assert_eq!(data[0].color, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_line_network_instances() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::X];
        let network = VisualLineNetwork::new(positions, vec![[0, 1], [1, 2]]);
        assert_eq!(network.num_segments(), 1);
        assert_eq!(network.segment_instances().len(), 1);
        assert_eq!(network.node_instances().len(), 3);
    }

    #[test]
    #[should_panic(expected = "edge index out of range")]
    fn test_line_network_rejects_bad_edges() {
        VisualLineNetwork::new(vec![Vec3::ZERO], vec![[0, 1]]);
    }
}
