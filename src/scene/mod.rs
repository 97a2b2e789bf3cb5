//! Named collection of drawables.
//!
//! The scene owns all CPU-side visual state. It knows nothing about the GPU;
//! the renderer compares [`Scene::revision`] and per-drawable versions to decide
//! what to re-upload.

mod drawable;
mod property;

pub use drawable::*;
pub use property::*;

use glam::Vec3;

use crate::geometry::{BoundingBox, Mesh};

#[derive(Default)]
pub struct Scene {
    entries: Vec<(String, Drawable)>,
    revision: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mesh, generating flat normals if it has none.
    pub fn add_mesh(&mut self, name: &str, mesh: Mesh) -> &mut VisualMesh {
        log::info!(
            "Adding mesh '{name}': {} vertices, {} faces",
            mesh.num_vertices(),
            mesh.num_faces()
        );
        match self.insert(name, Drawable::Mesh(VisualMesh::new(mesh))) {
            Drawable::Mesh(m) => m,
            _ => unreachable!(),
        }
    }

    pub fn add_point_cloud(&mut self, name: &str, points: Vec<Vec3>) -> &mut VisualPointCloud {
        log::info!("Adding point cloud '{name}': {} points", points.len());
        match self.insert(name, Drawable::PointCloud(VisualPointCloud::new(points))) {
            Drawable::PointCloud(p) => p,
            _ => unreachable!(),
        }
    }

    pub fn add_line_network(
        &mut self,
        name: &str,
        positions: Vec<Vec3>,
        edges: Vec<[u32; 2]>,
    ) -> &mut VisualLineNetwork {
        log::info!(
            "Adding line network '{name}': {} nodes, {} edges",
            positions.len(),
            edges.len()
        );
        let network = VisualLineNetwork::new(positions, edges);
        match self.insert(name, Drawable::LineNetwork(network)) {
            Drawable::LineNetwork(l) => l,
            _ => unreachable!(),
        }
    }

    /// Insert or replace by name.
    fn insert(&mut self, name: &str, drawable: Drawable) -> &mut Drawable {
        self.revision += 1;
        let index = match self.entries.iter().position(|(n, _)| n == name) {
            Some(i) => {
                log::debug!("Replacing drawable '{name}'");
                self.entries[i].1 = drawable;
                i
            }
            None => {
                self.entries.push((name.to_string(), drawable));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }

    pub fn remove(&mut self, name: &str) -> Option<Drawable> {
        let index = self.entries.iter().position(|(n, _)| n == name)?;
        self.revision += 1;
        Some(self.entries.remove(index).1)
    }

    pub fn get(&self, name: &str) -> Option<&Drawable> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, d)| d)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Drawable> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d)
    }

    pub fn mesh_mut(&mut self, name: &str) -> Option<&mut VisualMesh> {
        match self.get_mut(name)? {
            Drawable::Mesh(m) => Some(m),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Drawable)> {
        self.entries.iter().map(|(n, d)| (n.as_str(), d))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Drawable)> {
        self.entries.iter_mut().map(|(n, d)| (n.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bumped when drawables are added, replaced or removed.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Union of every drawable's bounds; empty for an empty scene.
    pub fn bounds(&self) -> BoundingBox {
        self.entries
            .iter()
            .fold(BoundingBox::default(), |acc, (_, d)| acc.merged(&d.bounds()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::create_box;

    #[test]
    fn test_bounds_merge_all_drawables() {
        let mut scene = Scene::new();
        assert!(scene.bounds().is_empty());

        scene.add_mesh("box", create_box());
        scene.add_point_cloud("points", vec![Vec3::new(2.0, 0.0, 0.0)]);
        scene.add_line_network(
            "line",
            vec![Vec3::new(0.0, -3.0, 0.0), Vec3::new(0.0, 0.0, 1.0)],
            vec![[0, 1]],
        );

        let bounds = scene.bounds();
        assert_eq!(bounds.lower, Vec3::new(-0.5, -3.0, -0.5));
        assert_eq!(bounds.upper, Vec3::new(2.0, 0.5, 1.0));
    }

    #[test]
    fn test_same_name_replaces() {
        let mut scene = Scene::new();
        scene.add_mesh("a", create_box());
        scene.add_point_cloud("a", vec![Vec3::ZERO]);
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.get("a").unwrap().kind(), "point cloud");
        assert!(scene.mesh_mut("a").is_none());
        assert_eq!(scene.revision(), 2);
    }

    #[test]
    fn test_remove() {
        let mut scene = Scene::new();
        scene.add_mesh("a", create_box());
        assert!(scene.remove("missing").is_none());
        assert!(scene.remove("a").is_some());
        assert!(scene.is_empty());
        assert_eq!(scene.revision(), 2);
    }
}
