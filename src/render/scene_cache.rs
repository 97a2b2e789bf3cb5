//! GPU copies of scene content, refreshed from drawable versions.

use wgpu::{BindGroup, BindGroupLayout, Buffer, Device, Queue};

use super::{create_uniform_buffer, create_vertex_buffer, InstanceBuffer, MeshStyle};
use crate::geometry::{
    create_arrow, create_cylinder, create_sphere, expand_glyph_vertices, GlyphVertex,
};
use crate::scene::{Drawable, Scene, VisualMesh};
use crate::util::Timed;

const ARROW_SEGMENTS: u32 = 16;
const CYLINDER_SEGMENTS: u32 = 12;
const SPHERE_LATITUDES: u32 = 10;
const SPHERE_LONGITUDES: u32 = 10;

/// Which shared glyph mesh an instance batch is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlyphKind {
    Arrow,
    Cylinder,
    Sphere,
}

/// A non-indexed glyph mesh shared by every instance batch.
pub struct GlyphMesh {
    pub vertex_buffer: Buffer,
    pub vertex_count: u32,
}

/// The three glyph meshes, uploaded once.
pub struct GlyphMeshes {
    pub arrow: GlyphMesh,
    pub cylinder: GlyphMesh,
    pub sphere: GlyphMesh,
}

impl GlyphMeshes {
    pub fn new(device: &Device) -> Self {
        let upload = |vertices: Vec<GlyphVertex>, label: &str| GlyphMesh {
            vertex_buffer: create_vertex_buffer(device, &vertices, label),
            vertex_count: vertices.len() as u32,
        };

        Self {
            arrow: upload(expand_glyph_vertices(&create_arrow(ARROW_SEGMENTS)), "arrow_glyph"),
            cylinder: upload(
                expand_glyph_vertices(&create_cylinder(CYLINDER_SEGMENTS)),
                "cylinder_glyph",
            ),
            sphere: upload(
                expand_glyph_vertices(&create_sphere(SPHERE_LATITUDES, SPHERE_LONGITUDES)),
                "sphere_glyph",
            ),
        }
    }

    pub fn get(&self, kind: GlyphKind) -> &GlyphMesh {
        match kind {
            GlyphKind::Arrow => &self.arrow,
            GlyphKind::Cylinder => &self.cylinder,
            GlyphKind::Sphere => &self.sphere,
        }
    }
}

/// Instances of one glyph kind, tagged with the version they were built from.
pub struct GlyphBatch {
    pub kind: GlyphKind,
    pub instances: InstanceBuffer,
    pub visible: bool,
    version: Option<u64>,
}

impl GlyphBatch {
    fn new(kind: GlyphKind, label: &str) -> Self {
        Self {
            kind,
            instances: InstanceBuffer::new(label),
            visible: true,
            version: None,
        }
    }
}

/// Expanded triangle corners and style of one mesh.
pub struct MeshEntry {
    pub vertex_buffer: Option<Buffer>,
    pub vertex_count: u32,
    pub style_buffer: Buffer,
    pub style_bind_group: BindGroup,
    pub visible: bool,
    version: Option<u64>,
}

pub struct CachedDrawable {
    pub name: String,
    pub mesh: Option<MeshEntry>,
    pub batches: Vec<GlyphBatch>,
    property_revision: Option<u64>,
}

/// GPU-side mirror of a [`Scene`].
///
/// Adding or removing drawables rebuilds the entry list; otherwise only
/// drawables whose version changed are re-uploaded.
pub struct SceneCache {
    pub glyphs: GlyphMeshes,
    pub entries: Vec<CachedDrawable>,
    revision: Option<u64>,
}

impl SceneCache {
    pub fn new(device: &Device) -> Self {
        Self {
            glyphs: GlyphMeshes::new(device),
            entries: Vec::new(),
            revision: None,
        }
    }

    pub fn sync(
        &mut self,
        device: &Device,
        queue: &Queue,
        style_layout: &BindGroupLayout,
        scene: &Scene,
    ) {
        if self.revision != Some(scene.revision()) {
            let _t = Timed::debug("Rebuild scene cache");
            self.entries = scene
                .iter()
                .map(|(name, drawable)| CachedDrawable::new(device, style_layout, name, drawable))
                .collect();
            self.revision = Some(scene.revision());
        }

        for (entry, (_, drawable)) in self.entries.iter_mut().zip(scene.iter()) {
            entry.update(device, queue, drawable);
        }
    }
}

impl CachedDrawable {
    fn new(device: &Device, style_layout: &BindGroupLayout, name: &str, drawable: &Drawable) -> Self {
        let mut mesh = None;
        let mut batches = Vec::new();
        match drawable {
            Drawable::Mesh(visual) => {
                let style = MeshStyle::new(visual.show_mesh(), visual.show_wireframe());
                let style_buffer = create_uniform_buffer(device, &style, "mesh_style");
                let style_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("mesh_style_bind_group"),
                    layout: style_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: style_buffer.as_entire_binding(),
                    }],
                });
                mesh = Some(MeshEntry {
                    vertex_buffer: None,
                    vertex_count: 0,
                    style_buffer,
                    style_bind_group,
                    visible: true,
                    version: None,
                });
            }
            Drawable::PointCloud(_) => {
                batches.push(GlyphBatch::new(GlyphKind::Sphere, "point_instances"));
            }
            Drawable::LineNetwork(_) => {
                batches.push(GlyphBatch::new(GlyphKind::Cylinder, "segment_instances"));
                batches.push(GlyphBatch::new(GlyphKind::Sphere, "node_instances"));
            }
        }
        Self {
            name: name.to_string(),
            mesh,
            batches,
            property_revision: None,
        }
    }

    fn update(&mut self, device: &Device, queue: &Queue, drawable: &Drawable) {
        match drawable {
            Drawable::Mesh(visual) => {
                if let Some(mesh) = &mut self.mesh {
                    mesh.update(device, queue, visual);
                }
                self.update_vectors(device, queue, visual);
            }
            Drawable::PointCloud(cloud) => {
                let version = cloud.version();
                if let Some(batch) = self.batches.first_mut() {
                    if batch.version != Some(version) {
                        batch.instances.write(device, queue, &cloud.instance_data());
                        batch.visible = cloud.visible();
                        batch.version = Some(version);
                    }
                }
            }
            Drawable::LineNetwork(network) => {
                let version = network.version();
                if let [segments, nodes] = self.batches.as_mut_slice() {
                    if segments.version != Some(version) {
                        segments
                            .instances
                            .write(device, queue, &network.segment_instances());
                        nodes.instances.write(device, queue, &network.node_instances());
                        segments.visible = network.visible();
                        nodes.visible = network.visible();
                        segments.version = Some(version);
                        nodes.version = Some(version);
                    }
                }
            }
        }
    }

    /// One arrow batch per face vector property, in property order.
    fn update_vectors(&mut self, device: &Device, queue: &Queue, visual: &VisualMesh) {
        if self.property_revision != Some(visual.property_revision()) {
            let count = visual.face_vectors().count();
            log::debug!("'{}': {} vector overlays", self.name, count);
            self.batches = (0..count)
                .map(|_| GlyphBatch::new(GlyphKind::Arrow, "vector_instances"))
                .collect();
            self.property_revision = Some(visual.property_revision());
        }
        for (batch, (_, vectors)) in self.batches.iter_mut().zip(visual.face_vectors()) {
            if batch.version != Some(vectors.version()) {
                batch.instances.write(device, queue, &vectors.instance_data());
                batch.visible = vectors.visible();
                batch.version = Some(vectors.version());
            }
        }
    }
}

impl MeshEntry {
    fn update(&mut self, device: &Device, queue: &Queue, visual: &VisualMesh) {
        let version = visual.version();
        if self.version == Some(version) {
            return;
        }
        let vertices = visual.vertices();
        self.vertex_buffer = if vertices.is_empty() {
            None
        } else {
            Some(create_vertex_buffer(device, &vertices, "mesh_vertices"))
        };
        self.vertex_count = vertices.len() as u32;

        let style = MeshStyle::new(visual.show_mesh(), visual.show_wireframe());
        queue.write_buffer(&self.style_buffer, 0, bytemuck::bytes_of(&style));
        self.visible = visual.show_mesh() || visual.show_wireframe();
        self.version = Some(version);
    }
}
