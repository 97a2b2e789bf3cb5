use wgpu::{
    include_wgsl, BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout,
    BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType, Buffer, BufferBindingType,
    Device, RenderPass, RenderPipeline, ShaderStages, TextureView,
};

use super::{
    create_depth_view, create_uniform_buffer, GpuContext, PipelineBuilder, SceneCache, Uniforms,
};
use crate::geometry::{GlyphVertex, InstanceData, MeshVertex};
use crate::scene::Scene;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.1,
    b: 0.15,
    a: 1.0,
};

fn uniform_layout(device: &Device, label: &str) -> BindGroupLayout {
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

/// Draws a [`Scene`]: shaded meshes with wireframe overlay, then glyph
/// instances (vector arrows, point spheres, line cylinders).
pub struct Renderer {
    mesh_pipeline: RenderPipeline,
    glyph_pipeline: RenderPipeline,
    uniform_buffer: Buffer,
    bind_group: BindGroup,
    style_layout: BindGroupLayout,
    depth_view: TextureView,
    cache: SceneCache,
}

impl Renderer {
    pub fn new(gpu: &GpuContext, initial_uniforms: &Uniforms) -> Self {
        let mesh_shader = gpu
            .device
            .create_shader_module(include_wgsl!("../shaders/mesh.wgsl"));
        let glyph_shader = gpu
            .device
            .create_shader_module(include_wgsl!("../shaders/instanced.wgsl"));

        let uniform_buffer = create_uniform_buffer(&gpu.device, initial_uniforms, "uniforms");
        let bind_group_layout = uniform_layout(&gpu.device, "uniform_bind_group_layout");
        let style_layout = uniform_layout(&gpu.device, "mesh_style_layout");

        let bind_group = gpu.device.create_bind_group(&BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        // Loaded meshes have no guaranteed winding, so both sides are drawn.
        let mesh_pipeline = PipelineBuilder::new(&gpu.device, gpu.format)
            .shader(&mesh_shader)
            .vertex_layout(MeshVertex::desc())
            .bind_group_layout(&bind_group_layout)
            .bind_group_layout(&style_layout)
            .cull_mode(None)
            .alpha_blend()
            .label("mesh_pipeline")
            .build();

        let glyph_pipeline = PipelineBuilder::new(&gpu.device, gpu.format)
            .shader(&glyph_shader)
            .vertex_layout(GlyphVertex::desc())
            .vertex_layout(InstanceData::desc())
            .bind_group_layout(&bind_group_layout)
            .label("glyph_pipeline")
            .build();

        let depth_view = create_depth_view(&gpu.device, gpu.size.width, gpu.size.height);
        let cache = SceneCache::new(&gpu.device);

        Self {
            mesh_pipeline,
            glyph_pipeline,
            uniform_buffer,
            bind_group,
            style_layout,
            depth_view,
            cache,
        }
    }

    pub fn resize(&mut self, device: &Device, width: u32, height: u32) {
        self.depth_view = create_depth_view(device, width, height);
    }

    /// Upload whatever changed in `scene` since the last call.
    pub fn sync(&mut self, gpu: &GpuContext, scene: &Scene) {
        self.cache
            .sync(&gpu.device, &gpu.queue, &self.style_layout, scene);
    }

    pub fn render(&mut self, gpu: &mut GpuContext, uniforms: &Uniforms) {
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.resize(gpu.size);
                self.resize(&gpu.device, gpu.size.width, gpu.size.height);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                panic!("Out of GPU memory");
            }
            Err(e) => {
                log::warn!("Surface error: {e:?}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.bind_group, &[]);
            self.draw_glyphs(&mut render_pass);
            // Meshes last so wireframe-only fragments blend over glyphs.
            self.draw_meshes(&mut render_pass);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    fn draw_meshes(&self, render_pass: &mut RenderPass<'_>) {
        render_pass.set_pipeline(&self.mesh_pipeline);
        for entry in &self.cache.entries {
            let Some(mesh) = &entry.mesh else { continue };
            let Some(vertex_buffer) = &mesh.vertex_buffer else {
                continue;
            };
            if !mesh.visible {
                continue;
            }
            render_pass.set_bind_group(1, &mesh.style_bind_group, &[]);
            render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
            render_pass.draw(0..mesh.vertex_count, 0..1);
        }
    }

    fn draw_glyphs(&self, render_pass: &mut RenderPass<'_>) {
        render_pass.set_pipeline(&self.glyph_pipeline);
        for batch in self.cache.entries.iter().flat_map(|e| &e.batches) {
            if !batch.visible {
                continue;
            }
            let Some((instances, count)) = batch.instances.get() else {
                continue;
            };
            let glyph = self.cache.glyphs.get(batch.kind);
            render_pass.set_vertex_buffer(0, glyph.vertex_buffer.slice(..));
            render_pass.set_vertex_buffer(1, instances.slice(..));
            render_pass.draw(0..glyph.vertex_count, 0..count);
        }
    }
}
