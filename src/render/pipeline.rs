use wgpu::{
    BindGroupLayout, BlendState, ColorTargetState, ColorWrites, CompareFunction, DepthStencilState,
    Device, Face, FragmentState, FrontFace, MultisampleState, PipelineLayoutDescriptor,
    PolygonMode, PrimitiveState, PrimitiveTopology, RenderPipeline, RenderPipelineDescriptor,
    ShaderModule, StencilState, TextureFormat, TextureView, VertexBufferLayout, VertexState,
};

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Builder for triangle-list render pipelines.
pub struct PipelineBuilder<'a> {
    device: &'a Device,
    shader: Option<&'a ShaderModule>,
    vertex_layouts: Vec<VertexBufferLayout<'a>>,
    bind_group_layouts: Vec<&'a BindGroupLayout>,
    format: TextureFormat,
    cull_mode: Option<Face>,
    depth_write: bool,
    blend: BlendState,
    label: Option<&'a str>,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new(device: &'a Device, format: TextureFormat) -> Self {
        Self {
            device,
            shader: None,
            vertex_layouts: Vec::new(),
            bind_group_layouts: Vec::new(),
            format,
            cull_mode: Some(Face::Back),
            depth_write: true,
            blend: BlendState::REPLACE,
            label: None,
        }
    }

    pub fn shader(mut self, shader: &'a ShaderModule) -> Self {
        self.shader = Some(shader);
        self
    }

    /// Add a vertex buffer slot; slots are numbered in call order.
    pub fn vertex_layout(mut self, layout: VertexBufferLayout<'a>) -> Self {
        self.vertex_layouts.push(layout);
        self
    }

    pub fn bind_group_layout(mut self, layout: &'a BindGroupLayout) -> Self {
        self.bind_group_layouts.push(layout);
        self
    }

    pub fn cull_mode(mut self, mode: Option<Face>) -> Self {
        self.cull_mode = mode;
        self
    }

    pub fn depth_write(mut self, write: bool) -> Self {
        self.depth_write = write;
        self
    }

    pub fn alpha_blend(mut self) -> Self {
        self.blend = BlendState::ALPHA_BLENDING;
        self
    }

    pub fn label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    /// # Panics
    /// If no shader was set.
    pub fn build(self) -> RenderPipeline {
        let shader = self.shader.expect("Shader required");

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&PipelineLayoutDescriptor {
                label: self.label,
                bind_group_layouts: &self.bind_group_layouts,
                push_constant_ranges: &[],
            });

        self.device
            .create_render_pipeline(&RenderPipelineDescriptor {
                label: self.label,
                layout: Some(&pipeline_layout),
                vertex: VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    buffers: &self.vertex_layouts,
                    compilation_options: Default::default(),
                },
                fragment: Some(FragmentState {
                    module: shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(ColorTargetState {
                        format: self.format,
                        blend: Some(self.blend),
                        write_mask: ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: PrimitiveState {
                    topology: PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: FrontFace::Ccw,
                    cull_mode: self.cull_mode,
                    polygon_mode: PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: self.depth_write,
                    depth_compare: CompareFunction::LessEqual,
                    stencil: StencilState::default(),
                    bias: Default::default(),
                }),
                multisample: MultisampleState::default(),
                multiview: None,
                cache: None,
            })
    }
}

/// Create a depth attachment matching the surface size.
pub fn create_depth_view(device: &Device, width: u32, height: u32) -> TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}
