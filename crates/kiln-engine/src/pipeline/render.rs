use crate::device::Device;
use crate::shader::ShaderProgram;

use super::layout::BindingLayout;
use super::BindingContract;

/// Vertex attribute layout: stride plus per-attribute offset/format list.
///
/// The demonstrated quad layout is stride 24 with a `float32x4` position
/// at offset 0 and a `float32x2` UV at offset 16.
#[derive(Debug, Clone)]
pub struct VertexLayout {
    stride: u64,
    attributes: Vec<wgpu::VertexAttribute>,
}

impl VertexLayout {
    pub fn new(stride: u64) -> Self {
        Self {
            stride,
            attributes: Vec::new(),
        }
    }

    /// Appends an attribute at `offset`, wired to `@location(location)`
    /// in the vertex shader.
    pub fn with_attribute(
        mut self,
        location: u32,
        offset: u64,
        format: wgpu::VertexFormat,
    ) -> Self {
        self.attributes.push(wgpu::VertexAttribute {
            format,
            offset,
            shader_location: location,
        });
        self
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    fn as_wgpu(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.attributes,
        }
    }
}

/// Everything a render pipeline is built from: two shader entry points,
/// vertex layout, fixed-function state, and the explicit binding layout.
pub struct RenderPipelineDesc<'a> {
    pub label: &'a str,
    pub vertex_shader: &'a ShaderProgram,
    pub vertex_entry: &'a str,
    pub fragment_shader: &'a ShaderProgram,
    pub fragment_entry: &'a str,
    pub vertex_layout: VertexLayout,
    pub topology: wgpu::PrimitiveTopology,
    /// Must match the eventual target: the presentation surface's
    /// negotiated format, or an offscreen texture's format.
    pub color_format: wgpu::TextureFormat,
    pub blend: Option<wgpu::BlendState>,
    pub binding_layout: BindingLayout,
}

/// A compiled rasterization pipeline; immutable once created.
pub struct RenderPipeline {
    raw: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    layout: BindingLayout,
    label: String,
}

impl RenderPipeline {
    /// Builds the pipeline. Entry-point names must exactly match
    /// `@vertex` / `@fragment` function names in their shader sources.
    pub fn new(device: &Device, desc: &RenderPipelineDesc<'_>) -> Self {
        let bind_group_layout = desc.binding_layout.to_wgpu(device.raw(), desc.label);

        let pipeline_layout = device
            .raw()
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(desc.label),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        let raw = device
            .raw()
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(desc.label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: desc.vertex_shader.module(),
                    entry_point: Some(desc.vertex_entry),
                    compilation_options: Default::default(),
                    buffers: &[desc.vertex_layout.as_wgpu()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: desc.fragment_shader.module(),
                    entry_point: Some(desc.fragment_entry),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: desc.color_format,
                        blend: desc.blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: desc.topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        Self {
            raw,
            bind_group_layout,
            layout: desc.binding_layout.clone(),
            label: desc.label.to_string(),
        }
    }

    pub(crate) fn raw(&self) -> &wgpu::RenderPipeline {
        &self.raw
    }
}

impl BindingContract for RenderPipeline {
    fn binding_layout(&self) -> &BindingLayout {
        &self.layout
    }

    fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    fn label(&self) -> &str {
        &self.label
    }
}
