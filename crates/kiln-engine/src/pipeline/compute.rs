use crate::device::Device;
use crate::shader::ShaderProgram;

use super::layout::BindingLayout;
use super::BindingContract;

/// A compiled data-parallel pipeline around one compute entry point.
///
/// The pipeline declares its per-invocation grain in the shader's
/// `@workgroup_size`; how many invocation groups actually run is decided
/// by the caller at encode time
/// ([`CommandSequence::compute_pass`](crate::command::CommandSequence::compute_pass)),
/// never implied here.
pub struct ComputePipeline {
    raw: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    layout: BindingLayout,
    label: String,
}

impl ComputePipeline {
    /// Builds the pipeline from one shader entry point and an explicit
    /// binding layout.
    ///
    /// `entry_point` must exactly match a `@compute` function name in the
    /// shader source.
    pub fn new(
        device: &Device,
        label: &str,
        shader: &ShaderProgram,
        entry_point: &str,
        layout: BindingLayout,
    ) -> Self {
        let bind_group_layout = layout.to_wgpu(device.raw(), label);

        let pipeline_layout = device
            .raw()
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(label),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        let raw = device
            .raw()
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                module: shader.module(),
                entry_point: Some(entry_point),
                compilation_options: Default::default(),
                cache: None,
            });

        Self {
            raw,
            bind_group_layout,
            layout,
            label: label.to_string(),
        }
    }

    pub(crate) fn raw(&self) -> &wgpu::ComputePipeline {
        &self.raw
    }
}

impl BindingContract for ComputePipeline {
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
