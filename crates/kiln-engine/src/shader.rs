//! Compiled shader programs.
//!
//! Shader source is opaque WGSL text compiled by wgpu; this layer only
//! carries the module handle. Entry-point names referenced at pipeline
//! construction must exactly match names declared in the source.

use crate::device::Device;

/// An immutable compiled GPU program, possibly naming several entry
/// points (compute, vertex, fragment). May be shared by multiple
/// pipelines.
pub struct ShaderProgram {
    module: wgpu::ShaderModule,
    label: String,
}

impl ShaderProgram {
    /// Compiles WGSL source text.
    ///
    /// Malformed source surfaces through wgpu's error scopes at pipeline
    /// construction; this call itself does not validate entry points.
    pub fn new(device: &Device, label: &str, source: &str) -> Self {
        let module = device
            .raw()
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });

        Self {
            module,
            label: label.to_string(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }
}
