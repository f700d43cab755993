use crate::device::Device;

/// Filtering/addressing configuration for a sampler.
#[derive(Debug, Clone)]
pub struct SamplerDesc {
    pub mag_filter: wgpu::FilterMode,
    pub min_filter: wgpu::FilterMode,
    pub address_mode: wgpu::AddressMode,
}

impl Default for SamplerDesc {
    fn default() -> Self {
        Self {
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            address_mode: wgpu::AddressMode::ClampToEdge,
        }
    }
}

/// Stateless filtering/addressing configuration; immutable once created
/// and freely shared across binding sets.
pub struct Sampler {
    raw: wgpu::Sampler,
}

impl Sampler {
    pub fn new(device: &Device, label: &str, desc: &SamplerDesc) -> Self {
        let raw = device.raw().create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: desc.address_mode,
            address_mode_v: desc.address_mode,
            address_mode_w: desc.address_mode,
            mag_filter: desc.mag_filter,
            min_filter: desc.min_filter,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Self { raw }
    }

    /// Linear filtering with clamped addressing, the common sampling
    /// setup for atlas textures.
    pub fn linear(device: &Device, label: &str) -> Self {
        Self::new(device, label, &SamplerDesc::default())
    }

    pub(crate) fn raw(&self) -> &wgpu::Sampler {
        &self.raw
    }
}
