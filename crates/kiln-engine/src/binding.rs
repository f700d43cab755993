//! Binding sets: slot index → concrete resource.
//!
//! A binding set is validated once, at construction, against the layout
//! declared by a specific pipeline. Mismatches fail here, before any
//! command referencing the set can be recorded, let alone submitted.

use crate::device::Device;
use crate::error::Result;
use crate::pipeline::{BindingContract, BindingKind};
use crate::resource::{Buffer, Sampler, Texture};

/// A concrete resource offered for one binding slot.
///
/// Holds a non-owning reference; the resource must outlive the set.
pub enum BindingResource<'a> {
    Uniform(&'a Buffer),
    Storage(&'a Buffer),
    Texture(&'a Texture),
    Sampler(&'a Sampler),
}

impl BindingResource<'_> {
    fn kind(&self) -> BindingKind {
        match self {
            BindingResource::Uniform(_) => BindingKind::UniformBuffer,
            // Access mode comes from the declared layout, not the offer.
            BindingResource::Storage(_) => BindingKind::StorageBuffer { read_only: false },
            BindingResource::Texture(_) => BindingKind::Texture,
            BindingResource::Sampler(_) => BindingKind::Sampler,
        }
    }

    /// Checks the resource's own usage set against what the slot implies.
    fn check_usage(&self) -> Result<()> {
        match self {
            BindingResource::Uniform(buffer) => buffer.require(wgpu::BufferUsages::UNIFORM),
            BindingResource::Storage(buffer) => buffer.require(wgpu::BufferUsages::STORAGE),
            BindingResource::Texture(texture) => {
                texture.require(wgpu::TextureUsages::TEXTURE_BINDING)
            }
            BindingResource::Sampler(_) => Ok(()),
        }
    }
}

/// An ordered slot→resource mapping validated against one pipeline's
/// declared layout.
///
/// Must be recreated if a bound resource's *identity* changes; in-place
/// mutation of the underlying resource (queue writes) does not invalidate
/// the set.
#[derive(Debug)]
pub struct BindingSet {
    bind_group: wgpu::BindGroup,
}

impl BindingSet {
    /// Validates `entries` against `pipeline`'s declared layout and
    /// builds the GPU binding object.
    ///
    /// Fails with [`Error::PipelineLayoutMismatch`](crate::error::Error::PipelineLayoutMismatch)
    /// on any slot/kind disagreement and with
    /// [`Error::ResourceUsageViolation`](crate::error::Error::ResourceUsageViolation)
    /// when a resource lacks the usage its slot implies.
    pub fn new(
        device: &Device,
        label: &str,
        pipeline: &dyn BindingContract,
        entries: &[(u32, BindingResource<'_>)],
    ) -> Result<Self> {
        let offered: Vec<(u32, BindingKind)> = entries
            .iter()
            .map(|(index, resource)| (*index, resource.kind()))
            .collect();
        pipeline.binding_layout().check(&offered)?;

        for (_, resource) in entries {
            resource.check_usage()?;
        }

        let wgpu_entries: Vec<wgpu::BindGroupEntry<'_>> = entries
            .iter()
            .map(|(index, resource)| wgpu::BindGroupEntry {
                binding: *index,
                resource: match resource {
                    BindingResource::Uniform(buffer) | BindingResource::Storage(buffer) => {
                        buffer.raw().as_entire_binding()
                    }
                    BindingResource::Texture(texture) => {
                        wgpu::BindingResource::TextureView(texture.view())
                    }
                    BindingResource::Sampler(sampler) => {
                        wgpu::BindingResource::Sampler(sampler.raw())
                    }
                },
            })
            .collect();

        let bind_group = device.raw().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: pipeline.bind_group_layout(),
            entries: &wgpu_entries,
        });

        log::trace!("binding set `{label}` validated against `{}`", pipeline.label());

        Ok(Self { bind_group })
    }

    pub(crate) fn raw(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
