use crate::error::{Error, Result};

/// Resource kind expected at a binding slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BindingKind {
    UniformBuffer,
    StorageBuffer {
        /// Whether the shader sees the buffer as read-only storage.
        read_only: bool,
    },
    Texture,
    Sampler,
}

impl BindingKind {
    /// Same resource class, ignoring storage access mode. A read-only
    /// and a read-write storage declaration both accept a storage
    /// buffer; everything else must match exactly.
    fn accepts(self, found: BindingKind) -> bool {
        matches!(
            (self, found),
            (BindingKind::StorageBuffer { .. }, BindingKind::StorageBuffer { .. })
        ) || self == found
    }

    fn describe(self) -> &'static str {
        match self {
            BindingKind::UniformBuffer => "uniform buffer",
            BindingKind::StorageBuffer { read_only: true } => "storage buffer (read)",
            BindingKind::StorageBuffer { read_only: false } => "storage buffer (read_write)",
            BindingKind::Texture => "texture",
            BindingKind::Sampler => "sampler",
        }
    }

    fn to_wgpu(self) -> wgpu::BindingType {
        match self {
            BindingKind::UniformBuffer => wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            BindingKind::StorageBuffer { read_only } => wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            BindingKind::Texture => wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            BindingKind::Sampler => wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        }
    }
}

/// One declared slot: index, resource kind, and visible shader stages.
#[derive(Debug, Copy, Clone)]
pub struct BindingSlot {
    pub index: u32,
    pub kind: BindingKind,
    pub visibility: wgpu::ShaderStages,
}

/// The declared contract of which resource kinds live at which slot
/// indices, visible to which stages.
///
/// Declared explicitly at pipeline construction (no reflection-derived
/// `layout: auto`); every binding set used with the pipeline must satisfy
/// it exactly.
#[derive(Debug, Clone, Default)]
pub struct BindingLayout {
    slots: Vec<BindingSlot>,
}

impl BindingLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a slot declaration. Slots are conventionally declared in
    /// ascending index order, matching the shader's `@binding` attributes.
    pub fn with_slot(
        mut self,
        index: u32,
        kind: BindingKind,
        visibility: wgpu::ShaderStages,
    ) -> Self {
        self.slots.push(BindingSlot {
            index,
            kind,
            visibility,
        });
        self
    }

    pub fn slots(&self) -> &[BindingSlot] {
        &self.slots
    }

    /// Structurally validates a proposed set of `(slot index, kind)`
    /// entries against this layout.
    ///
    /// Every declared slot must be bound with a compatible kind, nothing
    /// may bind to an undeclared index, and nothing is ever coerced to a
    /// nearby slot.
    pub(crate) fn check(&self, provided: &[(u32, BindingKind)]) -> Result<()> {
        for &(index, found) in provided {
            let Some(slot) = self.slots.iter().find(|s| s.index == index) else {
                return Err(Error::PipelineLayoutMismatch {
                    slot: index,
                    expected: "no slot declared at this index".to_string(),
                    found: found.describe().to_string(),
                });
            };

            if !slot.kind.accepts(found) {
                return Err(Error::PipelineLayoutMismatch {
                    slot: index,
                    expected: slot.kind.describe().to_string(),
                    found: found.describe().to_string(),
                });
            }
        }

        for slot in &self.slots {
            if !provided.iter().any(|&(index, _)| index == slot.index) {
                return Err(Error::PipelineLayoutMismatch {
                    slot: slot.index,
                    expected: slot.kind.describe().to_string(),
                    found: "nothing bound".to_string(),
                });
            }
        }

        Ok(())
    }

    pub(crate) fn to_wgpu(&self, device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
        let entries: Vec<wgpu::BindGroupLayoutEntry> = self
            .slots
            .iter()
            .map(|slot| wgpu::BindGroupLayoutEntry {
                binding: slot.index,
                visibility: slot.visibility,
                ty: slot.kind.to_wgpu(),
                count: None,
            })
            .collect();

        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_layout() -> BindingLayout {
        BindingLayout::new()
            .with_slot(0, BindingKind::Texture, wgpu::ShaderStages::FRAGMENT)
            .with_slot(1, BindingKind::Sampler, wgpu::ShaderStages::FRAGMENT)
    }

    #[test]
    fn exact_match_passes() {
        let layout = quad_layout();
        layout
            .check(&[(0, BindingKind::Texture), (1, BindingKind::Sampler)])
            .unwrap();
    }

    #[test]
    fn undeclared_slot_is_a_mismatch() {
        let layout = quad_layout();
        let err = layout
            .check(&[
                (0, BindingKind::Texture),
                (1, BindingKind::Sampler),
                (2, BindingKind::Sampler),
            ])
            .unwrap_err();

        match err {
            Error::PipelineLayoutMismatch { slot, .. } => assert_eq!(slot, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn wrong_kind_is_not_coerced_to_a_nearby_slot() {
        // Sampler offered where the texture is declared: must fail at
        // slot 0, not silently bind to slot 1.
        let layout = quad_layout();
        let err = layout
            .check(&[(0, BindingKind::Sampler), (1, BindingKind::Sampler)])
            .unwrap_err();

        match err {
            Error::PipelineLayoutMismatch { slot, .. } => assert_eq!(slot, 0),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_slot_is_a_mismatch() {
        let layout = quad_layout();
        let err = layout.check(&[(0, BindingKind::Texture)]).unwrap_err();

        match err {
            Error::PipelineLayoutMismatch { slot, found, .. } => {
                assert_eq!(slot, 1);
                assert_eq!(found, "nothing bound");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn storage_access_mode_does_not_split_the_class() {
        let layout = BindingLayout::new().with_slot(
            0,
            BindingKind::StorageBuffer { read_only: false },
            wgpu::ShaderStages::COMPUTE,
        );
        layout
            .check(&[(0, BindingKind::StorageBuffer { read_only: true })])
            .unwrap();
    }

    #[test]
    fn uniform_does_not_satisfy_storage() {
        let layout = BindingLayout::new().with_slot(
            0,
            BindingKind::StorageBuffer { read_only: false },
            wgpu::ShaderStages::COMPUTE,
        );
        let err = layout
            .check(&[(0, BindingKind::UniformBuffer)])
            .unwrap_err();
        assert!(matches!(err, Error::PipelineLayoutMismatch { slot: 0, .. }));
    }
}
