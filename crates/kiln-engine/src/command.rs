//! Command sequences: ordered, single-use lists of GPU operations.
//!
//! A sequence records zero or more passes and copies, is frozen by
//! [`CommandSequence::finish`], and is handed to the queue by
//! [`Device::submit`](crate::device::Device::submit). Move semantics make
//! resubmission and post-finish mutation unrepresentable.

use std::ops::Range;

use crate::binding::BindingSet;
use crate::device::Device;
use crate::error::Result;
use crate::pipeline::{ComputePipeline, RenderPipeline};
use crate::resource::{Buffer, Texture};

/// Load policy for a render target that is not being preserved.
#[derive(Debug, Copy, Clone)]
pub enum ClearOp {
    /// Clear to a color before the pass runs.
    Clear(wgpu::Color),
    /// Keep whatever the target already holds.
    Preserve,
}

/// One recorded render pass: target, clear policy, pipeline, bindings,
/// vertex buffers, and an explicit draw range.
pub struct RenderPassDesc<'a> {
    /// A presentation frame's view, or an explicit texture view.
    pub target: &'a wgpu::TextureView,
    pub clear: ClearOp,
    pub pipeline: &'a RenderPipeline,
    /// `None` for pipelines with an empty binding layout.
    pub bindings: Option<&'a BindingSet>,
    pub vertex_buffers: &'a [&'a Buffer],
    pub vertices: Range<u32>,
    pub instances: Range<u32>,
}

/// An open command sequence.
pub struct CommandSequence {
    encoder: wgpu::CommandEncoder,
    label: String,
    dispatches: u32,
    draws: u32,
    copies: u32,
}

impl CommandSequence {
    pub fn new(device: &Device, label: &str) -> Self {
        let encoder = device
            .raw()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) });

        Self {
            encoder,
            label: label.to_string(),
            dispatches: 0,
            draws: 0,
            copies: 0,
        }
    }

    /// Records one compute pass: bind pipeline + binding set, dispatch an
    /// explicit grid of invocation groups.
    ///
    /// A zero anywhere in `groups` records no dispatch at all. The grid
    /// size is the caller's statement of how much work exists; "none"
    /// means exactly that, not an undefined-count dispatch.
    pub fn compute_pass(
        &mut self,
        pipeline: &ComputePipeline,
        bindings: &BindingSet,
        groups: [u32; 3],
    ) {
        if groups.iter().any(|&n| n == 0) {
            log::debug!("`{}`: empty dispatch grid {groups:?}, nothing recorded", self.label);
            return;
        }

        let mut pass = self
            .encoder
            .begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(self.label.as_str()),
                timestamp_writes: None,
            });

        pass.set_pipeline(pipeline.raw());
        pass.set_bind_group(0, bindings.raw(), &[]);
        pass.dispatch_workgroups(groups[0], groups[1], groups[2]);
        drop(pass);

        self.dispatches += 1;
    }

    /// Records one render pass with a single draw call.
    ///
    /// Vertex buffers are usage-checked before anything is recorded.
    pub fn render_pass(&mut self, desc: &RenderPassDesc<'_>) -> Result<()> {
        for buffer in desc.vertex_buffers {
            buffer.require(wgpu::BufferUsages::VERTEX)?;
        }

        let load = match desc.clear {
            ClearOp::Clear(color) => wgpu::LoadOp::Clear(color),
            ClearOp::Preserve => wgpu::LoadOp::Load,
        };

        let mut pass = self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(self.label.as_str()),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: desc.target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_pipeline(desc.pipeline.raw());
        if let Some(bindings) = desc.bindings {
            pass.set_bind_group(0, bindings.raw(), &[]);
        }
        for (i, buffer) in desc.vertex_buffers.iter().enumerate() {
            pass.set_vertex_buffer(i as u32, buffer.raw().slice(..));
        }
        pass.draw(desc.vertices.clone(), desc.instances.clone());
        drop(pass);

        self.draws += 1;
        Ok(())
    }

    /// Records a device-to-device copy of `size` bytes, outside any pass
    /// but still in sequence order.
    ///
    /// This is how compute results reach a mappable buffer: shaders write
    /// the work buffer, the copy moves bytes into the MAP_READ one.
    pub fn copy_buffer(&mut self, src: &Buffer, dst: &Buffer, size: u64) -> Result<()> {
        src.require(wgpu::BufferUsages::COPY_SRC)?;
        dst.require(wgpu::BufferUsages::COPY_DST)?;

        self.encoder
            .copy_buffer_to_buffer(src.raw(), 0, dst.raw(), 0, size);
        self.copies += 1;
        Ok(())
    }

    /// Records a texture-to-buffer copy of the texture's full extent.
    ///
    /// Rows land in the buffer padded to wgpu's 256-byte row alignment;
    /// see [`padded_bytes_per_row`] for sizing the destination.
    pub fn copy_texture_to_buffer(&mut self, src: &Texture, dst: &Buffer) -> Result<()> {
        src.require(wgpu::TextureUsages::COPY_SRC)?;
        dst.require(wgpu::BufferUsages::COPY_DST)?;

        let bytes_per_row = padded_bytes_per_row(src.width());

        self.encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: src.raw(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: dst.raw(),
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(src.height()),
                },
            },
            wgpu::Extent3d {
                width: src.width(),
                height: src.height(),
                depth_or_array_layers: 1,
            },
        );
        self.copies += 1;
        Ok(())
    }

    /// Dispatches recorded so far; empty grids never count.
    pub fn dispatches_recorded(&self) -> u32 {
        self.dispatches
    }

    pub fn draws_recorded(&self) -> u32 {
        self.draws
    }

    pub fn copies_recorded(&self) -> u32 {
        self.copies
    }

    /// Freezes the sequence for submission. After this, nothing more can
    /// be recorded; the result can only be submitted, once.
    pub fn finish(self) -> FinishedSequence {
        FinishedSequence {
            buffer: self.encoder.finish(),
            label: self.label,
        }
    }
}

/// A frozen command sequence, consumable only by
/// [`Device::submit`](crate::device::Device::submit).
pub struct FinishedSequence {
    buffer: wgpu::CommandBuffer,
    label: String,
}

impl FinishedSequence {
    pub(crate) fn into_parts(self) -> (String, wgpu::CommandBuffer) {
        (self.label, self.buffer)
    }
}

/// Bytes per row for a full-width RGBA8 texture-to-buffer copy, padded to
/// the 256-byte alignment wgpu requires.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    unpadded.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT) * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT
}

/// One invocation group per element, the grain used by element-wise
/// transforms. Zero elements yield a zero grid, which
/// [`CommandSequence::compute_pass`] turns into "no dispatch".
pub fn groups_per_element(len: usize) -> [u32; 3] {
    [len as u32, 1, 1]
}
