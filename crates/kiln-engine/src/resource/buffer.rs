use wgpu::util::DeviceExt;

use crate::device::Device;
use crate::error::{Error, Result};

/// A device-resident byte region with a fixed size and usage set.
///
/// The usage set is fixed at creation and must be a superset of every
/// operation later performed on the buffer; each operation here checks it
/// up front and fails with [`Error::ResourceUsageViolation`] before
/// touching the GPU.
pub struct Buffer {
    raw: wgpu::Buffer,
    label: String,
    size: u64,
    usage: wgpu::BufferUsages,
}

impl Buffer {
    /// Allocates a zeroed buffer of exactly `size` bytes.
    pub fn new(device: &Device, label: &str, size: u64, usage: wgpu::BufferUsages) -> Self {
        let raw = device.raw().create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage,
            mapped_at_creation: false,
        });

        Self {
            raw,
            label: label.to_string(),
            size,
            usage,
        }
    }

    /// Allocates a buffer of exactly `data.len()` bytes and enqueues the
    /// host copy into it.
    ///
    /// The copy is asynchronous relative to the caller but ordered on the
    /// queue timeline: any later-submitted command reading the buffer
    /// observes the written data.
    pub fn from_data(device: &Device, label: &str, data: &[u8], usage: wgpu::BufferUsages) -> Self {
        let raw = device
            .raw()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: data,
                usage,
            });

        Self {
            raw,
            label: label.to_string(),
            size: data.len() as u64,
            usage,
        }
    }

    /// Enqueues a host write into the buffer at `offset`.
    ///
    /// Requires COPY_DST usage.
    pub fn write(&self, device: &Device, offset: u64, data: &[u8]) -> Result<()> {
        self.require(wgpu::BufferUsages::COPY_DST)?;
        device.queue().write_buffer(&self.raw, offset, data);
        Ok(())
    }

    /// Maps the buffer for host reading, suspending until all previously
    /// submitted work touching it has completed.
    ///
    /// Requires MAP_READ usage, checked before any map request is made.
    /// Shaders never write into mappable buffers directly; fill this one
    /// with a device-to-device copy first
    /// (see [`CommandSequence::copy_buffer`](crate::command::CommandSequence::copy_buffer)).
    pub fn map_read(&self, device: &Device) -> Result<MappedView<'_>> {
        self.require(wgpu::BufferUsages::MAP_READ)?;

        let slice = self.raw.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        // Completion is enforced by submission order: the poll blocks until
        // the queue has drained everything submitted before this request.
        device.wait(None)?;

        match rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(Error::MapFailure {
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                return Err(Error::MapFailure {
                    reason: "map request never resolved".to_string(),
                });
            }
        }

        Ok(MappedView {
            raw: &self.raw,
            view: Some(slice.get_mapped_range()),
        })
    }

    /// Returns the fixed byte size.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the fixed usage set.
    pub fn usage(&self) -> wgpu::BufferUsages {
        self.usage
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn raw(&self) -> &wgpu::Buffer {
        &self.raw
    }

    /// Fails unless the buffer was created with all of `needed`.
    pub(crate) fn require(&self, needed: wgpu::BufferUsages) -> Result<()> {
        if self.usage.contains(needed) {
            Ok(())
        } else {
            Err(Error::ResourceUsageViolation {
                label: self.label.clone(),
                needed: format!("{needed:?}"),
                usage: format!("{:?}", self.usage),
            })
        }
    }
}

/// Read-only typed view over a mapped buffer.
///
/// Valid until [`unmap`](MappedView::unmap) (or drop, which unmaps as a
/// backstop); the borrow checker prevents any access after that point.
pub struct MappedView<'a> {
    raw: &'a wgpu::Buffer,
    view: Option<wgpu::BufferView>,
}

impl<'a> MappedView<'a> {
    /// The mapped bytes.
    pub fn bytes(&self) -> &[u8] {
        // `view` is Some until drop.
        self.view.as_deref().map_or(&[], |v| v)
    }

    /// The mapped bytes reinterpreted as a slice of `T`.
    pub fn as_slice<T: bytemuck::Pod>(&self) -> &[T] {
        bytemuck::cast_slice(self.bytes())
    }

    /// Releases the mapping. Reading after this point is impossible by
    /// construction.
    pub fn unmap(self) {
        // Drop does the work.
    }
}

impl Drop for MappedView<'_> {
    fn drop(&mut self) {
        // The view's borrow on the mapped range must end before unmap.
        self.view.take();
        self.raw.unmap();
    }
}
