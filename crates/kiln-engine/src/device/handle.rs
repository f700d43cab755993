use winit::window::Window;

use crate::command::FinishedSequence;
use crate::error::{Error, Result};

use super::surface::{Surface, SurfaceInit};

/// Acquisition parameters for the device layer.
///
/// Keep this structure stable and minimal. Add configuration flags only when
/// a concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct DeviceInit {
    /// Adapter selection preference (high-performance vs low-power).
    pub power_preference: wgpu::PowerPreference,

    /// Required wgpu features.
    ///
    /// Favor an empty set for portability unless a feature is strictly
    /// necessary.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,
}

impl Default for DeviceInit {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
        }
    }
}

/// Owns the wgpu core objects and the single command queue.
///
/// This is the capability token every other component is created through:
/// resources, pipelines, binding sets, and command sequences all take
/// `&Device` explicitly. There is no process-wide singleton.
///
/// All submitted work executes in FIFO submission order on the queue's
/// timeline; that ordering is the only synchronization primitive this layer
/// exposes.
pub struct Device {
    /// wgpu instance used to create the adapter (and surface, if any).
    instance: wgpu::Instance,

    /// Selected adapter.
    adapter: wgpu::Adapter,

    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,
}

impl Device {
    /// Requests a device with no presentation surface (compute path).
    ///
    /// Adapter/device acquisition is asynchronous under wgpu. Any refusal
    /// along the way is [`Error::DeviceUnavailable`]; there is no fallback.
    pub async fn request(init: &DeviceInit) -> Result<Self> {
        let instance = new_instance();
        Self::negotiate(instance, None, init).await
    }

    /// Requests a device together with a configured presentation surface
    /// bound to `window` (render path).
    ///
    /// The adapter is required to be compatible with the surface, and the
    /// surface is configured with a negotiated pixel format and alpha mode
    /// before being returned.
    pub async fn request_with_surface<'w>(
        window: &'w Window,
        init: &DeviceInit,
        surface_init: &SurfaceInit,
    ) -> Result<(Self, Surface<'w>)> {
        let size = window.inner_size();
        let instance = new_instance();

        let raw_surface = instance
            .create_surface(window)
            .map_err(|e| Error::DeviceUnavailable {
                reason: format!("failed to create surface: {e}"),
            })?;

        let device = Self::negotiate(instance, Some(&raw_surface), init).await?;
        let surface = Surface::configure(raw_surface, &device, size, surface_init)?;

        Ok((device, surface))
    }

    async fn negotiate(
        instance: wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'_>>,
        init: &DeviceInit,
    ) -> Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| Error::DeviceUnavailable {
                reason: format!("no suitable adapter: {e}"),
            })?;

        log::debug!("adapter: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("kiln device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| Error::DeviceUnavailable {
                reason: format!("device negotiation refused: {e}"),
            })?;

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }

    /// Submits a finished command sequence to the queue.
    ///
    /// The sequence has already been frozen by
    /// [`CommandSequence::finish`](crate::command::CommandSequence::finish);
    /// submission hands it irrevocably to the queue timeline.
    pub fn submit(&self, sequence: FinishedSequence) -> wgpu::SubmissionIndex {
        let (label, buffer) = sequence.into_parts();
        log::trace!("submit `{label}`");
        self.queue.submit(std::iter::once(buffer))
    }

    /// Blocks until the queue has completed work up to `submission`
    /// (all prior submitted work when `None`).
    ///
    /// This is the suspension point behind buffer readback: a map request
    /// becomes observable only once every earlier submission touching the
    /// buffer has completed.
    pub fn wait(&self, submission: Option<wgpu::SubmissionIndex>) -> Result<()> {
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: submission,
                timeout: None,
            })
            .map_err(|e| Error::MapFailure {
                reason: format!("device poll failed: {e:?}"),
            })?;
        Ok(())
    }

    /// Returns a reference to the selected adapter.
    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    /// Returns a reference to the logical device.
    pub fn raw(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

fn new_instance() -> wgpu::Instance {
    // All backends, so wgpu selects the optimal platform backend.
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    })
}
