//! GPU device + presentation management.
//!
//! This module is responsible for:
//! - acquiring the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the presentation Surface (swapchain)
//! - acquiring frames and driving the repeatable frame loop

mod frame_loop;
mod handle;
mod surface;

pub use frame_loop::{FrameLoop, LoopControl};
pub use handle::{Device, DeviceInit};
pub use surface::{AlphaCompositing, Frame, Surface, SurfaceErrorAction, SurfaceInit};
