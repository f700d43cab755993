use winit::dpi::PhysicalSize;

use crate::error::{Error, Result};

use super::handle::Device;

/// Presentation configuration.
///
/// The preferred format is a request, not a guarantee: negotiation falls
/// back to the first supported format when the preferred one is absent,
/// and only fails when the surface reports no formats at all.
#[derive(Debug, Clone)]
pub struct SurfaceInit {
    /// Preferred pixel format, typically one of the two 8-bit variants
    /// (`Bgra8Unorm` / `Rgba8Unorm`).
    pub preferred_format: wgpu::TextureFormat,

    /// Alpha compositing against the host window.
    pub alpha: AlphaCompositing,

    /// Present mode (swap behavior). FIFO is broadly supported.
    pub present_mode: wgpu::PresentMode,

    /// Desired maximum frame latency for the surface; a hint only.
    pub desired_maximum_frame_latency: u32,
}

impl Default for SurfaceInit {
    fn default() -> Self {
        Self {
            preferred_format: wgpu::TextureFormat::Bgra8Unorm,
            alpha: AlphaCompositing::Opaque,
            present_mode: wgpu::PresentMode::Fifo,
            desired_maximum_frame_latency: 2,
        }
    }
}

/// Alpha compositing mode requested from the host.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AlphaCompositing {
    /// The surface is opaque; alpha output is ignored by the compositor.
    Opaque,
    /// The surface is blended with content behind the window.
    Blended,
}

/// A presentation surface configured against a device.
///
/// The surface borrows the window (`'w`); the window must outlive it.
pub struct Surface<'w> {
    surface: wgpu::Surface<'w>,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
}

/// A single acquired frame.
///
/// Short-lived: render into `view`, submit, then hand the frame back to
/// [`Surface::present`]. Holding it blocks acquisition of later frames.
pub struct Frame {
    surface_texture: wgpu::SurfaceTexture,
    /// Color view over the frame's image, for use as a render-pass target.
    pub view: wgpu::TextureView,
}

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}

impl<'w> Surface<'w> {
    /// Configures a raw surface for `device` with negotiated format and
    /// alpha mode.
    pub(crate) fn configure(
        surface: wgpu::Surface<'w>,
        device: &Device,
        size: PhysicalSize<u32>,
        init: &SurfaceInit,
    ) -> Result<Self> {
        let caps = surface.get_capabilities(device.adapter());

        let format = negotiate_format(&caps.formats, init.preferred_format)?;
        let alpha_mode = negotiate_alpha(&caps.alpha_modes, init.alpha);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: init.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };

        surface.configure(device.raw(), &config);

        Ok(Self {
            surface,
            config,
            size,
        })
    }

    /// Returns the negotiated surface format.
    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Returns the current drawable size (physical pixels).
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Reconfigures the surface after a resize.
    ///
    /// wgpu does not support a 0x0 surface; in that case only internal
    /// state is updated and reconfiguration is deferred.
    pub fn resize(&mut self, device: &Device, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            self.size = new_size;
            return;
        }

        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(device.raw(), &self.config);
    }

    /// Acquires the surface's current image for rendering.
    pub fn acquire(&self) -> std::result::Result<Frame, wgpu::SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Frame {
            surface_texture,
            view,
        })
    }

    /// Presents an acquired frame.
    ///
    /// All sequences rendering into the frame must have been submitted
    /// first; queue FIFO order then guarantees the presented image is
    /// complete.
    pub fn present(&self, frame: Frame) {
        drop(frame.view);
        frame.surface_texture.present();
    }

    /// Converts a `SurfaceError` into a higher-level action.
    pub fn handle_error(&mut self, device: &Device, err: wgpu::SurfaceError) -> SurfaceErrorAction {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                if self.size.width > 0 && self.size.height > 0 {
                    self.surface.configure(device.raw(), &self.config);
                }
                SurfaceErrorAction::Reconfigured
            }
            wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
            wgpu::SurfaceError::Timeout => SurfaceErrorAction::SkipFrame,
            wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
        }
    }
}

/// Picks the surface format: the preferred one when supported, otherwise
/// the first supported format. An empty capability set is a negotiation
/// failure surfaced to the caller, never an assumed success.
fn negotiate_format(
    supported: &[wgpu::TextureFormat],
    preferred: wgpu::TextureFormat,
) -> Result<wgpu::TextureFormat> {
    if supported.is_empty() {
        return Err(Error::SurfaceFormatUnavailable);
    }

    if supported.contains(&preferred) {
        return Ok(preferred);
    }

    let fallback = supported[0];
    log::debug!("surface format {preferred:?} unsupported, falling back to {fallback:?}");
    Ok(fallback)
}

fn negotiate_alpha(
    supported: &[wgpu::CompositeAlphaMode],
    requested: AlphaCompositing,
) -> wgpu::CompositeAlphaMode {
    let preferred: &[wgpu::CompositeAlphaMode] = match requested {
        AlphaCompositing::Opaque => &[wgpu::CompositeAlphaMode::Opaque],
        AlphaCompositing::Blended => &[
            wgpu::CompositeAlphaMode::PreMultiplied,
            wgpu::CompositeAlphaMode::PostMultiplied,
        ],
    };

    preferred
        .iter()
        .find(|m| supported.contains(m))
        .copied()
        .unwrap_or_else(|| {
            supported
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferred_format_wins_when_supported() {
        let supported = [
            wgpu::TextureFormat::Rgba8Unorm,
            wgpu::TextureFormat::Bgra8Unorm,
        ];
        let got = negotiate_format(&supported, wgpu::TextureFormat::Bgra8Unorm).unwrap();
        assert_eq!(got, wgpu::TextureFormat::Bgra8Unorm);
    }

    #[test]
    fn missing_preferred_falls_back_to_first_supported() {
        let supported = [wgpu::TextureFormat::Rgba8UnormSrgb];
        let got = negotiate_format(&supported, wgpu::TextureFormat::Bgra8Unorm).unwrap();
        assert_eq!(got, wgpu::TextureFormat::Rgba8UnormSrgb);
    }

    #[test]
    fn empty_capabilities_is_a_negotiation_failure() {
        let err = negotiate_format(&[], wgpu::TextureFormat::Bgra8Unorm).unwrap_err();
        assert!(matches!(err, Error::SurfaceFormatUnavailable));
    }

    #[test]
    fn blended_prefers_premultiplied() {
        let supported = [
            wgpu::CompositeAlphaMode::Opaque,
            wgpu::CompositeAlphaMode::PreMultiplied,
        ];
        let got = negotiate_alpha(&supported, AlphaCompositing::Blended);
        assert_eq!(got, wgpu::CompositeAlphaMode::PreMultiplied);
    }

    #[test]
    fn unsupported_request_falls_back_to_first_mode() {
        let supported = [wgpu::CompositeAlphaMode::Inherit];
        let got = negotiate_alpha(&supported, AlphaCompositing::Opaque);
        assert_eq!(got, wgpu::CompositeAlphaMode::Inherit);
    }
}
