use crate::device::Device;
use crate::error::{Error, Result};

/// A device-resident 2D image with fixed dimensions, format, and usage.
pub struct Texture {
    raw: wgpu::Texture,
    view: wgpu::TextureView,
    label: String,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    usage: wgpu::TextureUsages,
}

impl Texture {
    /// Creates a texture from a decoded RGBA8 pixel grid and enqueues the
    /// upload.
    ///
    /// `pixels` must be exactly `width * height * 4` bytes in row-major
    /// order. The usage set must include COPY_DST for the upload itself;
    /// add TEXTURE_BINDING for sampling.
    pub fn from_rgba8(
        device: &Device,
        label: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
        usage: wgpu::TextureUsages,
    ) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(Error::PixelDataMismatch {
                label: label.to_string(),
                width,
                height,
                expected,
                got: pixels.len(),
            });
        }

        if !usage.contains(wgpu::TextureUsages::COPY_DST) {
            return Err(Error::ResourceUsageViolation {
                label: label.to_string(),
                needed: format!("{:?}", wgpu::TextureUsages::COPY_DST),
                usage: format!("{usage:?}"),
            });
        }

        let texture = Self::allocate(
            device,
            label,
            width,
            height,
            wgpu::TextureFormat::Rgba8Unorm,
            usage,
        );

        device.queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture.raw,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        Ok(texture)
    }

    /// Creates an uninitialized texture, e.g. an offscreen render target.
    pub fn render_target(
        device: &Device,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        Self::allocate(
            device,
            label,
            width,
            height,
            format,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        )
    }

    fn allocate(
        device: &Device,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> Self {
        let raw = device.raw().create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });

        let view = raw.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            raw,
            view,
            label: label.to_string(),
            width,
            height,
            format,
            usage,
        }
    }

    /// Default full-texture view, for binding or render targeting.
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn usage(&self) -> wgpu::TextureUsages {
        self.usage
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn raw(&self) -> &wgpu::Texture {
        &self.raw
    }

    /// Fails unless the texture was created with all of `needed`.
    pub(crate) fn require(&self, needed: wgpu::TextureUsages) -> Result<()> {
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
