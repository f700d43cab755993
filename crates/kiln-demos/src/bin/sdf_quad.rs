//! Windowed render demo: a fullscreen quad sampling a signed-distance
//! glyph atlas, thresholded and anti-aliased in the fragment stage:
//! black glyph, white outline, orange background.
//!
//! The atlas is generated procedurally (image decoding is an external
//! concern); the rest is the render lifecycle: device + surface → texture
//! + sampler → render pipeline + binding set → per-redraw encode→submit
//! driven by an explicit, cancellable frame loop.

use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use kiln_engine::binding::{BindingResource, BindingSet};
use kiln_engine::command::{ClearOp, CommandSequence, RenderPassDesc};
use kiln_engine::device::{
    AlphaCompositing, Device, DeviceInit, FrameLoop, LoopControl, Surface, SurfaceErrorAction,
    SurfaceInit,
};
use kiln_engine::logging::{init_logging, LoggingConfig};
use kiln_engine::pipeline::{
    BindingKind, BindingLayout, RenderPipeline, RenderPipelineDesc, VertexLayout,
};
use kiln_engine::resource::{Buffer, Sampler, Texture};
use kiln_engine::shader::ShaderProgram;

const SDF_QUAD_WGSL: &str = r#"
struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@location(0) position: vec4<f32>, @location(1) uv: vec2<f32>) -> VertexOutput {
    var output: VertexOutput;
    output.position = position;
    output.uv = uv;
    return output;
}

@group(0) @binding(0) var glyph_atlas: texture_2d<f32>;
@group(0) @binding(1) var glyph_sampler: sampler;

@fragment
fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    let sdf = textureSample(glyph_atlas, glyph_sampler, uv).r;
    let distance = (sdf - 0.5) / fwidth(sdf);
    let alpha = clamp(distance, 0.0, 1.0);

    let glyph_color = vec4<f32>(0.0, 0.0, 0.0, alpha);
    let outline_color = vec4<f32>(1.0, 1.0, 1.0, smoothstep(0.4, 0.5, sdf));

    return mix(outline_color, glyph_color, alpha);
}
"#;

// Interleaved quad: 4 floats position + 2 floats UV per vertex,
// triangle-strip order.
const QUAD_VERTICES: [f32; 24] = [
    -1.0, -1.0, 0.0, 1.0, 0.0, 0.0, //
    1.0, -1.0, 0.0, 1.0, 1.0, 0.0, //
    -1.0, 1.0, 0.0, 1.0, 0.0, 1.0, //
    1.0, 1.0, 0.0, 1.0, 1.0, 1.0, //
];

const ATLAS_SIZE: u32 = 256;

const CLEAR_ORANGE: wgpu::Color = wgpu::Color {
    r: 1.0,
    g: 0.65,
    b: 0.0,
    a: 1.0,
};

/// Generates an RGBA8 signed-distance atlas for a ring glyph.
///
/// Distances are remapped so 0.5 sits on the glyph edge, the convention
/// the fragment shader thresholds against.
fn generate_sdf_atlas(size: u32) -> Vec<u8> {
    let center = size as f32 / 2.0;
    let outer = size as f32 * 0.36;
    let inner = size as f32 * 0.20;
    let spread = size as f32 * 0.10;

    let mid = (inner + outer) * 0.5;
    let half_stroke = (outer - inner) * 0.5;

    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 + 0.5 - center;
            let dy = y as f32 + 0.5 - center;
            let radial = (dx * dx + dy * dy).sqrt();

            // Signed distance to the ring stroke, negative inside.
            let sd = (radial - mid).abs() - half_stroke;
            let value = (0.5 - sd / spread).clamp(0.0, 1.0);

            let byte = (value * 255.0).round() as u8;
            pixels.extend_from_slice(&[byte, byte, byte, 255]);
        }
    }
    pixels
}

/// Everything that lives for the window's lifetime.
struct Gfx<'w> {
    device: Device,
    surface: Surface<'w>,
    pipeline: RenderPipeline,
    bindings: BindingSet,
    vertices: Buffer,
    frames: FrameLoop,
}

impl<'w> Gfx<'w> {
    fn new(window: &'w Window) -> Result<Self> {
        let (device, surface) = pollster::block_on(Device::request_with_surface(
            window,
            &DeviceInit::default(),
            &SurfaceInit {
                preferred_format: wgpu::TextureFormat::Bgra8Unorm,
                alpha: AlphaCompositing::Opaque,
                ..SurfaceInit::default()
            },
        ))?;

        let atlas = Texture::from_rgba8(
            &device,
            "glyph atlas",
            ATLAS_SIZE,
            ATLAS_SIZE,
            &generate_sdf_atlas(ATLAS_SIZE),
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        )?;
        let sampler = Sampler::linear(&device, "glyph sampler");

        let shader = ShaderProgram::new(&device, "sdf quad shader", SDF_QUAD_WGSL);
        let pipeline = RenderPipeline::new(
            &device,
            &RenderPipelineDesc {
                label: "sdf quad pipeline",
                vertex_shader: &shader,
                vertex_entry: "vs_main",
                fragment_shader: &shader,
                fragment_entry: "fs_main",
                vertex_layout: VertexLayout::new(24)
                    .with_attribute(0, 0, wgpu::VertexFormat::Float32x4)
                    .with_attribute(1, 16, wgpu::VertexFormat::Float32x2),
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                color_format: surface.format(),
                blend: None,
                binding_layout: BindingLayout::new()
                    .with_slot(0, BindingKind::Texture, wgpu::ShaderStages::FRAGMENT)
                    .with_slot(1, BindingKind::Sampler, wgpu::ShaderStages::FRAGMENT),
            },
        );

        let bindings = BindingSet::new(
            &device,
            "glyph bindings",
            &pipeline,
            &[
                (0, BindingResource::Texture(&atlas)),
                (1, BindingResource::Sampler(&sampler)),
            ],
        )?;

        let vertices = Buffer::from_data(
            &device,
            "quad vertices",
            bytemuck::cast_slice(&QUAD_VERTICES),
            wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        );

        Ok(Self {
            device,
            surface,
            pipeline,
            bindings,
            vertices,
            frames: FrameLoop::new(),
        })
    }

    /// One encode→submit→present cycle. Returns `Stop` when the loop has
    /// been cancelled or the surface failed fatally.
    fn render_frame(&mut self) -> LoopControl {
        let device = &self.device;
        let surface = &mut self.surface;
        let pipeline = &self.pipeline;
        let bindings = &self.bindings;
        let vertices = &self.vertices;

        let step = self.frames.step(|_| {
            let frame = match surface.acquire() {
                Ok(frame) => frame,
                Err(err) => {
                    log::warn!("surface error: {err}");
                    return match surface.handle_error(device, err) {
                        SurfaceErrorAction::Fatal => Err(()),
                        SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                            Ok(LoopControl::Continue)
                        }
                    };
                }
            };

            let mut seq = CommandSequence::new(device, "sdf quad frame");
            seq.render_pass(&RenderPassDesc {
                target: &frame.view,
                clear: ClearOp::Clear(CLEAR_ORANGE),
                pipeline,
                bindings: Some(bindings),
                vertex_buffers: &[vertices],
                vertices: 0..4,
                instances: 0..1,
            })
            .map_err(|e| log::error!("render pass failed: {e}"))?;

            device.submit(seq.finish());
            surface.present(frame);
            Ok(LoopControl::Continue)
        });

        match step {
            Ok(control) => control,
            Err(()) => LoopControl::Stop,
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gfx: Gfx<'this>,
}

#[derive(Default)]
struct App {
    entry: Option<WindowEntry>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("kiln sdf quad")
            .with_inner_size(LogicalSize::new(640.0, 640.0));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => window,
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let entry = WindowEntryBuilder {
            window,
            gfx_builder: |w| Gfx::new(w).expect("GPU initialization failed for window"),
        }
        .build();

        entry.with_window(|w| w.request_redraw());
        self.entry = Some(entry);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw: the frame loop is driven by RedrawRequested.
        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                // Cancel the frame loop explicitly, then leave.
                entry.with_gfx_mut(|gfx| gfx.frames.stop());
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                entry.with_gfx_mut(|gfx| {
                    let Gfx {
                        device, surface, ..
                    } = gfx;
                    surface.resize(device, new_size);
                });
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::RedrawRequested => {
                let control = entry.with_gfx_mut(|gfx| gfx.render_frame());
                if control == LoopControl::Stop {
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
    let mut app = App::default();

    event_loop
        .run_app(&mut app)
        .context("winit event loop terminated with error")?;

    Ok(())
}
