//! Render-path integration test: the encode→submit cycle must be
//! repeatable indefinitely against the same target with identical output
//! and no re-validation failures.

use kiln_engine::command::{ClearOp, CommandSequence, RenderPassDesc};
use kiln_engine::device::{Device, DeviceInit, FrameLoop, LoopControl};
use kiln_engine::error::Error;
use kiln_engine::pipeline::{BindingLayout, RenderPipeline, RenderPipelineDesc, VertexLayout};
use kiln_engine::resource::{Buffer, Texture};
use kiln_engine::shader::ShaderProgram;

const QUAD_WGSL: &str = r#"
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

@fragment
fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(uv.x, uv.y, 0.25, 1.0);
}
"#;

// One interleaved vertex: 4 floats position + 2 floats UV.
const QUAD_VERTICES: [f32; 24] = [
    -1.0, -1.0, 0.0, 1.0, 0.0, 0.0, //
    1.0, -1.0, 0.0, 1.0, 1.0, 0.0, //
    -1.0, 1.0, 0.0, 1.0, 0.0, 1.0, //
    1.0, 1.0, 0.0, 1.0, 1.0, 1.0, //
];

// 64 px rows are exactly 256 bytes, wgpu's copy row alignment, so the
// readback buffer needs no padding bookkeeping.
const TARGET_SIZE: u32 = 64;

fn request_device() -> Option<Device> {
    match pollster::block_on(Device::request(&DeviceInit::default())) {
        Ok(device) => Some(device),
        Err(Error::DeviceUnavailable { reason }) => {
            eprintln!("skipping: {reason}");
            None
        }
        Err(other) => panic!("unexpected acquisition error: {other}"),
    }
}

fn quad_pipeline(device: &Device) -> RenderPipeline {
    let shader = ShaderProgram::new(device, "quad shader", QUAD_WGSL);

    RenderPipeline::new(
        device,
        &RenderPipelineDesc {
            label: "quad pipeline",
            vertex_shader: &shader,
            vertex_entry: "vs_main",
            fragment_shader: &shader,
            fragment_entry: "fs_main",
            vertex_layout: VertexLayout::new(24)
                .with_attribute(0, 0, wgpu::VertexFormat::Float32x4)
                .with_attribute(1, 16, wgpu::VertexFormat::Float32x2),
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            color_format: wgpu::TextureFormat::Rgba8Unorm,
            blend: None,
            binding_layout: BindingLayout::new(),
        },
    )
}

fn capture(device: &Device, target: &Texture) -> Vec<u8> {
    let size = u64::from(TARGET_SIZE) * u64::from(TARGET_SIZE) * 4;
    let readback = Buffer::new(
        device,
        "frame readback",
        size,
        wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
    );

    let mut seq = CommandSequence::new(device, "frame capture");
    seq.copy_texture_to_buffer(target, &readback).unwrap();
    device.submit(seq.finish());

    let view = readback.map_read(device).unwrap();
    let bytes = view.bytes().to_vec();
    view.unmap();
    bytes
}

#[test]
fn frame_loop_is_restartable_with_steady_output() {
    let Some(device) = request_device() else { return };

    let target = Texture::render_target(
        &device,
        "offscreen target",
        TARGET_SIZE,
        TARGET_SIZE,
        wgpu::TextureFormat::Rgba8Unorm,
    );

    let pipeline = quad_pipeline(&device);
    let vertices = Buffer::from_data(
        &device,
        "quad vertices",
        bytemuck::cast_slice(&QUAD_VERTICES),
        wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    );

    let mut frames = FrameLoop::new();
    let mut first_frame: Option<Vec<u8>> = None;

    frames
        .run(|index| -> Result<LoopControl, Error> {
            let mut seq = CommandSequence::new(&device, "offscreen frame");
            seq.render_pass(&RenderPassDesc {
                target: target.view(),
                clear: ClearOp::Clear(wgpu::Color {
                    r: 1.0,
                    g: 0.65,
                    b: 0.0,
                    a: 1.0,
                }),
                pipeline: &pipeline,
                bindings: None,
                vertex_buffers: &[&vertices],
                vertices: 0..4,
                instances: 0..1,
            })?;
            device.submit(seq.finish());

            if index == 0 {
                first_frame = Some(capture(&device, &target));
            }

            if index + 1 == 1000 {
                Ok(LoopControl::Stop)
            } else {
                Ok(LoopControl::Continue)
            }
        })
        .unwrap();

    assert_eq!(frames.frames_produced(), 1000);

    let last_frame = capture(&device, &target);
    let first_frame = first_frame.expect("first frame captured");
    assert_eq!(first_frame, last_frame, "steady-state output drifted");

    // Spot-check the gradient. Texture row 0 is the top of the frame,
    // where the quad's UV is (0, 1): red low, green high. The opposite
    // corner flips both channels.
    let px = |x: u32, y: u32| {
        let offset = ((y * TARGET_SIZE + x) * 4) as usize;
        &last_frame[offset..offset + 4]
    };
    assert!(px(1, 1)[0] < 16 && px(1, 1)[1] > 240);
    assert!(px(TARGET_SIZE - 2, TARGET_SIZE - 2)[0] > 240);
    assert!(px(TARGET_SIZE - 2, TARGET_SIZE - 2)[1] < 16);
    assert_eq!(px(1, 1)[3], 255);

    // An external stop cancels before the body runs.
    frames.stop();
    frames
        .run(|_| -> Result<LoopControl, kiln_engine::error::Error> {
            panic!("body must not run after stop()");
        })
        .unwrap();
    assert_eq!(frames.frames_produced(), 1000);

    // Restart after the stop: the cycle re-runs with no re-validation
    // failure and the same steady-state output.
    frames
        .run(|index| {
            let mut seq = CommandSequence::new(&device, "offscreen frame");
            seq.render_pass(&RenderPassDesc {
                target: target.view(),
                clear: ClearOp::Clear(wgpu::Color::BLACK),
                pipeline: &pipeline,
                bindings: None,
                vertex_buffers: &[&vertices],
                vertices: 0..4,
                instances: 0..1,
            })?;
            device.submit(seq.finish());
            Ok::<_, kiln_engine::error::Error>(if index >= 1004 {
                LoopControl::Stop
            } else {
                LoopControl::Continue
            })
        })
        .unwrap();

    assert_eq!(capture(&device, &target), last_frame);
}
