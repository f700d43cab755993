//! Headless compute demo: double `[1, 3, 5]` on the GPU and read the
//! result back through a mappable buffer.
//!
//! The full lifecycle in one page: acquire device → upload storage
//! buffer → build compute pipeline + binding set → encode one dispatch
//! and one copy → submit → mapped readback.

use anyhow::Result;

use kiln_engine::binding::{BindingResource, BindingSet};
use kiln_engine::command::{groups_per_element, CommandSequence};
use kiln_engine::device::{Device, DeviceInit};
use kiln_engine::logging::{init_logging, LoggingConfig};
use kiln_engine::pipeline::{BindingKind, BindingLayout, ComputePipeline};
use kiln_engine::resource::Buffer;
use kiln_engine::shader::ShaderProgram;

const DOUBLE_WGSL: &str = r#"
@group(0) @binding(0) var<storage, read_write> data: array<f32>;

@compute @workgroup_size(1)
fn double_elements(@builtin(global_invocation_id) id: vec3u) {
    let i = id.x;
    data[i] = data[i] * 2.0;
}
"#;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let device = pollster::block_on(Device::request(&DeviceInit::default()))?;

    let input = [1.0f32, 3.0, 5.0];

    let work = Buffer::from_data(
        &device,
        "work buffer",
        bytemuck::cast_slice(&input),
        wgpu::BufferUsages::STORAGE
            | wgpu::BufferUsages::COPY_SRC
            | wgpu::BufferUsages::COPY_DST,
    );

    // Shaders never touch the mappable buffer; the result is copied into
    // it device-to-device after the dispatch.
    let result = Buffer::new(
        &device,
        "result buffer",
        work.size(),
        wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
    );

    let shader = ShaderProgram::new(&device, "doubling shader", DOUBLE_WGSL);
    let layout = BindingLayout::new().with_slot(
        0,
        BindingKind::StorageBuffer { read_only: false },
        wgpu::ShaderStages::COMPUTE,
    );
    let pipeline = ComputePipeline::new(
        &device,
        "doubling pipeline",
        &shader,
        "double_elements",
        layout,
    );

    let bindings = BindingSet::new(
        &device,
        "work bindings",
        &pipeline,
        &[(0, BindingResource::Storage(&work))],
    )?;

    let mut seq = CommandSequence::new(&device, "doubling");
    seq.compute_pass(&pipeline, &bindings, groups_per_element(input.len()));
    seq.copy_buffer(&work, &result, work.size())?;
    device.submit(seq.finish());

    let view = result.map_read(&device)?;
    log::info!("input:  {input:?}");
    log::info!("result: {:?}", view.as_slice::<f32>());
    view.unmap();

    Ok(())
}
