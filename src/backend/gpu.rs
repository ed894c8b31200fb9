use std::time::Instant;

use wgpu::util::DeviceExt;

use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::frame::FrameBuffer;
use crate::math::Color;
use crate::scene::Scene;

use super::flat::{FlatHeader, FlatScene};
use super::{gather_samples, Backend};

/// Deepest reflection chain the kernel unrolls.
pub const GPU_MAX_DEPTH: u32 = 8;

const WORKGROUP_SIZE: u32 = 64;
const MAX_GROUPS_PER_DIMENSION: u32 = 65_535;

/// Compute-shader renderer. One invocation traces one sub-sample; the host
/// reads the samples back and resolves them exactly like the CPU path.
pub struct GpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    /// Optional user kernel run over the sample buffer after tracing.
    postprocess: Option<wgpu::ComputePipeline>,
    adapter_name: String,
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn trace_pipeline_layout(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::PipelineLayout {
    device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Trace Pipeline Layout"),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    })
}

impl GpuBackend {
    pub async fn new() -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| Error::Gpu("no compatible adapter available".into()))?;
        let adapter_name = adapter.get_info().name;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Trace Device"),
                    features: wgpu::Features::empty(),
                    limits: adapter.limits(),
                },
                None,
            )
            .await
            .map_err(|error| Error::Gpu(format!("request_device failed: {error}")))?;

        let shader =
            device.create_shader_module(wgpu::include_wgsl!("../asset/shader/trace.wgsl"));

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Trace Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                storage_entry(1, true),
                storage_entry(2, true),
                storage_entry(3, false),
            ],
        });

        let pipeline_layout = trace_pipeline_layout(&device, &bind_group_layout);
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Trace Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "main",
        });

        tracing::info!(adapter = %adapter_name, "GPU backend initialized");

        Ok(Self {
            device,
            queue,
            pipeline,
            bind_group_layout,
            postprocess: None,
            adapter_name,
        })
    }

    /// Adds a post-processing pass compiled from WGSL `source`.
    ///
    /// The kernel must declare the trace bindings (header, spheres, lights and
    /// the read-write sample buffer at group 0) and a `main` entry point with
    /// `@workgroup_size(64)`. It is dispatched over the same grid as the trace
    /// pass, after it, and may rewrite `samples` in place.
    pub fn with_postprocess(mut self, source: &str) -> Result<Self> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Postprocess Shader"),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        let layout = trace_pipeline_layout(&self.device, &self.bind_group_layout);
        let pipeline = self
            .device
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("Postprocess Pipeline"),
                layout: Some(&layout),
                module: &module,
                entry_point: "main",
            });
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(Error::Gpu(format!("invalid postprocess shader: {error}")));
        }

        tracing::info!("postprocess pass enabled");
        self.postprocess = Some(pipeline);
        Ok(self)
    }

    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }

    fn check_limits(&self, config: &RenderConfig, output_size: u64) -> Result<()> {
        if config.max_depth > GPU_MAX_DEPTH {
            return Err(Error::GpuLimit(format!(
                "maxDepth {} exceeds the kernel limit of {GPU_MAX_DEPTH}",
                config.max_depth
            )));
        }

        let limits = self.device.limits();
        let binding_limit = u64::from(limits.max_storage_buffer_binding_size);
        if output_size > binding_limit || output_size > limits.max_buffer_size {
            return Err(Error::GpuLimit(format!(
                "{output_size} bytes of samples exceed the device buffer limits"
            )));
        }
        Ok(())
    }

    /// Traces every sub-sample of `flat` and returns them sample-major.
    pub fn trace_samples(&self, flat: &FlatScene) -> Result<Vec<Color>> {
        let work_items = flat.work_items();
        let output_size = work_items * std::mem::size_of::<[f32; 4]>() as u64;

        let header_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Header Buffer"),
                contents: bytemuck::bytes_of::<FlatHeader>(&flat.header),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let sphere_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Sphere Buffer"),
                contents: bytemuck::cast_slice(&flat.sphere_table()),
                usage: wgpu::BufferUsages::STORAGE,
            });
        let light_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Light Buffer"),
                contents: bytemuck::cast_slice(&flat.light_table()),
                usage: wgpu::BufferUsages::STORAGE,
            });
        let sample_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sample Buffer"),
            size: output_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let readback_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Readback Buffer"),
            size: output_size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Trace Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: header_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: sphere_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: light_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: sample_buffer.as_entire_binding(),
                },
            ],
        });

        let (groups_x, groups_y) = dispatch_size(work_items)?;
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Trace Encoder"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Trace Pass"),
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(groups_x, groups_y, 1);
        }
        if let Some(postprocess) = &self.postprocess {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Postprocess Pass"),
            });
            pass.set_pipeline(postprocess);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(groups_x, groups_y, 1);
        }
        encoder.copy_buffer_to_buffer(&sample_buffer, 0, &readback_buffer, 0, output_size);
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = readback_buffer.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        receiver
            .recv()
            .map_err(|_| Error::Gpu("readback status was never delivered".into()))?
            .map_err(|error| Error::Gpu(format!("readback map failed: {error}")))?;

        let samples = {
            let data = slice.get_mapped_range();
            bytemuck::cast_slice::<u8, [f32; 4]>(&data)
                .iter()
                .map(|&[r, g, b, _]| Color::new(r, g, b))
                .collect()
        };
        readback_buffer.unmap();

        Ok(samples)
    }
}

/// Workgroup grid covering `work_items` invocations. Rows of at most 65535
/// groups; the kernel linearizes the id as `x + y * groups_x * 64`.
fn dispatch_size(work_items: u64) -> Result<(u32, u32)> {
    let groups = work_items.div_ceil(u64::from(WORKGROUP_SIZE));
    let groups_x = groups.clamp(1, u64::from(MAX_GROUPS_PER_DIMENSION));
    let groups_y = groups.div_ceil(groups_x).max(1);
    if groups_y > u64::from(MAX_GROUPS_PER_DIMENSION) {
        return Err(Error::GpuLimit(format!(
            "{work_items} work items exceed the dispatch grid"
        )));
    }
    Ok((groups_x as u32, groups_y as u32))
}

impl Backend for GpuBackend {
    fn name(&self) -> &'static str {
        "GPU"
    }

    fn render(&mut self, scene: &Scene, config: &RenderConfig) -> Result<FrameBuffer> {
        config.validate()?;
        let flat = FlatScene::new(scene, config);
        self.check_limits(
            config,
            flat.work_items() * std::mem::size_of::<[f32; 4]>() as u64,
        )?;

        let started = Instant::now();
        let samples = self.trace_samples(&flat)?;
        let frame = gather_samples(config, &samples);

        tracing::debug!(
            width = config.width,
            height = config.height,
            antialiasing = config.antialiasing,
            spheres = scene.spheres.len(),
            lights = scene.lights.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "rendered frame on the GPU"
        );
        Ok(frame)
    }
}
