//! Interchangeable execution strategies for the same frame render.

pub mod cpu;
pub mod flat;
pub mod gpu;

pub use cpu::CpuBackend;
pub use flat::FlatScene;
pub use gpu::GpuBackend;

use crate::config::RenderConfig;
use crate::error::Result;
use crate::frame::FrameBuffer;
use crate::math::Color;
use crate::sampler::resolve_supersamples;
use crate::scene::Scene;

pub trait Backend {
    fn name(&self) -> &'static str;

    /// Renders one frame. Blocks until the whole buffer is available.
    fn render(&mut self, scene: &Scene, config: &RenderConfig) -> Result<FrameBuffer>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Cpu,
    Gpu,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cpu => "CPU",
            Self::Gpu => "GPU",
        }
    }

    /// Builds the backend. A GPU request without a usable adapter falls back to
    /// the CPU. `postprocess` is WGSL for an extra GPU pass; a shader that
    /// fails to compile is an error, and the CPU backend ignores it.
    pub fn create(self, postprocess: Option<&str>) -> Result<Box<dyn Backend>> {
        let backend: Box<dyn Backend> = match self {
            Self::Cpu => Box::new(CpuBackend),
            Self::Gpu => match pollster::block_on(GpuBackend::new()) {
                Ok(gpu) => match postprocess {
                    Some(source) => Box::new(gpu.with_postprocess(source)?),
                    None => Box::new(gpu),
                },
                Err(err) => {
                    tracing::warn!("{err}; falling back to the CPU backend");
                    Box::new(CpuBackend)
                }
            },
        };
        if postprocess.is_some() && backend.name() == "CPU" {
            tracing::warn!("postprocess shader ignored by the CPU backend");
        }
        tracing::info!(backend = backend.name(), "backend ready");
        Ok(backend)
    }
}

/// Assembles per-sample colors into a frame.
///
/// `samples` is sample-major: entry `s * width * height + y * width + x` holds
/// sub-sample `s` of scene pixel `(x, y)`.
pub fn gather_samples(config: &RenderConfig, samples: &[Color]) -> FrameBuffer {
    let pixel_count = config.pixel_count();
    let mut frame = FrameBuffer::new(config.width, config.height);

    for y in 0..config.height {
        for x in 0..config.width {
            let pixel = y as usize * config.width as usize + x as usize;
            let color = if config.antialiasing {
                resolve_supersamples(std::array::from_fn(|s| samples[s * pixel_count + pixel]))
            } else {
                samples[pixel]
            };
            frame.put(x, y, color);
        }
    }

    frame
}
