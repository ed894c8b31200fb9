use crate::config::RenderConfig;
use crate::error::Result;
use crate::frame::{render_frame, FrameBuffer};
use crate::scene::Scene;

use super::Backend;

/// Single-threaded reference renderer.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpuBackend;

impl Backend for CpuBackend {
    fn name(&self) -> &'static str {
        "CPU"
    }

    fn render(&mut self, scene: &Scene, config: &RenderConfig) -> Result<FrameBuffer> {
        render_frame(scene, config)
    }
}
