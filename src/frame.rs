use std::time::Instant;

use crate::config::RenderConfig;
use crate::error::Result;
use crate::math::Color;
use crate::sampler::pixel_color;
use crate::scene::Scene;

/// `width * height` float RGB pixels in raster order: row 0 is the top of the
/// image, rows run left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::BLACK; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Raster index of scene pixel `(x, y)`. The scene's y axis runs bottom-up,
    /// so rows are flipped.
    pub fn raster_index(&self, x: u32, y: u32) -> usize {
        let row = self.height - 1 - y;
        row as usize * self.width as usize + x as usize
    }

    pub fn put(&mut self, x: u32, y: u32, color: Color) {
        let index = self.raster_index(x, y);
        self.pixels[index] = color;
    }

    /// Pixel at raster coordinates (row 0 on top).
    pub fn get(&self, column: u32, row: u32) -> Color {
        self.pixels[row as usize * self.width as usize + column as usize]
    }
}

/// Renders one frame on the calling thread.
///
/// Pixels are visited column by column: `x` in the outer loop, `y` in the inner
/// loop. Writes to the buffer happen in that order.
pub fn render_frame(scene: &Scene, config: &RenderConfig) -> Result<FrameBuffer> {
    config.validate()?;
    let started = Instant::now();
    let mut frame = FrameBuffer::new(config.width, config.height);

    for x in 0..config.width {
        for y in 0..config.height {
            let color = pixel_color(scene, config, x, y)?;
            frame.put(x, y, color);
        }
    }

    tracing::debug!(
        width = config.width,
        height = config.height,
        antialiasing = config.antialiasing,
        spheres = scene.spheres.len(),
        lights = scene.lights.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "rendered frame on the CPU"
    );

    Ok(frame)
}
