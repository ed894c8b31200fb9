use serde::Deserialize;

use crate::error::{Error, Result};
use crate::intersection::HIT_EPSILON;
use crate::tracer::MAX_DEPTH;

pub const DEFAULT_WIDTH: u32 = 1080;
pub const DEFAULT_HEIGHT: u32 = 720;

/// Parameters of a frame render. Deserializable from the optional `render`
/// object of a scene file; missing fields take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub antialiasing: bool,
    pub max_depth: u32,
    pub hit_epsilon: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            antialiasing: false,
            max_depth: MAX_DEPTH,
            hit_epsilon: HIT_EPSILON,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidConfig(format!(
                "width and height must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.max_depth == 0 {
            return Err(Error::InvalidConfig("maxDepth must be at least 1".into()));
        }
        if !(self.hit_epsilon.is_finite() && self.hit_epsilon >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "hitEpsilon must be finite and non-negative, got {}",
                self.hit_epsilon
            )));
        }
        Ok(())
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn samples_per_pixel(&self) -> u32 {
        if self.antialiasing {
            4
        } else {
            1
        }
    }
}
