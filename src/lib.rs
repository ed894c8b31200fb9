pub mod application;
pub mod backend;
pub mod camera;
pub mod config;
pub mod description;
pub mod display;
pub mod error;
pub mod frame;
pub mod intersection;
pub mod math;
pub mod output;
pub mod sampler;
pub mod scene;
pub mod shading;
pub mod texture;
pub mod tracer;

pub use backend::{Backend, BackendKind, CpuBackend, GpuBackend};
pub use config::RenderConfig;
pub use error::{Error, Result};
pub use frame::{render_frame, FrameBuffer};
pub use math::Color;
pub use scene::{ImagePlane, Light, Material, Scene, Sphere};
