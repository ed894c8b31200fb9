use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A zero-length or non-finite vector reached `normalize`.
    #[error("cannot normalize a degenerate vector ({context})")]
    DegenerateVector { context: &'static str },

    #[error("sphere radius must be positive and finite, got {radius}")]
    InvalidSphere { radius: f32 },

    #[error("invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid scene description: {0}")]
    SceneDescription(String),

    #[error("failed to parse scene json: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("GPU backend failure: {0}")]
    Gpu(String),

    #[error("scene is not supported by the GPU backend: {0}")]
    GpuLimit(String),
}
