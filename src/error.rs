//! error type shared by every stage of a run (codec, fitness, engine, persistence)

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EvolveError>;

#[derive(Error, Debug)]
pub enum EvolveError {
    /// decoded length does not match what PolygonCount/PolygonEdgeCount imply
    #[error("format error: expected {expected} {unit}, got {actual}")]
    Format {
        expected: usize,
        actual: usize,
        unit: &'static str,
    },

    /// rendered buffer and seed buffer disagree in length (misconfigured renderer or settings)
    #[error("rendered buffer is {rendered} bytes but seed image is {seed} bytes")]
    BufferMismatch { seed: usize, rendered: usize },

    /// a canvas whose polygon or coordinate count disagrees with the settings
    #[error("expected {expected} {what}, got {actual}")]
    ShapeCount {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("render failed: {0}")]
    Render(String),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("invalid engine state: {0}")]
    InvalidState(&'static str),

    /// cooperative cancellation, observed at an epoch boundary
    #[error("run cancelled after epoch {epoch}")]
    Cancelled { epoch: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl EvolveError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, EvolveError::Cancelled { .. })
    }
}
