use thiserror::Error;

/// Errors originating from the core fractal engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("invalid output dimensions: {width}×{height} (both must be >= 1)")]
    InvalidDimension { width: u32, height: u32 },

    #[error("invalid iteration budget: {0} (must be >= 1)")]
    InvalidIterationBudget(u32),

    #[error("invalid viewport: {reason}")]
    InvalidViewport { reason: String },

    #[error("unknown fractal kind: {0:?}")]
    UnknownFractalKind(String),
}
