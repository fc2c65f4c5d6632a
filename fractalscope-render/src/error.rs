use thiserror::Error;

/// Errors originating from the rendering pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid palette selection: {0:?}")]
    InvalidPaletteSelection(String),

    #[error("render cancelled")]
    Cancelled,

    #[error("PNG export failed: {0}")]
    Export(String),

    #[error(transparent)]
    Core(#[from] fractalscope_core::CoreError),
}
