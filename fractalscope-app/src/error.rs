use thiserror::Error;

use fractalscope_render::RenderError;

/// Failures of the headless driver.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("unrecognised event {0:?}")]
    UnknownEvent(String),

    #[error("malformed event {event:?}: {reason}")]
    MalformedEvent { event: String, reason: String },

    #[error("no frame was produced for a {width}×{height} display")]
    NoFrame { width: u32, height: u32 },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Core(#[from] fractalscope_core::CoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
