pub mod complex;
pub mod error;
pub mod fractal;
pub mod viewport;

// Re-export primary types for convenience.
pub use complex::Complex;
pub use error::CoreError;
pub use fractal::{check_iteration_budget, FractalKind, ESCAPE_RADIUS_SQ};
pub use viewport::{PixelGrid, Viewport};

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
