pub mod error;
pub mod evaluator;
pub mod event;
pub mod export;
pub mod frame;
pub mod image;
pub mod iteration_grid;
pub mod palette;
pub mod tile;
pub mod view;

pub use error::RenderError;
pub use evaluator::{evaluate, evaluate_cancellable, RenderCancel};
pub use event::ViewEvent;
pub use export::{export_png, ExportMetadata};
pub use frame::{render_frame, render_snapshot, Frame, FrameProducer};
pub use image::RgbImage;
pub use iteration_grid::IterationGrid;
pub use palette::{build_palette, Palette, PaletteKind, LUT_SIZE};
pub use tile::TILE_SIZE;
pub use view::{HistoryEntry, ViewHistory, ViewSettings, ViewSnapshot, ViewState};

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
