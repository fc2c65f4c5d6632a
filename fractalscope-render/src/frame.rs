use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::evaluator::{evaluate_cancellable, RenderCancel};
use crate::image::RgbImage;
use crate::palette::Palette;
use crate::view::{ViewSnapshot, ViewState};

/// Render the current view at `width × height` and colour it with the
/// state's palette.
pub fn render_frame(state: &ViewState, width: u32, height: u32) -> crate::Result<RgbImage> {
    render_snapshot(
        &state.snapshot(),
        state.palette(),
        width,
        height,
        &RenderCancel::new(),
    )
}

/// Evaluate one snapshot and colour the resulting grid.
pub fn render_snapshot(
    snapshot: &ViewSnapshot,
    palette: &Palette,
    width: u32,
    height: u32,
    cancel: &RenderCancel,
) -> crate::Result<RgbImage> {
    let viewport = snapshot.viewport()?;
    let grid = evaluate_cancellable(
        snapshot.kind,
        &viewport,
        snapshot.max_iter,
        width,
        height,
        cancel,
    )?;
    Ok(palette.colorize(&grid))
}

/// A produced frame together with the view it shows.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbImage,
    pub snapshot: ViewSnapshot,
    pub elapsed: Duration,
}

impl Frame {
    /// Multi-line status readout: set, centre, scale, iterations and render time.
    pub fn status_line(&self) -> String {
        format!(
            "{}   • {:4.0} ms",
            self.snapshot,
            self.elapsed.as_secs_f64() * 1000.0
        )
    }
}

/// Turns a dirty [`ViewState`] into a displayable frame on demand.
///
/// Output resolution is the display size divided by `quality_factor`, never
/// below `min_size` on either axis.
#[derive(Debug, Clone)]
pub struct FrameProducer {
    quality_factor: u32,
    min_size: u32,
    cancel: Arc<RenderCancel>,
}

impl FrameProducer {
    pub const DEFAULT_QUALITY_FACTOR: u32 = 2;
    pub const DEFAULT_MIN_SIZE: u32 = 64;

    pub fn new(quality_factor: u32, min_size: u32) -> Self {
        Self {
            quality_factor: quality_factor.max(1),
            min_size: min_size.max(1),
            cancel: Arc::new(RenderCancel::new()),
        }
    }

    pub fn quality_factor(&self) -> u32 {
        self.quality_factor
    }

    /// Shared cancel handle, for a UI thread that wants to abort a stale
    /// frame while it is being produced.
    pub fn cancel_handle(&self) -> Arc<RenderCancel> {
        Arc::clone(&self.cancel)
    }

    /// Abort the frame currently being produced, if any.
    pub fn cancel_in_flight(&self) {
        self.cancel.cancel();
    }

    pub fn output_size(&self, display_width: u32, display_height: u32) -> (u32, u32) {
        (
            (display_width / self.quality_factor).max(self.min_size),
            (display_height / self.quality_factor).max(self.min_size),
        )
    }

    /// Produce a frame if the state is dirty.
    ///
    /// Returns `Ok(None)` when nothing changed since the last frame or the
    /// display is not ready yet (smaller than 2×2). The view takes the aspect
    /// ratio of the output image, so clamping to `min_size` crops instead of
    /// stretching. On success the dirty flag is cleared; a cancelled frame
    /// leaves it set.
    pub fn produce(
        &self,
        state: &mut ViewState,
        display_width: u32,
        display_height: u32,
    ) -> crate::Result<Option<Frame>> {
        if !state.is_dirty() {
            return Ok(None);
        }
        if display_width < 2 || display_height < 2 {
            debug!(display_width, display_height, "Display not ready, skipping frame");
            return Ok(None);
        }
        let (width, height) = self.output_size(display_width, display_height);
        state.set_aspect_ratio(width as f64 / height as f64)?;

        let start = Instant::now();
        let snapshot = state.snapshot();
        let image = render_snapshot(&snapshot, state.palette(), width, height, &self.cancel)?;
        state.clear_dirty();

        let elapsed = start.elapsed();
        info!(
            kind = %snapshot.kind,
            palette = %snapshot.palette,
            width,
            height,
            max_iter = snapshot.max_iter,
            elapsed_ms = elapsed.as_millis(),
            "Frame produced"
        );
        Ok(Some(Frame {
            image,
            snapshot,
            elapsed,
        }))
    }
}

impl Default for FrameProducer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_QUALITY_FACTOR, Self::DEFAULT_MIN_SIZE)
    }
}
