use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use tracing::debug;

use fractalscope_core::{check_iteration_budget, FractalKind, PixelGrid, Viewport};

use crate::error::RenderError;
use crate::iteration_grid::IterationGrid;
use crate::tile::{build_tile_grid, Tile};

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Tracks the current evaluation generation for cancellation and progress.
///
/// Advancing the generation tells every in-flight tile of an older
/// evaluation to stop. The progress counters let a status readout show how
/// many tiles are done.
#[derive(Debug)]
pub struct RenderCancel {
    generation: AtomicU64,
    progress_done: AtomicUsize,
    progress_total: AtomicUsize,
}

impl RenderCancel {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            progress_done: AtomicUsize::new(0),
            progress_total: AtomicUsize::new(0),
        }
    }

    /// Cancel the current evaluation by advancing the generation.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn reset_progress(&self, total: usize) {
        self.progress_total.store(total, Ordering::Relaxed);
        self.progress_done.store(0, Ordering::Relaxed);
    }

    fn inc_progress(&self) {
        self.progress_done.fetch_add(1, Ordering::Relaxed);
    }

    /// Read the current progress as `(done, total)` tiles.
    pub fn progress(&self) -> (usize, usize) {
        (
            self.progress_done.load(Ordering::Relaxed),
            self.progress_total.load(Ordering::Relaxed),
        )
    }
}

impl Default for RenderCancel {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Compute the escape count of every pixel of a `width × height` grid laid
/// over `viewport`.
///
/// Pure and deterministic: identical inputs always produce an identical grid.
pub fn evaluate(
    kind: FractalKind,
    viewport: &Viewport,
    max_iter: u32,
    width: u32,
    height: u32,
) -> crate::Result<IterationGrid> {
    evaluate_cancellable(kind, viewport, max_iter, width, height, &RenderCancel::new())
}

/// Like [`evaluate`], but stops early with [`RenderError::Cancelled`] once
/// `cancel` moves past the generation current at the start of the call.
///
/// Tiles are evaluated in parallel via Rayon; each tile writes a disjoint
/// region of the output, so no locking is involved.
pub fn evaluate_cancellable(
    kind: FractalKind,
    viewport: &Viewport,
    max_iter: u32,
    width: u32,
    height: u32,
    cancel: &RenderCancel,
) -> crate::Result<IterationGrid> {
    let max_iter = check_iteration_budget(max_iter)?;
    // Fields are public, so re-run the constructor checks.
    let viewport = Viewport::new(viewport.center, viewport.scale, viewport.aspect_ratio)?;
    let pixels = viewport.pixel_grid(width, height)?;

    let start = Instant::now();
    let gen = cancel.generation();
    let tiles = build_tile_grid(width, height);
    cancel.reset_progress(tiles.len());
    debug!(
        %kind,
        tile_count = tiles.len(),
        width,
        height,
        max_iter,
        "Starting tiled evaluation"
    );

    let tile_data: Vec<Option<Vec<u32>>> = tiles
        .par_iter()
        .map(|tile| {
            if cancel.generation() != gen {
                return None;
            }
            let data = evaluate_tile(kind, &pixels, tile, max_iter);
            cancel.inc_progress();
            Some(data)
        })
        .collect();

    if cancel.generation() != gen {
        debug!(elapsed_ms = start.elapsed().as_millis(), "Evaluation cancelled");
        return Err(RenderError::Cancelled);
    }

    let mut grid = IterationGrid::new(width, height, max_iter);
    for (tile, data) in tiles.iter().zip(tile_data) {
        let data = data.ok_or(RenderError::Cancelled)?;
        grid.blit_tile(tile, &data);
    }

    debug!(
        %kind,
        elapsed_ms = start.elapsed().as_millis(),
        width,
        height,
        escaped = grid.escaped_count(),
        "Evaluation complete"
    );
    Ok(grid)
}

fn evaluate_tile(kind: FractalKind, pixels: &PixelGrid, tile: &Tile, max_iter: u32) -> Vec<u32> {
    let mut data = Vec::with_capacity(tile.pixel_count());
    for py in tile.y..tile.y + tile.height {
        for px in tile.x..tile.x + tile.width {
            data.push(kind.iterate(pixels.point(px, py), max_iter));
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use fractalscope_core::{Complex, CoreError};

    #[test]
    fn grid_has_requested_shape_and_bounds() {
        let vp = Viewport::home(4.0 / 3.0).unwrap();
        let grid = evaluate(FractalKind::BurningShip, &vp, 80, 130, 70).unwrap();
        assert_eq!((grid.width, grid.height), (130, 70));
        assert_eq!(grid.data.len(), 130 * 70);
        assert!(grid.data.iter().all(|&n| n <= 80));
    }

    #[test]
    fn tiled_result_matches_direct_iteration() {
        let vp = Viewport::new(Complex::new(-0.6, 0.3), 1.2, 1.0).unwrap();
        let grid = evaluate(FractalKind::Tricorn, &vp, 120, 97, 75).unwrap();
        let pixels = vp.pixel_grid(97, 75).unwrap();
        for py in (0..75).step_by(7) {
            for px in (0..97).step_by(5) {
                let expected = FractalKind::Tricorn.iterate(pixels.point(px, py), 120);
                assert_eq!(grid.get(px, py), expected, "pixel ({px}, {py})");
            }
        }
    }

    #[test]
    fn rejects_zero_dimensions() {
        let vp = Viewport::home(1.0).unwrap();
        let err = evaluate(FractalKind::Mandelbrot, &vp, 50, 0, 4).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Core(CoreError::InvalidDimension { width: 0, height: 4 })
        ));
    }

    #[test]
    fn rejects_zero_budget() {
        let vp = Viewport::home(1.0).unwrap();
        let err = evaluate(FractalKind::Mandelbrot, &vp, 0, 4, 4).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Core(CoreError::InvalidIterationBudget(0))
        ));
    }

    #[test]
    fn progress_reaches_total() {
        let vp = Viewport::home(1.0).unwrap();
        let cancel = RenderCancel::new();
        evaluate_cancellable(FractalKind::Mandelbrot, &vp, 32, 150, 100, &cancel).unwrap();
        assert_eq!(cancel.progress(), (6, 6));
    }

    #[test]
    fn rejects_degenerate_viewports() {
        let zero_scale = Viewport {
            center: Complex::ZERO,
            scale: 0.0,
            aspect_ratio: 1.0,
        };
        let nan_center = Viewport {
            center: Complex::new(f64::NAN, 0.0),
            scale: 3.0,
            aspect_ratio: 1.0,
        };
        for vp in [zero_scale, nan_center] {
            let err = evaluate(FractalKind::Mandelbrot, &vp, 50, 4, 4).unwrap_err();
            assert!(
                matches!(err, RenderError::Core(CoreError::InvalidViewport { .. })),
                "{vp:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn cancellation_stops_evaluation() {
        // Deep inside the Tricorn every pixel runs the full budget, so the
        // render is still busy when the first tile reports in.
        let vp = Viewport::new(Complex::ZERO, 1e-4, 1.0).unwrap();
        let cancel = std::sync::Arc::new(RenderCancel::new());

        let cancel_clone = std::sync::Arc::clone(&cancel);
        let canceller = std::thread::spawn(move || {
            while cancel_clone.progress().0 == 0 {
                std::thread::yield_now();
            }
            cancel_clone.cancel();
        });

        let result =
            evaluate_cancellable(FractalKind::Tricorn, &vp, 20_000, 1024, 1024, &cancel);
        canceller.join().unwrap();

        assert!(matches!(result, Err(RenderError::Cancelled)));
        let (done, total) = cancel.progress();
        assert_eq!(total, 256);
        assert!(done < total, "not all tiles should have been evaluated");
    }
}
