use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use fractalscope_core::{Complex, CoreError, FractalKind, Viewport};

use crate::palette::{build_palette, Palette, PaletteKind};

/// Iteration budget of the home view.
pub const DEFAULT_MAX_ITER: u32 = 300;
/// Bounds applied to the zoom-derived iteration budget.
pub const MIN_ZOOM_ITER: u32 = 64;
pub const MAX_ZOOM_ITER: u32 = 4000;

/// Iteration budget for a given zoom depth: `clamp(300 / scale^0.3, 64, 4000)`.
pub fn iterations_for_scale(scale: f64) -> u32 {
    let budget = DEFAULT_MAX_ITER as f64 / scale.powf(0.3);
    budget.clamp(MIN_ZOOM_ITER as f64, MAX_ZOOM_ITER as f64) as u32
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Interaction tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewSettings {
    /// Scale multiplier for one zoom-in step; zoom-out uses its reciprocal.
    #[serde(default = "default_zoom_speed")]
    pub zoom_speed: f64,
    /// Multiplier on pan deltas.
    #[serde(default = "default_pan_speed")]
    pub pan_speed: f64,
}

fn default_zoom_speed() -> f64 {
    0.8
}
fn default_pan_speed() -> f64 {
    1.0
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            zoom_speed: default_zoom_speed(),
            pan_speed: default_pan_speed(),
        }
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// A view that [`ViewState::go_back`] can return to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryEntry {
    pub center: Complex,
    pub scale: f64,
    pub max_iter: u32,
    pub kind: FractalKind,
}

/// Stack of previously visited views, most recent last.
///
/// There is no cap: every zoom, reset and drag start adds an entry for the
/// lifetime of the session, so memory grows with the number of interactions.
#[derive(Debug, Clone, Default)]
pub struct ViewHistory {
    entries: Vec<HistoryEntry>,
}

impl ViewHistory {
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Everything a frame is rendered from, copied out of a [`ViewState`] in one
/// step so a frame never mixes fields from two different views.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSnapshot {
    pub center: Complex,
    pub scale: f64,
    pub aspect_ratio: f64,
    pub max_iter: u32,
    pub kind: FractalKind,
    pub palette: PaletteKind,
}

impl ViewSnapshot {
    pub fn viewport(&self) -> fractalscope_core::Result<Viewport> {
        Viewport::new(self.center, self.scale, self.aspect_ratio)
    }
}

impl fmt::Display for ViewSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Set   : {}", self.kind)?;
        writeln!(f, "Center: ({:+.4}, {:+.4})", self.center.re, self.center.im)?;
        writeln!(f, "Scale : {:.2e}", self.scale)?;
        write!(f, "Iter  : {}", self.max_iter)
    }
}

// ---------------------------------------------------------------------------
// View state
// ---------------------------------------------------------------------------

/// Pan/zoom/budget state of one explorer session.
///
/// Every mutating operation sets the dirty flag; the frame producer clears it
/// after rendering a fresh frame.
#[derive(Debug, Clone)]
pub struct ViewState {
    center: Complex,
    scale: f64,
    aspect_ratio: f64,
    max_iter: u32,
    kind: FractalKind,
    palette: Palette,
    history: ViewHistory,
    settings: ViewSettings,
    dirty: bool,
}

impl ViewState {
    /// Home view for a display with the given aspect ratio. Starts dirty so
    /// the first frame gets produced.
    pub fn new(aspect_ratio: f64) -> fractalscope_core::Result<Self> {
        let home = Viewport::home(aspect_ratio)?;
        Ok(Self {
            center: home.center,
            scale: home.scale,
            aspect_ratio: home.aspect_ratio,
            max_iter: DEFAULT_MAX_ITER,
            kind: FractalKind::default(),
            palette: Palette::default(),
            history: ViewHistory::default(),
            settings: ViewSettings::default(),
            dirty: true,
        })
    }

    pub fn with_settings(mut self, settings: ViewSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn center(&self) -> Complex {
        self.center
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    pub fn max_iter(&self) -> u32 {
        self.max_iter
    }

    pub fn kind(&self) -> FractalKind {
        self.kind
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    pub fn history(&self) -> &ViewHistory {
        &self.history
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            center: self.center,
            scale: self.scale,
            aspect_ratio: self.aspect_ratio,
            max_iter: self.max_iter,
            kind: self.kind,
            palette: self.palette.kind(),
        }
    }

    pub fn viewport(&self) -> fractalscope_core::Result<Viewport> {
        self.snapshot().viewport()
    }

    fn save_state(&mut self) {
        self.history.push(HistoryEntry {
            center: self.center,
            scale: self.scale,
            max_iter: self.max_iter,
            kind: self.kind,
        });
        debug!(depth = self.history.len(), "Pushed view history");
    }

    /// Offset from the view centre to the plane point under `uv`.
    ///
    /// `uv` is in texture coordinates: `u` grows rightwards, `v` upwards.
    fn cursor_offset(&self, uv: (f64, f64), scale: f64) -> Complex {
        Complex::new(
            (uv.0 - 0.5) * scale * self.aspect_ratio,
            (uv.1 - 0.5) * scale,
        )
    }

    /// Rescale the view by `factor`, keeping the point under the cursor fixed.
    ///
    /// Does nothing when the cursor is not over the view. The iteration
    /// budget follows the new depth via [`iterations_for_scale`].
    pub fn zoom(
        &mut self,
        factor: f64,
        cursor_uv: Option<(f64, f64)>,
    ) -> fractalscope_core::Result<()> {
        if factor <= 0.0 || !factor.is_finite() {
            return Err(CoreError::InvalidViewport {
                reason: format!("zoom factor must be positive and finite, got {factor}"),
            });
        }
        let Some(uv) = cursor_uv else {
            return Ok(());
        };

        let focus = self.center + self.cursor_offset(uv, self.scale);
        let new_scale = self.scale * factor;
        let new_center = focus - self.cursor_offset(uv, new_scale);
        Viewport::new(new_center, new_scale, self.aspect_ratio)?;

        self.save_state();
        self.scale = new_scale;
        self.center = new_center;
        self.max_iter = iterations_for_scale(new_scale);
        self.dirty = true;
        Ok(())
    }

    pub fn zoom_in(&mut self, cursor_uv: Option<(f64, f64)>) -> fractalscope_core::Result<()> {
        self.zoom(self.settings.zoom_speed, cursor_uv)
    }

    pub fn zoom_out(&mut self, cursor_uv: Option<(f64, f64)>) -> fractalscope_core::Result<()> {
        self.zoom(1.0 / self.settings.zoom_speed, cursor_uv)
    }

    /// Record the view at the start of a drag so the whole drag undoes as
    /// one step.
    pub fn begin_pan(&mut self) {
        self.save_state();
    }

    /// Drag the view by `delta_uv` (fractions of the view size).
    ///
    /// The content follows the pointer, so the centre moves the opposite
    /// way. Not recorded in history.
    pub fn pan(&mut self, delta_uv: (f64, f64)) -> fractalscope_core::Result<()> {
        let shift = self.cursor_offset((delta_uv.0 + 0.5, delta_uv.1 + 0.5), self.scale)
            * self.settings.pan_speed;
        let new_center = self.center - shift;
        Viewport::new(new_center, self.scale, self.aspect_ratio)?;
        self.center = new_center;
        self.dirty = true;
        Ok(())
    }

    /// Return to the home view, keeping the fractal kind.
    pub fn reset(&mut self) {
        self.save_state();
        self.center = Complex::ZERO;
        self.scale = Viewport::DEFAULT_SCALE;
        self.max_iter = DEFAULT_MAX_ITER;
        self.dirty = true;
    }

    /// Restore the most recent history entry. Returns `false` (and changes
    /// nothing) when the history is empty.
    pub fn go_back(&mut self) -> bool {
        let Some(entry) = self.history.pop() else {
            return false;
        };
        debug!(depth = self.history.len(), "Popped view history");
        self.center = entry.center;
        self.scale = entry.scale;
        self.max_iter = entry.max_iter;
        self.kind = entry.kind;
        self.dirty = true;
        true
    }

    /// Switch the recurrence. Not recorded in history.
    pub fn set_fractal_kind(&mut self, kind: FractalKind) {
        if kind != self.kind {
            self.kind = kind;
            self.dirty = true;
        }
    }

    /// Switch the colour scheme. Not recorded in history.
    pub fn set_palette(&mut self, kind: PaletteKind) {
        if kind != self.palette.kind() {
            self.palette = build_palette(kind);
            debug!(palette = %kind, "Palette changed");
            self.dirty = true;
        }
    }

    /// Advance to the next palette in [`PaletteKind::ALL`] order.
    pub fn cycle_palette(&mut self) {
        self.set_palette(self.palette.kind().next());
    }

    /// Follow a display resize.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f64) -> fractalscope_core::Result<()> {
        Viewport::new(self.center, self.scale, aspect_ratio)?;
        if aspect_ratio != self.aspect_ratio {
            self.aspect_ratio = aspect_ratio;
            self.dirty = true;
        }
        Ok(())
    }
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.snapshot(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn state() -> ViewState {
        ViewState::new(1.5).unwrap()
    }

    #[test]
    fn starts_at_home_and_dirty() {
        let s = state();
        assert_eq!(s.center(), Complex::ZERO);
        assert!((s.scale() - 3.0).abs() < EPSILON);
        assert_eq!(s.max_iter(), 300);
        assert_eq!(s.kind(), FractalKind::Mandelbrot);
        assert_eq!(s.palette().kind(), PaletteKind::Rainbow);
        assert!(s.is_dirty());
        assert!(s.history().is_empty());
    }

    #[test]
    fn zoom_keeps_cursor_point_fixed() {
        let mut s = state();
        let uv = (0.8, 0.3);
        let before = s.center() + s.cursor_offset(uv, s.scale());
        s.zoom(0.5, Some(uv)).unwrap();
        let after = s.center() + s.cursor_offset(uv, s.scale());
        assert!((before.re - after.re).abs() < EPSILON);
        assert!((before.im - after.im).abs() < EPSILON);
        assert!((s.scale() - 1.5).abs() < EPSILON);
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn zoom_at_centre_keeps_centre() {
        let mut s = state();
        s.zoom(0.25, Some((0.5, 0.5))).unwrap();
        assert_eq!(s.center(), Complex::ZERO);
    }

    #[test]
    fn zoom_then_inverse_restores_view() {
        let mut s = state();
        s.pan((0.1, -0.2)).unwrap();
        let (c0, s0) = (s.center(), s.scale());
        s.zoom(0.8, Some((0.3, 0.9))).unwrap();
        s.zoom(1.0 / 0.8, Some((0.3, 0.9))).unwrap();
        assert!((s.scale() - s0).abs() < EPSILON);
        assert!((s.center().re - c0.re).abs() < EPSILON);
        assert!((s.center().im - c0.im).abs() < EPSILON);
    }

    #[test]
    fn zoom_without_cursor_is_noop() {
        let mut s = state();
        s.clear_dirty();
        s.zoom_in(None).unwrap();
        assert!(!s.is_dirty());
        assert!(s.history().is_empty());
        assert!((s.scale() - 3.0).abs() < EPSILON);
    }

    #[test]
    fn zoom_rejects_bad_factor() {
        let mut s = state();
        assert!(s.zoom(0.0, Some((0.5, 0.5))).is_err());
        assert!(s.zoom(f64::NAN, Some((0.5, 0.5))).is_err());
        assert!(s.history().is_empty());
    }

    #[test]
    fn zoom_budget_grows_with_depth() {
        assert_eq!(iterations_for_scale(3.0), 215);
        assert_eq!(iterations_for_scale(1000.0), MIN_ZOOM_ITER);
        assert_eq!(iterations_for_scale(1e-12), MAX_ZOOM_ITER);
        assert!(iterations_for_scale(1e-3) > iterations_for_scale(1e-1));

        let mut s = state();
        s.zoom_in(Some((0.5, 0.5))).unwrap();
        assert_eq!(s.max_iter(), iterations_for_scale(2.4));
    }

    #[test]
    fn pan_moves_against_drag_without_history() {
        let mut s = state();
        s.pan((0.1, 0.2)).unwrap();
        assert!((s.center().re - (-0.1 * 3.0 * 1.5)).abs() < EPSILON);
        assert!((s.center().im - (-0.2 * 3.0)).abs() < EPSILON);
        assert!(s.history().is_empty());
        assert!(s.is_dirty());
    }

    #[test]
    fn begin_pan_records_one_entry() {
        let mut s = state();
        s.begin_pan();
        s.pan((0.1, 0.0)).unwrap();
        s.pan((0.1, 0.0)).unwrap();
        assert_eq!(s.history().len(), 1);
        assert!(s.go_back());
        assert_eq!(s.center(), Complex::ZERO);
    }

    #[test]
    fn reset_restores_home_and_keeps_kind() {
        let mut s = state();
        s.set_fractal_kind(FractalKind::Tricorn);
        s.zoom(0.1, Some((0.9, 0.9))).unwrap();
        s.reset();
        assert_eq!(s.center(), Complex::ZERO);
        assert!((s.scale() - 3.0).abs() < EPSILON);
        assert_eq!(s.max_iter(), 300);
        assert_eq!(s.kind(), FractalKind::Tricorn);
        assert_eq!(s.history().len(), 2);
    }

    #[test]
    fn go_back_replays_previous_states() {
        let mut s = state();
        let mut seen = vec![s.snapshot()];
        s.zoom(0.5, Some((0.2, 0.7))).unwrap();
        seen.push(s.snapshot());
        s.zoom(0.5, Some((0.6, 0.1))).unwrap();
        seen.push(s.snapshot());
        s.reset();

        for expected in seen.iter().rev() {
            assert!(s.go_back());
            let got = s.snapshot();
            assert_eq!(got.center, expected.center);
            assert_eq!(got.scale, expected.scale);
            assert_eq!(got.max_iter, expected.max_iter);
        }
        assert!(s.history().is_empty());
    }

    #[test]
    fn go_back_on_empty_history_is_noop() {
        let mut s = state();
        s.clear_dirty();
        let before = s.snapshot();
        assert!(!s.go_back());
        assert_eq!(s.snapshot(), before);
        assert!(!s.is_dirty());
    }

    #[test]
    fn go_back_restores_fractal_kind() {
        let mut s = state();
        s.zoom(0.5, Some((0.5, 0.5))).unwrap();
        s.set_fractal_kind(FractalKind::BurningShip);
        assert_eq!(s.history().len(), 1, "kind change is not recorded");
        s.go_back();
        assert_eq!(s.kind(), FractalKind::Mandelbrot);
    }

    #[test]
    fn same_kind_does_not_dirty() {
        let mut s = state();
        s.clear_dirty();
        s.set_fractal_kind(FractalKind::Mandelbrot);
        assert!(!s.is_dirty());
        s.set_fractal_kind(FractalKind::Tricorn);
        assert!(s.is_dirty());
    }

    #[test]
    fn cycle_palette_wraps_without_history() {
        let mut s = state();
        for _ in 0..4 {
            s.cycle_palette();
        }
        assert_eq!(s.palette().kind(), PaletteKind::Rainbow);
        s.cycle_palette();
        assert_eq!(s.palette().kind(), PaletteKind::Fiery);
        assert!(s.history().is_empty());
    }

    #[test]
    fn aspect_ratio_validated() {
        let mut s = state();
        assert!(s.set_aspect_ratio(0.0).is_err());
        s.set_aspect_ratio(2.0).unwrap();
        assert!((s.viewport().unwrap().complex_width() - 6.0).abs() < EPSILON);
    }

    #[test]
    fn status_readout() {
        let text = state().to_string();
        assert!(text.contains("Set   : Mandelbrot"));
        assert!(text.contains("Center: (+0.0000, +0.0000)"));
        assert!(text.contains("Scale : 3.00e0"));
        assert!(text.contains("Iter  : 300"));
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let s: ViewSettings = serde_json::from_str(r#"{"zoom_speed": 0.5}"#).unwrap();
        assert_eq!(s.zoom_speed, 0.5);
        assert_eq!(s.pan_speed, 1.0);
    }
}
