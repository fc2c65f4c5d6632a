use fractalscope_core::FractalKind;

use crate::palette::PaletteKind;
use crate::view::ViewState;

/// A discrete interaction delivered by the surrounding UI.
///
/// Cursor positions are normalised texture coordinates in `[0, 1]²`
/// (`u` rightwards, `v` upwards); `None` means the pointer is outside the view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewEvent {
    ZoomIn { cursor: Option<(f64, f64)> },
    ZoomOut { cursor: Option<(f64, f64)> },
    /// Pointer pressed on the view; starts an undoable drag.
    BeginPan,
    /// Pointer moved while pressed, in fractions of the view size.
    Pan { du: f64, dv: f64 },
    CyclePalette,
    SelectPalette(PaletteKind),
    GoBack,
    Reset,
    SelectKind(FractalKind),
    /// Display resized.
    Resize { aspect_ratio: f64 },
}

impl ViewState {
    /// Apply one interaction event. Every event that changes the view marks
    /// the state dirty.
    pub fn apply(&mut self, event: ViewEvent) -> fractalscope_core::Result<()> {
        match event {
            ViewEvent::ZoomIn { cursor } => self.zoom_in(cursor)?,
            ViewEvent::ZoomOut { cursor } => self.zoom_out(cursor)?,
            ViewEvent::BeginPan => self.begin_pan(),
            ViewEvent::Pan { du, dv } => self.pan((du, dv))?,
            ViewEvent::CyclePalette => self.cycle_palette(),
            ViewEvent::SelectPalette(kind) => self.set_palette(kind),
            ViewEvent::GoBack => {
                self.go_back();
            }
            ViewEvent::Reset => self.reset(),
            ViewEvent::SelectKind(kind) => self.set_fractal_kind(kind),
            ViewEvent::Resize { aspect_ratio } => self.set_aspect_ratio(aspect_ratio)?,
        }
        Ok(())
    }
}
