use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info};

use fractalscope_render::{export_png, ExportMetadata, Frame, FrameProducer, ViewState};

use crate::error::AppError;
use crate::input::parse_event;
use crate::preferences::AppPreferences;

/// One headless explorer run: a view state driven by parsed events and a
/// frame producer sized from the preferences.
pub struct Session {
    prefs: AppPreferences,
    state: ViewState,
    producer: FrameProducer,
}

impl Session {
    pub fn new(prefs: AppPreferences) -> Result<Self, AppError> {
        let mut state = ViewState::new(prefs.display_aspect())?.with_settings(prefs.view);
        state.set_fractal_kind(prefs.fractal);
        state.set_palette(prefs.palette);
        let producer = FrameProducer::new(prefs.quality_factor, prefs.min_output_size);
        Ok(Self {
            prefs,
            state,
            producer,
        })
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Parse and apply every token in order. Events run against a copy of
    /// the view that replaces the current one only if all of them succeed,
    /// so a failure anywhere leaves the session untouched.
    pub fn replay<S: AsRef<str>>(&mut self, tokens: &[S]) -> Result<(), AppError> {
        let mut events = Vec::new();
        for token in tokens {
            events.extend(parse_event(token.as_ref())?);
        }
        let mut next = self.state.clone();
        for event in events {
            debug!(?event, "Applying event");
            next.apply(event)?;
        }
        self.state = next;
        Ok(())
    }

    /// Produce a frame for the configured display, even if nothing changed.
    pub fn produce(&mut self) -> Result<Frame, AppError> {
        let (width, height) = (self.prefs.display_width, self.prefs.display_height);
        self.state.mark_dirty();
        self.producer
            .produce(&mut self.state, width, height)?
            .ok_or(AppError::NoFrame { width, height })
    }

    /// Write `frame` as a PNG into `dir`, returning the file path.
    pub fn export(&self, frame: &Frame, dir: &Path) -> Result<PathBuf, AppError> {
        std::fs::create_dir_all(dir)?;
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let kind = frame.snapshot.kind.display_name().replace(' ', "_").to_lowercase();
        let path = dir.join(format!("fractalscope_{kind}_{stamp}.png"));
        export_png(&frame.image, &path, &ExportMetadata::from_frame(frame))?;
        info!("Saved frame to {}", path.display());
        Ok(path)
    }
}
