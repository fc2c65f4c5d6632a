use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use fractalscope_core::FractalKind;
use fractalscope_render::{FrameProducer, PaletteKind, ViewSettings};

/// Driver preferences, read from `preferences.json` next to the executable.
///
/// Every field has a default so partial files stay valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppPreferences {
    /// Size of the display the frame is produced for.
    #[serde(default = "default_display_width")]
    pub display_width: u32,
    #[serde(default = "default_display_height")]
    pub display_height: u32,
    /// Display pixels per output pixel along each axis.
    #[serde(default = "default_quality_factor")]
    pub quality_factor: u32,
    #[serde(default = "default_min_output_size")]
    pub min_output_size: u32,
    #[serde(default)]
    pub view: ViewSettings,
    #[serde(default)]
    pub fractal: FractalKind,
    #[serde(default)]
    pub palette: PaletteKind,
}

fn default_display_width() -> u32 {
    1280
}
fn default_display_height() -> u32 {
    720
}
fn default_quality_factor() -> u32 {
    FrameProducer::DEFAULT_QUALITY_FACTOR
}
fn default_min_output_size() -> u32 {
    FrameProducer::DEFAULT_MIN_SIZE
}

impl Default for AppPreferences {
    fn default() -> Self {
        Self {
            display_width: default_display_width(),
            display_height: default_display_height(),
            quality_factor: default_quality_factor(),
            min_output_size: default_min_output_size(),
            view: ViewSettings::default(),
            fractal: FractalKind::default(),
            palette: PaletteKind::default(),
        }
    }
}

impl AppPreferences {
    /// Load preferences from `path`; a missing or unreadable file yields defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            debug!("No preferences file at {}", path.display());
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<AppPreferences>(&json) {
                Ok(mut prefs) => {
                    info!("Loaded preferences from {}", path.display());
                    prefs.sanitize();
                    return prefs;
                }
                Err(e) => error!("Failed to parse preferences: {e}"),
            },
            Err(e) => error!("Failed to read preferences file: {e}"),
        }
        Self::default()
    }

    /// Persist preferences to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        debug!("Saved preferences to {}", path.display());
        Ok(())
    }

    /// Replace view speeds that would make every zoom or pan fail.
    fn sanitize(&mut self) {
        let defaults = ViewSettings::default();
        let zoom = self.view.zoom_speed;
        if zoom <= 0.0 || !zoom.is_finite() {
            error!("Invalid zoom_speed {zoom}, using {}", defaults.zoom_speed);
            self.view.zoom_speed = defaults.zoom_speed;
        }
        let pan = self.view.pan_speed;
        if !pan.is_finite() {
            error!("Invalid pan_speed {pan}, using {}", defaults.pan_speed);
            self.view.pan_speed = defaults.pan_speed;
        }
    }

    /// Aspect ratio of the configured display.
    pub fn display_aspect(&self) -> f64 {
        self.display_width.max(1) as f64 / self.display_height.max(1) as f64
    }
}

pub fn config_path() -> PathBuf {
    crate::app_dir::exe_directory().join("preferences.json")
}
