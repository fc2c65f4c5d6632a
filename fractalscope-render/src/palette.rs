use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::image::RgbImage;
use crate::iteration_grid::{normalize, IterationGrid};

/// Number of entries in every palette.
pub const LUT_SIZE: usize = 256;

// ---------------------------------------------------------------------------
// Palette selection
// ---------------------------------------------------------------------------

/// The built-in colour schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaletteKind {
    /// Cosine sweep with the three channels a third of a turn apart.
    #[default]
    Rainbow,
    /// Black through red and orange to white.
    Fiery,
    /// Cosine sweep with uneven per-channel frequencies.
    Psychedelic,
    Grayscale,
}

impl PaletteKind {
    /// Cycle order used by [`PaletteKind::next`].
    pub const ALL: &'static [Self] = &[
        Self::Rainbow,
        Self::Fiery,
        Self::Psychedelic,
        Self::Grayscale,
    ];

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Rainbow => "Rainbow",
            Self::Fiery => "Fiery",
            Self::Psychedelic => "Psychedelic",
            Self::Grayscale => "Grayscale",
        }
    }

    /// Position in [`PaletteKind::ALL`].
    pub fn index(self) -> usize {
        match self {
            Self::Rainbow => 0,
            Self::Fiery => 1,
            Self::Psychedelic => 2,
            Self::Grayscale => 3,
        }
    }

    /// Look up a palette by position; unknown positions are rejected.
    pub fn from_index(index: usize) -> crate::Result<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or_else(|| RenderError::InvalidPaletteSelection(index.to_string()))
    }

    /// The following palette, wrapping after the last one.
    #[must_use]
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for PaletteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for PaletteKind {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.display_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RenderError::InvalidPaletteSelection(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// A 256-entry RGB lookup table.
///
/// Built once per selection and immutable afterwards; index 0 colours the
/// fastest-escaping samples, index 255 the interior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    kind: PaletteKind,
    colors: Vec<[u8; 3]>,
}

impl Palette {
    pub fn kind(&self) -> PaletteKind {
        self.kind
    }

    pub fn colors(&self) -> &[[u8; 3]] {
        &self.colors
    }

    #[inline]
    pub fn lookup(&self, index: u8) -> [u8; 3] {
        self.colors[index as usize]
    }

    /// Colour an entire iteration grid into an RGB image.
    pub fn colorize(&self, grid: &IterationGrid) -> RgbImage {
        let mut image = RgbImage::new(grid.width, grid.height);
        image
            .pixels
            .par_chunks_mut(RgbImage::CHANNELS)
            .zip(grid.data.par_iter())
            .for_each(|(pixel, &count)| {
                pixel.copy_from_slice(&self.lookup(normalize(count, grid.max_iter)));
            });
        image
    }
}

impl Default for Palette {
    fn default() -> Self {
        build_palette(PaletteKind::default())
    }
}

/// Generate the lookup table for `kind`.
///
/// `t` runs over `[0, 1]` inclusively across the 256 entries; each channel is
/// computed as a float in `[0, 1]` and truncated to a byte.
pub fn build_palette(kind: PaletteKind) -> Palette {
    let colors = (0..LUT_SIZE)
        .map(|i| {
            let t = i as f64 / (LUT_SIZE - 1) as f64;
            let rgb = match kind {
                PaletteKind::Rainbow => cosine(t, [1.0, 1.0, 1.0], [0.0, 0.33, 0.67]),
                PaletteKind::Fiery => [t.powf(0.8), (t * t).powf(0.9), t * t * t],
                PaletteKind::Psychedelic => cosine(t, [1.0, 0.7, 0.4], [0.0, 0.15, 0.20]),
                PaletteKind::Grayscale => [t, t, t],
            };
            rgb.map(to_byte)
        })
        .collect();
    Palette { kind, colors }
}

/// `0.5 + 0.5·cos(2π(t·freq + phase))` per channel.
fn cosine(t: f64, freq: [f64; 3], phase: [f64; 3]) -> [f64; 3] {
    [0, 1, 2].map(|ch| 0.5 + 0.5 * (TAU * (t * freq[ch] + phase[ch])).cos())
}

#[inline]
fn to_byte(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0) as u8
}
