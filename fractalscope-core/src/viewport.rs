use crate::complex::Complex;
use crate::error::CoreError;

/// Defines the visible region of the complex plane.
///
/// The rectangle is centred on `center`, `scale` units tall and
/// `scale * aspect_ratio` units wide. Pixel resolution is not part of the
/// viewport; it is chosen per evaluation through [`Viewport::pixel_grid`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Centre of the viewport in the complex plane.
    pub center: Complex,

    /// Height of the visible rectangle in complex-plane units.
    pub scale: f64,

    /// Width divided by height of the visible rectangle.
    pub aspect_ratio: f64,
}

impl Viewport {
    pub const DEFAULT_SCALE: f64 = 3.0;

    /// Create a viewport, rejecting values that would map pixels to NaN or
    /// a degenerate rectangle.
    pub fn new(center: Complex, scale: f64, aspect_ratio: f64) -> crate::Result<Self> {
        if !center.is_finite() {
            return Err(CoreError::InvalidViewport {
                reason: format!("center must be finite, got {center}"),
            });
        }
        if scale <= 0.0 || !scale.is_finite() {
            return Err(CoreError::InvalidViewport {
                reason: format!("scale must be positive and finite, got {scale}"),
            });
        }
        if aspect_ratio <= 0.0 || !aspect_ratio.is_finite() {
            return Err(CoreError::InvalidViewport {
                reason: format!("aspect ratio must be positive and finite, got {aspect_ratio}"),
            });
        }
        Ok(Self {
            center,
            scale,
            aspect_ratio,
        })
    }

    /// The full view at the origin: `scale = 3.0`.
    pub fn home(aspect_ratio: f64) -> crate::Result<Self> {
        Self::new(Complex::ZERO, Self::DEFAULT_SCALE, aspect_ratio)
    }

    /// Real-axis extent of the visible rectangle.
    pub fn complex_width(&self) -> f64 {
        self.scale * self.aspect_ratio
    }

    /// Imaginary-axis extent of the visible rectangle.
    pub fn complex_height(&self) -> f64 {
        self.scale
    }

    /// Lay a `width × height` sample grid over the viewport.
    ///
    /// Samples sit on the rectangle's edges inclusively: column 0 is the left
    /// edge, column `width - 1` the right edge, row 0 the top edge.
    pub fn pixel_grid(&self, width: u32, height: u32) -> crate::Result<PixelGrid> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidDimension { width, height });
        }
        let span_re = self.complex_width();
        let span_im = self.complex_height();
        Ok(PixelGrid {
            left: self.center.re - 0.5 * span_re,
            top: self.center.im + 0.5 * span_im,
            step_re: inclusive_step(span_re, width),
            step_im: inclusive_step(span_im, height),
            width,
            height,
        })
    }
}

fn inclusive_step(span: f64, samples: u32) -> f64 {
    if samples > 1 {
        span / (samples - 1) as f64
    } else {
        0.0
    }
}

/// Pixel-to-plane mapping for one output resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelGrid {
    left: f64,
    top: f64,
    step_re: f64,
    step_im: f64,
    pub width: u32,
    pub height: u32,
}

impl PixelGrid {
    /// Map a pixel coordinate to a point on the complex plane.
    ///
    /// `(0, 0)` is the top-left pixel; increasing `py` moves towards
    /// decreasing imaginary part.
    #[inline]
    pub fn point(&self, px: u32, py: u32) -> Complex {
        Complex::new(
            self.left + px as f64 * self.step_re,
            self.top - py as f64 * self.step_im,
        )
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
