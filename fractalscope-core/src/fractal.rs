use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::error::CoreError;

/// Bailout test is `|z| > 2`, compared as `|z|² > 4`.
pub const ESCAPE_RADIUS_SQ: f64 = 4.0;

/// The escape-time families the engine can evaluate.
///
/// Every family starts from `z₀ = 0` and differs only in the per-step
/// recurrence applied before adding `c`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FractalKind {
    /// `z ← z² + c`
    #[default]
    Mandelbrot,
    /// `z ← (|Re z| + i|Im z|)² + c`
    BurningShip,
    /// `z ← conj(z)² + c`
    Tricorn,
}

impl FractalKind {
    pub const ALL: &'static [Self] = &[Self::Mandelbrot, Self::BurningShip, Self::Tricorn];

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Mandelbrot => "Mandelbrot",
            Self::BurningShip => "Burning Ship",
            Self::Tricorn => "Tricorn",
        }
    }

    /// One step of the recurrence.
    #[inline]
    pub fn step(self, z: Complex, c: Complex) -> Complex {
        match self {
            Self::Mandelbrot => z.square() + c,
            Self::BurningShip => z.abs_parts().square() + c,
            Self::Tricorn => z.conj().square() + c,
        }
    }

    /// Iterate a single point and return its escape count.
    ///
    /// The result is the zero-based step index at which `|z| > 2` first
    /// held, or `max_iter` if the orbit stayed bounded for the whole budget.
    pub fn iterate(self, c: Complex, max_iter: u32) -> u32 {
        if self == Self::Mandelbrot && (in_cardioid(c.re, c.im) || in_period2_bulb(c.re, c.im)) {
            return max_iter;
        }

        let mut z = Complex::ZERO;
        for n in 0..max_iter {
            z = self.step(z, c);
            if z.norm_sq() > ESCAPE_RADIUS_SQ {
                return n;
            }
        }
        max_iter
    }
}

impl fmt::Display for FractalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for FractalKind {
    type Err = CoreError;

    /// Accepts display names and kebab/snake spellings, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|ch| !matches!(ch, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "mandelbrot" => Ok(Self::Mandelbrot),
            "burningship" => Ok(Self::BurningShip),
            "tricorn" => Ok(Self::Tricorn),
            _ => Err(CoreError::UnknownFractalKind(s.to_string())),
        }
    }
}

/// Reject a zero iteration budget.
pub fn check_iteration_budget(max_iter: u32) -> crate::Result<u32> {
    if max_iter < 1 {
        return Err(CoreError::InvalidIterationBudget(max_iter));
    }
    Ok(max_iter)
}

/// Returns `true` if `c` lies inside the Mandelbrot main cardioid.
#[inline]
fn in_cardioid(re: f64, im: f64) -> bool {
    let im2 = im * im;
    let q = (re - 0.25) * (re - 0.25) + im2;
    q * (q + (re - 0.25)) <= 0.25 * im2
}

/// Returns `true` if `c` lies inside the Mandelbrot period-2 bulb.
#[inline]
fn in_period2_bulb(re: f64, im: f64) -> bool {
    (re + 1.0) * (re + 1.0) + im * im <= 0.0625
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_never_escapes() {
        for &kind in FractalKind::ALL {
            assert_eq!(kind.iterate(Complex::ZERO, 100), 100, "{kind}");
        }
    }

    #[test]
    fn far_point_escapes_on_first_step() {
        for &kind in FractalKind::ALL {
            assert_eq!(kind.iterate(Complex::new(2.5, 0.0), 100), 0, "{kind}");
            assert_eq!(kind.iterate(Complex::new(-1.9, 1.9), 100), 0, "{kind}");
        }
    }

    #[test]
    fn known_mandelbrot_escape_count() {
        // c = 1: z₁=1, z₂=2 (|z|² = 4, not > 4), z₃=5 → escapes at index 2.
        assert_eq!(FractalKind::Mandelbrot.iterate(Complex::new(1.0, 0.0), 50), 2);
    }

    #[test]
    fn period_two_point_stays_bounded() {
        // c = -1 orbits 0 → -1 → 0 → -1 …
        for &kind in FractalKind::ALL {
            assert_eq!(kind.iterate(Complex::new(-1.0, 0.0), 64), 64, "{kind}");
        }
    }

    #[test]
    fn burning_ship_folds_before_squaring() {
        let c = Complex::new(0.1, -0.3);
        let z = Complex::new(-0.5, -0.5);
        // (0.5 + 0.5i)² = 0.5i
        let next = FractalKind::BurningShip.step(z, c);
        assert!((next.re - 0.1).abs() < 1e-12);
        assert!((next.im - 0.2).abs() < 1e-12);
    }

    #[test]
    fn tricorn_conjugates_before_squaring() {
        let z = Complex::new(1.0, 1.0);
        // conj(1 + i)² = (1 - i)² = -2i
        let next = FractalKind::Tricorn.step(z, Complex::ZERO);
        assert!(next.re.abs() < 1e-12);
        assert!((next.im + 2.0).abs() < 1e-12);
    }

    #[test]
    fn families_disagree_off_axis() {
        let c = Complex::new(-1.76, -0.03);
        let counts: Vec<u32> = FractalKind::ALL.iter().map(|k| k.iterate(c, 200)).collect();
        assert!(counts.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn cardioid_shortcut_returns_budget() {
        assert_eq!(FractalKind::Mandelbrot.iterate(Complex::new(-0.5, 0.5), 50), 50);
        assert_eq!(FractalKind::Mandelbrot.iterate(Complex::new(-1.0, 0.1), 50), 50);
    }

    #[test]
    fn parse_names() {
        assert_eq!("Mandelbrot".parse::<FractalKind>().unwrap(), FractalKind::Mandelbrot);
        assert_eq!("Burning Ship".parse::<FractalKind>().unwrap(), FractalKind::BurningShip);
        assert_eq!("burning-ship".parse::<FractalKind>().unwrap(), FractalKind::BurningShip);
        assert_eq!("TRICORN".parse::<FractalKind>().unwrap(), FractalKind::Tricorn);
        assert!(matches!(
            "julia".parse::<FractalKind>(),
            Err(CoreError::UnknownFractalKind(_))
        ));
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&FractalKind::BurningShip).unwrap();
        assert_eq!(json, "\"burning-ship\"");
        let back: FractalKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FractalKind::BurningShip);
    }

    #[test]
    fn zero_budget_rejected() {
        assert_eq!(check_iteration_budget(0), Err(CoreError::InvalidIterationBudget(0)));
        assert_eq!(check_iteration_budget(1), Ok(1));
    }
}
