//! Interface profiles between successive layers of a multilayer stack.
//!
//! Real interfaces are never perfectly sharp: interdiffusion and roughness
//! blur the transition from one material to the next. Following Stearns
//! (1989), the transition is described by a profile `p(z)`, the fraction of
//! material belonging to the new layer at signed depth `z` from the nominal
//! interface. The Fourier transform of `p'(z)` evaluated at the momentum
//! transfer `s = 4 pi cos(theta) / lambda` multiplies the Fresnel reflection
//! coefficient of an ideal interface.
//!
//! Four shapes are provided, each parameterized by a single width `sigma`:
//!
//! | shape       | `p(z)`                                   | attenuation                         |
//! |-------------|------------------------------------------|-------------------------------------|
//! | error func. | `(1 + erf(z / sqrt(2) sigma)) / 2`       | `exp(-(s sigma)^2 / 2)`             |
//! | exponential | two-sided exponential                    | `1 / (1 + (s sigma)^2 / 2)`         |
//! | linear      | ramp of half-width `sqrt(3) sigma`       | `sinc(sqrt(3) sigma s)`             |
//! | sinusoidal  | half sine of half-width `a sigma`        | `pi/4 [sinc(x - pi/2) + sinc(x + pi/2)]` |
//!
//! with `a = pi / sqrt(pi^2 - 8)` and `x = a sigma s`. A width of zero is the
//! sharp-interface limit: `p` becomes a step and the attenuation is exactly 1.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, SQRT_2};
use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::snell::cos_theta;
use crate::wave::Direction;


/// The transition shape between two layers, with its characteristic width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum InterfaceProfile {
    Erf { width: f64 },
    Exponential { width: f64 },
    Linear { width: f64 },
    Sinusoidal { width: f64 },
}

/// `pi / sqrt(pi^2 - 8)`, the half-width of the sinusoidal profile in units of its width.
fn sinusoidal_scale() -> f64 {
    PI / (PI * PI - 8.0).sqrt()
}

/// `sin(x) / x`, continuous at the origin.
fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-8 {
        1.0 - x * x / 6.0
    } else {
        x.sin() / x
    }
}

/// The sharp-interface limit of every profile.
fn step(z: f64) -> f64 {
    if z < 0.0 {
        0.0
    } else if z > 0.0 {
        1.0
    } else {
        0.5
    }
}

fn check_width(width: f64) -> Result<f64> {
    if width.is_finite() && width >= 0.0 {
        Ok(width)
    } else {
        Err(Error::InvalidWidth(width))
    }
}

impl InterfaceProfile {
    /// Error-function profile, the integral of a Gaussian of standard deviation `width`.
    pub fn erf(width: f64) -> Result<Self> {
        Ok(Self::Erf {
            width: check_width(width)?,
        })
    }

    /// Two-sided exponential profile.
    pub fn exponential(width: f64) -> Result<Self> {
        Ok(Self::Exponential {
            width: check_width(width)?,
        })
    }

    /// Linear ramp profile.
    pub fn linear(width: f64) -> Result<Self> {
        Ok(Self::Linear {
            width: check_width(width)?,
        })
    }

    /// Half-period sine profile.
    pub fn sinusoidal(width: f64) -> Result<Self> {
        Ok(Self::Sinusoidal {
            width: check_width(width)?,
        })
    }

    /// Characteristic length scale of the profile.
    pub fn width(&self) -> f64 {
        match *self {
            Self::Erf { width }
            | Self::Exponential { width }
            | Self::Linear { width }
            | Self::Sinusoidal { width } => width,
        }
    }

    /// Checks the width of a profile built without its constructor (e.g. deserialized).
    pub fn validate(&self) -> Result<()> {
        check_width(self.width()).map(|_| ())
    }

    /// Fraction of the material at depth `z` that belongs to the new layer.
    pub fn mix(&self, z: f64) -> f64 {
        let width = self.width();
        if width == 0.0 {
            return step(z);
        }
        match self {
            Self::Erf { .. } => (1.0 + libm::erf(z / (SQRT_2 * width))) / 2.0,
            Self::Exponential { .. } => {
                if z <= 0.0 {
                    (SQRT_2 * z / width).exp() / 2.0
                } else {
                    1.0 - (-SQRT_2 * z / width).exp() / 2.0
                }
            }
            Self::Linear { .. } => {
                let result = 0.5 + z / (2.0 * 3f64.sqrt() * width);
                result.clamp(0.0, 1.0)
            }
            Self::Sinusoidal { .. } => {
                let half_width = sinusoidal_scale() * width;
                let z = z.clamp(-half_width, half_width);
                0.5 + (FRAC_PI_2 * z / half_width).sin() / 2.0
            }
        }
    }

    /// Factor by which this profile reduces the amplitude reflection
    /// coefficient of an ideal interface, for light of vacuum wavelength
    /// `wavelength` travelling along `direction`.
    ///
    /// Only the real part of the direction cosine enters the momentum transfer.
    /// The linear and sinusoidal shapes oscillate once `s * width` passes their
    /// first zero.
    pub fn attenuation(&self, wavelength: f64, direction: &Direction, normal: &Vector3<f64>) -> f64 {
        let width = self.width();
        if width == 0.0 {
            return 1.0;
        }
        let s = 4.0 * PI * cos_theta(direction, normal).re / wavelength;
        match self {
            Self::Erf { .. } => (-(s * width).powi(2) / 2.0).exp(),
            Self::Exponential { .. } => 1.0 / (1.0 + (s * width).powi(2) / 2.0),
            Self::Linear { .. } => sinc(3f64.sqrt() * width * s),
            Self::Sinusoidal { .. } => {
                let x = sinusoidal_scale() * width * s;
                FRAC_PI_4 * (sinc(x - FRAC_PI_2) + sinc(x + FRAC_PI_2))
            }
        }
    }
}

impl fmt::Display for InterfaceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Erf { .. } => "erf",
            Self::Exponential { .. } => "exponential",
            Self::Linear { .. } => "linear",
            Self::Sinusoidal { .. } => "sinusoidal",
        };
        write!(f, "{} profile ({} nm)", name, self.width())
    }
}
