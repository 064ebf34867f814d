//! Energy bookkeeping for a multilayer calculation.
//!
//! All quantities are fractions of the incident power. For a passive stack
//! `reflected + transmitted <= 1` and the remainder is absorbed in the layers.

use std::{fmt, ops::*};

use crate::config;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorbed_is_remainder() {
        let powers = Powers::new(0.3, 0.5);
        assert!((powers.absorbed() - 0.2).abs() < 1e-15);
        assert!(powers.is_conserving());
    }

    #[test]
    fn excess_detected() {
        assert!(!Powers::new(0.7, 0.4).is_conserving());
    }

    #[test]
    fn average() {
        let mut powers = Powers::new(0.2, 0.6) + Powers::new(0.4, 0.4);
        powers /= 2.0;
        assert!((powers.reflected - 0.3).abs() < 1e-15);
        assert!((powers.transmitted - 0.5).abs() < 1e-15);
    }
}

/// Reflected and transmitted power, as fractions of the incident power.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Powers {
    pub reflected: f64,
    pub transmitted: f64,
}

impl DivAssign<f64> for Powers {
    fn div_assign(&mut self, rhs: f64) {
        self.reflected /= rhs;
        self.transmitted /= rhs;
    }
}

impl Add for Powers {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            reflected: self.reflected + other.reflected,
            transmitted: self.transmitted + other.transmitted,
        }
    }
}

impl AddAssign for Powers {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Powers {
    pub fn new(reflected: f64, transmitted: f64) -> Self {
        Self {
            reflected,
            transmitted,
        }
    }

    /// Power absorbed in the stack: `1 - R - T`.
    pub fn absorbed(&self) -> f64 {
        1.0 - self.reflected - self.transmitted
    }

    /// Whether `R + T` stays within `1 + ENERGY_TOLERANCE`.
    pub fn is_conserving(&self) -> bool {
        self.absorbed() >= -config::ENERGY_TOLERANCE
    }
}

impl fmt::Display for Powers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Powers:")?;
        writeln!(f, "  Reflected:        {:.6}", self.reflected)?;
        writeln!(f, "  Transmitted:      {:.6}", self.transmitted)?;
        writeln!(f, "  Absorbed:         {:.6}", self.absorbed())
    }
}
