//! Complex 2x2 transfer-matrix algebra.
//!
//! Transfer matrices form a monoid under multiplication with the identity
//! as neutral element. Periodic stacks raise a single-period matrix to a
//! large integer power, so the power is computed by binary exponentiation
//! (`O(log n)` products) rather than repeated multiplication.

use std::ops::Mul;

use nalgebra::Matrix2;
use num_complex::Complex64;

use crate::config;
use crate::error::{Error, Result};

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TransferMatrix {
        TransferMatrix::new(
            Complex64::new(1.1, 0.2),
            Complex64::new(-0.3, 0.5),
            Complex64::new(0.25, -0.1),
            Complex64::new(0.9, 0.05),
        )
    }

    fn naive_power(matrix: &TransferMatrix, exponent: u64) -> TransferMatrix {
        (0..exponent).fold(identity(), |acc, _| acc * matrix)
    }

    #[test]
    fn power_zero_is_identity() {
        assert_eq!(power(&sample(), 0), identity());
    }

    #[test]
    fn power_one_is_base() {
        assert_eq!(power(&sample(), 1), sample());
    }

    #[test]
    fn power_matches_naive() {
        let m = sample() / Complex64::new(1.2, 0.0);
        for exponent in [2, 3, 7, 16, 33] {
            let fast = power(&m, exponent);
            let slow = naive_power(&m, exponent);
            assert!(
                (fast - slow).norm() < 1e-9 * slow.norm().max(1.0),
                "exponent {}: {} vs {}",
                exponent,
                fast,
                slow
            );
        }
    }

    #[test]
    fn scalar_power() {
        assert_eq!(pow_by_squaring(3u64, 13, 1), 1_594_323);
        assert_eq!(pow_by_squaring(2.0f64, 0, 1.0), 1.0);
    }

    #[test]
    fn singular_matrix_rejected() {
        let m = TransferMatrix::new(
            Complex64::new(1.0, 0.0),
            Complex64::new(2.0, 0.0),
            Complex64::new(2.0, 0.0),
            Complex64::new(4.0, 0.0),
        );
        assert!(check_determinant(&m, "test").is_err());
        assert!(check_determinant(&sample(), "test").is_ok());
    }

    #[test]
    fn non_finite_matrix_rejected() {
        let mut m = identity();
        m[(0, 1)] = Complex64::new(f64::NAN, 0.0);
        assert!(check_determinant(&m, "test").is_err());
    }

    #[test]
    fn large_entries_are_finite() {
        // entries of a thick absorber: each product overflows, the ratios do not
        let big = Complex64::new(1e200, 0.0);
        let m = TransferMatrix::new(big, big * 0.3, big * 0.2, big);
        assert!(!m.determinant().is_finite());
        assert!(check_finite(&m, "test").is_ok());

        let mut m = identity();
        m[(1, 1)] = Complex64::new(f64::INFINITY, 0.0);
        assert!(check_finite(&m, "test").is_err());
    }
}

/// Amplitude-domain transfer matrix mapping (forward, backward) amplitudes on
/// the substrate side of an element onto the ambient side.
pub type TransferMatrix = Matrix2<Complex64>;

/// The neutral element of transfer-matrix composition.
pub fn identity() -> TransferMatrix {
    TransferMatrix::identity()
}

/// Raises `base` to a non-negative integer power by squaring.
///
/// Works over any type that is closed under an associative multiplication,
/// given its neutral element. The exponent is consumed one bit at a time,
/// squaring the base for every bit and folding it into the accumulator when
/// the bit is set.
pub fn pow_by_squaring<T>(base: T, exponent: u64, identity: T) -> T
where
    T: Clone + Mul<Output = T>,
{
    let mut result = identity;
    let mut base = base;
    let mut exponent = exponent;
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = result * base.clone();
        }
        exponent >>= 1;
        if exponent > 0 {
            base = base.clone() * base;
        }
    }
    result
}

/// Raises a transfer matrix to an integer power. `power(m, 0)` is the identity.
pub fn power(matrix: &TransferMatrix, exponent: u64) -> TransferMatrix {
    pow_by_squaring(*matrix, exponent, identity())
}

/// Returns the determinant of `matrix`, or an error if it is zero or not finite.
///
/// Only meaningful for boundary and single-layer matrices, whose `ad - bc`
/// does not overflow. `context` names the matrix in the error message.
pub fn check_determinant(matrix: &TransferMatrix, context: &'static str) -> Result<Complex64> {
    let determinant = matrix.determinant();
    if !determinant.is_finite() || determinant.norm() < config::DETERMINANT_THRESHOLD {
        return Err(Error::DegenerateMatrix {
            context,
            determinant,
        });
    }
    Ok(determinant)
}

/// Checks that every entry of a composite transfer matrix is finite.
///
/// The determinant of a product is the product of the boundary determinants,
/// each already checked by [`check_determinant`], so composite matrices only
/// need their entries checked. Computing `ad - bc` directly would overflow
/// for thick absorbers well before the entries themselves do.
pub fn check_finite(matrix: &TransferMatrix, context: &'static str) -> Result<()> {
    if matrix.iter().all(|entry| entry.is_finite()) {
        Ok(())
    } else {
        Err(Error::NonFinite { context })
    }
}
