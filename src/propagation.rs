//! Phase accumulated while crossing a homogeneous slab.
//!
//! Yeh (1988) Eq. 5.1-24:
//!
//! ```text
//! U = [[exp(-i beta), 0           ],
//!      [0,            exp(+i beta)]],   beta = 2 pi n d cos(theta) / lambda
//! ```
//!
//! The matrix maps amplitudes at the far side of the slab back onto the near
//! side, so `exp(+i beta)` is the factor gained by the forward wave on its way
//! through. With `Im(n cos(theta)) >= 0` that factor never grows.

use nalgebra::Vector3;
use num_complex::Complex64;
use std::f64::consts::PI;

use crate::matrix::TransferMatrix;
use crate::snell::cos_theta;
use crate::wave::Direction;

#[cfg(test)]
mod tests {

    use super::*;
    use crate::config;
    use crate::wave::to_direction;

    #[test]
    fn zero_thickness_is_identity() {
        let d = to_direction(&Vector3::z());
        let u = propagation(100.0, &d, 0.0, Complex64::new(1.5, 0.1), &config::DEFAULT_NORMAL);
        assert_eq!(u, TransferMatrix::identity());
    }

    #[test]
    fn transparent_phase_is_unimodular() {
        let d = to_direction(&Vector3::z());
        let u = propagation(100.0, &d, 25.0, Complex64::new(1.5, 0.0), &config::DEFAULT_NORMAL);
        assert!((u[(0, 0)].norm() - 1.0).abs() < 1e-12);
        assert!((u[(1, 1)].norm() - 1.0).abs() < 1e-12);
        // a quarter wave at n = 1.5 and d = 25 nm for 100 nm light is 3 pi / 4
        assert!((u[(1, 1)].arg() - 0.75 * PI).abs() < 1e-12);
    }

    #[test]
    fn absorbing_forward_factor_decays() {
        let d = to_direction(&Vector3::z());
        let u = propagation(100.0, &d, 10.0, Complex64::new(1.0, 0.3), &config::DEFAULT_NORMAL);
        let forward = forward_factor(&u);
        assert!(forward.norm() < 1.0);
        assert!((forward * u[(0, 0)] - Complex64::new(1.0, 0.0)).norm() < 1e-12);
        assert_eq!(u[(0, 1)], Complex64::new(0.0, 0.0));
        assert_eq!(u[(1, 0)], Complex64::new(0.0, 0.0));
    }
}

/// Phase thickness `beta` of a slab.
pub fn phase(
    wavelength: f64,
    direction: &Direction,
    thickness: f64,
    n: Complex64,
    normal: &Vector3<f64>,
) -> Complex64 {
    2.0 * PI * thickness * n * cos_theta(direction, normal) / wavelength
}

/// Computes the propagation matrix for a slab of index `n` and the given
/// thickness, for light of vacuum wavelength `wavelength` travelling along
/// `direction` inside the slab.
pub fn propagation(
    wavelength: f64,
    direction: &Direction,
    thickness: f64,
    n: Complex64,
    normal: &Vector3<f64>,
) -> TransferMatrix {
    if thickness == 0.0 {
        return TransferMatrix::identity();
    }
    let beta = phase(wavelength, direction, thickness, n, normal);
    let i = Complex64::i();
    TransferMatrix::from_diagonal(&nalgebra::Vector2::new((-i * beta).exp(), (i * beta).exp()))
}

/// The amplitude factor gained by the forward-travelling wave across a slab.
pub fn forward_factor(matrix: &TransferMatrix) -> Complex64 {
    matrix[(1, 1)]
}
