//! Generalized Snell's law for complex refractive indices.
//!
//! The component of the wavevector tangential to the interface,
//! `n * (d - (d . u) u)`, is conserved across every boundary of a planar
//! stack. The normal component then follows from `|k|^2 = n^2`:
//!
//! `k_z = sqrt(n_new^2 - n^2 sin^2(theta))`
//!
//! which is complex inside absorbing media and purely imaginary beyond the
//! critical angle. The root with `Im(k_z) >= 0` is taken, so the transmitted
//! wave decays away from the boundary instead of growing.

use nalgebra::Vector3;
use num_complex::Complex64;

use crate::wave::{to_direction, Direction};


/// Cosine of the angle between `direction` and the inward normal `-normal`.
pub fn cos_theta(direction: &Direction, normal: &Vector3<f64>) -> Complex64 {
    -direction.dot(&to_direction(normal))
}

/// Computes the propagation direction after crossing from a medium of index
/// `n` into a medium of index `n_new`.
///
/// `normal` points back toward the incident side. The returned direction
/// satisfies `d . d = 1` (as a complex bilinear form, not a Hermitian norm).
pub fn refract(
    direction: &Direction,
    n: Complex64,
    n_new: Complex64,
    normal: &Vector3<f64>,
) -> Direction {
    if n == n_new {
        return *direction;
    }

    let inward = to_direction(&(-normal));
    let cos_i = direction.dot(&inward);
    let tangential = direction - inward * cos_i;

    let sin2_i = Complex64::new(1.0, 0.0) - cos_i * cos_i;
    let mut k_z = (n_new * n_new - n * n * sin2_i).sqrt();
    if k_z.im < 0.0 || (k_z.im == 0.0 && k_z.re < 0.0) {
        k_z = -k_z;
    }

    tangential * (n / n_new) + inward * (k_z / n_new)
}
