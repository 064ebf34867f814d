//! Fresnel boundary matrices for planar interfaces.
//!
//! The refractive (boundary) matrix of Yeh (1988) Eq. 5.1-12 relates the
//! forward and backward amplitudes on either side of an interface between
//! media `i` and `j`:
//!
//! ```text
//! W_ij = 1/t_ij [[1,    r_ij],
//!                [r_ij, 1   ]]
//! ```
//!
//! with `r_ij = (q_i - q_j) / (q_i + q_j)` and `t_ij = 2 q_i / (q_i + q_j)`,
//! where `q = n cos(theta)` for s polarization and `q = cos(theta) / n` for
//! p polarization. A graded or rough interface scales `r_ij` by the
//! attenuation factor of its [`InterfaceProfile`].

use nalgebra::Vector3;
use num_complex::Complex64;

use crate::error::Result;
use crate::matrix::{check_determinant, TransferMatrix};
use crate::profiles::InterfaceProfile;
use crate::snell::cos_theta;
use crate::wave::{Direction, Polarization};


/// The normal component of the wave's momentum used by the Fresnel relations.
pub fn wave_impedance(n: Complex64, cos_theta: Complex64, polarization: Polarization) -> Complex64 {
    match polarization {
        Polarization::S => n * cos_theta,
        Polarization::P => cos_theta / n,
    }
}

/// Fresnel amplitude reflection coefficient from medium `i` into medium `j`.
pub fn reflection_coefficient(q_i: Complex64, q_j: Complex64) -> Complex64 {
    (q_i - q_j) / (q_i + q_j)
}

/// Fresnel amplitude transmission coefficient from medium `i` into medium `j`.
pub fn transmission_coefficient(q_i: Complex64, q_j: Complex64) -> Complex64 {
    2.0 * q_i / (q_i + q_j)
}

/// Computes the refractive matrix of the boundary between a medium of index
/// `n_left` (where the wave travels along `direction_left`) and a medium of
/// index `n_right` (where it travels along `direction_right`).
///
/// When an interface profile is given, the reflection coefficient is
/// multiplied by its attenuation, evaluated for the incident direction.
/// Returns an error if the resulting matrix is singular or not finite.
#[allow(clippy::too_many_arguments)]
pub fn refraction(
    wavelength: f64,
    direction_left: &Direction,
    direction_right: &Direction,
    polarization: Polarization,
    n_left: Complex64,
    n_right: Complex64,
    normal: &Vector3<f64>,
    interface: Option<&InterfaceProfile>,
) -> Result<TransferMatrix> {
    let q_i = wave_impedance(n_left, cos_theta(direction_left, normal), polarization);
    let q_j = wave_impedance(n_right, cos_theta(direction_right, normal), polarization);

    let mut r_ij = reflection_coefficient(q_i, q_j);
    let t_ij = transmission_coefficient(q_i, q_j);

    if let Some(profile) = interface {
        r_ij *= profile.attenuation(wavelength, direction_left, normal);
    }

    let one = Complex64::new(1.0, 0.0);
    let result = TransferMatrix::new(one, r_ij, r_ij, one) / t_ij;

    check_determinant(&result, "refraction")?;

    Ok(result)
}
