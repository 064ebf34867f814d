use std::fmt;

use nalgebra::Vector3;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::{Error, Result};
use crate::profiles::InterfaceProfile;

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn normal_incidence_cos_theta() {
        let wave = Wave::new(
            100.0,
            Vector3::z(),
            Polarization::S,
            Complex64::new(1.0, 0.0),
            config::DEFAULT_NORMAL,
        )
        .unwrap();
        assert!((wave.cos_theta() - Complex64::new(1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn unnormalised_direction() {
        let result = Wave::new(
            100.0,
            Vector3::new(0.0, 0.0, 2.0),
            Polarization::P,
            Complex64::new(1.0, 0.0),
            config::DEFAULT_NORMAL,
        );
        assert!(result.is_err());
    }

    #[test]
    fn unnormalised_normal() {
        let result = Wave::new(
            100.0,
            Vector3::z(),
            Polarization::P,
            Complex64::new(1.0, 0.0),
            Vector3::new(0.0, 0.1, -0.5),
        );
        assert!(result.is_err());
    }

    #[test]
    fn non_positive_wavelength() {
        let result = Wave::new(
            0.0,
            Vector3::z(),
            Polarization::S,
            Complex64::new(1.0, 0.0),
            config::DEFAULT_NORMAL,
        );
        assert!(result.is_err());
    }

    #[test]
    fn default_interface_survives_boundaries() {
        let profile = InterfaceProfile::linear(0.3).unwrap();
        let wave = Wave::new(
            100.0,
            Vector3::z(),
            Polarization::S,
            Complex64::new(1.0, 0.0),
            config::DEFAULT_NORMAL,
        )
        .unwrap()
        .with_interface(Some(profile));
        let next = wave.with(Complex64::new(2.0, 0.1), to_direction(&Vector3::z()));
        assert_eq!(next.interface, Some(profile));
        assert_eq!(next.n, Complex64::new(2.0, 0.1));
    }
}

/// Linear polarization state relative to the plane of incidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarization {
    /// Electric field perpendicular to the plane of incidence.
    S,
    /// Electric field parallel to the plane of incidence.
    P,
}

impl Polarization {
    pub const BOTH: [Polarization; 2] = [Polarization::S, Polarization::P];
}

impl fmt::Display for Polarization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarization::S => write!(f, "s"),
            Polarization::P => write!(f, "p"),
        }
    }
}

/// Propagation direction as complex direction cosines.
///
/// Directions stay real for transparent media below the critical angle. The
/// normal component turns complex inside absorbing layers and purely
/// imaginary beyond total internal reflection.
pub type Direction = Vector3<Complex64>;

/// Promotes a real unit vector to a [`Direction`].
pub fn to_direction(v: &Vector3<f64>) -> Direction {
    v.map(|x| Complex64::new(x, 0.0))
}

/// The state of a plane wave threaded through a layer stack.
///
/// `wavelength` (in vacuum), `polarization`, `normal` and the default
/// `interface` profile are fixed for a whole traversal; `n` and `direction`
/// describe the medium the wave currently travels in and are replaced at
/// every boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Wave {
    pub wavelength: f64,
    pub direction: Direction,
    pub polarization: Polarization,
    pub n: Complex64,
    pub normal: Vector3<f64>,
    /// Profile used at every boundary whose layer carries none of its own.
    pub interface: Option<InterfaceProfile>,
}

impl Wave {
    /// Creates an incident wave, checking that the wavelength is positive and
    /// that the direction and normal are unit vectors.
    pub fn new(
        wavelength: f64,
        direction: Vector3<f64>,
        polarization: Polarization,
        n: Complex64,
        normal: Vector3<f64>,
    ) -> Result<Self> {
        if !(wavelength.is_finite() && wavelength > 0.0) {
            return Err(Error::InvalidWave(format!(
                "wavelength must be positive, got {}",
                wavelength
            )));
        }

        let norm_direction_diff = direction.norm() - 1.0;
        if !(norm_direction_diff.abs() < config::UNIT_TOLERANCE) {
            return Err(Error::InvalidWave(format!(
                "direction is not normalised: {:?}",
                direction
            )));
        }

        let norm_normal_diff = normal.norm() - 1.0;
        if !(norm_normal_diff.abs() < config::UNIT_TOLERANCE) {
            return Err(Error::InvalidWave(format!(
                "normal is not normalised: {:?}",
                normal
            )));
        }

        if !n.is_finite() {
            return Err(Error::InvalidWave(format!(
                "refractive index is not finite: {}",
                n
            )));
        }

        Ok(Self {
            wavelength,
            direction: to_direction(&direction),
            polarization,
            n,
            normal,
            interface: None,
        })
    }

    /// The same wave with `interface` as the profile of every boundary that
    /// does not define its own.
    pub fn with_interface(mut self, interface: Option<InterfaceProfile>) -> Self {
        self.interface = interface;
        self
    }

    /// The same wave after crossing into a medium of index `n`, now travelling
    /// along `direction`.
    pub fn with(&self, n: Complex64, direction: Direction) -> Self {
        Self {
            wavelength: self.wavelength,
            direction,
            polarization: self.polarization,
            n,
            normal: self.normal,
            interface: self.interface,
        }
    }

    /// Cosine of the angle between the propagation direction and the inward normal.
    pub fn cos_theta(&self) -> Complex64 {
        crate::snell::cos_theta(&self.direction, &self.normal)
    }
}
