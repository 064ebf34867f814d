//! Reflectivity and transmissivity of multilayer coatings and films.
//!
//! The system transfer matrix of Yeh (1988) is built from the refractive
//! matrix of every boundary and the propagation matrix of every layer:
//!
//! ```text
//! M = (W_01 U_1)(W_12 U_2) ... (W_(N-1)N U_N) W_NS
//! ```
//!
//! where `S` is the substrate. With no wave entering from beyond the
//! substrate, Eqs. 5.2-3 and 5.2-4 give the amplitude coefficients of the
//! whole stack, `r = M_10 / M_00` and `t = 1 / M_00`. The power reflectivity
//! is `|r|^2`; the transmissivity is `Re(q_S / q_0) |t|^2`, which accounts for
//! the different power flux carried by a wave of unit amplitude in the
//! ambient and in the substrate.

use std::fmt;

use log::{debug, warn};
use nalgebra::Vector3;
use num_complex::Complex64;

use crate::absorbance;
use crate::error::{Error, Result};
use crate::fresnel::{self, wave_impedance};
use crate::layer::{Layer, Stack, Transfer};
use crate::matrix::{check_finite, TransferMatrix};
use crate::powers::Powers;
use crate::profiles::InterfaceProfile;
use crate::snell;
use crate::wave::{Polarization, Wave};


/// Computes the reflectivity and transmissivity of `stack` on a substrate of
/// index `n_substrate`, for one polarization state.
///
/// `wavelength_ambient` is the wavelength of the incident light inside the
/// ambient medium of index `n_ambient`. `interface` is the profile of every
/// boundary in the stack, from the ambient into the first layer through to
/// the substrate, except where a layer carries a profile of its own.
#[allow(clippy::too_many_arguments)]
pub fn polarized_efficiency(
    stack: &Stack,
    wavelength_ambient: f64,
    direction_ambient: &Vector3<f64>,
    polarization: Polarization,
    n_ambient: Complex64,
    n_substrate: Complex64,
    normal: &Vector3<f64>,
    interface: Option<&InterfaceProfile>,
) -> Result<Powers> {
    let wave = incident_wave(
        wavelength_ambient,
        direction_ambient,
        polarization,
        n_ambient,
        normal,
    )?
    .with_interface(interface.copied());
    stack_efficiency(stack, &wave, n_substrate, None)
}

/// Computes the reflectivity and transmissivity of `stack` on a substrate of
/// index `n_substrate` for unpolarized light, the mean of the s and p results.
pub fn multilayer_efficiency(
    stack: &Stack,
    wavelength_ambient: f64,
    direction_ambient: &Vector3<f64>,
    n_ambient: Complex64,
    n_substrate: Complex64,
    normal: &Vector3<f64>,
    interface: Option<&InterfaceProfile>,
) -> Result<Powers> {
    let mut powers = Powers::default();
    for polarization in Polarization::BOTH {
        powers += polarized_efficiency(
            stack,
            wavelength_ambient,
            direction_ambient,
            polarization,
            n_ambient,
            n_substrate,
            normal,
            interface,
        )?;
    }
    powers /= Polarization::BOTH.len() as f64;
    Ok(powers)
}

/// The incident wave in vacuum-wavelength terms.
pub(crate) fn incident_wave(
    wavelength_ambient: f64,
    direction_ambient: &Vector3<f64>,
    polarization: Polarization,
    n_ambient: Complex64,
    normal: &Vector3<f64>,
) -> Result<Wave> {
    let wavelength = wavelength_ambient * n_ambient.re;
    Wave::new(wavelength, *direction_ambient, polarization, n_ambient, *normal)
}

/// Crosses from the last layer into the substrate. The boundary uses
/// `interface`, or the default profile carried by the wave.
pub(crate) fn substrate_refraction(
    exit: &Wave,
    n_substrate: Complex64,
    interface: Option<&InterfaceProfile>,
) -> Result<(Wave, TransferMatrix)> {
    let direction = snell::refract(&exit.direction, exit.n, n_substrate, &exit.normal);
    let w = fresnel::refraction(
        exit.wavelength,
        &exit.direction,
        &direction,
        exit.polarization,
        exit.n,
        n_substrate,
        &exit.normal,
        interface.or(exit.interface.as_ref()),
    )?;
    Ok((exit.with(n_substrate, direction), w))
}

fn stack_efficiency(
    stack: &Stack,
    wave: &Wave,
    n_substrate: Complex64,
    substrate_interface: Option<&InterfaceProfile>,
) -> Result<Powers> {
    let (exit, m) = stack.transfer(wave)?;
    let (substrate, w) = substrate_refraction(&exit, n_substrate, substrate_interface)?;

    let m = m * w;
    check_finite(&m, "system transfer")?;

    // scaled so that |M00|^2 cannot overflow inside the complex division
    let scale = m[(0, 0)].norm();
    if scale == 0.0 {
        return Err(Error::DegenerateMatrix {
            context: "system transfer",
            determinant: Complex64::new(0.0, 0.0),
        });
    }
    let m00 = m[(0, 0)] / scale;
    let r = (m[(1, 0)] / scale) / m00;
    let t = Complex64::new(1.0 / scale, 0.0) / m00;

    let q_ambient = wave_impedance(wave.n, wave.cos_theta(), wave.polarization);
    let q_substrate = wave_impedance(n_substrate, substrate.cos_theta(), wave.polarization);

    let powers = Powers::new(r.norm_sqr(), (q_substrate / q_ambient).re * t.norm_sqr());

    debug!(
        "{}-polarized efficiency at {:.4} nm: R = {:.6}, T = {:.6}",
        wave.polarization, wave.wavelength, powers.reflected, powers.transmitted
    );
    if !powers.is_conserving() {
        warn!(
            "reflected + transmitted power exceeds unity by {:.3e} at {:.4} nm ({}-polarized)",
            -powers.absorbed(),
            wave.wavelength,
            wave.polarization
        );
    }

    Ok(powers)
}

/// A multilayer coating on a substrate.
#[derive(Debug, Clone)]
pub struct Multilayer {
    /// The coating, ambient side first.
    pub layers: Stack,
    /// The substrate. Its interface profile describes the last boundary.
    pub substrate: Layer,
}

impl Multilayer {
    pub fn new(layers: Stack, substrate: Layer) -> Self {
        Self { layers, substrate }
    }

    /// Substrate index at the vacuum wavelength of the incident light.
    fn n_substrate(&self, wavelength_ambient: f64, n_ambient: Complex64) -> Result<Complex64> {
        self.substrate
            .index_of_refraction(wavelength_ambient * n_ambient.re)
    }

    /// Efficiency for one polarization state. Every boundary uses the profile
    /// of the layer it leads into; the last one uses the substrate's.
    pub fn polarized_efficiency(
        &self,
        wavelength_ambient: f64,
        direction_ambient: &Vector3<f64>,
        polarization: Polarization,
        n_ambient: Complex64,
        normal: &Vector3<f64>,
    ) -> Result<Powers> {
        let wave = incident_wave(
            wavelength_ambient,
            direction_ambient,
            polarization,
            n_ambient,
            normal,
        )?;
        stack_efficiency(
            &self.layers,
            &wave,
            self.n_substrate(wavelength_ambient, n_ambient)?,
            self.substrate.interface(),
        )
    }

    /// Efficiency for unpolarized light.
    pub fn efficiency(
        &self,
        wavelength_ambient: f64,
        direction_ambient: &Vector3<f64>,
        n_ambient: Complex64,
        normal: &Vector3<f64>,
    ) -> Result<Powers> {
        let mut powers = Powers::default();
        for polarization in Polarization::BOTH {
            powers += self.polarized_efficiency(
                wavelength_ambient,
                direction_ambient,
                polarization,
                n_ambient,
                normal,
            )?;
        }
        powers /= Polarization::BOTH.len() as f64;
        Ok(powers)
    }

    /// Fraction of unpolarized light absorbed in the layer at `index` of
    /// [`Stack::leaves`].
    pub fn layer_absorbance(
        &self,
        index: usize,
        wavelength_ambient: f64,
        direction_ambient: &Vector3<f64>,
        n_ambient: Complex64,
        normal: &Vector3<f64>,
    ) -> Result<f64> {
        let mut absorbance = 0.0;
        for polarization in Polarization::BOTH {
            let wave = incident_wave(
                wavelength_ambient,
                direction_ambient,
                polarization,
                n_ambient,
                normal,
            )?;
            absorbance += absorbance::polarized_layer_absorbance(
                &self.layers,
                index,
                &wave,
                self.n_substrate(wavelength_ambient, n_ambient)?,
                self.substrate.interface(),
            )?;
        }
        Ok(absorbance / Polarization::BOTH.len() as f64)
    }

    /// Total thickness of the coating, excluding the substrate.
    pub fn thickness(&self) -> f64 {
        self.layers.thickness()
    }
}

impl fmt::Display for Multilayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.layers)?;
        write!(f, "substrate: {}", self.substrate.name())?;
        if let Some(interface) = self.substrate.interface() {
            write!(f, ", {}", interface)?;
        }
        writeln!(f)
    }
}

/// A free-standing film, surrounded on both sides by the ambient medium.
#[derive(Debug, Clone)]
pub struct MultilayerFilm {
    pub layers: Stack,
    /// Profile of every boundary whose layer does not carry its own,
    /// including the exit back into the ambient.
    interface: Option<InterfaceProfile>,
}

impl MultilayerFilm {
    pub fn new(layers: Stack) -> Self {
        Self {
            layers,
            interface: None,
        }
    }

    pub fn with_interface(mut self, interface: InterfaceProfile) -> Result<Self> {
        interface.validate()?;
        self.interface = Some(interface);
        Ok(self)
    }

    /// Fraction of unpolarized light transmitted through the film.
    pub fn transmissivity(
        &self,
        wavelength_ambient: f64,
        direction_ambient: &Vector3<f64>,
        n_ambient: Complex64,
        normal: &Vector3<f64>,
    ) -> Result<f64> {
        let powers = multilayer_efficiency(
            &self.layers,
            wavelength_ambient,
            direction_ambient,
            n_ambient,
            n_ambient,
            normal,
            self.interface.as_ref(),
        )?;
        Ok(powers.transmitted)
    }
}
