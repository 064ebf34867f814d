//! Fraction of the incident power absorbed inside a single layer.
//!
//! The net power flux through a plane inside a layer of impedance `q`, with
//! forward amplitude `A` and backward amplitude `B`, is
//! `Re[(A + B) conj(q (A - B))]` for both polarizations (electric field
//! amplitudes for s, magnetic for p). Sharp boundaries conserve it, so the
//! power absorbed in a layer is the flux entering at its front minus the
//! flux leaving at its back, normalised to the incident flux `Re(q_0)`.
//!
//! The amplitudes are found by running the stack backwards from the
//! substrate, where only a forward wave exists. Inside thick absorbers they
//! span hundreds of orders of magnitude, so each amplitude vector is kept as
//! a mantissa and a natural-log scale.

use nalgebra::{Vector2, Vector3};
use num_complex::Complex64;

use crate::error::{Error, Result};
use crate::fresnel::wave_impedance;
use crate::layer::{Stack, Transfer};
use crate::matrix::TransferMatrix;
use crate::multilayer::{incident_wave, substrate_refraction};
use crate::profiles::InterfaceProfile;
use crate::propagation;
use crate::wave::{Polarization, Wave};

#[cfg(test)]
mod tests {

    use super::*;
    use crate::config;
    use crate::layer::{Layer, LayerSequence, PeriodicLayerSequence};
    use crate::medium::{Constant, Medium};
    use crate::multilayer::{multilayer_efficiency, Multilayer};
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::sync::Arc;

    fn real(x: f64) -> Complex64 {
        Complex64::new(x, 0.0)
    }

    fn constant(name: &str, re: f64, im: f64) -> Arc<dyn Medium> {
        Arc::new(Constant::new(name, Complex64::new(re, im)))
    }

    fn incident(angle: f64) -> Vector3<f64> {
        Vector3::new(angle.sin(), 0.0, angle.cos())
    }

    fn sensor() -> Stack {
        let period = LayerSequence::new(vec![
            Layer::new(constant("SiO2", 1.46, 0.0), 30.0).unwrap().into(),
            Layer::new(constant("Si3N4", 2.0, 0.004), 15.0).unwrap().into(),
        ]);
        LayerSequence::new(vec![
            Layer::new(constant("oxide", 1.46, 0.0), 5.0).unwrap().into(),
            PeriodicLayerSequence::new(period, 3).unwrap().into(),
            Layer::new(constant("Si", 4.3, 0.07), 200.0).unwrap().into(),
        ])
        .into()
    }

    #[test]
    fn lossless_layer_absorbs_nothing() {
        let stack = sensor();
        for angle in [0.0, 0.5, 1.1] {
            let a = layer_absorbance(
                &stack,
                0,
                450.0,
                &incident(angle),
                real(1.0),
                real(3.9),
                &config::DEFAULT_NORMAL,
                None,
            )
            .unwrap();
            assert_abs_diff_eq!(a, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn layers_sum_to_total_absorbance() {
        let stack = sensor();
        let n_substrate = Complex64::new(3.9, 0.02);
        for wavelength in [350.0, 500.0, 800.0] {
            for angle in [0.0, 0.4, 1.2] {
                let powers = multilayer_efficiency(
                    &stack,
                    wavelength,
                    &incident(angle),
                    real(1.0),
                    n_substrate,
                    &config::DEFAULT_NORMAL,
                    None,
                )
                .unwrap();
                let layers: Vec<f64> = (0..stack.leaves().len())
                    .map(|index| {
                        layer_absorbance(
                            &stack,
                            index,
                            wavelength,
                            &incident(angle),
                            real(1.0),
                            n_substrate,
                            &config::DEFAULT_NORMAL,
                            None,
                        )
                        .unwrap()
                    })
                    .collect();
                assert!(layers.iter().all(|a| *a >= -1e-12), "{:?}", layers);
                let total: f64 = layers.iter().sum();
                assert_abs_diff_eq!(total, powers.absorbed(), epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn thick_absorber_takes_everything_not_reflected() {
        let multilayer = Multilayer::new(
            LayerSequence::new(vec![
                Layer::new(constant("Cr", 3.1, 3.3), 10_000.0).unwrap().into(),
                Layer::new(constant("SiO2", 1.46, 0.0), 50.0).unwrap().into(),
            ])
            .into(),
            Layer::boundary(constant("glass", 1.5, 0.0)),
        );
        let powers = multilayer
            .efficiency(500.0, &Vector3::z(), real(1.0), &config::DEFAULT_NORMAL)
            .unwrap();
        let chromium = multilayer
            .layer_absorbance(0, 500.0, &Vector3::z(), real(1.0), &config::DEFAULT_NORMAL)
            .unwrap();
        let oxide = multilayer
            .layer_absorbance(1, 500.0, &Vector3::z(), real(1.0), &config::DEFAULT_NORMAL)
            .unwrap();
        assert_relative_eq!(chromium, 1.0 - powers.reflected, max_relative = 1e-9);
        assert_abs_diff_eq!(oxide, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn index_out_of_range() {
        let result = layer_absorbance(
            &sensor(),
            8,
            450.0,
            &Vector3::z(),
            real(1.0),
            real(3.9),
            &config::DEFAULT_NORMAL,
            None,
        );
        assert!(matches!(
            result,
            Err(Error::InvalidLayerIndex { index: 8, len: 8 })
        ));
    }
}

type Amplitudes = Vector2<Complex64>;

/// Forward and backward amplitudes stored as `mantissa * exp(log_scale)`.
#[derive(Debug, Clone, Copy)]
struct Scaled {
    mantissa: Amplitudes,
    log_scale: f64,
}

impl Scaled {
    fn new(amplitudes: Amplitudes) -> Self {
        Self {
            mantissa: amplitudes,
            log_scale: 0.0,
        }
        .normalized()
    }

    fn normalized(mut self) -> Self {
        let size = self.mantissa[0].norm().max(self.mantissa[1].norm());
        if size > 0.0 && size.is_finite() {
            self.mantissa /= Complex64::new(size, 0.0);
            self.log_scale += size.ln();
        }
        self
    }

    /// Amplitudes at the front of a slab of phase thickness `beta`, given
    /// those at its back. The growth `exp(Im beta)` of the forward entry of
    /// `diag(exp(-i beta), exp(i beta))` goes into the scale.
    fn propagate(self, beta: Complex64) -> Self {
        let i = Complex64::i();
        let forward = (-i * beta.re).exp();
        let backward = (i * beta.re).exp() * (-2.0 * beta.im).exp();
        Self {
            mantissa: Amplitudes::new(self.mantissa[0] * forward, self.mantissa[1] * backward),
            log_scale: self.log_scale + beta.im,
        }
        .normalized()
    }

    fn refract(self, matrix: &TransferMatrix) -> Self {
        Self {
            mantissa: matrix * self.mantissa,
            log_scale: self.log_scale,
        }
        .normalized()
    }

    /// The amplitudes relative to `reference`, divided by `factor`.
    fn relative_to(&self, reference: &Scaled, factor: Complex64) -> Amplitudes {
        let ratio = (self.log_scale - reference.log_scale).exp();
        self.mantissa * (Complex64::new(ratio, 0.0) / factor)
    }
}

/// Net power flux along the normal carried by `amplitudes` in a medium of
/// impedance `q`.
fn flux(q: Complex64, amplitudes: &Amplitudes) -> f64 {
    let (a, b) = (amplitudes[0], amplitudes[1]);
    ((a + b) * (q * (a - b)).conj()).re
}

/// Fraction of the power of `wave` absorbed in the layer at `index` of
/// [`Stack::leaves`], for a stack on a substrate of index `n_substrate`.
pub(crate) fn polarized_layer_absorbance(
    stack: &Stack,
    index: usize,
    wave: &Wave,
    n_substrate: Complex64,
    substrate_interface: Option<&InterfaceProfile>,
) -> Result<f64> {
    let leaves = stack.leaves();
    if index >= leaves.len() {
        return Err(Error::InvalidLayerIndex {
            index,
            len: leaves.len(),
        });
    }

    // boundary matrix, phase thickness and impedance of every leaf
    let mut slabs = Vec::with_capacity(leaves.len());
    let mut current = wave.clone();
    for layer in &leaves {
        let (inside, w) = layer.refraction(&current)?;
        let beta = propagation::phase(
            inside.wavelength,
            &inside.direction,
            layer.thickness(),
            inside.n,
            &inside.normal,
        );
        let q = wave_impedance(inside.n, inside.cos_theta(), inside.polarization);
        slabs.push((w, beta, q));
        current = inside;
    }
    let (_, w_substrate) = substrate_refraction(&current, n_substrate, substrate_interface)?;

    // only a forward wave in the substrate
    let mut amplitudes = Scaled::new(Amplitudes::new(w_substrate[(0, 0)], w_substrate[(1, 0)]));
    let mut back = amplitudes;
    let mut front = amplitudes;
    for (j, (w, beta, _)) in slabs.iter().enumerate().rev() {
        if j == index {
            back = amplitudes;
        }
        amplitudes = amplitudes.propagate(*beta);
        if j == index {
            front = amplitudes;
        }
        amplitudes = amplitudes.refract(w);
    }

    // the ambient amplitudes are proportional to (1, r)
    let ambient = amplitudes;
    let incident = ambient.mantissa[0];
    if incident == Complex64::new(0.0, 0.0) {
        return Err(Error::DegenerateMatrix {
            context: "system transfer",
            determinant: Complex64::new(0.0, 0.0),
        });
    }

    let q_ambient = wave_impedance(wave.n, wave.cos_theta(), wave.polarization);
    let q = slabs[index].2;
    let entering = flux(q, &front.relative_to(&ambient, incident));
    let leaving = flux(q, &back.relative_to(&ambient, incident));

    Ok((entering - leaving) / q_ambient.re)
}

/// Fraction of unpolarized light absorbed in the layer at `index` of
/// [`Stack::leaves`], the mean of the s and p results.
///
/// The arguments are those of [`multilayer_efficiency`](crate::multilayer_efficiency).
/// Summed over every layer of a stack with sharp interfaces, the result is
/// the total absorbance `1 - R - T`.
#[allow(clippy::too_many_arguments)]
pub fn layer_absorbance(
    stack: &Stack,
    index: usize,
    wavelength_ambient: f64,
    direction_ambient: &Vector3<f64>,
    n_ambient: Complex64,
    n_substrate: Complex64,
    normal: &Vector3<f64>,
    interface: Option<&InterfaceProfile>,
) -> Result<f64> {
    let mut absorbance = 0.0;
    for polarization in Polarization::BOTH {
        let wave = incident_wave(
            wavelength_ambient,
            direction_ambient,
            polarization,
            n_ambient,
            normal,
        )?
        .with_interface(interface.copied());
        absorbance += polarized_layer_absorbance(stack, index, &wave, n_substrate, None)?;
    }
    Ok(absorbance / Polarization::BOTH.len() as f64)
}
