//! Layers, explicit layer sequences and periodic layer sequences.
//!
//! A multilayer stack is a tree: leaves are homogeneous [`Layer`]s, inner
//! nodes are [`LayerSequence`]s (an ordered list of sub-stacks, ambient side
//! first) and [`PeriodicLayerSequence`]s (one sequence repeated a number of
//! times). Every node implements [`Transfer`], folding the boundary and
//! propagation matrices of its leaves into one 2x2 transfer matrix while
//! threading the evolving refractive index and propagation direction of the
//! wave from one leaf to the next.
//!
//! # Periodic stacks
//!
//! A periodic sequence evaluates its period twice: once from the incident
//! state and once from the state reached after the first period. The first
//! matrix differs from the others whenever the medium in front of the stack
//! differs from the last layer of the period, but every later period enters
//! from the same medium, so the second matrix is raised to the power
//! `num_periods - 1` by squaring. The cost is `O(log num_periods)` matrix
//! products instead of `O(num_periods)`.

use std::fmt;
use std::sync::Arc;

use log::debug;
use num_complex::Complex64;

use crate::config;
use crate::error::{Error, Result};
use crate::fresnel;
use crate::matrix::{self, check_determinant, check_finite, TransferMatrix};
use crate::medium::Medium;
use crate::profiles::InterfaceProfile;
use crate::propagation;
use crate::snell;
use crate::wave::Wave;


/// An element of a multilayer stack that can transfer a wave across itself.
pub trait Transfer {
    /// Computes the transfer matrix of this element for the incident `wave`,
    /// returning the state of the wave at the far side together with the
    /// matrix.
    fn transfer(&self, wave: &Wave) -> Result<(Wave, TransferMatrix)>;

    /// Total physical thickness (nm).
    fn thickness(&self) -> f64;
}

/// An isotropic, homogeneous layer of optical material.
///
/// Fields are only set through the validating constructors.
#[derive(Debug, Clone)]
pub struct Layer {
    medium: Arc<dyn Medium>,
    /// Thickness in nm. `None` for a boundary-only layer such as a substrate.
    thickness: Option<f64>,
    /// Profile of the boundary through which the wave enters this layer.
    interface: Option<InterfaceProfile>,
    /// Display label, defaults to the medium name.
    label: Option<String>,
}

impl Layer {
    /// Creates a layer of the given medium and thickness (nm).
    pub fn new(medium: Arc<dyn Medium>, thickness: f64) -> Result<Self> {
        if !(thickness.is_finite() && thickness >= 0.0) {
            return Err(Error::InvalidThickness(thickness));
        }
        Ok(Self {
            medium,
            thickness: Some(thickness),
            interface: None,
            label: None,
        })
    }

    /// Creates a layer without thickness, which only contributes its boundary.
    pub fn boundary(medium: Arc<dyn Medium>) -> Self {
        Self {
            medium,
            thickness: None,
            interface: None,
            label: None,
        }
    }

    /// Sets the profile of the boundary into this layer, rejecting a
    /// negative or non-finite width.
    pub fn with_interface(mut self, interface: InterfaceProfile) -> Result<Self> {
        interface.validate()?;
        self.interface = Some(interface);
        Ok(self)
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// The label of this layer, or the name of its medium.
    pub fn name(&self) -> &str {
        self.label.as_deref().unwrap_or_else(|| self.medium.name())
    }

    pub fn medium(&self) -> &Arc<dyn Medium> {
        &self.medium
    }

    pub fn interface(&self) -> Option<&InterfaceProfile> {
        self.interface.as_ref()
    }

    /// Complex refractive index of the layer at the given vacuum wavelength.
    pub fn index_of_refraction(&self, wavelength: f64) -> Result<Complex64> {
        self.medium.index_of_refraction(wavelength)
    }

    /// Crosses the boundary into this layer: returns the wave inside the
    /// layer and the refractive matrix of the boundary.
    ///
    /// The boundary uses this layer's own profile, or the wave's default
    /// profile when the layer has none.
    pub fn refraction(&self, wave: &Wave) -> Result<(Wave, TransferMatrix)> {
        let n = self.index_of_refraction(wave.wavelength)?;
        let direction = snell::refract(&wave.direction, wave.n, n, &wave.normal);

        let refraction = fresnel::refraction(
            wave.wavelength,
            &wave.direction,
            &direction,
            wave.polarization,
            wave.n,
            n,
            &wave.normal,
            self.interface.as_ref().or(wave.interface.as_ref()),
        )?;

        Ok((wave.with(n, direction), refraction))
    }
}

impl Transfer for Layer {
    fn transfer(&self, wave: &Wave) -> Result<(Wave, TransferMatrix)> {
        let (inside, refraction) = self.refraction(wave)?;

        let propagation = propagation::propagation(
            inside.wavelength,
            &inside.direction,
            self.thickness(),
            inside.n,
            &inside.normal,
        );

        let result = refraction * propagation;
        check_determinant(&result, "layer transfer")?;

        Ok((inside, result))
    }

    fn thickness(&self) -> f64 {
        self.thickness.unwrap_or(0.0)
    }
}

/// An ordered sequence of stack elements, listed from the ambient side
/// toward the substrate.
#[derive(Debug, Clone, Default)]
pub struct LayerSequence {
    pub layers: Vec<Stack>,
}

impl LayerSequence {
    pub fn new(layers: Vec<Stack>) -> Self {
        Self { layers }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Transfer for LayerSequence {
    fn transfer(&self, wave: &Wave) -> Result<(Wave, TransferMatrix)> {
        let mut wave = wave.clone();
        let mut result = matrix::identity();
        for layer in &self.layers {
            let (next, m) = layer.transfer(&wave)?;
            result *= m;
            wave = next;
        }
        Ok((wave, result))
    }

    fn thickness(&self) -> f64 {
        self.layers.iter().map(|layer| layer.thickness()).sum()
    }
}

/// A layer sequence repeated `num_periods` times with no break between repeats.
#[derive(Debug, Clone)]
pub struct PeriodicLayerSequence {
    pub period: LayerSequence,
    pub num_periods: usize,
}

impl PeriodicLayerSequence {
    /// Creates a periodic sequence. At least one period is required.
    pub fn new(period: LayerSequence, num_periods: usize) -> Result<Self> {
        if num_periods == 0 {
            return Err(Error::InvalidPeriodCount(num_periods));
        }
        Ok(Self {
            period,
            num_periods,
        })
    }
}

impl Transfer for PeriodicLayerSequence {
    fn transfer(&self, wave: &Wave) -> Result<(Wave, TransferMatrix)> {
        let (wave_start, start) = self.period.transfer(wave)?;
        if self.num_periods == 1 {
            return Ok((wave_start, start));
        }

        let (wave_period, period) = self.period.transfer(&wave_start)?;

        let difference = (start - period).norm() / period.norm();
        if difference < config::PERIOD_MATRIX_TOLERANCE {
            debug!("first period matrix equals the repeated period matrix");
        } else {
            debug!(
                "first period matrix differs from the repeated period matrix by {:.3e}",
                difference
            );
        }

        let result = start * matrix::power(&period, self.num_periods as u64 - 1);
        check_finite(&result, "periodic transfer")?;

        Ok((wave_period, result))
    }

    fn thickness(&self) -> f64 {
        self.num_periods as f64 * self.period.thickness()
    }
}

/// Any element of a multilayer stack.
#[derive(Debug, Clone)]
pub enum Stack {
    Layer(Layer),
    Sequence(LayerSequence),
    Periodic(PeriodicLayerSequence),
}

impl Stack {
    /// A stack without any layers.
    pub fn empty() -> Self {
        Stack::Sequence(LayerSequence::default())
    }

    /// The leaf layers in the order the wave crosses them, with every period
    /// of a periodic sequence written out.
    pub fn leaves(&self) -> Vec<&Layer> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a Layer>) {
        match self {
            Stack::Layer(layer) => leaves.push(layer),
            Stack::Sequence(sequence) => {
                for layer in &sequence.layers {
                    layer.collect_leaves(leaves);
                }
            }
            Stack::Periodic(periodic) => {
                for _ in 0..periodic.num_periods {
                    for layer in &periodic.period.layers {
                        layer.collect_leaves(leaves);
                    }
                }
            }
        }
    }
}

impl Transfer for Stack {
    fn transfer(&self, wave: &Wave) -> Result<(Wave, TransferMatrix)> {
        match self {
            Stack::Layer(layer) => layer.transfer(wave),
            Stack::Sequence(sequence) => sequence.transfer(wave),
            Stack::Periodic(periodic) => periodic.transfer(wave),
        }
    }

    fn thickness(&self) -> f64 {
        match self {
            Stack::Layer(layer) => layer.thickness(),
            Stack::Sequence(sequence) => sequence.thickness(),
            Stack::Periodic(periodic) => periodic.thickness(),
        }
    }
}

impl From<Layer> for Stack {
    fn from(layer: Layer) -> Self {
        Stack::Layer(layer)
    }
}

impl From<LayerSequence> for Stack {
    fn from(sequence: LayerSequence) -> Self {
        Stack::Sequence(sequence)
    }
}

impl From<PeriodicLayerSequence> for Stack {
    fn from(periodic: PeriodicLayerSequence) -> Self {
        Stack::Periodic(periodic)
    }
}

impl Stack {
    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match self {
            Stack::Layer(layer) => {
                write!(f, "{}{}", indent, layer.name())?;
                match layer.thickness {
                    Some(thickness) => write!(f, " ({:.3} nm)", thickness)?,
                    None => write!(f, " (boundary)")?,
                }
                if let Some(interface) = &layer.interface {
                    write!(f, ", {}", interface)?;
                }
                writeln!(f)
            }
            Stack::Sequence(sequence) => {
                writeln!(f, "{}sequence ({:.3} nm):", indent, sequence.thickness())?;
                for layer in &sequence.layers {
                    layer.fmt_indented(f, depth + 1)?;
                }
                Ok(())
            }
            Stack::Periodic(periodic) => {
                writeln!(
                    f,
                    "{}{} x period ({:.3} nm):",
                    indent,
                    periodic.num_periods,
                    periodic.period.thickness()
                )?;
                for layer in &periodic.period.layers {
                    layer.fmt_indented(f, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}
