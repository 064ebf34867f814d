//! Evaluation of a multilayer over a grid of wavelengths and incidence angles.
//!
//! Every grid point is independent, so the points are distributed over the
//! rayon thread pool and collected back into `[wavelength, angle]` arrays.

use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use nalgebra::Vector3;
use ndarray::Array2;
use num_complex::Complex64;
use rayon::prelude::*;
use serde::Serialize;

use crate::config;
use crate::error::Result;
use crate::grid;
use crate::multilayer::Multilayer;
use crate::powers::Powers;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{Layer, Stack};
    use crate::medium::Constant;
    use std::sync::Arc;

    fn glass() -> Multilayer {
        Multilayer::new(
            Stack::empty(),
            Layer::boundary(Arc::new(Constant::new("glass", Complex64::new(1.5, 0.0)))),
        )
    }

    #[test]
    fn shape_and_values() {
        let sweep = Sweep::new(vec![400.0, 500.0, 600.0], vec![0.0, 0.5]);
        let result = sweep.solve(&glass()).unwrap();
        assert_eq!(result.reflected.dim(), (3, 2));
        assert_eq!(result.transmitted.dim(), (3, 2));
        for i in 0..3 {
            assert!((result.reflected[[i, 0]] - 0.04).abs() < 1e-12);
            assert!(result.reflected[[i, 1]] > 0.04);
        }
        let absorbed = result.absorbed();
        assert!(absorbed.iter().all(|a| a.abs() < 1e-12));
    }

    #[test]
    fn matches_pointwise_evaluation() {
        let multilayer = glass();
        let sweep = Sweep::new(vec![450.0], vec![0.2, 0.9]);
        let result = sweep.solve(&multilayer).unwrap();
        let direction = grid::direction_from_angle(0.9, &config::DEFAULT_NORMAL);
        let expected = multilayer
            .efficiency(450.0, &direction, Complex64::new(1.0, 0.0), &config::DEFAULT_NORMAL)
            .unwrap();
        assert_eq!(result.powers(0, 1), expected);
    }

    #[test]
    fn failing_point_aborts() {
        let sweep = Sweep::new(vec![-1.0, 500.0], vec![0.0]);
        assert!(sweep.solve(&glass()).is_err());
    }
}

/// A grid of incidence conditions.
#[derive(Debug, Clone)]
pub struct Sweep {
    /// Wavelengths in the ambient medium (nm).
    pub wavelengths: Vec<f64>,
    /// Angles of incidence (radians), in the plane of the normal and the x axis.
    pub angles: Vec<f64>,
    pub n_ambient: Complex64,
    pub normal: Vector3<f64>,
    /// Whether to draw a progress bar on stderr.
    pub progress: bool,
}

/// Reflectivity and transmissivity over a sweep, indexed `[wavelength, angle]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepResult {
    pub wavelengths: Vec<f64>,
    pub angles: Vec<f64>,
    pub reflected: Array2<f64>,
    pub transmitted: Array2<f64>,
}

impl Sweep {
    /// A sweep in vacuum with the default surface normal.
    pub fn new(wavelengths: Vec<f64>, angles: Vec<f64>) -> Self {
        Self {
            wavelengths,
            angles,
            n_ambient: Complex64::new(1.0, 0.0),
            normal: config::DEFAULT_NORMAL,
            progress: false,
        }
    }

    pub fn with_ambient(mut self, n_ambient: Complex64) -> Self {
        self.n_ambient = n_ambient;
        self
    }

    pub fn with_normal(mut self, normal: Vector3<f64>) -> Self {
        self.normal = normal;
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {bar:40.green/blue} {pos:>5}/{len:5} {msg} ETA: {eta_precise}",
        )
        .map(|style| style.progress_chars("█▇▆▅▄▃▂▁"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb.set_message("point".to_string());
        pb
    }

    /// Evaluates `multilayer` at every (wavelength, angle) pair in parallel.
    /// Stops at the first point that fails.
    pub fn solve(&self, multilayer: &Multilayer) -> Result<SweepResult> {
        let start = Instant::now();
        let points = grid::combinations(&self.wavelengths, &self.angles);
        info!(
            "solving {} wavelengths x {} angles",
            self.wavelengths.len(),
            self.angles.len()
        );

        let pb = self.progress_bar(points.len());

        let powers = points
            .par_iter()
            .map(|&(wavelength, angle)| {
                let direction = grid::direction_from_angle(angle, &self.normal);
                let powers =
                    multilayer.efficiency(wavelength, &direction, self.n_ambient, &self.normal);
                pb.inc(1);
                powers
            })
            .collect::<Result<Vec<Powers>>>()?;

        pb.finish_and_clear();

        let shape = (self.wavelengths.len(), self.angles.len());
        let mut reflected = Array2::zeros(shape);
        let mut transmitted = Array2::zeros(shape);
        for (index, p) in powers.iter().enumerate() {
            let (i, j) = (index / shape.1, index % shape.1);
            reflected[[i, j]] = p.reflected;
            transmitted[[i, j]] = p.transmitted;
        }

        let duration = start.elapsed();
        info!(
            "time taken: {:.2?}, time per point: {:.2?}",
            duration,
            duration / points.len().max(1) as u32
        );

        Ok(SweepResult {
            wavelengths: self.wavelengths.clone(),
            angles: self.angles.clone(),
            reflected,
            transmitted,
        })
    }
}

impl SweepResult {
    /// Absorbed fraction `1 - R - T` at every grid point.
    pub fn absorbed(&self) -> Array2<f64> {
        1.0 - &self.reflected - &self.transmitted
    }

    /// The result at one grid point.
    pub fn powers(&self, i: usize, j: usize) -> Powers {
        Powers::new(self.reflected[[i, j]], self.transmitted[[i, j]])
    }
}
