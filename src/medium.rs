//! Optical media: sources of the complex refractive index of a layer.
//!
//! Every layer resolves its index through the [`Medium`] trait at the vacuum
//! wavelength of the incident light. Besides vacuum and constant-index media,
//! [`Tabulated`] media interpolate measured optical constants read from
//! whitespace-separated `wavelength n k` files (wavelength in nanometres).

use std::f64::consts::PI;
use std::fmt;
use std::fs;
use std::path::Path;

use num_complex::Complex64;

use crate::error::{Error, Result};

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Tabulated {
        Tabulated::new(
            "test",
            vec![100.0, 200.0, 300.0],
            vec![1.0, 2.0, 4.0],
            vec![0.0, 0.1, 0.3],
        )
        .unwrap()
    }

    #[test]
    fn vacuum_is_unity() {
        assert_eq!(Vacuum.index_of_refraction(123.0).unwrap(), Complex64::new(1.0, 0.0));
        assert_eq!(Vacuum.absorption_coefficient(123.0).unwrap(), 0.0);
    }

    #[test]
    fn absorption_coefficient_from_extinction() {
        let medium = Constant::new("lossy", Complex64::new(1.0, 0.5));
        let alpha = medium.absorption_coefficient(100.0).unwrap();
        assert!((alpha - 4.0 * PI * 0.5 / 100.0).abs() < 1e-15);
    }

    #[test]
    fn tabulated_interpolates_linearly() {
        let n = table().index_of_refraction(250.0).unwrap();
        assert!((n.re - 3.0).abs() < 1e-12);
        assert!((n.im - 0.2).abs() < 1e-12);
    }

    #[test]
    fn tabulated_hits_nodes_exactly() {
        let n = table().index_of_refraction(200.0).unwrap();
        assert_eq!(n, Complex64::new(2.0, 0.1));
        let n = table().index_of_refraction(300.0).unwrap();
        assert_eq!(n, Complex64::new(4.0, 0.3));
    }

    #[test]
    fn tabulated_out_of_range() {
        assert!(table().index_of_refraction(99.0).is_err());
        assert!(table().index_of_refraction(301.0).is_err());
    }

    #[test]
    fn unsorted_table_rejected() {
        let result = Tabulated::new("bad", vec![2.0, 1.0], vec![1.0, 1.0], vec![0.0, 0.0]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_table() {
        let text = "# wavelength n k\n100 1.0 0.0\n\n200 2.0 0.1 # comment\n";
        let table = Tabulated::parse("parsed", text).unwrap();
        assert_eq!(table.wavelengths, vec![100.0, 200.0]);
        assert_eq!(table.k, vec![0.0, 0.1]);
    }

    #[test]
    fn parse_table_bad_row() {
        assert!(Tabulated::parse("bad", "100 1.0\n200 2.0 0.1\n").is_err());
        assert!(Tabulated::parse("bad", "100 x 0.0\n200 2.0 0.1\n").is_err());
    }
}

/// A homogeneous, isotropic optical medium.
pub trait Medium: fmt::Debug + Send + Sync {
    /// Human-readable name of the medium, e.g. its chemical formula.
    fn name(&self) -> &str;

    /// Complex refractive index `n + ik` at the given vacuum wavelength (nm).
    fn index_of_refraction(&self, wavelength: f64) -> Result<Complex64>;

    /// Intensity absorption coefficient `4 pi k / lambda` (per nm).
    fn absorption_coefficient(&self, wavelength: f64) -> Result<f64> {
        let n = self.index_of_refraction(wavelength)?;
        Ok(4.0 * PI * n.im / wavelength)
    }
}

/// Empty space, `n = 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vacuum;

impl Medium for Vacuum {
    fn name(&self) -> &str {
        "vacuum"
    }

    fn index_of_refraction(&self, _wavelength: f64) -> Result<Complex64> {
        Ok(Complex64::new(1.0, 0.0))
    }
}

/// A dispersionless medium with a fixed complex index.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub name: String,
    pub n: Complex64,
}

impl Constant {
    pub fn new(name: &str, n: Complex64) -> Self {
        Self {
            name: name.to_string(),
            n,
        }
    }
}

impl Medium for Constant {
    fn name(&self) -> &str {
        &self.name
    }

    fn index_of_refraction(&self, _wavelength: f64) -> Result<Complex64> {
        Ok(self.n)
    }
}

/// Tabulated optical constants, linearly interpolated in wavelength.
#[derive(Debug, Clone, PartialEq)]
pub struct Tabulated {
    pub name: String,
    pub wavelengths: Vec<f64>,
    pub n: Vec<f64>,
    pub k: Vec<f64>,
}

impl Tabulated {
    /// Creates a table, checking that the columns have equal length, hold at
    /// least two rows and that the wavelengths are strictly increasing.
    pub fn new(name: &str, wavelengths: Vec<f64>, n: Vec<f64>, k: Vec<f64>) -> Result<Self> {
        if wavelengths.len() != n.len() || wavelengths.len() != k.len() {
            return Err(Error::Table(format!(
                "{}: column lengths differ ({}, {}, {})",
                name,
                wavelengths.len(),
                n.len(),
                k.len()
            )));
        }
        if wavelengths.len() < 2 {
            return Err(Error::Table(format!("{}: need at least two rows", name)));
        }
        if wavelengths.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(Error::Table(format!(
                "{}: wavelengths must be strictly increasing",
                name
            )));
        }
        Ok(Self {
            name: name.to_string(),
            wavelengths,
            n,
            k,
        })
    }

    /// Parses whitespace-separated `wavelength n k` rows. Blank lines and
    /// anything after a `#` are ignored.
    pub fn parse(name: &str, text: &str) -> Result<Self> {
        let mut wavelengths = Vec::new();
        let mut n = Vec::new();
        let mut k = Vec::new();

        for (line_number, line) in text.lines().enumerate() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let values = line
                .split_whitespace()
                .map(|s| s.parse::<f64>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| Error::Table(format!("{}:{}: {}", name, line_number + 1, e)))?;
            if values.len() != 3 {
                return Err(Error::Table(format!(
                    "{}:{}: expected 3 columns, got {}",
                    name,
                    line_number + 1,
                    values.len()
                )));
            }
            wavelengths.push(values[0]);
            n.push(values[1]);
            k.push(values[2]);
        }

        Self::new(name, wavelengths, n, k)
    }

    /// Reads a table from a file. The medium is named after the file stem.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let text = fs::read_to_string(path)?;
        Self::parse(&name, &text)
    }

    fn range(&self) -> (f64, f64) {
        (self.wavelengths[0], self.wavelengths[self.wavelengths.len() - 1])
    }
}

/// Linear interpolation of `fp` sampled at the increasing abscissae `xp`.
/// `x` must lie within `[xp[0], xp[last]]`.
fn interp_one(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let idx = xp.partition_point(|&v| v < x);
    if idx == 0 {
        return fp[0];
    }
    if xp[idx] == x {
        return fp[idx];
    }
    let lo = idx - 1;
    let t = (x - xp[lo]) / (xp[idx] - xp[lo]);
    fp[lo] + t * (fp[idx] - fp[lo])
}

impl Medium for Tabulated {
    fn name(&self) -> &str {
        &self.name
    }

    fn index_of_refraction(&self, wavelength: f64) -> Result<Complex64> {
        let (min, max) = self.range();
        if !(wavelength >= min && wavelength <= max) {
            return Err(Error::OutOfRange {
                medium: self.name.clone(),
                wavelength,
                min,
                max,
            });
        }
        Ok(Complex64::new(
            interp_one(wavelength, &self.wavelengths, &self.n),
            interp_one(wavelength, &self.wavelengths, &self.k),
        ))
    }
}
