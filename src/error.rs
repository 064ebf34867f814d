//! Error types for stack construction and transfer-matrix evaluation.
//!
//! Construction errors (negative thickness, zero periods, negative profile
//! width, malformed incident waves) are reported as soon as the offending
//! value is built. Numeric degeneracy is reported at evaluation time, when a
//! boundary or transfer matrix loses its inverse.

use num_complex::Complex64;
use thiserror::Error;

/// Errors produced while building or evaluating a multilayer stack.
#[derive(Debug, Error)]
pub enum Error {
    #[error("layer thickness must be finite and non-negative, got {0}")]
    InvalidThickness(f64),

    #[error("a periodic layer sequence needs at least one period, got {0}")]
    InvalidPeriodCount(usize),

    #[error("interface profile width must be finite and non-negative, got {0}")]
    InvalidWidth(f64),

    #[error("invalid incident wave: {0}")]
    InvalidWave(String),

    #[error("degenerate {context} matrix, determinant is {determinant}")]
    DegenerateMatrix {
        context: &'static str,
        determinant: Complex64,
    },

    #[error("{context} matrix has non-finite entries")]
    NonFinite { context: &'static str },

    #[error("layer index {index} is out of range for a stack of {len} layers")]
    InvalidLayerIndex { index: usize, len: usize },

    #[error("wavelength {wavelength} nm is outside the tabulated range [{min}, {max}] nm of {medium}")]
    OutOfRange {
        medium: String,
        wavelength: f64,
        min: f64,
        max: f64,
    },

    #[error("malformed index table: {0}")]
    Table(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
