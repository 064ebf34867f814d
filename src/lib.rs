//! Reflectivity and transmissivity of planar multilayer thin-film stacks,
//! computed with the transfer-matrix method.
//!
//! Lengths are in nanometres, angles in radians and refractive indices are
//! complex (`n + ik`, `k >= 0` for absorbing media). The ambient medium is on
//! the side the surface normal points to; the default normal is `-z`, so light
//! travelling along `+z` hits the stack head-on.
//!
//! ```no_run
//! use std::sync::Arc;
//! use num_complex::Complex64;
//! use nalgebra::Vector3;
//! use thinfilm::{config, Constant, Layer, Multilayer, Stack};
//!
//! let film = Layer::new(Arc::new(Constant::new("MgF2", Complex64::new(1.38, 0.0))), 100.0)?;
//! let substrate = Layer::boundary(Arc::new(Constant::new("glass", Complex64::new(1.52, 0.0))));
//! let multilayer = Multilayer::new(Stack::from(film), substrate);
//! let powers = multilayer.efficiency(
//!     550.0,
//!     &Vector3::z(),
//!     Complex64::new(1.0, 0.0),
//!     &config::DEFAULT_NORMAL,
//! )?;
//! println!("{}", powers);
//! # Ok::<(), thinfilm::Error>(())
//! ```

pub mod absorbance;
pub mod config;
pub mod error;
pub mod fresnel;
pub mod grid;
pub mod layer;
pub mod matrix;
pub mod medium;
pub mod multilayer;
pub mod output;
pub mod powers;
pub mod profiles;
pub mod propagation;
pub mod settings;
pub mod snell;
pub mod sweep;
pub mod wave;

pub use absorbance::layer_absorbance;
pub use error::{Error, Result};
pub use layer::{Layer, LayerSequence, PeriodicLayerSequence, Stack, Transfer};
pub use matrix::TransferMatrix;
pub use medium::{Constant, Medium, Tabulated, Vacuum};
pub use multilayer::{multilayer_efficiency, polarized_efficiency, Multilayer, MultilayerFilm};
pub use powers::Powers;
pub use profiles::InterfaceProfile;
pub use sweep::{Sweep, SweepResult};
pub use wave::{Polarization, Wave};
