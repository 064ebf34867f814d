use anyhow::{bail, Context, Result};
use clap::Parser;
use config::{Config, Environment, File};
use nalgebra::Vector3;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::grid;
use crate::layer::{Layer, LayerSequence, PeriodicLayerSequence, Stack};
use crate::medium::{Constant, Medium, Tabulated, Vacuum};
use crate::multilayer::Multilayer;
use crate::profiles::InterfaceProfile;
use crate::sweep::Sweep;

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(text, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    const MINIMAL: &str = r#"
        angles = [0.0, 45.0]
        wavelengths = { start = 400.0, stop = 500.0, num = 3 }

        [stack]
        type = "periodic"
        num_periods = 4

        [[stack.period]]
        type = "layer"
        thickness = 2.5
        medium = { kind = "constant", name = "Mo", n = [0.92, 0.0064] }

        [[stack.period]]
        type = "layer"
        thickness = 4.5
        interface = { shape = "erf", width = 0.4 }
        medium = { kind = "constant", name = "Si", n = [0.999, 0.0018] }

        [substrate]
        medium = { kind = "vacuum" }
    "#;

    #[test]
    fn parse_periodic_stack() {
        let settings = parse(MINIMAL);
        assert!(settings.validate().is_ok());
        assert_eq!(settings.wavelengths.values(), vec![400.0, 450.0, 500.0]);
        assert_eq!(settings.n_ambient, Complex64::new(1.0, 0.0));

        let multilayer = settings.build_multilayer().unwrap();
        assert!((multilayer.thickness() - 28.0).abs() < 1e-12);
    }

    #[test]
    fn wavelength_list() {
        let spec: WavelengthSpec = serde_json::from_str("[13.5, 17.1]").unwrap();
        assert_eq!(spec.values(), vec![13.5, 17.1]);
    }

    #[test]
    fn invalid_settings_rejected() {
        let mut settings = parse(MINIMAL);
        settings.angles = vec![95.0];
        assert!(settings.validate().is_err());

        let mut settings = parse(MINIMAL);
        settings.wavelengths = WavelengthSpec::List(vec![]);
        assert!(settings.validate().is_err());

        let mut settings = parse(MINIMAL);
        settings.normal = [0.0, 0.0, -2.0];
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_periods_fail_to_build() {
        let text = MINIMAL.replace("num_periods = 4", "num_periods = 0");
        let settings = parse(&text);
        assert!(settings.build_multilayer().is_err());
    }

    #[test]
    fn sweep_uses_radians() {
        let sweep = parse(MINIMAL).sweep();
        assert_eq!(sweep.angles.len(), 2);
        assert!((sweep.angles[1] - std::f64::consts::FRAC_PI_4).abs() < 1e-15);
    }

    #[test]
    fn default_config_is_valid() {
        let settings = load_default_config().unwrap();
        assert!(settings.build_multilayer().is_ok());
    }

    #[test]
    fn cli_overrides() {
        let root = retrieve_project_root().unwrap();
        let args = CliArgs {
            config: Some(root.join("config/default.toml").display().to_string()),
            angles: Some(vec![10.0, 20.0]),
            ri0: Some(Complex64::new(1.33, 0.0)),
            ..Default::default()
        };
        let settings = load_config_with_args(args).unwrap();
        assert_eq!(settings.angles, vec![10.0, 20.0]);
        assert_eq!(settings.n_ambient, Complex64::new(1.33, 0.0));
    }

    #[test]
    fn display_as_toml() {
        let text = parse(MINIMAL).to_string();
        assert!(text.contains("num_periods = 4"));
    }
}

/// Runtime configuration for the application.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Settings {
    /// Wavelengths in the ambient medium (nm).
    pub wavelengths: WavelengthSpec,
    /// Angles of incidence (degrees).
    pub angles: Vec<f64>,
    #[serde(default = "default_ambient")]
    pub n_ambient: Complex64,
    /// Surface normal, pointing back toward the ambient side.
    #[serde(default = "default_normal")]
    pub normal: [f64; 3],
    pub stack: StackConfig,
    pub substrate: LayerConfig,
    /// Output file. `.json` files are written as JSON, anything else as a table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default)]
    pub progress: bool,
}

fn default_ambient() -> Complex64 {
    Complex64::new(1.0, 0.0)
}

fn default_normal() -> [f64; 3] {
    [0.0, 0.0, -1.0]
}

/// Either an evenly spaced range or an explicit list of wavelengths.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum WavelengthSpec {
    Range { start: f64, stop: f64, num: usize },
    List(Vec<f64>),
}

impl WavelengthSpec {
    pub fn values(&self) -> Vec<f64> {
        match self {
            WavelengthSpec::Range { start, stop, num } => grid::linspace(*start, *stop, *num),
            WavelengthSpec::List(values) => values.clone(),
        }
    }
}

/// Serialized form of a [`Stack`].
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StackConfig {
    Layer(LayerConfig),
    Sequence {
        layers: Vec<StackConfig>,
    },
    Periodic {
        period: Vec<StackConfig>,
        num_periods: usize,
    },
}

/// Serialized form of a [`Layer`].
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LayerConfig {
    pub medium: MediumConfig,
    /// Thickness in nm. Omitted for the substrate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<InterfaceProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Serialized form of a [`Medium`].
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediumConfig {
    Vacuum,
    Constant { name: String, n: Complex64 },
    /// A `wavelength n k` table. Relative paths start at the project root.
    Tabulated { path: String },
}

impl MediumConfig {
    pub fn build(&self) -> Result<Arc<dyn Medium>> {
        let medium: Arc<dyn Medium> = match self {
            MediumConfig::Vacuum => Arc::new(Vacuum),
            MediumConfig::Constant { name, n } => Arc::new(Constant::new(name, *n)),
            MediumConfig::Tabulated { path } => {
                let path = resolve_path(path)?;
                let table = Tabulated::from_file(&path)
                    .with_context(|| format!("failed to load index table {:?}", path))?;
                Arc::new(table)
            }
        };
        Ok(medium)
    }
}

impl LayerConfig {
    pub fn build(&self) -> Result<Layer> {
        let medium = self.medium.build()?;
        let mut layer = match self.thickness {
            Some(thickness) => Layer::new(medium, thickness)?,
            None => Layer::boundary(medium),
        };
        if let Some(interface) = self.interface {
            layer = layer.with_interface(interface)?;
        }
        if let Some(label) = &self.label {
            layer = layer.with_label(label);
        }
        Ok(layer)
    }
}

impl StackConfig {
    pub fn build(&self) -> Result<Stack> {
        let stack: Stack = match self {
            StackConfig::Layer(layer) => layer.build()?.into(),
            StackConfig::Sequence { layers } => build_sequence(layers)?.into(),
            StackConfig::Periodic {
                period,
                num_periods,
            } => PeriodicLayerSequence::new(build_sequence(period)?, *num_periods)?.into(),
        };
        Ok(stack)
    }
}

fn build_sequence(layers: &[StackConfig]) -> Result<LayerSequence> {
    let layers = layers
        .iter()
        .map(|layer| layer.build())
        .collect::<Result<Vec<_>>>()?;
    Ok(LayerSequence::new(layers))
}

impl Settings {
    /// Builds the physical multilayer described by these settings.
    pub fn build_multilayer(&self) -> Result<Multilayer> {
        let layers = self.stack.build().context("invalid layer stack")?;
        let substrate = self.substrate.build().context("invalid substrate")?;
        Ok(Multilayer::new(layers, substrate))
    }

    pub fn normal(&self) -> Vector3<f64> {
        Vector3::from(self.normal)
    }

    /// The evaluation grid, with angles converted to radians.
    pub fn sweep(&self) -> Sweep {
        Sweep::new(
            self.wavelengths.values(),
            self.angles.iter().map(|angle| angle.to_radians()).collect(),
        )
        .with_ambient(self.n_ambient)
        .with_normal(self.normal())
        .with_progress(self.progress)
    }

    pub fn validate(&self) -> Result<()> {
        let wavelengths = self.wavelengths.values();
        if wavelengths.is_empty() {
            bail!("at least one wavelength is required");
        }
        if let Some(wavelength) = wavelengths.iter().find(|w| !(**w > 0.0 && w.is_finite())) {
            bail!("wavelengths must be positive, got {}", wavelength);
        }
        if self.angles.is_empty() {
            bail!("at least one angle of incidence is required");
        }
        if let Some(angle) = self.angles.iter().find(|a| !(0.0..90.0).contains(*a)) {
            bail!("angles of incidence must lie in [0, 90) degrees, got {}", angle);
        }
        if !(self.n_ambient.re > 0.0 && self.n_ambient.is_finite()) {
            bail!("ambient index must have a positive real part, got {}", self.n_ambient);
        }
        if (self.normal().norm() - 1.0).abs() > crate::config::UNIT_TOLERANCE {
            bail!("normal must be a unit vector, got {:?}", self.normal);
        }
        Ok(())
    }
}

pub fn load_default_config() -> Result<Settings> {
    let root = retrieve_project_root()?;
    let default_config_file = root.join("config/default.toml");

    let settings = read_config(&default_config_file, false)?;
    settings.validate()?;

    Ok(settings)
}

pub fn load_config() -> Result<Settings> {
    load_config_with_args(CliArgs::parse())
}

pub fn load_config_with_args(args: CliArgs) -> Result<Settings> {
    let config_file = match &args.config {
        Some(path) => PathBuf::from(path),
        None => {
            let root = retrieve_project_root()?;
            let default_config_file = root.join("config/default.toml");
            let local_config = root.join("config/local.toml");

            // Check if local config exists, if not use default
            if local_config.exists() {
                println!("Using local configuration: {:?}", local_config);
                local_config
            } else {
                println!("Using default configuration: {:?}", default_config_file);
                default_config_file
            }
        }
    };

    let mut config = read_config(&config_file, true)?;

    if let Some(wavelengths) = args.wavelengths {
        config.wavelengths = WavelengthSpec::List(wavelengths);
    }
    if let Some(angles) = args.angles {
        config.angles = angles;
    }
    if let Some(medium) = args.ri0 {
        config.n_ambient = medium;
    }
    if let Some(output) = args.output {
        config.output = Some(output);
    }
    if args.progress {
        config.progress = true;
    }

    config.validate()?;

    println!("{}", config);

    Ok(config)
}

fn read_config(path: &Path, environment: bool) -> Result<Settings> {
    let mut builder = Config::builder().add_source(File::from(path).required(true));
    if environment {
        builder = builder.add_source(Environment::with_prefix("thinfilm"));
    }
    let settings = builder
        .build()
        .with_context(|| format!("error loading configuration {:?}", path))?;

    settings
        .try_deserialize()
        .with_context(|| format!("error deserializing configuration {:?}", path))
}

/// Relative paths are taken from the project root.
fn resolve_path(path: &str) -> Result<PathBuf> {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(retrieve_project_root()?.join(path))
    }
}

/// Retrieve the project root directory.
/// This function tries to find the project root directory in different ways:
/// 1. If the CARGO_MANIFEST_DIR environment variable is set, use it.
/// 2. If the THINFILM_ROOT_DIR environment variable is set, use it.
/// 3. If the "config" subdirectory is found in the executable directory or any of its parents, use it.
fn retrieve_project_root() -> Result<PathBuf> {
    if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        // When running through cargo (e.g. cargo run, cargo test)
        return Ok(PathBuf::from(manifest_dir));
    }
    if let Ok(path) = env::var("THINFILM_ROOT_DIR") {
        return Ok(PathBuf::from(path));
    }

    // Walk upward from the executable directory
    let exe_path = env::current_exe().context("failed to get current executable path")?;
    let mut current_dir = exe_path.parent();
    while let Some(dir) = current_dir {
        if dir.join("config").is_dir() {
            return Ok(dir.to_path_buf());
        }
        current_dir = dir.parent();
    }
    bail!("could not find project root directory")
}

#[derive(Parser, Debug, Default)]
#[command(version, about = "thinfilm - transfer-matrix reflectivity of multilayer stacks")]
pub struct CliArgs {
    /// Configuration file. Defaults to config/local.toml, then config/default.toml.
    #[arg(short, long)]
    pub config: Option<String>,

    /// Wavelengths in the ambient medium (nm), separated by spaces.
    #[arg(short, long, num_args = 1.., value_delimiter = ' ')]
    pub wavelengths: Option<Vec<f64>>,

    /// Angles of incidence in degrees, separated by spaces.
    #[arg(short, long, num_args = 1.., value_delimiter = ' ')]
    pub angles: Option<Vec<f64>>,

    /// The refractive index of the ambient medium.
    #[arg(long)]
    pub ri0: Option<Complex64>,

    /// Output file. A `.json` extension selects JSON output.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Show a progress bar.
    #[arg(short, long)]
    pub progress: bool,
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = toml::to_string_pretty(self).map_err(|_| fmt::Error)?;
        writeln!(f, "Settings:")?;
        write!(f, "{}", text)
    }
}
