use nalgebra::Vector3;

/// Surface normal used when none is given: the stack surface faces `+z`
/// ambient-side, so the normal pointing back at the ambient medium is `-z`.
pub const DEFAULT_NORMAL: Vector3<f64> = Vector3::new(0.0, 0.0, -1.0);
/// Maximum deviation from unit length accepted for direction and normal vectors.
pub const UNIT_TOLERANCE: f64 = 1e-6;
/// Determinants with a modulus below this are treated as singular.
pub const DETERMINANT_THRESHOLD: f64 = 1e-300;
/// Allowed excess of reflected + transmitted power over unity before a warning is logged.
pub const ENERGY_TOLERANCE: f64 = 1e-6;
/// Relative difference below which two period matrices are reported as identical.
pub const PERIOD_MATRIX_TOLERANCE: f64 = 1e-12;
