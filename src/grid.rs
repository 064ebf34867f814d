use nalgebra::Vector3;
use ndarray::Array1;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;

    #[test]
    fn linspace_endpoints() {
        let values = linspace(100.0, 200.0, 11);
        assert_eq!(values.len(), 11);
        assert_eq!(values[0], 100.0);
        assert!((values[10] - 200.0).abs() < 1e-12);
        assert!((values[1] - 110.0).abs() < 1e-12);
    }

    #[test]
    fn combinations_are_row_major() {
        let pairs = combinations(&[1.0, 2.0], &[0.0, 0.5, 1.0]);
        assert_eq!(pairs.len(), 6);
        assert_eq!(pairs[0], (1.0, 0.0));
        assert_eq!(pairs[2], (1.0, 1.0));
        assert_eq!(pairs[3], (2.0, 0.0));
    }

    #[test]
    fn normal_incidence_direction() {
        let d = direction_from_angle(0.0, &config::DEFAULT_NORMAL);
        assert!((d - Vector3::z()).norm() < 1e-15);
    }

    #[test]
    fn oblique_direction() {
        let angle = 0.4f64;
        let d = direction_from_angle(angle, &config::DEFAULT_NORMAL);
        assert!((d.norm() - 1.0).abs() < 1e-12);
        assert!((-d.dot(&config::DEFAULT_NORMAL) - angle.cos()).abs() < 1e-12);
        assert!(d.y.abs() < 1e-15);
    }

    #[test]
    fn tilted_normal() {
        let normal = Vector3::new(1.0, 0.0, -1.0).normalize();
        let d = direction_from_angle(0.3, &normal);
        assert!((d.norm() - 1.0).abs() < 1e-12);
        assert!((-d.dot(&normal) - 0.3f64.cos()).abs() < 1e-12);
    }
}

/// `num` evenly spaced values over `[start, stop]`.
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    Array1::linspace(start, stop, num).to_vec()
}

/// Every `(wavelength, angle)` pair, wavelengths varying slowest.
pub fn combinations(wavelengths: &[f64], angles: &[f64]) -> Vec<(f64, f64)> {
    wavelengths
        .iter()
        .flat_map(|&wavelength| angles.iter().map(move |&angle| (wavelength, angle)))
        .collect()
}

/// Unit direction of incidence at `angle` (radians) from the inward normal
/// `-normal`, tilted within the plane spanned by the normal and the x axis
/// (the y axis if the normal lies along x).
pub fn direction_from_angle(angle: f64, normal: &Vector3<f64>) -> Vector3<f64> {
    let inward = -normal;
    let reference = if normal.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let tangent = (reference - inward * reference.dot(&inward)).normalize();
    inward * angle.cos() + tangent * angle.sin()
}
