//! Inertial sensor calibration

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// Calibration of a tri-axial inertial sensor (accelerometer or gyroscope)
///
/// Applied as `misalignment * ((uncalibrated - offset) * sensitivity)`,
/// with the sensitivity multiplied per axis.
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use gait_trajectory::InertialCalibration;
///
/// let calibration = InertialCalibration {
///     offset: Vector3::new(0.1, 0.2, 0.3),
///     sensitivity: Vector3::new(0.5, 0.5, 0.5),
///     ..Default::default()
/// };
///
/// let calibrated = calibration.apply(Vector3::new(1.0, 2.0, 3.0));
/// assert!((calibrated - Vector3::new(0.45, 0.9, 1.35)).magnitude() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InertialCalibration {
    /// 3x3 misalignment correction matrix
    pub misalignment: Matrix3<f64>,
    /// Sensitivity scaling factors for each axis
    pub sensitivity: Vector3<f64>,
    /// Bias offset subtracted from the raw reading
    pub offset: Vector3<f64>,
}

impl InertialCalibration {
    /// Calibration that leaves readings unchanged
    pub fn identity() -> Self {
        Self {
            misalignment: Matrix3::identity(),
            sensitivity: Vector3::repeat(1.0),
            offset: Vector3::zeros(),
        }
    }

    /// Offset-only calibration estimated as the mean of readings taken at rest
    ///
    /// Intended for the gyroscope, whose reading at rest is pure bias. An
    /// empty slice yields the identity calibration.
    pub fn from_rest(readings: &[Vector3<f64>]) -> Self {
        if readings.is_empty() {
            return Self::identity();
        }
        let sum = readings.iter().fold(Vector3::zeros(), |acc, v| acc + v);
        Self {
            offset: sum / readings.len() as f64,
            ..Self::identity()
        }
    }

    /// Apply the calibration to one reading
    pub fn apply(&self, uncalibrated: Vector3<f64>) -> Vector3<f64> {
        self.misalignment * (uncalibrated - self.offset).component_mul(&self.sensitivity)
    }
}

impl Default for InertialCalibration {
    fn default() -> Self {
        Self::identity()
    }
}
