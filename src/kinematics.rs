//! Earth-frame acceleration and strapdown integration
//!
//! Specific force measured in the body frame is rotated into the Earth frame,
//! gravity is removed and the result integrated once to velocity (with
//! zero-velocity updates during stance) and once more to position.

use nalgebra::{UnitQuaternion, Vector3};

use crate::error::{Error, Result};
use crate::stance::StationaryMask;
use crate::types::AccelerationUnit;

/// Earth-frame acceleration, velocity and position of every sample
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KinematicSeries {
    /// Gravity-free acceleration in m/s²
    pub acceleration: Vec<Vector3<f64>>,
    /// Drift-corrected velocity in m/s
    pub velocity: Vec<Vector3<f64>>,
    /// Position in m relative to the first sample
    pub position: Vec<Vector3<f64>>,
}

impl KinematicSeries {
    pub fn len(&self) -> usize {
        self.position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }
}

/// Rotate body-frame specific force into the Earth frame and remove gravity
///
/// Returns linear acceleration in m/s² regardless of the input unit.
///
/// # Example
/// ```
/// use nalgebra::{UnitQuaternion, Vector3};
/// use gait_trajectory::{AccelerationUnit, kinematics::earth_acceleration};
///
/// // Sensor at rest, rolled 90° onto its side: gravity reads along body Y
/// let roll = UnitQuaternion::from_euler_angles(core::f64::consts::FRAC_PI_2, 0.0, 0.0);
/// let acceleration = earth_acceleration(
///     &[roll],
///     &[Vector3::new(0.0, 1.0, 0.0)],
///     AccelerationUnit::G,
/// ).unwrap();
///
/// assert!(acceleration[0].magnitude() < 1e-12);
/// ```
pub fn earth_acceleration(
    orientation: &[UnitQuaternion<f64>],
    accelerometer: &[Vector3<f64>],
    unit: AccelerationUnit,
) -> Result<Vec<Vector3<f64>>> {
    Error::ensure_len("orientation", accelerometer.len(), orientation.len())?;

    let gravity = Vector3::new(0.0, 0.0, unit.gravity());
    let scale = unit.to_si();

    Ok(orientation
        .iter()
        .zip(accelerometer)
        .map(|(q, a)| (q * a - gravity) * scale)
        .collect())
}

/// Integrate acceleration to velocity, zeroing every stationary sample
///
/// Forward Euler with `velocity[0] = 0`. Samples flagged stationary are set to
/// exactly zero after the integration step, which resets accumulated drift at
/// each foot contact.
pub fn integrate_velocity(
    acceleration: &[Vector3<f64>],
    sample_period: f64,
    stationary: &StationaryMask,
) -> Result<Vec<Vector3<f64>>> {
    Error::ensure_positive("sample_period", sample_period)?;
    Error::ensure_len("stationary mask", acceleration.len(), stationary.len())?;

    let mut velocity = Vec::with_capacity(acceleration.len());
    let mut current = Vector3::zeros();
    for (index, (a, is_stationary)) in acceleration.iter().zip(stationary.iter()).enumerate() {
        if index > 0 {
            current += a * sample_period;
        }
        if is_stationary {
            current = Vector3::zeros();
        }
        velocity.push(current);
    }
    Ok(velocity)
}

/// Integrate velocity to position, starting at the origin
pub fn integrate_position(velocity: &[Vector3<f64>], sample_period: f64) -> Result<Vec<Vector3<f64>>> {
    Error::ensure_positive("sample_period", sample_period)?;

    let mut position = Vec::with_capacity(velocity.len());
    let mut current = Vector3::zeros();
    for (index, v) in velocity.iter().enumerate() {
        if index > 0 {
            current += v * sample_period;
        }
        position.push(current);
    }
    Ok(position)
}
