//! Mahony attitude estimation with stance-switched feedback
//!
//! The estimator integrates the gyroscope and, while the foot is
//! stationary, pulls the estimated gravity direction toward the measured
//! accelerometer direction. During swing the accelerometer also measures
//! translational acceleration, so the proportional gain drops to the moving
//! value (zero by default) and the attitude follows the gyroscope alone.
//!
//! Quaternions rotate body-frame vectors into the Earth frame (Z up):
//! `q * v_body == v_earth`.

use log::debug;
use nalgebra::{Quaternion, UnitQuaternion, Vector3};

use crate::error::{Error, Result};
use crate::math::Vector3Ext;
use crate::stance::StationaryMask;
use crate::types::{AngularRateUnit, AttitudeSettings};

/// Mahony complementary filter state
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use gait_trajectory::{AttitudeEstimator, AttitudeSettings};
///
/// let mut estimator = AttitudeEstimator::new(AttitudeSettings::default(), 0.02);
///
/// // Seed from a sensor tilted about X, then hold still
/// let tilted = Vector3::new(0.0, 0.5, 0.866);
/// estimator.converge(tilted);
///
/// let gravity = estimator.gravity();
/// assert!((gravity - tilted).magnitude() < 1e-3);
/// ```
#[derive(Debug, Clone)]
pub struct AttitudeEstimator {
    settings: AttitudeSettings,
    /// Sample period in seconds
    sample_period: f64,
    /// Current body-to-Earth orientation
    quaternion: UnitQuaternion<f64>,
    /// Proportional gain applied on the next update
    gain: f64,
    /// Integrated gyroscope bias estimate in rad/s
    bias: Vector3<f64>,
}

impl AttitudeEstimator {
    /// Create an estimator at the identity orientation
    ///
    /// `sample_period` is taken as given and must be finite and positive;
    /// [`estimate_orientation`] checks its rate before building one.
    pub fn new(settings: AttitudeSettings, sample_period: f64) -> Self {
        Self {
            settings,
            sample_period,
            quaternion: UnitQuaternion::identity(),
            gain: settings.stationary_gain,
            bias: Vector3::zeros(),
        }
    }

    /// Current orientation
    pub fn quaternion(&self) -> UnitQuaternion<f64> {
        self.quaternion
    }

    /// Set orientation quaternion directly
    pub fn set_quaternion(&mut self, quaternion: UnitQuaternion<f64>) {
        self.quaternion = quaternion;
    }

    /// Current proportional gain
    pub fn gain(&self) -> f64 {
        self.gain
    }

    /// Switch the proportional gain according to stance state
    pub fn set_stationary(&mut self, stationary: bool) {
        self.gain = if stationary {
            self.settings.stationary_gain
        } else {
            self.settings.moving_gain
        };
    }

    /// Estimated gravity direction (unit, pointing up) in the body frame
    pub fn gravity(&self) -> Vector3<f64> {
        self.half_gravity() * 2.0
    }

    /// Settle the orientation on a fixed acceleration with zero angular rate
    ///
    /// Runs `convergence_iterations` updates at `convergence_gain` starting
    /// from the current orientation, then restores the stationary gain.
    pub fn converge(&mut self, accelerometer: Vector3<f64>) {
        self.gain = self.settings.convergence_gain;
        for _ in 0..self.settings.convergence_iterations {
            self.update(Vector3::zeros(), accelerometer);
        }
        self.gain = self.settings.stationary_gain;
    }

    /// Advance one sample
    ///
    /// # Arguments
    /// * `gyroscope` - Angular rate in rad/s
    /// * `accelerometer` - Specific force in any unit; only its direction is used
    pub fn update(&mut self, gyroscope: Vector3<f64>, accelerometer: Vector3<f64>) {
        let mut omega = gyroscope;

        let measured = accelerometer.safe_normalize();
        if measured.magnitude() > 0.0 {
            let error = measured.cross(&self.gravity());
            self.bias -= error * (self.settings.integral_gain * self.sample_period);
            omega += error * self.gain - self.bias;
        }

        self.integrate_quaternion(omega * 0.5);
    }

    /// Gravity direction in the body frame, halved
    ///
    /// Third row of the body-to-Earth rotation matrix times 0.5.
    fn half_gravity(&self) -> Vector3<f64> {
        let q = self.quaternion.as_ref();
        let (qw, qx, qy, qz) = (q.w, q.i, q.j, q.k);

        Vector3::new(
            qx * qz - qw * qy,
            qy * qz + qw * qx,
            qw * qw - 0.5 + qz * qz,
        )
    }

    /// First-order integration of dq/dt = 0.5 * q ⊗ ω
    fn integrate_quaternion(&mut self, half_omega: Vector3<f64>) {
        let omega_quat = Quaternion::from_parts(0.0, half_omega);
        let derivative = self.quaternion.as_ref() * omega_quat;
        let integrated = self.quaternion.as_ref() + derivative * self.sample_period;

        // Renormalize to counter numerical drift
        self.quaternion = UnitQuaternion::from_quaternion(integrated);
    }
}

/// Estimate the orientation of every sample of a conditioned recording
///
/// The orientation is seeded by averaging the accelerometer over the first
/// `convergence_window` seconds (the first sample alone when zero) and
/// settling on that average, then updated once per sample with the gain
/// switched by `stationary`.
pub fn estimate_orientation(
    settings: &AttitudeSettings,
    sample_rate: f64,
    gyroscope: &[Vector3<f64>],
    accelerometer: &[Vector3<f64>],
    stationary: &StationaryMask,
    angular_rate_unit: AngularRateUnit,
) -> Result<Vec<UnitQuaternion<f64>>> {
    Error::ensure_positive("sample_rate", sample_rate)?;
    Error::ensure_len("gyroscope", accelerometer.len(), gyroscope.len())?;
    Error::ensure_len("stationary mask", accelerometer.len(), stationary.len())?;
    if accelerometer.is_empty() {
        return Ok(Vec::new());
    }

    let mut estimator = AttitudeEstimator::new(*settings, 1.0 / sample_rate);

    let window = initial_window(settings.convergence_window, sample_rate, accelerometer.len());
    let mean = accelerometer[..window]
        .iter()
        .fold(Vector3::zeros(), |acc, a| acc + a)
        / window as f64;
    estimator.converge(mean);

    debug!(
        "attitude seeded from {} samples after {} iterations: {:?}",
        window,
        settings.convergence_iterations,
        estimator.quaternion().euler_angles()
    );

    let to_rad = angular_rate_unit.to_si();
    let orientation = gyroscope
        .iter()
        .zip(accelerometer)
        .zip(stationary.iter())
        .map(|((gyro, accel), is_stationary)| {
            estimator.set_stationary(is_stationary);
            estimator.update(gyro * to_rad, *accel);
            estimator.quaternion()
        })
        .collect();

    Ok(orientation)
}

/// Samples with `t <= t0 + window`, at least one
fn initial_window(window: f64, sample_rate: f64, len: usize) -> usize {
    let samples = (window * sample_rate + 1e-9).floor() as usize + 1;
    samples.min(len)
}
