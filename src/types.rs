//! Units and settings for the trajectory pipeline

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::math::{DEG_TO_RAD, STANDARD_GRAVITY};

/// Unit of the accelerometer channel
///
/// The stance threshold and the gravity vector removed by the frame
/// transformation are expressed in this unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccelerationUnit {
    /// Multiples of standard gravity
    #[default]
    G,
    /// Metres per second squared
    MetersPerSecondSquared,
}

impl AccelerationUnit {
    /// Magnitude of gravity expressed in this unit
    pub fn gravity(self) -> f64 {
        match self {
            AccelerationUnit::G => 1.0,
            AccelerationUnit::MetersPerSecondSquared => STANDARD_GRAVITY,
        }
    }

    /// Factor converting a value in this unit to m/s²
    pub fn to_si(self) -> f64 {
        match self {
            AccelerationUnit::G => STANDARD_GRAVITY,
            AccelerationUnit::MetersPerSecondSquared => 1.0,
        }
    }
}

/// Unit of the gyroscope channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AngularRateUnit {
    /// Degrees per second
    #[default]
    DegreesPerSecond,
    /// Radians per second
    RadiansPerSecond,
}

impl AngularRateUnit {
    /// Factor converting a value in this unit to rad/s
    pub fn to_si(self) -> f64 {
        match self {
            AngularRateUnit::DegreesPerSecond => DEG_TO_RAD,
            AngularRateUnit::RadiansPerSecond => 1.0,
        }
    }
}

/// Units of the inertial channels of a [`SampleSeries`](crate::SampleSeries)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SensorUnits {
    pub acceleration: AccelerationUnit,
    pub angular_rate: AngularRateUnit,
}

impl SensorUnits {
    /// Accelerometer in m/s², gyroscope in rad/s
    pub const SI: SensorUnits = SensorUnits {
        acceleration: AccelerationUnit::MetersPerSecondSquared,
        angular_rate: AngularRateUnit::RadiansPerSecond,
    };
}

/// Band-pass conditioning of the accelerometer and gyroscope channels
///
/// # Example
/// ```
/// use gait_trajectory::ConditioningSettings;
///
/// let settings = ConditioningSettings {
///     low_pass_cutoff: 6.0,   // slower gait, less bandwidth
///     ..Default::default()
/// };
/// assert_eq!(settings.order, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditioningSettings {
    /// High-pass cutoff in Hz, removes bias and slow drift
    pub high_pass_cutoff: f64,
    /// Low-pass cutoff in Hz, removes noise above the gait bandwidth
    pub low_pass_cutoff: f64,
    /// Butterworth order of both stages
    pub order: usize,
}

impl Default for ConditioningSettings {
    fn default() -> Self {
        Self {
            high_pass_cutoff: 0.4,
            low_pass_cutoff: 10.0,
            order: 2,
        }
    }
}

/// Stance detection on the acceleration magnitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StanceSettings {
    /// High-pass cutoff in Hz applied to the magnitude
    pub high_pass_cutoff: f64,
    /// Low-pass cutoff in Hz applied to the rectified magnitude
    pub low_pass_cutoff: f64,
    /// Butterworth order of both stages
    pub order: usize,
    /// Samples whose filtered magnitude falls below this value are stationary
    ///
    /// Expressed in the accelerometer unit of the series. Empirically tuned
    /// for a given sensor and walking speed.
    pub threshold: f64,
}

impl Default for StanceSettings {
    fn default() -> Self {
        Self {
            high_pass_cutoff: 0.4,
            low_pass_cutoff: 1.5,
            order: 1,
            threshold: 0.3,
        }
    }
}

/// Mahony attitude filter settings
///
/// # Example
/// ```
/// use gait_trajectory::AttitudeSettings;
///
/// let settings = AttitudeSettings {
///     convergence_window: 2.0,  // average the first 2 s of stance
///     ..Default::default()
/// };
/// assert_eq!(settings.convergence_iterations, 2000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttitudeSettings {
    /// Proportional gain while the foot is stationary (accelerometer trusted)
    pub stationary_gain: f64,
    /// Proportional gain while the foot moves (gyroscope only)
    pub moving_gain: f64,
    /// Integral gain, disabled in normal operation
    pub integral_gain: f64,
    /// Proportional gain used during the initial convergence
    pub convergence_gain: f64,
    /// Length in seconds of the window averaged to seed the orientation
    ///
    /// Zero uses the first sample alone.
    pub convergence_window: f64,
    /// Number of filter updates run on the averaged acceleration before
    /// the per-sample loop starts
    pub convergence_iterations: usize,
}

impl Default for AttitudeSettings {
    fn default() -> Self {
        Self {
            stationary_gain: 0.5,
            moving_gain: 0.0,
            integral_gain: 0.0,
            convergence_gain: 1.0,
            convergence_window: 0.0,
            convergence_iterations: 2000,
        }
    }
}

/// Complete pipeline configuration
///
/// Every tuned constant of the pipeline lives here so that different
/// hardware or walking speeds can be retuned without code changes.
/// Partial configurations deserialize with the remaining fields defaulted.
///
/// # Example
/// ```
/// use gait_trajectory::TrajectorySettings;
///
/// let settings = TrajectorySettings {
///     sample_rate: 100.0,
///     ..Default::default()
/// };
/// assert!(settings.validate().is_ok());
/// assert!((settings.sample_period() - 0.01).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectorySettings {
    /// Sample rate in Hz
    pub sample_rate: f64,
    pub conditioning: ConditioningSettings,
    pub stance: StanceSettings,
    pub attitude: AttitudeSettings,
}

impl TrajectorySettings {
    /// Sample period in seconds
    pub fn sample_period(&self) -> f64 {
        1.0 / self.sample_rate
    }

    /// Check every parameter before any processing starts
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(Error::invalid(
                "sample_rate",
                self.sample_rate,
                "must be finite and greater than 0",
            ));
        }
        let nyquist = 0.5 * self.sample_rate;

        check_cutoff("conditioning.high_pass_cutoff", self.conditioning.high_pass_cutoff, nyquist)?;
        check_cutoff("conditioning.low_pass_cutoff", self.conditioning.low_pass_cutoff, nyquist)?;
        check_order("conditioning.order", self.conditioning.order)?;

        check_cutoff("stance.high_pass_cutoff", self.stance.high_pass_cutoff, nyquist)?;
        check_cutoff("stance.low_pass_cutoff", self.stance.low_pass_cutoff, nyquist)?;
        check_order("stance.order", self.stance.order)?;
        check_non_negative("stance.threshold", self.stance.threshold)?;

        check_non_negative("attitude.stationary_gain", self.attitude.stationary_gain)?;
        check_non_negative("attitude.moving_gain", self.attitude.moving_gain)?;
        check_non_negative("attitude.integral_gain", self.attitude.integral_gain)?;
        check_non_negative("attitude.convergence_gain", self.attitude.convergence_gain)?;
        check_non_negative("attitude.convergence_window", self.attitude.convergence_window)?;

        Ok(())
    }
}

impl Default for TrajectorySettings {
    fn default() -> Self {
        Self {
            sample_rate: 50.0,
            conditioning: ConditioningSettings::default(),
            stance: StanceSettings::default(),
            attitude: AttitudeSettings::default(),
        }
    }
}

fn check_cutoff(name: &'static str, cutoff: f64, nyquist: f64) -> Result<()> {
    if !(cutoff.is_finite() && cutoff > 0.0) {
        return Err(Error::invalid(name, cutoff, "cutoff frequency must be greater than 0"));
    }
    if cutoff >= nyquist {
        return Err(Error::invalid(name, cutoff, "cutoff frequency must be below Nyquist"));
    }
    Ok(())
}

fn check_order(name: &'static str, order: usize) -> Result<()> {
    if order == 0 {
        return Err(Error::invalid(name, 0.0, "filter order must be at least 1"));
    }
    Ok(())
}

fn check_non_negative(name: &'static str, value: f64) -> Result<()> {
    if !(value.is_finite() && value >= 0.0) {
        return Err(Error::invalid(name, value, "must be finite and non-negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = TrajectorySettings::default();
        assert_eq!(settings.sample_rate, 50.0);
        assert_eq!(settings.conditioning.high_pass_cutoff, 0.4);
        assert_eq!(settings.conditioning.low_pass_cutoff, 10.0);
        assert_eq!(settings.stance.threshold, 0.3);
        assert_eq!(settings.attitude.stationary_gain, 0.5);
        assert_eq!(settings.attitude.moving_gain, 0.0);
        assert_eq!(settings.attitude.convergence_iterations, 2000);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_cutoff() {
        let mut settings = TrajectorySettings::default();
        settings.conditioning.high_pass_cutoff = 0.0;

        match settings.validate() {
            Err(Error::InvalidParameter { name, .. }) => {
                assert_eq!(name, "conditioning.high_pass_cutoff")
            }
            other => panic!("expected invalid parameter, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_cutoff_above_nyquist() {
        let settings = TrajectorySettings {
            sample_rate: 15.0,
            ..Default::default()
        };
        // 10 Hz low-pass is above the 7.5 Hz Nyquist frequency
        assert!(matches!(
            settings.validate(),
            Err(Error::InvalidParameter {
                name: "conditioning.low_pass_cutoff",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_negative_gain() {
        let mut settings = TrajectorySettings::default();
        settings.attitude.stationary_gain = -0.5;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_unit_factors() {
        assert_eq!(AccelerationUnit::G.gravity(), 1.0);
        assert_eq!(AccelerationUnit::G.to_si(), STANDARD_GRAVITY);
        assert_eq!(AccelerationUnit::MetersPerSecondSquared.gravity(), STANDARD_GRAVITY);
        assert!((AngularRateUnit::DegreesPerSecond.to_si() * 180.0 - core::f64::consts::PI).abs() < 1e-12);
        assert_eq!(AngularRateUnit::RadiansPerSecond.to_si(), 1.0);
    }
}
