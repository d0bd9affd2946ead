//! End-to-end trajectory estimation
//!
//! [`TrajectoryAnalyzer`] chains the processing stages: band-pass
//! conditioning, stance detection, Mahony attitude estimation, rotation into
//! the Earth frame, ZUPT velocity integration, drift removal and position
//! integration.

use log::{debug, info, warn};
use nalgebra::{UnitQuaternion, Vector3};

use crate::attitude::estimate_orientation;
use crate::conditioning::SignalConditioner;
use crate::drift::correct_drift;
use crate::error::{Error, Result};
use crate::kinematics::{KinematicSeries, earth_acceleration, integrate_position, integrate_velocity};
use crate::math::QuaternionExt;
use crate::series::SampleSeries;
use crate::stance::{StanceDetector, StationaryMask};
use crate::types::TrajectorySettings;

/// Relative difference between configured and measured sample rate that is logged
const SAMPLE_RATE_TOLERANCE: f64 = 0.01;

/// Everything produced by one analysis run
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryEstimate {
    /// Series after conditioning (the input itself when conditioning was skipped)
    pub conditioned: SampleSeries,
    /// Motion envelope used for stance detection, `None` when the mask was supplied
    pub stance_signal: Option<Vec<f64>>,
    pub stationary: StationaryMask,
    /// Body-to-Earth orientation per sample
    pub orientation: Vec<UnitQuaternion<f64>>,
    /// Velocity after zero-velocity updates, before drift removal
    pub uncorrected_velocity: Vec<Vector3<f64>>,
    pub kinematics: KinematicSeries,
}

impl TrajectoryEstimate {
    pub fn len(&self) -> usize {
        self.kinematics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinematics.is_empty()
    }

    pub fn position(&self) -> &[Vector3<f64>] {
        &self.kinematics.position
    }

    pub fn velocity(&self) -> &[Vector3<f64>] {
        &self.kinematics.velocity
    }

    /// Straight-line offset between the first and last position
    pub fn displacement(&self) -> Vector3<f64> {
        match (self.position().first(), self.position().last()) {
            (Some(first), Some(last)) => last - first,
            _ => Vector3::zeros(),
        }
    }

    /// Distance travelled along the estimated path
    pub fn path_length(&self) -> f64 {
        self.position()
            .windows(2)
            .map(|w| (w[1] - w[0]).magnitude())
            .sum()
    }

    /// Number of moving intervals closed by a foot contact
    pub fn stride_count(&self) -> usize {
        self.stationary.moving_intervals().len()
    }

    /// Roll, pitch and yaw of every sample in degrees
    pub fn euler_angles_degrees(&self) -> Vec<Vector3<f64>> {
        self.orientation.iter().map(|q| q.to_euler_degrees()).collect()
    }
}

/// Configured trajectory pipeline
///
/// Settings are validated and filters designed once on construction; the
/// analyzer can then process any number of recordings.
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use gait_trajectory::{SampleSeries, SensorUnits, TrajectoryAnalyzer, TrajectorySettings};
///
/// let analyzer = TrajectoryAnalyzer::new(TrajectorySettings::default()).unwrap();
///
/// // Ten seconds standing still
/// let series = SampleSeries::from_sample_rate(
///     50.0,
///     vec![Vector3::new(0.0, 0.0, 1.0); 500],
///     vec![Vector3::zeros(); 500],
///     SensorUnits::default(),
/// ).unwrap();
///
/// let estimate = analyzer.analyze(&series).unwrap();
/// assert_eq!(estimate.stride_count(), 0);
/// assert!(estimate.displacement().magnitude() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct TrajectoryAnalyzer {
    settings: TrajectorySettings,
    conditioner: SignalConditioner,
    detector: StanceDetector,
}

impl TrajectoryAnalyzer {
    pub fn new(settings: TrajectorySettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            conditioner: SignalConditioner::new(&settings.conditioning, settings.sample_rate)?,
            detector: StanceDetector::new(&settings.stance, settings.sample_rate)?,
            settings,
        })
    }

    pub fn settings(&self) -> &TrajectorySettings {
        &self.settings
    }

    /// Run the full pipeline on a raw recording
    pub fn analyze(&self, series: &SampleSeries) -> Result<TrajectoryEstimate> {
        self.check_sample_rate(series);
        info!("analyzing {} samples ({:.2} s)", series.len(), series.duration());

        let conditioned = self.conditioner.condition(series)?;
        info!(
            "conditioned with {:.2}-{:.2} Hz band-pass",
            self.settings.conditioning.high_pass_cutoff, self.settings.conditioning.low_pass_cutoff
        );

        self.analyze_conditioned(conditioned)
    }

    /// Run the pipeline on a series that is already filtered
    pub fn analyze_conditioned(&self, series: SampleSeries) -> Result<TrajectoryEstimate> {
        let detection = self.detector.detect(series.accelerometer())?;
        info!(
            "stance detected: {:.1}% stationary",
            stationary_percent(&detection.mask)
        );

        self.integrate(series, Some(detection.signal), detection.mask)
    }

    /// Run attitude estimation and integration with externally supplied stance flags
    ///
    /// No filtering is applied, so the series should already be clean.
    pub fn analyze_with_stance(
        &self,
        series: SampleSeries,
        stationary: StationaryMask,
    ) -> Result<TrajectoryEstimate> {
        Error::ensure_len("stationary mask", series.len(), stationary.len())?;
        self.check_sample_rate(&series);
        self.integrate(series, None, stationary)
    }

    fn integrate(
        &self,
        series: SampleSeries,
        stance_signal: Option<Vec<f64>>,
        stationary: StationaryMask,
    ) -> Result<TrajectoryEstimate> {
        let units = series.units();
        let sample_period = self.settings.sample_period();

        let orientation = estimate_orientation(
            &self.settings.attitude,
            self.settings.sample_rate,
            series.gyroscope(),
            series.accelerometer(),
            &stationary,
            units.angular_rate,
        )?;
        info!("orientation estimated for {} samples", orientation.len());

        let acceleration = earth_acceleration(&orientation, series.accelerometer(), units.acceleration)?;
        let uncorrected_velocity = integrate_velocity(&acceleration, sample_period, &stationary)?;
        let velocity = correct_drift(&uncorrected_velocity, &stationary)?;
        let position = integrate_position(&velocity, sample_period)?;

        let estimate = TrajectoryEstimate {
            conditioned: series,
            stance_signal,
            stationary,
            orientation,
            uncorrected_velocity,
            kinematics: KinematicSeries {
                acceleration,
                velocity,
                position,
            },
        };

        let displacement = estimate.displacement();
        info!(
            "trajectory complete: {} strides, displacement ({:.3}, {:.3}, {:.3}) m, path {:.3} m",
            estimate.stride_count(),
            displacement.x,
            displacement.y,
            displacement.z,
            estimate.path_length()
        );

        Ok(estimate)
    }

    fn check_sample_rate(&self, series: &SampleSeries) {
        let Some(measured) = series.sample_rate() else {
            return;
        };
        let configured = self.settings.sample_rate;
        if ((measured - configured) / configured).abs() > SAMPLE_RATE_TOLERANCE {
            warn!(
                "timestamps suggest {:.3} Hz but the pipeline is configured for {:.3} Hz; resample the series first",
                measured, configured
            );
        } else {
            debug!("measured sample rate {:.3} Hz", measured);
        }
    }
}

fn stationary_percent(mask: &StationaryMask) -> f64 {
    if mask.is_empty() {
        return 0.0;
    }
    100.0 * mask.stationary_count() as f64 / mask.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccelerationUnit, AngularRateUnit, SensorUnits};

    fn si_series(accelerometer: Vec<Vector3<f64>>) -> SampleSeries {
        let len = accelerometer.len();
        SampleSeries::from_sample_rate(50.0, accelerometer, vec![Vector3::zeros(); len], SensorUnits::SI)
            .unwrap()
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = TrajectorySettings {
            sample_rate: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            TrajectoryAnalyzer::new(settings),
            Err(Error::InvalidParameter { name: "sample_rate", .. })
        ));
    }

    #[test]
    fn test_supplied_mask_length_checked() {
        let analyzer = TrajectoryAnalyzer::new(TrajectorySettings::default()).unwrap();
        let series = si_series(vec![Vector3::new(0.0, 0.0, 9.80665); 20]);
        let result = analyzer.analyze_with_stance(series, StationaryMask::new(vec![true; 19]));
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn test_reporting_helpers() {
        let analyzer = TrajectoryAnalyzer::new(TrajectorySettings::default()).unwrap();

        // Level sensor pushed along X for one second between two stances
        let mut accelerometer = vec![Vector3::new(0.0, 0.0, 9.80665); 100];
        let mut mask = vec![true; 100];
        for (index, a) in accelerometer.iter_mut().enumerate().take(75).skip(25) {
            a.x = if index < 50 { 1.0 } else { -1.0 };
            mask[index] = false;
        }

        let estimate = analyzer
            .analyze_with_stance(si_series(accelerometer), mask.into())
            .unwrap();

        assert_eq!(estimate.len(), 100);
        assert!(estimate.stance_signal.is_none());
        assert_eq!(estimate.stride_count(), 1);
        assert!((estimate.displacement().x - 0.25).abs() < 0.02, "{:?}", estimate.displacement());
        assert!((estimate.path_length() - estimate.displacement().magnitude()).abs() < 1e-9);
        assert!(estimate.euler_angles_degrees().iter().all(|e| e.magnitude() < 1e-9));
        assert_eq!(estimate.conditioned.units().acceleration, AccelerationUnit::MetersPerSecondSquared);
        assert_eq!(estimate.conditioned.units().angular_rate, AngularRateUnit::RadiansPerSecond);
    }
}
