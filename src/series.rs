//! Time-stamped inertial recordings

use log::debug;
use nalgebra::Vector3;

use crate::axes::AxesAlignment;
use crate::calibration::InertialCalibration;
use crate::error::{Error, Result};
use crate::math::median;
use crate::types::SensorUnits;

/// Largest ratio of resampled to original length accepted by [`SampleSeries::resample`]
pub const MAX_RESAMPLE_EXPANSION: f64 = 100.0;

/// A recording of N samples from one foot-mounted IMU
///
/// All channels share the same length and the timestamps (seconds) are
/// finite and strictly increasing. Both invariants are checked on
/// construction, so every stage downstream can index channels in lockstep.
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use gait_trajectory::{SampleSeries, SensorUnits};
///
/// let accelerometer = vec![Vector3::new(0.0, 0.0, 1.0); 100];
/// let gyroscope = vec![Vector3::zeros(); 100];
///
/// let series = SampleSeries::from_sample_rate(50.0, accelerometer, gyroscope, SensorUnits::default())
///     .unwrap();
/// assert_eq!(series.len(), 100);
/// assert!((series.sample_rate().unwrap() - 50.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSeries {
    timestamps: Vec<f64>,
    accelerometer: Vec<Vector3<f64>>,
    gyroscope: Vec<Vector3<f64>>,
    magnetometer: Option<Vec<Vector3<f64>>>,
    units: SensorUnits,
}

impl SampleSeries {
    /// Create a series from explicit timestamps in seconds
    pub fn new(
        timestamps: Vec<f64>,
        accelerometer: Vec<Vector3<f64>>,
        gyroscope: Vec<Vector3<f64>>,
        units: SensorUnits,
    ) -> Result<Self> {
        if timestamps.is_empty() {
            return Err(Error::EmptySeries);
        }
        Error::ensure_len("accelerometer", timestamps.len(), accelerometer.len())?;
        Error::ensure_len("gyroscope", timestamps.len(), gyroscope.len())?;

        if let Some(index) = timestamps.iter().position(|t| !t.is_finite()) {
            return Err(Error::NonIncreasingTimestamps { index });
        }
        if let Some(index) = timestamps.windows(2).position(|w| w[1] <= w[0]) {
            return Err(Error::NonIncreasingTimestamps { index: index + 1 });
        }

        Ok(Self {
            timestamps,
            accelerometer,
            gyroscope,
            magnetometer: None,
            units,
        })
    }

    /// Create a series sampled at a fixed rate, starting at t = 0
    pub fn from_sample_rate(
        sample_rate: f64,
        accelerometer: Vec<Vector3<f64>>,
        gyroscope: Vec<Vector3<f64>>,
        units: SensorUnits,
    ) -> Result<Self> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(Error::invalid(
                "sample_rate",
                sample_rate,
                "must be finite and greater than 0",
            ));
        }
        let timestamps = (0..accelerometer.len())
            .map(|i| i as f64 / sample_rate)
            .collect();
        Self::new(timestamps, accelerometer, gyroscope, units)
    }

    /// Attach a magnetometer channel of the same length
    ///
    /// The magnetometer is carried through resampling and alignment but is
    /// not used by the trajectory pipeline.
    pub fn with_magnetometer(mut self, magnetometer: Vec<Vector3<f64>>) -> Result<Self> {
        Error::ensure_len("magnetometer", self.len(), magnetometer.len())?;
        self.magnetometer = Some(magnetometer);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    pub fn accelerometer(&self) -> &[Vector3<f64>] {
        &self.accelerometer
    }

    pub fn gyroscope(&self) -> &[Vector3<f64>] {
        &self.gyroscope
    }

    pub fn magnetometer(&self) -> Option<&[Vector3<f64>]> {
        self.magnetometer.as_deref()
    }

    pub fn units(&self) -> SensorUnits {
        self.units
    }

    /// Time between the first and last sample in seconds
    pub fn duration(&self) -> f64 {
        self.timestamps[self.len() - 1] - self.timestamps[0]
    }

    /// Sample rate estimated from the median timestamp spacing
    ///
    /// Returns `None` for a single-sample series.
    pub fn sample_rate(&self) -> Option<f64> {
        let spacing: Vec<f64> = self.timestamps.windows(2).map(|w| w[1] - w[0]).collect();
        median(&spacing).map(|period| 1.0 / period)
    }

    /// Linearly interpolate every channel onto a uniform grid at `sample_rate` Hz
    ///
    /// The grid starts at the first timestamp and never extends past the last.
    /// A rate that would produce more than [`MAX_RESAMPLE_EXPANSION`] times the
    /// original number of samples is rejected.
    pub fn resample(&self, sample_rate: f64) -> Result<Self> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(Error::invalid(
                "sample_rate",
                sample_rate,
                "must be finite and greater than 0",
            ));
        }

        let count = (self.duration() * sample_rate + 1e-9).floor() + 1.0;
        if count > MAX_RESAMPLE_EXPANSION * self.len() as f64 {
            return Err(Error::invalid(
                "sample_rate",
                sample_rate,
                "would expand the series more than 100 times",
            ));
        }
        let count = count as usize;

        let start = self.timestamps[0];
        let grid: Vec<f64> = (0..count)
            .map(|i| start + i as f64 / sample_rate)
            .collect();

        debug!(
            "resampling {} samples to {} at {:.3} Hz",
            self.len(),
            count,
            sample_rate
        );

        let accelerometer = interpolate(&self.timestamps, &self.accelerometer, &grid);
        let gyroscope = interpolate(&self.timestamps, &self.gyroscope, &grid);
        let magnetometer = self
            .magnetometer
            .as_ref()
            .map(|channel| interpolate(&self.timestamps, channel, &grid));

        Ok(Self {
            timestamps: grid,
            accelerometer,
            gyroscope,
            magnetometer,
            units: self.units,
        })
    }

    /// Remap sensor axes onto body axes for every channel
    pub fn aligned(&self, alignment: AxesAlignment) -> Self {
        let remap = |channel: &[Vector3<f64>]| -> Vec<Vector3<f64>> {
            channel.iter().map(|v| alignment.apply(*v)).collect()
        };
        Self {
            timestamps: self.timestamps.clone(),
            accelerometer: remap(&self.accelerometer),
            gyroscope: remap(&self.gyroscope),
            magnetometer: self.magnetometer.as_deref().map(remap),
            units: self.units,
        }
    }

    /// Apply inertial calibration to the accelerometer and gyroscope channels
    pub fn calibrated(
        &self,
        accelerometer: &InertialCalibration,
        gyroscope: &InertialCalibration,
    ) -> Self {
        self.with_inertial(
            self.accelerometer.iter().map(|v| accelerometer.apply(*v)).collect(),
            self.gyroscope.iter().map(|v| gyroscope.apply(*v)).collect(),
        )
    }

    /// Same timestamps and magnetometer with replaced inertial channels
    pub(crate) fn with_inertial(
        &self,
        accelerometer: Vec<Vector3<f64>>,
        gyroscope: Vec<Vector3<f64>>,
    ) -> Self {
        debug_assert_eq!(accelerometer.len(), self.len());
        debug_assert_eq!(gyroscope.len(), self.len());
        Self {
            timestamps: self.timestamps.clone(),
            accelerometer,
            gyroscope,
            magnetometer: self.magnetometer.clone(),
            units: self.units,
        }
    }
}

/// Piecewise-linear interpolation of `values` sampled at `times` onto `grid`
///
/// `times` is strictly increasing and `grid` is non-decreasing; grid points
/// outside `times` clamp to the end samples.
fn interpolate(times: &[f64], values: &[Vector3<f64>], grid: &[f64]) -> Vec<Vector3<f64>> {
    let mut segment = 0;
    grid.iter()
        .map(|&t| {
            while segment + 1 < times.len() - 1 && times[segment + 1] < t {
                segment += 1;
            }
            if times.len() == 1 || t <= times[0] {
                return values[0];
            }
            let (t0, t1) = (times[segment], times[segment + 1]);
            if t >= t1 {
                return values[segment + 1];
            }
            let fraction = (t - t0) / (t1 - t0);
            values[segment] + (values[segment + 1] - values[segment]) * fraction
        })
        .collect()
}
