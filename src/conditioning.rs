//! Band-pass conditioning of the inertial channels

use log::debug;
use nalgebra::Vector3;

use crate::error::Result;
use crate::filter::{Butterworth, FilterKind};
use crate::series::SampleSeries;
use crate::types::ConditioningSettings;

/// Zero-phase high-pass followed by low-pass Butterworth filtering
///
/// The high-pass stage removes sensor bias and slow drift, the low-pass
/// stage removes noise above the gait bandwidth. Both run forward and
/// backward so feature timing is preserved. The same filter pair is applied
/// independently to each accelerometer and gyroscope axis; the magnetometer
/// passes through untouched.
///
/// # Example
/// ```
/// use gait_trajectory::{ConditioningSettings, SignalConditioner};
///
/// let conditioner = SignalConditioner::new(&ConditioningSettings::default(), 50.0).unwrap();
/// let offset = vec![0.8; 200];
/// let filtered = conditioner.filter_channel(&offset).unwrap();
///
/// // A constant offset is removed entirely
/// assert!(filtered.iter().all(|v| v.abs() < 1e-6));
/// ```
#[derive(Debug, Clone)]
pub struct SignalConditioner {
    high_pass: Butterworth,
    low_pass: Butterworth,
}

impl SignalConditioner {
    /// Design both filter stages for a signal sampled at `sample_rate` Hz
    pub fn new(settings: &ConditioningSettings, sample_rate: f64) -> Result<Self> {
        let high_pass = Butterworth::new(
            FilterKind::HighPass,
            settings.order,
            settings.high_pass_cutoff,
            sample_rate,
        )?;
        let low_pass = Butterworth::new(
            FilterKind::LowPass,
            settings.order,
            settings.low_pass_cutoff,
            sample_rate,
        )?;
        Ok(Self {
            high_pass,
            low_pass,
        })
    }

    /// Filter one scalar channel; output has the input's length
    pub fn filter_channel(&self, samples: &[f64]) -> Result<Vec<f64>> {
        let high_passed = self.high_pass.filtfilt(samples)?;
        self.low_pass.filtfilt(&high_passed)
    }

    /// Filter each axis of a tri-axial channel independently
    pub fn filter_axes(&self, samples: &[Vector3<f64>]) -> Result<Vec<Vector3<f64>>> {
        let mut filtered = vec![Vector3::zeros(); samples.len()];
        for axis in 0..3 {
            let component: Vec<f64> = samples.iter().map(|v| v[axis]).collect();
            for (out, value) in filtered.iter_mut().zip(self.filter_channel(&component)?) {
                out[axis] = value;
            }
        }
        Ok(filtered)
    }

    /// Condition the accelerometer and gyroscope channels of a series
    pub fn condition(&self, series: &SampleSeries) -> Result<SampleSeries> {
        let accelerometer = self.filter_axes(series.accelerometer())?;
        let gyroscope = self.filter_axes(series.gyroscope())?;
        debug!("conditioned {} samples on 6 inertial axes", series.len());
        Ok(series.with_inertial(accelerometer, gyroscope))
    }
}
