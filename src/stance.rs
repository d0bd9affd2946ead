//! Stance (stationary foot) detection
//!
//! The acceleration magnitude is high-pass filtered, rectified and low-pass
//! filtered. What remains is an envelope of dynamic motion: short bursts
//! during swing, near zero while the foot rests on the ground. Samples whose
//! envelope falls below a threshold are flagged stationary.

use core::ops::Index;

use log::debug;
use nalgebra::Vector3;

use crate::error::Result;
use crate::filter::{Butterworth, FilterKind};
use crate::types::StanceSettings;

/// Per-sample stationary flags
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StationaryMask(Vec<bool>);

/// Half-open range `[start, end)` of moving samples between two stances
///
/// `start - 1` is the zero-velocity sample anchoring the interval and `end`
/// is the first stationary sample after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StanceInterval {
    pub start: usize,
    pub end: usize,
}

impl StanceInterval {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl StationaryMask {
    pub fn new(flags: Vec<bool>) -> Self {
        Self(flags)
    }

    /// Flag samples whose value lies strictly below `threshold`
    pub fn from_threshold(signal: &[f64], threshold: f64) -> Self {
        Self(signal.iter().map(|&v| v < threshold).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().copied()
    }

    pub fn stationary_count(&self) -> usize {
        self.0.iter().filter(|&&s| s).count()
    }

    /// Indices where the stance state differs from the previous sample
    pub fn transitions(&self) -> Vec<usize> {
        self.0
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| pair[0] != pair[1])
            .map(|(index, _)| index + 1)
            .collect()
    }

    /// Moving intervals closed by a stance on both sides
    ///
    /// The series start acts as a stance because velocity starts at zero, so
    /// a series that begins in motion yields an interval starting at index 1.
    /// Motion still in progress at the end of the series has no closing
    /// stance and is not returned; see [`trailing_motion`](Self::trailing_motion).
    pub fn moving_intervals(&self) -> Vec<StanceInterval> {
        let mut intervals = Vec::new();
        let mut start: Option<usize> = None;

        for (index, stationary) in self.iter().enumerate() {
            match (stationary, start) {
                (false, None) => start = Some(index.max(1)),
                (true, Some(s)) => {
                    if index > s {
                        intervals.push(StanceInterval { start: s, end: index });
                    }
                    start = None;
                }
                _ => {}
            }
        }
        intervals
    }

    /// Start of a final moving segment that never returns to stance
    pub fn trailing_motion(&self) -> Option<usize> {
        let last_stationary = self.0.iter().rposition(|&s| s);
        let start = match last_stationary {
            Some(index) => index + 1,
            None => 1,
        };
        (start < self.len()).then_some(start)
    }
}

impl From<Vec<bool>> for StationaryMask {
    fn from(flags: Vec<bool>) -> Self {
        Self(flags)
    }
}

impl Index<usize> for StationaryMask {
    type Output = bool;

    fn index(&self, index: usize) -> &bool {
        &self.0[index]
    }
}

/// Output of [`StanceDetector::detect`]
#[derive(Debug, Clone, PartialEq)]
pub struct StanceDetection {
    /// Filtered acceleration-magnitude envelope that was thresholded
    pub signal: Vec<f64>,
    pub mask: StationaryMask,
}

/// Threshold detector on the filtered acceleration magnitude
#[derive(Debug, Clone)]
pub struct StanceDetector {
    high_pass: Butterworth,
    low_pass: Butterworth,
    threshold: f64,
}

impl StanceDetector {
    pub fn new(settings: &StanceSettings, sample_rate: f64) -> Result<Self> {
        Ok(Self {
            high_pass: Butterworth::new(
                FilterKind::HighPass,
                settings.order,
                settings.high_pass_cutoff,
                sample_rate,
            )?,
            low_pass: Butterworth::new(
                FilterKind::LowPass,
                settings.order,
                settings.low_pass_cutoff,
                sample_rate,
            )?,
            threshold: settings.threshold,
        })
    }

    /// Motion envelope of the acceleration magnitude
    pub fn envelope(&self, accelerometer: &[Vector3<f64>]) -> Result<Vec<f64>> {
        let magnitude: Vec<f64> = accelerometer.iter().map(|a| a.magnitude()).collect();

        let high_passed = self
            .high_pass
            .filtfilt_padded(&magnitude, edge_padding(&self.high_pass))?;
        let rectified: Vec<f64> = high_passed.iter().map(|v| v.abs()).collect();
        self.low_pass
            .filtfilt_padded(&rectified, edge_padding(&self.low_pass))
    }

    /// Compute the envelope and flag stationary samples
    pub fn detect(&self, accelerometer: &[Vector3<f64>]) -> Result<StanceDetection> {
        let signal = self.envelope(accelerometer)?;
        let mask = StationaryMask::from_threshold(&signal, self.threshold);

        debug!(
            "stance detection: {} of {} samples stationary, {} moving intervals",
            mask.stationary_count(),
            mask.len(),
            mask.moving_intervals().len()
        );

        Ok(StanceDetection { signal, mask })
    }
}

/// Edge padding of three times the filter order
fn edge_padding(filter: &Butterworth) -> usize {
    3 * (filter.b().len().max(filter.a().len()) - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::PI;

    fn mask(pattern: &str) -> StationaryMask {
        pattern.chars().map(|c| c == 'S').collect::<Vec<_>>().into()
    }

    #[test]
    fn test_intervals_between_stances() {
        let intervals = mask("SSMMMSSMMS").moving_intervals();
        assert_eq!(
            intervals,
            vec![
                StanceInterval { start: 2, end: 5 },
                StanceInterval { start: 7, end: 9 },
            ]
        );
        assert_eq!(intervals[0].len(), 3);
    }

    #[test]
    fn test_transitions() {
        assert_eq!(mask("SSMMMSSMMS").transitions(), vec![2, 5, 7, 9]);
        assert_eq!(mask("MMSS").transitions(), vec![2]);
        assert!(mask("SSSS").transitions().is_empty());
        assert!(StationaryMask::default().transitions().is_empty());
    }

    #[test]
    fn test_leading_motion_anchored_at_start() {
        let intervals = mask("MMMSS").moving_intervals();
        assert_eq!(intervals, vec![StanceInterval { start: 1, end: 3 }]);

        // A single moving first sample has nothing to correct
        assert!(mask("MSSS").moving_intervals().is_empty());
    }

    #[test]
    fn test_trailing_motion_left_open() {
        let m = mask("SSMMSMMM");
        assert_eq!(m.moving_intervals(), vec![StanceInterval { start: 2, end: 4 }]);
        assert_eq!(m.trailing_motion(), Some(5));

        assert_eq!(mask("SSMS").trailing_motion(), None);
        assert_eq!(mask("MMMM").trailing_motion(), Some(1));
        assert_eq!(mask("M").trailing_motion(), None);
    }

    #[test]
    fn test_degenerate_masks() {
        assert!(mask("SSSS").moving_intervals().is_empty());
        assert!(mask("MMMM").moving_intervals().is_empty());
        assert!(StationaryMask::default().moving_intervals().is_empty());
        assert_eq!(StationaryMask::default().trailing_motion(), None);
    }

    #[test]
    fn test_threshold_is_strict() {
        let m = StationaryMask::from_threshold(&[0.1, 0.3, 0.29, 0.5], 0.3);
        assert_eq!(m.as_slice(), &[true, false, true, false]);
        assert_eq!(m.stationary_count(), 2);
        assert!(m[0]);
    }

    #[test]
    fn test_zero_and_constant_acceleration_stationary() {
        let detector = StanceDetector::new(&StanceSettings::default(), 50.0).unwrap();

        let zeros = vec![Vector3::zeros(); 200];
        let detection = detector.detect(&zeros).unwrap();
        assert!(detection.mask.iter().all(|s| s));
        assert!(detection.signal.iter().all(|v| *v == 0.0));

        let gravity = vec![Vector3::new(0.0, 0.0, 1.0); 200];
        assert!(detector.detect(&gravity).unwrap().mask.iter().all(|s| s));
    }

    #[test]
    fn test_motion_burst_detected() {
        let detector = StanceDetector::new(&StanceSettings::default(), 50.0).unwrap();

        // 2 s rest, 2 s of 1.5 Hz swing at 2 g amplitude, 2 s rest
        let accelerometer: Vec<Vector3<f64>> = (0..300)
            .map(|i| {
                let t = i as f64 / 50.0;
                if (2.0..4.0).contains(&t) {
                    Vector3::new(2.0 * (2.0 * PI * 1.5 * t).sin(), 0.0, 1.0)
                } else {
                    Vector3::new(0.0, 0.0, 1.0)
                }
            })
            .collect();

        let detection = detector.detect(&accelerometer).unwrap();
        assert!(detection.mask.as_slice()[..50].iter().all(|&s| s));
        assert!(detection.mask.as_slice()[125..175].iter().all(|&s| !s));
        assert!(detection.mask.as_slice()[260..].iter().all(|&s| s));
        assert_eq!(detection.mask.moving_intervals().len(), 1);
    }
}
