//! Linear velocity drift removal between stances
//!
//! Integrated velocity accumulates error during every swing phase. Because
//! the true velocity is zero again at the next foot contact, whatever the
//! integrator reports on the last moving sample is drift. That residual is
//! spread linearly over the interval, from zero at the anchor stance to the
//! full residual at the last moving sample.

use log::{debug, warn};
use nalgebra::Vector3;

use crate::error::{Error, Result};
use crate::stance::{StanceInterval, StationaryMask};

/// Remove linear drift from each moving interval of a ZUPT velocity series
///
/// For an interval `[s, e)` of length `L` with residual `r = v[e - 1]`, the
/// corrected velocity is `v[s + k] - r * (k + 1) / L`, so the last moving
/// sample lands exactly on zero. Motion that is still in progress at the end
/// of the series is left uncorrected.
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use gait_trajectory::{StationaryMask, drift::correct_drift};
///
/// let mask = StationaryMask::new(vec![true, false, false, true]);
/// let velocity = vec![
///     Vector3::zeros(),
///     Vector3::new(1.0, 0.0, 0.0),
///     Vector3::new(2.0, 0.0, 0.0),
///     Vector3::zeros(),
/// ];
///
/// let corrected = correct_drift(&velocity, &mask).unwrap();
/// assert_eq!(corrected[1], Vector3::zeros());
/// assert_eq!(corrected[2], Vector3::zeros());
/// ```
pub fn correct_drift(
    velocity: &[Vector3<f64>],
    stationary: &StationaryMask,
) -> Result<Vec<Vector3<f64>>> {
    Error::ensure_len("stationary mask", velocity.len(), stationary.len())?;

    let mut corrected = velocity.to_vec();
    let intervals = stationary.moving_intervals();
    for interval in &intervals {
        remove_ramp(&mut corrected, interval);
    }

    if let Some(start) = stationary.trailing_motion() {
        warn!(
            "motion from sample {} to the end of the series has no closing stance; drift left uncorrected",
            start
        );
    }
    debug!("drift removed from {} moving intervals", intervals.len());

    Ok(corrected)
}

fn remove_ramp(velocity: &mut [Vector3<f64>], interval: &StanceInterval) {
    if interval.is_empty() {
        return;
    }
    let length = interval.len() as f64;
    let residual = velocity[interval.end - 1];
    for (k, v) in velocity[interval.start..interval.end].iter_mut().enumerate() {
        *v -= residual * ((k + 1) as f64 / length);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(values: &[f64]) -> Vec<Vector3<f64>> {
        values.iter().map(|&x| Vector3::new(x, -2.0 * x, 0.5 * x)).collect()
    }

    #[test]
    fn test_interval_ends_at_zero() {
        let mask: StationaryMask = vec![true, true, false, false, false, false, true].into();
        let velocity = ramp(&[0.0, 0.0, 1.0, 3.0, 4.0, 2.0, 0.0]);

        let corrected = correct_drift(&velocity, &mask).unwrap();

        assert!(corrected[5].magnitude() < 1e-12);
        // Residual 2.0 spread over four samples
        assert!((corrected[2].x - 0.5).abs() < 1e-12);
        assert!((corrected[3].x - 2.0).abs() < 1e-12);
        assert!((corrected[4].x - 2.5).abs() < 1e-12);
        assert!((corrected[3].y + 4.0).abs() < 1e-12);

        // Stationary samples untouched
        assert_eq!(corrected[0], Vector3::zeros());
        assert_eq!(corrected[6], Vector3::zeros());
    }

    #[test]
    fn test_every_closed_interval_corrected() {
        let mask: StationaryMask = vec![true, false, false, true, false, false, false, true].into();
        let velocity = ramp(&[0.0, 1.0, 1.0, 0.0, 3.0, 6.0, 9.0, 0.0]);

        let corrected = correct_drift(&velocity, &mask).unwrap();
        for interval in mask.moving_intervals() {
            assert!(corrected[interval.end - 1].magnitude() < 1e-12);
        }
        // Constant drift slope cancelled exactly
        assert!(corrected[4..7].iter().all(|v| v.magnitude() < 1e-12));
    }

    #[test]
    fn test_leading_motion_anchored_at_first_sample() {
        let mask: StationaryMask = vec![false, false, false, true].into();
        let velocity = ramp(&[0.0, 2.0, 4.0, 0.0]);

        let corrected = correct_drift(&velocity, &mask).unwrap();
        assert_eq!(corrected[0], Vector3::zeros());
        assert!(corrected[1].magnitude() < 1e-12);
        assert!(corrected[2].magnitude() < 1e-12);
    }

    #[test]
    fn test_trailing_motion_uncorrected() {
        let mask: StationaryMask = vec![true, false, false].into();
        let velocity = ramp(&[0.0, 1.0, 2.0]);
        assert_eq!(correct_drift(&velocity, &mask).unwrap(), velocity);
    }

    #[test]
    fn test_no_intervals_returns_input() {
        let velocity = ramp(&[0.0, 0.0, 0.0]);
        let stationary = StationaryMask::new(vec![true; 3]);
        assert_eq!(correct_drift(&velocity, &stationary).unwrap(), velocity);

        let moving = ramp(&[0.0, 1.0, 2.0]);
        assert_eq!(
            correct_drift(&moving, &StationaryMask::new(vec![false; 3])).unwrap(),
            moving
        );
    }

    #[test]
    fn test_mask_length_checked() {
        let result = correct_drift(&ramp(&[0.0, 1.0]), &StationaryMask::new(vec![true]));
        assert!(matches!(
            result,
            Err(Error::DimensionMismatch { expected: 2, found: 1, .. })
        ));
    }
}
