//! Error type shared by every processing stage

use thiserror::Error;

/// Errors reported by the trajectory pipeline and its stages
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A configuration value is outside its valid range
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Two channels that must be sample-aligned have different lengths
    #[error("dimension mismatch on `{channel}`: expected {expected} samples, found {found}")]
    DimensionMismatch {
        channel: &'static str,
        expected: usize,
        found: usize,
    },

    /// The series holds no samples
    #[error("sample series is empty")]
    EmptySeries,

    /// Zero-phase filtering needs more samples than the edge padding
    #[error("series of {len} samples is too short, at least {required} are required")]
    SeriesTooShort { len: usize, required: usize },

    /// Timestamps must be finite and strictly increasing
    #[error("timestamp at index {index} is not strictly increasing")]
    NonIncreasingTimestamps { index: usize },

    /// Axis alignment uses the same sensor axis more than once
    #[error("axes alignment maps sensor axis {axis} to more than one body axis")]
    DegenerateAlignment { axis: char },

    /// Filter initial conditions could not be solved
    #[error("filter design failed: {0}")]
    FilterDesign(&'static str),
}

/// Result alias used throughout the crate
pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        Error::InvalidParameter {
            name,
            value,
            reason,
        }
    }

    pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<()> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(Error::invalid(name, value, "must be finite and greater than 0"))
        }
    }

    pub(crate) fn ensure_len(channel: &'static str, expected: usize, found: usize) -> Result<()> {
        if expected == found {
            Ok(())
        } else {
            Err(Error::DimensionMismatch {
                channel,
                expected,
                found,
            })
        }
    }
}
