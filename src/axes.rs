//! Sensor-to-body axes alignment
//!
//! Recordings do not always store the IMU axes in the body frame expected by
//! the pipeline (X forward, Y left, Z up). An [`AxesAlignment`] names, for
//! each body axis, the signed sensor axis it is read from.
//!
//! # Example
//! ```
//! use nalgebra::Vector3;
//! use gait_trajectory::{AxesAlignment, SensorAxis};
//!
//! // Sensor mounted with its Y axis pointing up
//! let alignment: AxesAlignment = "+x+z+y".parse().unwrap();
//! assert_eq!(
//!     alignment,
//!     AxesAlignment::new(SensorAxis::PositiveX, SensorAxis::PositiveZ, SensorAxis::PositiveY).unwrap()
//! );
//!
//! let body = alignment.apply(Vector3::new(0.1, 1.0, 0.2));
//! assert_eq!(body, Vector3::new(0.1, 0.2, 1.0));
//! assert!(!alignment.is_proper_rotation());
//! ```

use core::fmt;
use core::str::FromStr;

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A signed sensor axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorAxis {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl SensorAxis {
    fn index(self) -> usize {
        match self {
            SensorAxis::PositiveX | SensorAxis::NegativeX => 0,
            SensorAxis::PositiveY | SensorAxis::NegativeY => 1,
            SensorAxis::PositiveZ | SensorAxis::NegativeZ => 2,
        }
    }

    fn sign(self) -> f64 {
        match self {
            SensorAxis::PositiveX | SensorAxis::PositiveY | SensorAxis::PositiveZ => 1.0,
            _ => -1.0,
        }
    }

    fn name(self) -> char {
        ['x', 'y', 'z'][self.index()]
    }

    /// Signed component of a sensor reading along this axis
    pub fn select(self, sensor: &Vector3<f64>) -> f64 {
        self.sign() * sensor[self.index()]
    }
}

/// Signed permutation mapping sensor axes onto body axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxesAlignment {
    x: SensorAxis,
    y: SensorAxis,
    z: SensorAxis,
}

impl AxesAlignment {
    /// Sensor axes already match body axes
    pub const IDENTITY: AxesAlignment = AxesAlignment {
        x: SensorAxis::PositiveX,
        y: SensorAxis::PositiveY,
        z: SensorAxis::PositiveZ,
    };

    /// Create an alignment from the sensor axes feeding body X, Y and Z
    ///
    /// Fails if a sensor axis is used more than once.
    pub fn new(x: SensorAxis, y: SensorAxis, z: SensorAxis) -> Result<Self> {
        let mut used = [false; 3];
        for axis in [x, y, z] {
            if used[axis.index()] {
                return Err(Error::DegenerateAlignment { axis: axis.name() });
            }
            used[axis.index()] = true;
        }
        Ok(Self { x, y, z })
    }

    /// Remap one sensor reading into the body frame
    pub fn apply(&self, sensor: Vector3<f64>) -> Vector3<f64> {
        Vector3::new(
            self.x.select(&sensor),
            self.y.select(&sensor),
            self.z.select(&sensor),
        )
    }

    /// Matrix `M` with `body = M * sensor`
    pub fn matrix(&self) -> Matrix3<f64> {
        let mut matrix = Matrix3::zeros();
        for (row, axis) in [self.x, self.y, self.z].into_iter().enumerate() {
            matrix[(row, axis.index())] = axis.sign();
        }
        matrix
    }

    /// Whether the remapping preserves handedness
    ///
    /// A mirrored alignment (determinant -1) is accepted, since some
    /// loggers store channels in a left-handed order, but rotations derived
    /// from such data are mirrored too.
    pub fn is_proper_rotation(&self) -> bool {
        self.matrix().determinant() > 0.0
    }
}

impl Default for AxesAlignment {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl FromStr for AxesAlignment {
    type Err = Error;

    /// Parse three signed axes such as `"+x-z+y"` (case-insensitive)
    fn from_str(s: &str) -> Result<Self> {
        let chars: Vec<char> = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if chars.len() != 6 {
            return Err(Error::invalid(
                "axes_alignment",
                chars.len() as f64,
                "expected three signed axes such as +x-z+y",
            ));
        }

        let mut axes = [SensorAxis::PositiveX; 3];
        for (slot, pair) in axes.iter_mut().zip(chars.chunks(2)) {
            *slot = match (pair[0], pair[1]) {
                ('+', 'x') => SensorAxis::PositiveX,
                ('-', 'x') => SensorAxis::NegativeX,
                ('+', 'y') => SensorAxis::PositiveY,
                ('-', 'y') => SensorAxis::NegativeY,
                ('+', 'z') => SensorAxis::PositiveZ,
                ('-', 'z') => SensorAxis::NegativeZ,
                _ => {
                    return Err(Error::invalid(
                        "axes_alignment",
                        f64::NAN,
                        "axis must be a sign followed by x, y or z",
                    ));
                }
            };
        }
        Self::new(axes[0], axes[1], axes[2])
    }
}

impl fmt::Display for AxesAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for axis in [self.x, self.y, self.z] {
            let sign = if axis.sign() > 0.0 { '+' } else { '-' };
            write!(f, "{}{}", sign, axis.name())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_alignment() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(AxesAlignment::IDENTITY.apply(v), v);
        assert_eq!(AxesAlignment::default().matrix(), Matrix3::identity());
        assert!(AxesAlignment::IDENTITY.is_proper_rotation());
    }

    #[test]
    fn test_alignment_matches_matrix() {
        let alignment: AxesAlignment = "+y-x+z".parse().unwrap();
        let v = Vector3::new(1.0, 2.0, 3.0);

        assert_eq!(alignment.apply(v), Vector3::new(2.0, -1.0, 3.0));
        assert_eq!(alignment.matrix() * v, alignment.apply(v));
        assert!(alignment.is_proper_rotation());
    }

    #[test]
    fn test_rejects_repeated_axis() {
        let result = AxesAlignment::new(
            SensorAxis::PositiveX,
            SensorAxis::NegativeX,
            SensorAxis::PositiveZ,
        );
        assert_eq!(result, Err(Error::DegenerateAlignment { axis: 'x' }));
    }

    #[test]
    fn test_parse_errors() {
        assert!("+x+y".parse::<AxesAlignment>().is_err());
        assert!("+x*y+z".parse::<AxesAlignment>().is_err());
        assert!("+x+y+y".parse::<AxesAlignment>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["+x+y+z", "-z+x-y", "+x+z+y"] {
            let alignment: AxesAlignment = text.parse().unwrap();
            assert_eq!(alignment.to_string(), text);
        }
        assert_eq!(" +X -Z +Y ".parse::<AxesAlignment>().unwrap().to_string(), "+x-z+y");
    }
}
