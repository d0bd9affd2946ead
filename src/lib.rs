//! Gait Trajectory - foot-mounted IMU trajectory estimation
//!
//! Reconstructs the 3-D path of a foot from a recorded accelerometer and
//! gyroscope session using strapdown inertial navigation with zero-velocity
//! updates (ZUPT). Every time the foot rests on the ground the velocity is
//! known to be zero, which bounds the drift that double integration of
//! noisy acceleration would otherwise accumulate.
//!
//! # Pipeline
//!
//! - Zero-phase Butterworth band-pass conditioning of the inertial channels
//! - Stance detection from the filtered acceleration magnitude
//! - Mahony attitude estimation with accelerometer feedback during stance only
//! - Rotation of specific force into the Earth frame and gravity removal
//! - Velocity integration with zero-velocity updates
//! - Linear drift removal over each moving interval
//! - Position integration
//!
//! Recordings whose axes or scale differ from the body frame can be
//! prepared with [`AxesAlignment`], [`InertialCalibration`] and
//! [`SampleSeries::resample`] first.
//!
//! # Quick Start
//!
//! ```rust
//! use nalgebra::Vector3;
//! use gait_trajectory::{SampleSeries, SensorUnits, TrajectoryAnalyzer, TrajectorySettings};
//!
//! let accelerometer = vec![Vector3::new(0.0, 0.0, 1.0); 250]; // g
//! let gyroscope = vec![Vector3::zeros(); 250];                // deg/s
//!
//! let series = SampleSeries::from_sample_rate(50.0, accelerometer, gyroscope, SensorUnits::default())
//!     .unwrap();
//!
//! let analyzer = TrajectoryAnalyzer::new(TrajectorySettings::default()).unwrap();
//! let estimate = analyzer.analyze(&series).unwrap();
//!
//! // Position of every sample in metres, Earth frame with Z up
//! let position = estimate.position();
//! assert_eq!(position.len(), 250);
//! ```

pub mod attitude;
mod axes;
mod calibration;
mod conditioning;
pub mod drift;
mod error;
pub mod filter;
pub mod kinematics;
mod math;
mod series;
mod stance;
mod trajectory;
mod types;

// Re-export all public types and functions
pub use attitude::AttitudeEstimator;
pub use axes::{AxesAlignment, SensorAxis};
pub use calibration::InertialCalibration;
pub use conditioning::SignalConditioner;
pub use error::{Error, Result};
pub use kinematics::KinematicSeries;
pub use math::{DEG_TO_RAD, QuaternionExt, RAD_TO_DEG, STANDARD_GRAVITY, Vector3Ext};
pub use series::{MAX_RESAMPLE_EXPANSION, SampleSeries};
pub use stance::{StanceDetection, StanceDetector, StanceInterval, StationaryMask};
pub use trajectory::{TrajectoryAnalyzer, TrajectoryEstimate};
pub use types::*;
