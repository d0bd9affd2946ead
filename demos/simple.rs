use gait_trajectory::{SampleSeries, SensorUnits, TrajectoryAnalyzer, TrajectorySettings};
use nalgebra::Vector3;
use std::f64::consts::PI;

const SAMPLE_RATE: f64 = 50.0; // 50 Hz

fn main() {
    env_logger::init();

    // Three strides: 1 s standing, then 0.6 s swing and 1 s stance each
    let mut accelerometer = vec![Vector3::new(0.0, 0.0, 1.0); 50]; // g
    let mut gyroscope = vec![Vector3::zeros(); 50]; // deg/s
    for _ in 0..3 {
        for i in 0..30 {
            let phase = i as f64 / 30.0;
            accelerometer.push(Vector3::new(
                1.5 * (2.0 * PI * phase).sin(),
                0.0,
                1.0 + 0.8 * (PI * phase).sin(),
            ));
            gyroscope.push(Vector3::new(0.0, 200.0 * (2.0 * PI * phase).sin(), 0.0));
        }
        accelerometer.extend(vec![Vector3::new(0.0, 0.0, 1.0); 50]);
        gyroscope.extend(vec![Vector3::zeros(); 50]);
    }

    let series = SampleSeries::from_sample_rate(SAMPLE_RATE, accelerometer, gyroscope, SensorUnits::default())
        .expect("channels have equal length");

    let analyzer = TrajectoryAnalyzer::new(TrajectorySettings::default()).expect("default settings are valid");
    let estimate = analyzer.analyze(&series).expect("recording is long enough");

    for interval in estimate.stationary.moving_intervals() {
        let position = estimate.position()[interval.end];
        println!(
            "Stride ending at {:.2} s: x {:.2}, y {:.2}, z {:.2} m",
            interval.end as f64 / SAMPLE_RATE,
            position.x,
            position.y,
            position.z
        );
    }
}
