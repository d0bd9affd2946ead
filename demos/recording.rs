//! Trajectory of a recorded walking session
//!
//! Reads a CSV recording with columns `time` (s), `ax`, `ay`, `az` (g) and
//! `gx`, `gy`, `gz` (deg/s), optionally remaps the sensor axes, runs the
//! trajectory pipeline and writes one row per sample to `<input>.trajectory.csv`.
//!
//! Run with: `cargo run --example recording -- walk.csv [+x+z+y] [settings.json]`
//!
//! Set `RUST_LOG=debug` for per-stage statistics.

use std::env;
use std::error::Error;
use std::fs::File;

use gait_trajectory::{AxesAlignment, SampleSeries, SensorUnits, TrajectoryAnalyzer, TrajectorySettings};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct Sample {
    time: f64,
    ax: f64,
    ay: f64,
    az: f64,
    gx: f64,
    gy: f64,
    gz: f64,
}

#[derive(Debug, Serialize)]
struct TrajectoryRow {
    time: f64,
    stationary: bool,
    roll: f64,
    pitch: f64,
    yaw: f64,
    vx: f64,
    vy: f64,
    vz: f64,
    x: f64,
    y: f64,
    z: f64,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let Some(input) = args.get(1) else {
        return Err("usage: recording <samples.csv> [axes] [settings.json]".into());
    };
    let alignment: AxesAlignment = match args.get(2) {
        Some(axes) => axes.parse()?,
        None => AxesAlignment::IDENTITY,
    };
    let settings: TrajectorySettings = match args.get(3) {
        Some(path) => serde_json::from_reader(File::open(path)?)?,
        None => TrajectorySettings::default(),
    };

    // Load sensor data from CSV
    let mut reader = csv::Reader::from_path(input)?;
    let mut timestamps = Vec::new();
    let mut accelerometer = Vec::new();
    let mut gyroscope = Vec::new();
    for result in reader.deserialize() {
        let sample: Sample = result?;
        timestamps.push(sample.time);
        accelerometer.push(Vector3::new(sample.ax, sample.ay, sample.az));
        gyroscope.push(Vector3::new(sample.gx, sample.gy, sample.gz));
    }

    let mut series = SampleSeries::new(timestamps, accelerometer, gyroscope, SensorUnits::default())?
        .aligned(alignment);
    if !alignment.is_proper_rotation() {
        println!("Note: axes {} mirror the sensor frame", alignment);
    }

    // Bring unevenly logged sessions onto the configured grid
    let rate = series.sample_rate().unwrap_or(settings.sample_rate);
    if ((rate - settings.sample_rate) / settings.sample_rate).abs() > 0.01 {
        println!("Resampling from {:.2} Hz to {:.2} Hz", rate, settings.sample_rate);
        series = series.resample(settings.sample_rate)?;
    }

    println!("Processing {} samples ({:.1} s)...", series.len(), series.duration());

    let analyzer = TrajectoryAnalyzer::new(settings)?;
    let estimate = analyzer.analyze(&series)?;

    let output = format!("{}.trajectory.csv", input.trim_end_matches(".csv"));
    let mut writer = csv::Writer::from_path(&output)?;
    let euler = estimate.euler_angles_degrees();
    for i in 0..estimate.len() {
        let velocity = estimate.velocity()[i];
        let position = estimate.position()[i];
        writer.serialize(TrajectoryRow {
            time: estimate.conditioned.timestamps()[i],
            stationary: estimate.stationary[i],
            roll: euler[i].x,
            pitch: euler[i].y,
            yaw: euler[i].z,
            vx: velocity.x,
            vy: velocity.y,
            vz: velocity.z,
            x: position.x,
            y: position.y,
            z: position.z,
        })?;
    }
    writer.flush()?;

    let displacement = estimate.displacement();
    println!("Strides:      {}", estimate.stride_count());
    println!(
        "Displacement: ({:.2}, {:.2}, {:.2}) m, {:.2} m",
        displacement.x,
        displacement.y,
        displacement.z,
        displacement.magnitude()
    );
    println!("Path length:  {:.2} m", estimate.path_length());
    println!("Trajectory written to {}", output);

    Ok(())
}
