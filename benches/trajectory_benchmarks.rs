use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use gait_trajectory::attitude::estimate_orientation;
use gait_trajectory::drift::correct_drift;
use gait_trajectory::filter::{Butterworth, FilterKind};
use gait_trajectory::kinematics::integrate_velocity;
use gait_trajectory::{
    AngularRateUnit, SampleSeries, SensorUnits, StanceDetector, StanceSettings, TrajectoryAnalyzer,
    TrajectorySettings,
};
use nalgebra::Vector3;
use rand::prelude::*;
use rand_pcg::Pcg64;
use std::f64::consts::PI;

const SAMPLE_RATE: f64 = 50.0;

/// Noisy synthetic walk: 1 s stance and 0.6 s swing per stride, in g and deg/s
fn generate_walk(seconds: f64, seed: u64) -> SampleSeries {
    let mut rng = Pcg64::seed_from_u64(seed);
    let count = (seconds * SAMPLE_RATE) as usize;
    let stride = (1.6 * SAMPLE_RATE) as usize;
    let swing = (0.6 * SAMPLE_RATE) as usize;

    let mut accelerometer = Vec::with_capacity(count);
    let mut gyroscope = Vec::with_capacity(count);
    for i in 0..count {
        let step = i % stride;
        let (accel, gyro) = if step < swing {
            let phase = step as f64 / swing as f64;
            (
                Vector3::new(1.5 * (2.0 * PI * phase).sin(), 0.0, 1.0 + 0.8 * (PI * phase).sin()),
                Vector3::new(0.0, 200.0 * (2.0 * PI * phase).sin(), 0.0),
            )
        } else {
            (Vector3::new(0.0, 0.0, 1.0), Vector3::zeros())
        };

        accelerometer.push(
            accel
                + Vector3::new(
                    rng.random_range(-0.01..0.01),
                    rng.random_range(-0.01..0.01),
                    rng.random_range(-0.01..0.01),
                ),
        );
        gyroscope.push(
            gyro + Vector3::new(
                rng.random_range(-0.5..0.5),
                rng.random_range(-0.5..0.5),
                rng.random_range(-0.5..0.5),
            ),
        );
    }

    SampleSeries::from_sample_rate(SAMPLE_RATE, accelerometer, gyroscope, SensorUnits::default())
        .expect("synthetic walk is well formed")
}

/// Benchmark filter design
fn bench_butterworth_design(c: &mut Criterion) {
    c.bench_function("butterworth_design_order_4", |b| {
        b.iter(|| Butterworth::new(FilterKind::HighPass, black_box(4), black_box(0.4), SAMPLE_RATE))
    });
}

/// Benchmark zero-phase filtering of one channel
fn bench_filtfilt(c: &mut Criterion) {
    let filter = Butterworth::new(FilterKind::LowPass, 2, 10.0, SAMPLE_RATE).unwrap();
    let series = generate_walk(60.0, 1);
    let channel: Vec<f64> = series.accelerometer().iter().map(|a| a.x).collect();

    c.bench_function("filtfilt_60s", |b| b.iter(|| filter.filtfilt(black_box(&channel))));

    // Five-tap moving average for comparison with the recursive design
    let moving_average = Butterworth::from_coefficients(vec![0.2; 5], vec![1.0]).unwrap();
    c.bench_function("filtfilt_60s_moving_average", |b| {
        b.iter(|| moving_average.filtfilt(black_box(&channel)))
    });
}

/// Benchmark stance detection
fn bench_stance_detection(c: &mut Criterion) {
    let detector = StanceDetector::new(&StanceSettings::default(), SAMPLE_RATE).unwrap();
    let series = generate_walk(60.0, 2);

    c.bench_function("stance_detection_60s", |b| {
        b.iter(|| detector.detect(black_box(series.accelerometer())))
    });
}

/// Benchmark attitude estimation including the convergence phase
fn bench_attitude(c: &mut Criterion) {
    let settings = TrajectorySettings::default();
    let series = generate_walk(60.0, 3);
    let detector = StanceDetector::new(&settings.stance, SAMPLE_RATE).unwrap();
    let mask = detector.detect(series.accelerometer()).unwrap().mask;

    c.bench_function("attitude_60s", |b| {
        b.iter(|| {
            estimate_orientation(
                &settings.attitude,
                SAMPLE_RATE,
                black_box(series.gyroscope()),
                black_box(series.accelerometer()),
                &mask,
                AngularRateUnit::DegreesPerSecond,
            )
        })
    });
}

/// Benchmark ZUPT integration and drift removal
fn bench_integration(c: &mut Criterion) {
    let series = generate_walk(60.0, 4);
    let detector = StanceDetector::new(&StanceSettings::default(), SAMPLE_RATE).unwrap();
    let mask = detector.detect(series.accelerometer()).unwrap().mask;
    let acceleration: Vec<_> = series.accelerometer().iter().map(|a| a * 9.80665).collect();

    c.bench_function("zupt_drift_60s", |b| {
        b.iter(|| {
            let velocity = integrate_velocity(black_box(&acceleration), 0.02, &mask).unwrap();
            correct_drift(&velocity, &mask)
        })
    });
}

/// Benchmark the full pipeline over increasing recording lengths
fn bench_full_pipeline(c: &mut Criterion) {
    let analyzer = TrajectoryAnalyzer::new(TrajectorySettings::default()).unwrap();
    let mut group = c.benchmark_group("full_pipeline");

    for seconds in [10.0, 60.0, 300.0] {
        let series = generate_walk(seconds, 5);
        group.bench_with_input(BenchmarkId::from_parameter(seconds), &series, |b, series| {
            b.iter(|| analyzer.analyze(black_box(series)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_butterworth_design,
    bench_filtfilt,
    bench_stance_detection,
    bench_attitude,
    bench_integration,
    bench_full_pipeline
);
criterion_main!(benches);
