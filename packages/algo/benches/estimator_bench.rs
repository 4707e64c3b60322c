//! Benchmark suite for attention-algo
//!
//! Run with: cargo bench

use attention_algo::{
    AttentionConfig, AttentionTracker, Detection, Estimator, EstimatorConfig, EstimatorStatus,
    FaceBox, Frame, FrameSample,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn noisy_frame(width: u32, height: u32, seed: u8) -> Frame {
    let mut data = Vec::with_capacity((width * height) as usize * 4);
    for i in 0..(width * height) {
        let v = (i as u8).wrapping_mul(31).wrapping_add(seed);
        data.extend_from_slice(&[v, v.wrapping_add(7), v.wrapping_add(13), 255]);
    }
    Frame::from_rgba(width, height, data).unwrap()
}

fn bench_estimate_brightness(c: &mut Criterion) {
    let frames = [noisy_frame(320, 240, 0), noisy_frame(320, 240, 97)];
    let mut estimator = Estimator::new(
        EstimatorConfig::default(),
        EstimatorStatus::unsupported("bench"),
    );
    let mut i = 0usize;

    c.bench_function("Estimator::estimate brightness 320x240", |b| {
        b.iter(|| {
            i += 1;
            estimator.estimate(black_box(&frames[i % 2]), Detection::NotRun, i as f64)
        })
    });
}

fn bench_estimate_detector(c: &mut Criterion) {
    let frames = [noisy_frame(320, 240, 0), noisy_frame(320, 240, 97)];
    let mut estimator = Estimator::new(EstimatorConfig::default(), EstimatorStatus::native());
    let face = FaceBox::new(110.0, 70.0, 100.0, 100.0);
    let mut i = 0usize;

    c.bench_function("Estimator::estimate detector 320x240", |b| {
        b.iter(|| {
            i += 1;
            let detection = Detection::Faces(vec![face]);
            estimator.estimate(black_box(&frames[i % 2]), detection, i as f64)
        })
    });
}

fn bench_tracker_ingest(c: &mut Criterion) {
    let mut tracker = AttentionTracker::new(AttentionConfig::default(), 0.0);
    let mut seq = 0u64;

    c.bench_function("AttentionTracker::ingest", |b| {
        b.iter(|| {
            seq += 1;
            let sample = FrameSample::basic(seq as f64 * 200.0, seq % 3 != 0, 0.05);
            tracker.ingest(black_box(sample), seq)
        })
    });
}

criterion_group!(
    benches,
    bench_estimate_brightness,
    bench_estimate_detector,
    bench_tracker_ingest
);
criterion_main!(benches);
