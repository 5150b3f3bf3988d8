//! Performance benchmarks for the per-tick pipeline

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use spectral_sentinel::features::spectral::{power_to_db, DecibelParams};
use spectral_sentinel::{
    extract_features, MonitorConfig, MonitorError, SlidingSampleBuffer, SpectralMatrix,
    SpectrogramParams, I16_FULL_SCALE,
};

fn synthetic_chunk(len: usize) -> Vec<i16> {
    (0..len)
        .map(|i| ((i as f32 * 440.0 * 2.0 * std::f32::consts::PI / 16000.0).sin() * 16000.0) as i16)
        .collect()
}

fn synthetic_power(rows: usize, cols: usize) -> SpectralMatrix {
    let data = (0..rows * cols)
        .map(|i| ((i % 97) as f32 + 1.0) * 1e-3)
        .collect();
    SpectralMatrix::new(rows, cols, data).expect("non-empty grid")
}

fn bench_buffer(c: &mut Criterion) {
    // 2 seconds at 16 kHz
    let buffer = SlidingSampleBuffer::new(32000).expect("capacity");
    let chunk = synthetic_chunk(1024);
    buffer.append(&synthetic_chunk(32000), I16_FULL_SCALE);

    c.bench_function("append_1024", |b| {
        b.iter(|| buffer.append(black_box(&chunk), I16_FULL_SCALE));
    });

    c.bench_function("snapshot_normalized_32000", |b| {
        b.iter(|| black_box(buffer.snapshot_normalized()));
    });
}

fn bench_decibel(c: &mut Criterion) {
    let power = synthetic_power(128, 251);
    let params = DecibelParams::default();

    c.bench_function("power_to_db_128x251", |b| {
        b.iter(|| power_to_db(black_box(power.clone()), &params));
    });
}

fn bench_extract_features(c: &mut Criterion) {
    let config = MonitorConfig::default();
    let window: Vec<f32> = synthetic_chunk(config.window_capacity())
        .iter()
        .map(|&s| f32::from(s) / f32::from(i16::MAX))
        .collect();
    let power = synthetic_power(128, 251);
    let mut generator = move |_: &[f32], _: &SpectrogramParams| -> Result<SpectralMatrix, MonitorError> {
        Ok(power.clone())
    };

    c.bench_function("extract_features_128x251", |b| {
        b.iter(|| extract_features(black_box(&window), &config, &mut generator));
    });
}

criterion_group!(benches, bench_buffer, bench_decibel, bench_extract_features);
criterion_main!(benches);
