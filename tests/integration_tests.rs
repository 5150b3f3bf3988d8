//! Integration tests for the monitoring pipeline

#[path = "../demos/band_power.rs"]
mod band_power;

use band_power::BandPowerSpectrogram;
use spectral_sentinel::features::spectral::{min_max, power_to_db, DecibelParams};
use spectral_sentinel::io::wav_source::WavFileSource;
use spectral_sentinel::{
    extract_features, DetectionEvent, FeatureShape, ModelInput, Monitor, MonitorConfig,
    MonitorError, Pipeline, SlidingSampleBuffer, SpectrogramGenerator, I16_FULL_SCALE,
};
use std::f32::consts::PI;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

fn tone(frequency: f32, sample_rate: u32, len: usize, amplitude: f32) -> Vec<i16> {
    (0..len)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (amplitude * f32::from(i16::MAX) * (2.0 * PI * frequency * t).sin()) as i16
        })
        .collect()
}

fn score_mean_feature() -> impl FnMut(&ModelInput) -> Result<f32, MonitorError> + Send {
    |input| {
        let mean = input.as_slice().iter().sum::<f32>() / input.as_slice().len() as f32;
        Ok(1.0 / (1.0 + (-mean).exp()))
    }
}

#[test]
fn test_buffer_scenarios() {
    let unit = NonZeroU32::MIN;

    let buffer = SlidingSampleBuffer::new(4).unwrap();
    buffer.append(&[9i16], unit);
    assert_eq!(buffer.snapshot(), vec![0.0, 0.0, 0.0, 9.0]);
    buffer.append(&[8i16], unit);
    assert_eq!(buffer.snapshot(), vec![0.0, 0.0, 9.0, 8.0]);
    buffer.append(&[9i16, 8, 7, 6, 5, 4], unit);
    assert_eq!(buffer.snapshot(), vec![7.0, 6.0, 5.0, 4.0]);

    let buffer = SlidingSampleBuffer::new(4).unwrap();
    buffer.append(&[9i16, 8], unit);
    assert_eq!(buffer.snapshot(), vec![0.0, 0.0, 9.0, 8.0]);
    buffer.append(&[7i16, 6], unit);
    assert_eq!(buffer.snapshot(), vec![9.0, 8.0, 7.0, 6.0]);
    buffer.append(&[5i16, 4, 3], unit);
    assert_eq!(buffer.snapshot(), vec![6.0, 5.0, 4.0, 3.0]);
}

#[test]
fn test_default_config_produces_model_shape() {
    let config = MonitorConfig::default();
    let buffer = SlidingSampleBuffer::with_window(config.sample_rate, config.window_seconds).unwrap();
    buffer.append(
        &tone(1000.0, config.sample_rate, buffer.capacity(), 0.5),
        I16_FULL_SCALE,
    );

    let mut generator = BandPowerSpectrogram::new(config.fft_size);
    let frame = extract_features(&buffer.snapshot_normalized(), &config, &mut generator).unwrap();

    assert_eq!(frame.features.shape(), FeatureShape::new(128, 251));
    assert_eq!(frame.display.shape(), FeatureShape::new(128, 251));

    let (low, high) = min_max(&frame.display);
    assert_eq!(high, 1.0);
    assert_eq!(low, 0.0);

    // 1 kHz at 16 kHz sits in band ~16 of 128; it should be the loudest row
    let loudest_row = (0..frame.display.rows())
        .max_by(|&a, &b| {
            let sa: f32 = frame.display.row(a).unwrap().iter().sum();
            let sb: f32 = frame.display.row(b).unwrap().iter().sum();
            sa.partial_cmp(&sb).unwrap()
        })
        .unwrap();
    assert!((15..=17).contains(&loudest_row), "loudest band {}", loudest_row);
}

#[test]
fn test_decibel_bounds_on_generated_spectrogram() {
    let config = MonitorConfig::default();
    let samples: Vec<f32> = tone(440.0, 16000, 32000, 0.3)
        .iter()
        .map(|&s| f32::from(s) / f32::from(i16::MAX))
        .collect();

    let power = BandPowerSpectrogram::new(config.fft_size)
        .generate(&samples, &config.spectrogram_params())
        .unwrap();
    let db = power_to_db(power, &DecibelParams::default()).unwrap();

    let (low, high) = min_max(&db);
    assert_eq!(high, 0.0);
    assert!(low >= high - 80.0);
}

#[test]
fn test_shape_contract_rejects_other_window_lengths() {
    let config = MonitorConfig {
        window_seconds: 1.0,
        ..MonitorConfig::default()
    };
    let buffer = SlidingSampleBuffer::with_window(config.sample_rate, config.window_seconds).unwrap();
    buffer.append(&tone(300.0, 16000, 16000, 0.5), I16_FULL_SCALE);

    let mut generator = BandPowerSpectrogram::new(config.fft_size);
    let result = extract_features(&buffer.snapshot_normalized(), &config, &mut generator);
    match result {
        Err(MonitorError::ShapeMismatch { expected, actual }) => {
            assert_eq!(expected, FeatureShape::new(128, 251));
            assert_eq!(actual, FeatureShape::new(128, 126));
        }
        other => panic!("expected shape mismatch, got {:?}", other.map(|f| f.features.shape())),
    }
}

#[test]
fn test_pipeline_latches_detection() {
    let config = MonitorConfig {
        detection_threshold: 0.5,
        alarm_hold_ticks: 2,
        ..MonitorConfig::default()
    };
    let buffer = SlidingSampleBuffer::new(config.window_capacity()).unwrap();
    buffer.append(&tone(2000.0, 16000, 32000, 0.8), I16_FULL_SCALE);

    let mut scores = vec![0.9f32, 0.1, 0.1, 0.1].into_iter();
    let classifier = move |_: &ModelInput| -> Result<f32, MonitorError> {
        scores
            .next()
            .ok_or_else(|| MonitorError::Classifier("out of scores".to_string()))
    };

    let generator = BandPowerSpectrogram::new(config.fft_size);
    let mut pipeline = Pipeline::new(config, generator, classifier).unwrap();
    let events: Vec<DetectionEvent> = (0..4)
        .map(|_| pipeline.tick(&buffer).unwrap().event)
        .collect();

    assert_eq!(
        events,
        vec![
            DetectionEvent::Triggered,
            DetectionEvent::Cleared,
            DetectionEvent::Idle,
            DetectionEvent::Idle
        ]
    );
    assert!(pipeline.tick(&buffer).is_err());
}

fn write_test_wav(name: &str, samples: &[i16]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("{}-{}.wav", name, std::process::id()));
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
    path
}

#[test]
fn test_monitor_replays_wav_file() {
    let samples = tone(1000.0, 16000, 48000, 0.5);
    let path = write_test_wav("spectral-sentinel-monitor", &samples);

    let config = MonitorConfig {
        tick_interval_ms: 20,
        ..MonitorConfig::default()
    };
    let source = WavFileSource::open(&path, false).unwrap();
    let generator = BandPowerSpectrogram::new(config.fft_size);
    let pipeline = Pipeline::new(config, generator, score_mean_feature()).unwrap();
    let mut monitor = Monitor::start(source, pipeline).unwrap();

    let report = monitor
        .reports()
        .recv_timeout(Duration::from_secs(10))
        .expect("tick report");
    assert_eq!(report.feature_shape, FeatureShape::new(128, 251));
    assert!((0.0..=1.0).contains(&report.score));

    monitor.stop_capture();
    let buffer = monitor.buffer();
    let frozen = buffer.snapshot();
    assert_eq!(frozen.len(), 32000);
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(buffer.snapshot(), frozen);

    monitor.shutdown();
    let _ = std::fs::remove_file(path);
}
