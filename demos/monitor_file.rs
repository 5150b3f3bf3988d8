//! Example: Replay a WAV file through the monitor
//!
//! Usage:
//!   cargo run --release --example monitor_file -- <file.wav> [config.json]
//!
//! The file must be 16-bit PCM; stereo is mixed down to mono. Audio is fed
//! at real-time speed and one JSON report is printed per tick. The
//! classifier here is a stand-in that scores mean normalized energy.

mod band_power;

use band_power::BandPowerSpectrogram;
use spectral_sentinel::io::wav_source::WavFileSource;
use spectral_sentinel::{ModelInput, Monitor, MonitorConfig, MonitorError, Pipeline};
use std::env;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

fn energy_score(input: &ModelInput) -> Result<f32, MonitorError> {
    let values = input.as_slice();
    let mean = values.iter().sum::<f32>() / values.len() as f32;
    Ok(1.0 / (1.0 + (-mean).exp()))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <file.wav> [config.json]", args[0]);
        std::process::exit(1);
    }

    let config = match args.get(2) {
        Some(path) => MonitorConfig::from_json_file(path)?,
        None => MonitorConfig::default(),
    };

    let source = WavFileSource::open(&args[1], true)?;
    if source.sample_rate() != config.sample_rate {
        log::warn!(
            "File is {} Hz but monitor expects {} Hz",
            source.sample_rate(),
            config.sample_rate
        );
    }

    let generator = BandPowerSpectrogram::new(config.fft_size);
    let pipeline = Pipeline::new(config, generator, energy_score)?;
    let monitor = Monitor::start(source, pipeline)?;

    // Print reports until the file is exhausted
    while monitor.is_capturing() {
        match monitor.reports().recv_timeout(Duration::from_millis(500)) {
            Ok(report) => println!("{}", report.to_json()?),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    for report in monitor.reports().try_iter() {
        println!("{}", report.to_json()?);
    }

    monitor.shutdown();
    Ok(())
}
