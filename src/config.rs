//! Configuration parameters for the monitor
//!
//! Defaults reproduce the reference deployment: 16 kHz mono capture, a
//! 2 second window analysed every 200 ms, 128 mel bands with a 1024-point
//! FFT and hop of 128, yielding a 128x251 feature grid.
//!
//! Configuration can be loaded from JSON; missing fields take their
//! defaults.
//!
//! ```
//! use spectral_sentinel::MonitorConfig;
//!
//! let config = MonitorConfig::from_json_str(
//!     r#"{ "tick_interval_ms": 100, "calibration": { "version": "v2", "mean": -40.0, "std": 11.5 } }"#,
//! )?;
//! assert_eq!(config.tick_interval_ms, 100);
//! assert_eq!(config.sample_rate, 16000);
//! # Ok::<(), spectral_sentinel::MonitorError>(())
//! ```

use crate::analysis::detection::{DEFAULT_DETECTION_THRESHOLD, DEFAULT_HOLD_TICKS};
use crate::error::MonitorError;
use crate::features::spectral::{Calibration, DecibelParams};
use crate::ml::model_input::FeatureShape;
use crate::pipeline::SpectrogramParams;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Monitor configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    // Capture
    /// Capture sample rate in Hz (default: 16000)
    pub sample_rate: u32,

    /// Length of the sliding window in seconds (default: 2.0)
    pub window_seconds: f32,

    /// Samples requested from the capture source per read (default: 1024)
    pub capture_chunk_size: usize,

    // Scheduling
    /// Period between pipeline ticks in milliseconds (default: 200)
    pub tick_interval_ms: u64,

    // Spectrogram generator parameters
    /// FFT window size (default: 1024)
    pub fft_size: usize,

    /// Number of mel bands (default: 128)
    pub n_mels: usize,

    /// Hop length between FFT frames (default: 128)
    pub hop_length: usize,

    // Post-processing
    /// Decibel conversion floor and dynamic range (default: 1e-10, 80 dB)
    pub decibel: DecibelParams,

    /// Frozen mean/std the model was trained against (default: v1)
    pub calibration: Calibration,

    /// Feature grid shape the model expects (default: 128x251)
    pub feature_shape: FeatureShape,

    // Detection
    /// Score above which a detection is raised (default: 0.8)
    pub detection_threshold: f32,

    /// Ticks the alarm stays up after the last detection (default: 5)
    pub alarm_hold_ticks: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            window_seconds: 2.0,
            capture_chunk_size: 1024,
            tick_interval_ms: 200,
            fft_size: 1024,
            n_mels: 128,
            hop_length: 128,
            decibel: DecibelParams::default(),
            calibration: Calibration::default(),
            feature_shape: FeatureShape::default(),
            detection_threshold: DEFAULT_DETECTION_THRESHOLD,
            alarm_hold_ticks: DEFAULT_HOLD_TICKS,
        }
    }
}

impl MonitorConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, MonitorError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, MonitorError> {
        log::debug!("Loading monitor config from {}", path.as_ref().display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check every parameter is usable
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::InvalidConfig` describing the first bad field.
    pub fn validate(&self) -> Result<(), MonitorError> {
        let positive = [
            ("sample_rate", self.sample_rate as usize),
            ("capture_chunk_size", self.capture_chunk_size),
            ("tick_interval_ms", self.tick_interval_ms as usize),
            ("fft_size", self.fft_size),
            ("n_mels", self.n_mels),
            ("hop_length", self.hop_length),
            ("alarm_hold_ticks", self.alarm_hold_ticks as usize),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(MonitorError::InvalidConfig(format!("{} must be > 0", name)));
        }

        if !self.window_seconds.is_finite() || self.window_seconds <= 0.0 {
            return Err(MonitorError::InvalidConfig(format!(
                "window_seconds must be finite and > 0, got {}",
                self.window_seconds
            )));
        }

        if self.window_capacity() == 0 {
            return Err(MonitorError::InvalidConfig(
                "Window holds no samples at this sample rate".to_string(),
            ));
        }

        if self.feature_shape.is_empty() {
            return Err(MonitorError::InvalidConfig(format!(
                "feature_shape must be non-empty, got {}",
                self.feature_shape
            )));
        }

        if !self.detection_threshold.is_finite() {
            return Err(MonitorError::InvalidConfig(format!(
                "detection_threshold must be finite, got {}",
                self.detection_threshold
            )));
        }

        self.decibel.validate()?;
        self.calibration.validate()?;

        Ok(())
    }

    /// Number of samples held by the sliding window
    pub fn window_capacity(&self) -> usize {
        (f64::from(self.sample_rate) * f64::from(self.window_seconds)).round() as usize
    }

    /// Tick period as a `Duration`
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Parameters passed to the spectrogram generator every tick
    pub fn spectrogram_params(&self) -> SpectrogramParams {
        SpectrogramParams {
            sample_rate: self.sample_rate,
            fft_size: self.fft_size,
            n_bands: self.n_mels,
            hop_length: self.hop_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = MonitorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window_capacity(), 32000);
        assert_eq!(config.tick_interval(), Duration::from_millis(200));
        assert_eq!(config.feature_shape, FeatureShape::new(128, 251));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = MonitorConfig::from_json_str(r#"{"n_mels": 64}"#).unwrap();
        assert_eq!(config.n_mels, 64);
        assert_eq!(config.fft_size, 1024);
        assert_eq!(config.calibration, Calibration::default());
    }

    #[test]
    fn test_zero_fields_rejected() {
        let config = MonitorConfig {
            hop_length: 0,
            ..MonitorConfig::default()
        };
        assert!(matches!(config.validate(), Err(MonitorError::InvalidConfig(_))));

        let config = MonitorConfig {
            window_seconds: 0.0,
            ..MonitorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_std_calibration_rejected() {
        let result = MonitorConfig::from_json_str(
            r#"{"calibration": {"version": "bad", "mean": -38.0, "std": 0.0}}"#,
        );
        assert!(matches!(result, Err(MonitorError::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            MonitorConfig::from_json_str("{ not json"),
            Err(MonitorError::Config(_))
        ));
    }

    #[test]
    fn test_spectrogram_params() {
        let params = MonitorConfig::default().spectrogram_params();
        assert_eq!(params.sample_rate, 16000);
        assert_eq!(params.fft_size, 1024);
        assert_eq!(params.n_bands, 128);
        assert_eq!(params.hop_length, 128);
    }
}
