//! Pipeline orchestration
//!
//! Traits at the boundary with the collaborators this crate does not
//! implement (capture device, spectrogram generator, classifier, display),
//! and [`Pipeline`], which runs one tick:
//!
//! ```text
//! snapshot_normalized → generator → power_to_db ─┬→ mean_std_normalize → shape check → classifier → latch
//!                                                └→ min_max_normalize → display
//! ```
//!
//! [`monitor::Monitor`] drives the capture producer and the periodic tick on
//! two threads that only share the sample buffer.

pub mod monitor;

use crate::analysis::detection::DetectionLatch;
use crate::analysis::result::{FeatureFrame, TickReport};
use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::features::spectral::{mean_std_normalize, min_max_normalize, power_to_db, SpectralMatrix};
use crate::io::sample_buffer::{SlidingSampleBuffer, I16_FULL_SCALE};
use crate::ml::model_input::ModelInput;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Instant;

pub use monitor::Monitor;

/// Transform parameters handed to the spectrogram generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpectrogramParams {
    /// Sample rate of the window in Hz
    pub sample_rate: u32,
    /// FFT window size
    pub fft_size: usize,
    /// Number of mel bands (output rows)
    pub n_bands: usize,
    /// Hop length between frames
    pub hop_length: usize,
}

/// External power spectrogram generator
///
/// Receives the standardized window and returns a power grid of
/// `n_bands` rows by time frames.
pub trait SpectrogramGenerator {
    /// Produce a power spectrogram for `samples`
    fn generate(
        &mut self,
        samples: &[f32],
        params: &SpectrogramParams,
    ) -> Result<SpectralMatrix, MonitorError>;
}

impl<F> SpectrogramGenerator for F
where
    F: FnMut(&[f32], &SpectrogramParams) -> Result<SpectralMatrix, MonitorError>,
{
    fn generate(
        &mut self,
        samples: &[f32],
        params: &SpectrogramParams,
    ) -> Result<SpectralMatrix, MonitorError> {
        self(samples, params)
    }
}

/// External model consumer
pub trait Classifier {
    /// Score a shape-checked feature grid
    fn classify(&mut self, input: &ModelInput) -> Result<f32, MonitorError>;
}

impl<F> Classifier for F
where
    F: FnMut(&ModelInput) -> Result<f32, MonitorError>,
{
    fn classify(&mut self, input: &ModelInput) -> Result<f32, MonitorError> {
        self(input)
    }
}

/// External display consumer; receives grids scaled to `[0, 1]`
pub trait DisplaySink {
    /// Render or store one frame
    fn show(&mut self, grid: &SpectralMatrix);
}

impl<F> DisplaySink for F
where
    F: FnMut(&SpectralMatrix),
{
    fn show(&mut self, grid: &SpectralMatrix) {
        self(grid)
    }
}

/// Producer of integer PCM chunks (microphone, file replay, ...)
pub trait CaptureSource {
    /// Fill the front of `chunk` with new samples and return how many
    ///
    /// `Ok(0)` means the source is exhausted. May block for roughly one
    /// chunk duration.
    fn read_chunk(&mut self, chunk: &mut [i16]) -> Result<usize, MonitorError>;

    /// Magnitude that maps to 1.0 (default: `i16::MAX`)
    fn full_scale(&self) -> NonZeroU32 {
        I16_FULL_SCALE
    }
}

/// Turn a standardized window into model features and a display image
///
/// Runs the generator, converts to decibels, standardizes against the
/// configured calibration and checks the result against the model shape.
/// The display image is the same decibel grid min-max scaled to `[0, 1]`.
///
/// # Errors
///
/// Propagates generator errors, and returns `MonitorError::ShapeMismatch`
/// when the feature grid does not match `config.feature_shape`.
pub fn extract_features<G>(
    window: &[f32],
    config: &MonitorConfig,
    generator: &mut G,
) -> Result<FeatureFrame, MonitorError>
where
    G: SpectrogramGenerator + ?Sized,
{
    if window.is_empty() {
        return Err(MonitorError::InvalidInput("Empty audio window".to_string()));
    }

    let power = generator.generate(window, &config.spectrogram_params())?;
    log::debug!(
        "Generator produced {}x{} power grid from {} samples",
        power.rows(),
        power.cols(),
        window.len()
    );

    let decibels = power_to_db(power, &config.decibel)?;
    let normalized = mean_std_normalize(&decibels, &config.calibration)?;
    let features = ModelInput::from_matrix(&normalized, config.feature_shape)?;
    let display = min_max_normalize(&decibels);

    Ok(FeatureFrame { features, display })
}

/// One periodic analysis step over the shared window
pub struct Pipeline<G, C> {
    config: MonitorConfig,
    generator: G,
    classifier: C,
    display: Option<Box<dyn DisplaySink + Send>>,
    latch: DetectionLatch,
    sequence: u64,
}

impl<G, C> Pipeline<G, C>
where
    G: SpectrogramGenerator,
    C: Classifier,
{
    /// Create a pipeline
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::InvalidConfig` if `config` fails validation.
    pub fn new(config: MonitorConfig, generator: G, classifier: C) -> Result<Self, MonitorError> {
        config.validate()?;
        let latch = DetectionLatch::new(config.detection_threshold, config.alarm_hold_ticks)?;

        Ok(Self {
            config,
            generator,
            classifier,
            display: None,
            latch,
            sequence: 0,
        })
    }

    /// Forward a `[0, 1]` image of every successful tick to `sink`
    pub fn with_display<D>(mut self, sink: D) -> Self
    where
        D: DisplaySink + Send + 'static,
    {
        self.display = Some(Box::new(sink));
        self
    }

    /// Configuration the pipeline was built with
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Run one tick against the current window
    ///
    /// A failed tick leaves the alarm latch untouched and produces no
    /// report; the caller decides whether to log and carry on.
    pub fn tick(&mut self, buffer: &SlidingSampleBuffer) -> Result<TickReport, MonitorError> {
        self.sequence += 1;
        let start_time = Instant::now();

        let window = buffer.snapshot_normalized();
        let frame = extract_features(&window, &self.config, &mut self.generator)?;

        if let Some(display) = self.display.as_mut() {
            display.show(&frame.display);
        }

        let score = self.classifier.classify(&frame.features)?;
        if !score.is_finite() {
            return Err(MonitorError::Classifier(format!(
                "Classifier returned non-finite score {}",
                score
            )));
        }

        let event = self.latch.update(score);
        let processing_time_ms = start_time.elapsed().as_secs_f32() * 1000.0;

        log::debug!(
            "Tick {}: score={:.3}, event={:?}, {:.2} ms",
            self.sequence,
            score,
            event,
            processing_time_ms
        );

        Ok(TickReport {
            sequence: self.sequence,
            score,
            event,
            feature_shape: frame.features.shape(),
            processing_time_ms,
        })
    }
}
