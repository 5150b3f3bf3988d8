//! # Spectral Sentinel
//!
//! Real-time audio monitoring core: keeps a sliding window of the most
//! recent samples and periodically turns it into normalized spectral
//! features for a classifier.
//!
//! ## Features
//!
//! - **Sliding window**: fixed-capacity sample buffer shared between one
//!   capture thread and one periodic consumer, with linearizable snapshots
//! - **Decibel conversion**: peak-referenced, floored against silence and
//!   clamped to a dynamic range
//! - **Normalization**: min-max scaling for display, fixed-calibration
//!   mean/std standardization for the model
//! - **Orchestration**: fixed-rate ticking, strict model input shape check,
//!   alarm latch over classifier scores
//!
//! Capture hardware, the spectrogram algorithm, the classifier and the
//! display are supplied by the caller through the traits in [`pipeline`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use spectral_sentinel::io::wav_source::WavFileSource;
//! use spectral_sentinel::{Monitor, MonitorConfig, MonitorError, ModelInput, Pipeline};
//! use spectral_sentinel::{SpectralMatrix, SpectrogramParams};
//!
//! # fn mel_power(_: &[f32], _: &SpectrogramParams) -> Result<SpectralMatrix, MonitorError> { unimplemented!() }
//! # fn score(_: &ModelInput) -> Result<f32, MonitorError> { unimplemented!() }
//! let config = MonitorConfig::default();
//! let source = WavFileSource::open("kitchen.wav", true)?;
//! let pipeline = Pipeline::new(config, mel_power, score)?;
//!
//! let monitor = Monitor::start(source, pipeline)?;
//! for report in monitor.reports().iter().take(10) {
//!     println!("tick {}: score {:.2} ({:?})", report.sequence, report.score, report.event);
//! }
//! monitor.shutdown();
//! # Ok::<(), spectral_sentinel::MonitorError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! capture thread ─append─▶ SlidingSampleBuffer ◀─snapshot_normalized─ tick thread
//!                                                       │
//!               generator → power_to_db → mean_std_normalize → ModelInput → classifier
//!                                       └→ min_max_normalize → display
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod ml;
pub mod pipeline;
pub mod preprocessing;

// Re-export main types
pub use analysis::detection::{DetectionEvent, DetectionLatch};
pub use analysis::result::{FeatureFrame, TickReport};
pub use config::MonitorConfig;
pub use error::MonitorError;
pub use features::spectral::{Calibration, DecibelParams, SpectralMatrix};
pub use io::sample_buffer::{SlidingSampleBuffer, I16_FULL_SCALE};
pub use ml::model_input::{FeatureShape, ModelInput};
pub use pipeline::{
    extract_features, CaptureSource, Classifier, DisplaySink, Monitor, Pipeline,
    SpectrogramGenerator, SpectrogramParams,
};
