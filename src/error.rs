//! Error types for the monitoring pipeline

use crate::ml::model_input::FeatureShape;
use thiserror::Error;

/// Errors that can occur while capturing or processing audio
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Invalid input parameters (construction contract violations)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration value out of range
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Numerical hazard that would otherwise produce non-finite output
    #[error("Numerical error: {0}")]
    NumericalError(String),

    /// Feature grid does not match the shape the model expects
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Shape the model was built for
        expected: FeatureShape,
        /// Shape actually produced
        actual: FeatureShape,
    },

    /// External spectrogram generator failed
    #[error("Spectrogram generator error: {0}")]
    Generator(String),

    /// External classifier failed
    #[error("Classifier error: {0}")]
    Classifier(String),

    /// Capture source failed
    #[error("Capture error: {0}")]
    Capture(String),

    /// Audio file error
    #[error("Audio file error: {0}")]
    Wav(#[from] hound::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed
    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),
}
