//! Per-tick result types

use super::detection::DetectionEvent;
use crate::features::spectral::SpectralMatrix;
use crate::ml::model_input::{FeatureShape, ModelInput};
use serde::{Deserialize, Serialize};

/// Both products of one window: model features and a display image
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    /// Calibrated, shape-checked features for the classifier
    pub features: ModelInput,
    /// Decibel grid min-max scaled to `[0, 1]`
    pub display: SpectralMatrix,
}

/// Outcome of one successful pipeline tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Monotonic tick counter (counts failed ticks too)
    pub sequence: u64,

    /// Classifier score for this window
    pub score: f32,

    /// Alarm latch transition caused by `score`
    pub event: DetectionEvent,

    /// Shape of the feature grid handed to the classifier
    pub feature_shape: FeatureShape,

    /// Time spent from snapshot to score, in milliseconds
    pub processing_time_ms: f32,
}

impl TickReport {
    /// `true` while the alarm is up
    pub fn is_alarm(&self) -> bool {
        self.event.is_alarm()
    }

    /// Serialize as a single JSON line
    pub fn to_json(&self) -> Result<String, crate::error::MonitorError> {
        Ok(serde_json::to_string(self)?)
    }
}
