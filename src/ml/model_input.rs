//! Fixed-shape model input
//!
//! The classifier consumes a flattened, row-major feature grid of a shape
//! agreed ahead of time. Any other shape is rejected; the grid is never
//! reshaped, padded or truncated to fit.

use crate::error::MonitorError;
use crate::features::spectral::SpectralMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mel bands the reference model was trained on
pub const DEFAULT_MODEL_ROWS: usize = 128;

/// Time frames the reference model was trained on (2 s at 16 kHz, hop 128)
pub const DEFAULT_MODEL_COLS: usize = 251;

/// Grid dimensions as `(rows, cols)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureShape {
    /// Frequency bins
    pub rows: usize,
    /// Time frames
    pub cols: usize,
}

impl FeatureShape {
    /// Create a shape
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// `true` if either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }
}

impl Default for FeatureShape {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_ROWS, DEFAULT_MODEL_COLS)
    }
}

impl fmt::Display for FeatureShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Flattened feature grid that matched the expected shape
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInput {
    shape: FeatureShape,
    data: Vec<f32>,
}

impl ModelInput {
    /// Check the matrix shape and flatten it in row-major order
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::ShapeMismatch` if either dimension differs from
    /// `expected`.
    pub fn from_matrix(matrix: &SpectralMatrix, expected: FeatureShape) -> Result<Self, MonitorError> {
        let actual = matrix.shape();
        if actual != expected {
            return Err(MonitorError::ShapeMismatch { expected, actual });
        }

        Ok(Self {
            shape: actual,
            data: matrix.as_slice().to_vec(),
        })
    }

    /// Shape the input was checked against
    pub fn shape(&self) -> FeatureShape {
        self.shape
    }

    /// Row-major features
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Consume and return the flat features
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}
