//! Spectral matrix normalization
//!
//! Two independent schemes:
//! - Min-max scaling to `[0, 1]` using the grid's own extremes (display path)
//! - Mean/std standardization against a frozen [`Calibration`] (model path)
//!
//! # Example
//!
//! ```
//! use spectral_sentinel::features::spectral::{
//!     mean_std_normalize, min_max_normalize, Calibration, SpectralMatrix,
//! };
//!
//! let db = SpectralMatrix::from_rows(vec![vec![-80.0, -38.598], vec![-12.0, 0.0]])?;
//! let display = min_max_normalize(&db);
//! let features = mean_std_normalize(&db, &Calibration::default())?;
//! assert_eq!(display.get(1, 1), Some(1.0));
//! assert_eq!(features.get(0, 1), Some(0.0));
//! # Ok::<(), spectral_sentinel::MonitorError>(())
//! ```

use super::matrix::SpectralMatrix;
use super::stats::min_max;
use crate::error::MonitorError;
use serde::{Deserialize, Serialize};

/// Decibel-domain mean of the training distribution (calibration `v1`)
pub const REFERENCE_MEAN_DB: f32 = -38.598;

/// Decibel-domain standard deviation of the training distribution (calibration `v1`)
pub const REFERENCE_STD_DB: f32 = 12.22;

/// Version tag of the built-in calibration
pub const REFERENCE_CALIBRATION_VERSION: &str = "v1";

/// Fixed mean/std parameters the downstream model was calibrated against
///
/// These are not derived from the input. They must match the distribution
/// the model was trained on; a new model ships with a new version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Calibration identifier, e.g. `"v1"`
    pub version: String,
    /// Expected mean in dB
    pub mean: f32,
    /// Expected standard deviation in dB (must be finite and > 0)
    pub std: f32,
}

impl Calibration {
    /// Create a calibration, validating the spread
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::InvalidConfig` if `mean` is not finite or `std`
    /// is not finite and strictly positive.
    pub fn new(version: impl Into<String>, mean: f32, std: f32) -> Result<Self, MonitorError> {
        let calibration = Self {
            version: version.into(),
            mean,
            std,
        };
        calibration.validate()?;
        Ok(calibration)
    }

    /// Check the parameters are usable for standardization
    pub fn validate(&self) -> Result<(), MonitorError> {
        if !self.mean.is_finite() {
            return Err(MonitorError::InvalidConfig(format!(
                "Calibration {} mean must be finite, got {}",
                self.version, self.mean
            )));
        }
        if !self.std.is_finite() || self.std <= 0.0 {
            return Err(MonitorError::InvalidConfig(format!(
                "Calibration {} std must be finite and > 0, got {}",
                self.version, self.std
            )));
        }
        Ok(())
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            version: REFERENCE_CALIBRATION_VERSION.to_string(),
            mean: REFERENCE_MEAN_DB,
            std: REFERENCE_STD_DB,
        }
    }
}

/// Rescale a matrix to `[0, 1]` using its own minimum and maximum
///
/// Each element becomes `(v - min) / (max - min)`. The input is left untouched.
///
/// A flat matrix (`max == min`) has no range to scale into; the result is
/// an all-zero matrix of the same shape instead of NaN.
pub fn min_max_normalize(matrix: &SpectralMatrix) -> SpectralMatrix {
    let (min_value, max_value) = min_max(matrix);
    let range = max_value - min_value;

    if range.is_finite() && range > 0.0 {
        return matrix.map(|v| (v - min_value) / range);
    }

    log::warn!(
        "Flat or non-finite spectral range (min={}, max={}), returning zeros",
        min_value,
        max_value
    );
    matrix.map(|_| 0.0)
}

/// Standardize a matrix with fixed calibration constants
///
/// Each element becomes `(v - calibration.mean) / calibration.std`. The
/// input is left untouched.
///
/// # Errors
///
/// Returns `MonitorError::NumericalError` if the calibration's `std` is zero
/// or non-finite; dividing by it would corrupt every feature.
pub fn mean_std_normalize(
    matrix: &SpectralMatrix,
    calibration: &Calibration,
) -> Result<SpectralMatrix, MonitorError> {
    if !calibration.std.is_finite() || calibration.std <= 0.0 {
        return Err(MonitorError::NumericalError(format!(
            "Cannot standardize with std={} (calibration {})",
            calibration.std, calibration.version
        )));
    }

    let mean = calibration.mean;
    let std = calibration.std;
    Ok(matrix.map(|v| (v - mean) / std))
}
