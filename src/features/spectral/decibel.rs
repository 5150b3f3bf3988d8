//! Power to decibel conversion
//!
//! Converts a power spectrogram into log-power units relative to its own
//! peak, with two stability safeguards:
//!
//! 1. Every value (and the reference peak) is floored at `amin` before the
//!    logarithm, so silence and negative inputs never reach `log10`.
//! 2. After conversion every element is clamped to at most `top_db` below
//!    the converted maximum.
//!
//! The peak of the output is always exactly 0 dB.
//!
//! # Example
//!
//! ```
//! use spectral_sentinel::features::spectral::{power_to_db, DecibelParams, SpectralMatrix};
//!
//! let power = SpectralMatrix::from_rows(vec![vec![1.0, 0.5], vec![0.25, 0.0]])?;
//! let db = power_to_db(power, &DecibelParams::default())?;
//! assert_eq!(db.get(0, 0), Some(0.0));
//! assert_eq!(db.get(1, 1), Some(-80.0)); // silence clamped to the dynamic range floor
//! # Ok::<(), spectral_sentinel::MonitorError>(())
//! ```

use super::matrix::SpectralMatrix;
use super::stats::max_value;
use crate::error::MonitorError;
use serde::{Deserialize, Serialize};

/// Default floor applied before taking the logarithm
pub const DEFAULT_AMIN: f32 = 1e-10;

/// Default dynamic range kept below the peak, in dB
pub const DEFAULT_TOP_DB: f32 = 80.0;

/// Parameters for [`power_to_db`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecibelParams {
    /// Minimum power fed into `log10` (must be > 0)
    pub amin: f32,
    /// Dynamic range below the peak to keep; `None` disables the clamp
    pub top_db: Option<f32>,
}

impl Default for DecibelParams {
    fn default() -> Self {
        Self {
            amin: DEFAULT_AMIN,
            top_db: Some(DEFAULT_TOP_DB),
        }
    }
}

impl DecibelParams {
    /// Check `amin > 0` and `top_db >= 0`
    pub fn validate(&self) -> Result<(), MonitorError> {
        if !self.amin.is_finite() || self.amin <= 0.0 {
            return Err(MonitorError::InvalidConfig(format!(
                "amin must be finite and > 0, got {}",
                self.amin
            )));
        }
        if let Some(top_db) = self.top_db {
            if !top_db.is_finite() || top_db < 0.0 {
                return Err(MonitorError::InvalidConfig(format!(
                    "top_db must be finite and >= 0, got {}",
                    top_db
                )));
            }
        }
        Ok(())
    }
}

/// Convert a power grid to decibels relative to its peak, taking ownership
///
/// Callers that still need the power values must clone before calling.
///
/// # Errors
///
/// Returns `MonitorError::InvalidConfig` if `params` fail validation.
pub fn power_to_db(
    mut matrix: SpectralMatrix,
    params: &DecibelParams,
) -> Result<SpectralMatrix, MonitorError> {
    power_to_db_in_place(&mut matrix, params)?;
    Ok(matrix)
}

/// Convert a power grid to decibels relative to its peak, in place
///
/// Each element becomes
/// `10·log10(max(v, amin)) − 10·log10(max(peak, amin))`, computed in `f64`,
/// then clamped to `new_peak − top_db`.
///
/// # Errors
///
/// Returns `MonitorError::InvalidConfig` if `params` fail validation. The
/// matrix is untouched in that case.
pub fn power_to_db_in_place(
    matrix: &mut SpectralMatrix,
    params: &DecibelParams,
) -> Result<(), MonitorError> {
    params.validate()?;

    let amin = f64::from(params.amin);

    // Pass 1: reference peak before conversion
    let peak = f64::from(max_value(matrix));
    let reference_db = 10.0 * peak.max(amin).log10();

    for value in matrix.as_mut_slice() {
        let power = f64::from(*value).max(amin);
        *value = (10.0 * power.log10() - reference_db) as f32;
    }

    // Pass 2: clamp against the converted peak. The floor makes the
    // converted peak exactly 0.0; it is still rescanned rather than assumed.
    if let Some(top_db) = params.top_db {
        let floor = max_value(matrix) - top_db;
        for value in matrix.as_mut_slice() {
            if *value < floor {
                *value = floor;
            }
        }
    }

    log::debug!(
        "Converted {}x{} power grid to dB (peak power {:.3e}, top_db {:?})",
        matrix.rows(),
        matrix.cols(),
        peak,
        params.top_db
    );

    Ok(())
}
