//! Spectral matrix post-processing
//!
//! Everything applied to the power grid returned by the external
//! spectrogram generator:
//! - Min/max scan
//! - Decibel conversion (floor + dynamic range clamp)
//! - Min-max and calibrated mean/std normalization

pub mod decibel;
pub mod matrix;
pub mod normalization;
pub mod stats;

pub use decibel::{power_to_db, power_to_db_in_place, DecibelParams};
pub use matrix::SpectralMatrix;
pub use normalization::{mean_std_normalize, min_max_normalize, Calibration};
pub use stats::min_max;
