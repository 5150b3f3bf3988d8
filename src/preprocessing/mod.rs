//! Audio preprocessing modules
//!
//! Utilities applied to a captured window before spectral analysis:
//! - Standardization (zero mean, unit standard deviation)

pub mod normalization;
