//! Feature extraction modules
//!
//! Post-processing of spectral grids into model features and display
//! images.

pub mod spectral;
