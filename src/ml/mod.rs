//! Model-facing contract
//!
//! The classifier itself lives outside this crate; this module owns the
//! shape check and flattening of its input.

pub mod model_input;

pub use model_input::{FeatureShape, ModelInput};
