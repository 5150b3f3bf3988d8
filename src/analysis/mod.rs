//! Analysis of classifier output
//!
//! Turning per-window scores into alarm events and per-tick reports.

pub mod detection;
pub mod result;

pub use detection::{DetectionEvent, DetectionLatch};
pub use result::{FeatureFrame, TickReport};
