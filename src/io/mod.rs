//! Audio I/O modules
//!
//! The shared sliding window and capture sources that feed it.

pub mod sample_buffer;
pub mod wav_source;
