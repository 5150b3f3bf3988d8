//! Sliding window over the most recent audio samples
//!
//! One producer (the capture thread) appends chunks while one consumer (the
//! periodic tick) takes snapshots. All access goes through a single mutex
//! that owns the storage; critical sections are a bounded memory shift or
//! copy with no I/O inside.
//!
//! Closing the window is also done under that mutex, so once
//! [`SlidingSampleBuffer::close`] returns no append can land, whatever the
//! producer thread is doing.
//!
//! # Example
//!
//! ```
//! use spectral_sentinel::io::sample_buffer::SlidingSampleBuffer;
//! use std::num::NonZeroU32;
//!
//! let buffer = SlidingSampleBuffer::new(4)?;
//! let unit = NonZeroU32::MIN;
//! buffer.append(&[9i16, 8], unit);
//! buffer.append(&[7i16, 6], unit);
//! buffer.append(&[5i16, 4, 3], unit);
//! assert_eq!(buffer.snapshot(), vec![6.0, 5.0, 4.0, 3.0]);
//! # Ok::<(), spectral_sentinel::MonitorError>(())
//! ```

use crate::error::MonitorError;
use crate::preprocessing::normalization::standardize;
use std::num::NonZeroU32;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Full-scale constant for signed 16-bit PCM
pub const I16_FULL_SCALE: NonZeroU32 = match NonZeroU32::new(i16::MAX as u32) {
    Some(scale) => scale,
    None => panic!("i16::MAX is non-zero"),
};

/// Fixed-capacity, time-ordered window of normalized samples (oldest first)
#[derive(Debug)]
pub struct SlidingSampleBuffer {
    capacity: usize,
    window: Mutex<Window>,
}

#[derive(Debug)]
struct Window {
    samples: Vec<f32>,
    closed: bool,
}

impl SlidingSampleBuffer {
    /// Create a window of `capacity` samples, all zero
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::InvalidInput` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, MonitorError> {
        if capacity == 0 {
            return Err(MonitorError::InvalidInput(
                "Sample buffer capacity must be > 0".to_string(),
            ));
        }

        log::debug!("Allocating sliding sample buffer of {} samples", capacity);

        Ok(Self {
            capacity,
            window: Mutex::new(Window {
                samples: vec![0.0; capacity],
                closed: false,
            }),
        })
    }

    /// Create a window holding `window_seconds` of audio at `sample_rate`
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::InvalidInput` if the resulting capacity is zero
    /// or `window_seconds` is not finite.
    pub fn with_window(sample_rate: u32, window_seconds: f32) -> Result<Self, MonitorError> {
        if !window_seconds.is_finite() || window_seconds <= 0.0 {
            return Err(MonitorError::InvalidInput(format!(
                "Window length must be finite and > 0, got {} s",
                window_seconds
            )));
        }
        let capacity = (f64::from(sample_rate) * f64::from(window_seconds)).round() as usize;
        Self::new(capacity)
    }

    /// Number of samples in the window
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current length, always equal to [`capacity`](Self::capacity)
    pub fn len(&self) -> usize {
        self.lock().samples.len()
    }

    /// Always `false`; a window cannot be created empty
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Slide the window forward by one chunk of integer PCM samples
    ///
    /// Each sample is divided by `full_scale`. Inputs larger than
    /// `full_scale` produce values outside `[-1, 1]`; that is the caller's
    /// concern, not an error. The oldest `k` stored values are discarded
    /// and the `k` new values are written at the tail. When the chunk is
    /// longer than the window only its trailing `capacity` samples are kept.
    ///
    /// Readers see either the state before or after the whole append.
    ///
    /// Returns `false` if the window has been [closed](Self::close) and the
    /// chunk was discarded.
    pub fn append<T>(&self, chunk: &[T], full_scale: NonZeroU32) -> bool
    where
        T: Copy + Into<f64>,
    {
        if chunk.is_empty() {
            return !self.is_closed();
        }

        let incoming = if chunk.len() > self.capacity {
            &chunk[chunk.len() - self.capacity..]
        } else {
            chunk
        };
        let k = incoming.len();
        let scale = f64::from(full_scale.get());

        let mut window = self.lock();
        if window.closed {
            return false;
        }
        let samples = &mut window.samples;
        samples.copy_within(k.., 0);
        let tail_start = self.capacity - k;
        for (slot, &sample) in samples[tail_start..].iter_mut().zip(incoming) {
            *slot = (sample.into() / scale) as f32;
        }
        true
    }

    /// Refuse all further appends
    ///
    /// Takes the same lock as [`append`](Self::append), so an append in
    /// progress completes first and none starts afterwards. Snapshots keep
    /// working on the frozen window.
    pub fn close(&self) {
        self.lock().closed = true;
    }

    /// `true` once [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Independent copy of the current window
    pub fn snapshot(&self) -> Vec<f32> {
        self.lock().samples.clone()
    }

    /// Copy of the current window rescaled to zero mean and unit std
    ///
    /// Statistics are computed over the copy taken under the lock, so they
    /// describe exactly the returned instant. A constant window (zero
    /// variance) yields all zeros.
    pub fn snapshot_normalized(&self) -> Vec<f32> {
        let mut window = self.snapshot();
        standardize(&mut window);
        window
    }

    fn lock(&self) -> MutexGuard<'_, Window> {
        // Every append leaves a complete window, so a poisoned lock still
        // guards valid data.
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
