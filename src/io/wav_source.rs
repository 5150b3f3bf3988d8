//! WAV file replay as a capture source
//!
//! Feeds 16-bit PCM from a file into the monitor as if it came from a
//! microphone. Multi-channel files are mixed down to mono by averaging each
//! frame. With pacing enabled each chunk is delayed by its own duration so
//! the producer runs at real-time speed.

use crate::error::MonitorError;
use crate::pipeline::CaptureSource;
use hound::{SampleFormat, WavReader};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::thread;
use std::time::Duration;

/// Capture source reading 16-bit integer PCM from a WAV stream
pub struct WavFileSource<R: Read> {
    reader: WavReader<R>,
    sample_rate: u32,
    channels: u16,
    realtime: bool,
}

impl WavFileSource<BufReader<File>> {
    /// Open a WAV file
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::Wav` if the file cannot be read and
    /// `MonitorError::InvalidInput` if it is not 16-bit integer PCM.
    pub fn open<P: AsRef<Path>>(path: P, realtime: bool) -> Result<Self, MonitorError> {
        log::debug!("Opening WAV capture source: {}", path.as_ref().display());
        Self::new(WavReader::open(path)?, realtime)
    }
}

impl<R: Read> WavFileSource<R> {
    /// Wrap an already opened reader
    pub fn new(reader: WavReader<R>, realtime: bool) -> Result<Self, MonitorError> {
        let spec = reader.spec();

        if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
            return Err(MonitorError::InvalidInput(format!(
                "Expected 16-bit integer PCM, got {}-bit {:?}",
                spec.bits_per_sample, spec.sample_format
            )));
        }
        if spec.channels == 0 || spec.sample_rate == 0 {
            return Err(MonitorError::InvalidInput(format!(
                "Invalid WAV spec: {} channels at {} Hz",
                spec.channels, spec.sample_rate
            )));
        }

        Ok(Self {
            reader,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            realtime,
        })
    }

    /// Sample rate of the file in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl<R: Read + Send> CaptureSource for WavFileSource<R> {
    fn read_chunk(&mut self, chunk: &mut [i16]) -> Result<usize, MonitorError> {
        let channels = usize::from(self.channels);
        let mut samples = self.reader.samples::<i16>();
        let mut frames = 0;

        'frames: for slot in chunk.iter_mut() {
            let mut sum = 0i32;
            for _ in 0..channels {
                match samples.next() {
                    Some(sample) => sum += i32::from(sample?),
                    // A trailing partial frame is dropped
                    None => break 'frames,
                }
            }
            *slot = (sum / channels as i32) as i16;
            frames += 1;
        }

        if self.realtime && frames > 0 {
            thread::sleep(Duration::from_secs_f64(
                frames as f64 / f64::from(self.sample_rate),
            ));
        }

        Ok(frames)
    }
}
