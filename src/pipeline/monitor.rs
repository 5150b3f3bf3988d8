//! Capture producer and periodic consumer threads
//!
//! The two threads never call each other; they only share the
//! [`SlidingSampleBuffer`]. The producer appends as fast as the source
//! delivers and is never throttled by a slow consumer: old audio is simply
//! overwritten. The consumer runs [`Pipeline::tick`] at a fixed rate and
//! publishes reports on a bounded channel, dropping them if nobody reads.

use super::{CaptureSource, Classifier, Pipeline, SpectrogramGenerator};
use crate::analysis::result::TickReport;
use crate::error::MonitorError;
use crate::io::sample_buffer::SlidingSampleBuffer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Reports kept for a reader before newer ones are dropped
pub const REPORT_BACKLOG: usize = 64;

/// Longest [`Monitor::stop_capture`] waits for the producer to exit
///
/// The window is closed before waiting, so a producer stuck in a device
/// read past this point is detached and can no longer touch the buffer.
pub const CAPTURE_STOP_GRACE: Duration = Duration::from_millis(100);

/// Running capture + analysis session
pub struct Monitor {
    buffer: Arc<SlidingSampleBuffer>,
    capture_stop: Arc<AtomicBool>,
    capture_thread: Option<JoinHandle<()>>,
    tick_shutdown: Option<SyncSender<()>>,
    tick_thread: Option<JoinHandle<()>>,
    reports: Receiver<TickReport>,
}

impl Monitor {
    /// Allocate the window and start both threads
    ///
    /// Window size, capture chunk size and tick interval come from the
    /// pipeline's configuration.
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::InvalidInput` if the window is empty and
    /// `MonitorError::Io` if a thread cannot be spawned. On error the
    /// window is closed, so a producer already started can no longer
    /// append.
    pub fn start<S, G, C>(source: S, pipeline: Pipeline<G, C>) -> Result<Self, MonitorError>
    where
        S: CaptureSource + Send + 'static,
        G: SpectrogramGenerator + Send + 'static,
        C: Classifier + Send + 'static,
    {
        let config = pipeline.config();
        let buffer = Arc::new(SlidingSampleBuffer::new(config.window_capacity())?);
        let chunk_size = config.capture_chunk_size;
        let interval = config.tick_interval();

        log::debug!(
            "Starting monitor: window={} samples, chunk={}, tick={:?}",
            buffer.capacity(),
            chunk_size,
            interval
        );

        let capture_stop = Arc::new(AtomicBool::new(false));
        let capture_thread = {
            let buffer = Arc::clone(&buffer);
            let stop = Arc::clone(&capture_stop);
            thread::Builder::new()
                .name("audio-capture".to_string())
                .spawn(move || run_capture(source, &buffer, &stop, chunk_size))?
        };

        let (report_tx, reports) = mpsc::sync_channel(REPORT_BACKLOG);
        let (shutdown_tx, shutdown_rx) = mpsc::sync_channel(1);
        let tick_thread = {
            let buffer = Arc::clone(&buffer);
            thread::Builder::new()
                .name("spectral-tick".to_string())
                .spawn(move || run_ticks(pipeline, &buffer, interval, &shutdown_rx, &report_tx))
        };

        let tick_thread = match tick_thread {
            Ok(handle) => handle,
            Err(e) => {
                // Detach the producer; the closed window ignores it
                capture_stop.store(true, Ordering::Release);
                buffer.close();
                drop(capture_thread);
                return Err(e.into());
            }
        };

        Ok(Self {
            buffer,
            capture_stop,
            capture_thread: Some(capture_thread),
            tick_shutdown: Some(shutdown_tx),
            tick_thread: Some(tick_thread),
            reports,
        })
    }

    /// Shared window; may be snapshotted at any time, including after stop
    pub fn buffer(&self) -> Arc<SlidingSampleBuffer> {
        Arc::clone(&self.buffer)
    }

    /// Tick reports in order of production
    pub fn reports(&self) -> &Receiver<TickReport> {
        &self.reports
    }

    /// `true` while the producer thread is still appending
    pub fn is_capturing(&self) -> bool {
        self.capture_thread
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the producer
    ///
    /// Once this returns no further append can reach the buffer. Ticking
    /// continues over the frozen window. Waits up to
    /// [`CAPTURE_STOP_GRACE`] for the producer thread to exit; a thread
    /// still blocked in the source after that is detached.
    pub fn stop_capture(&mut self) {
        self.capture_stop.store(true, Ordering::Release);
        self.buffer.close();

        let Some(handle) = self.capture_thread.take() else {
            return;
        };

        let deadline = Instant::now() + CAPTURE_STOP_GRACE;
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }

        if handle.is_finished() {
            if handle.join().is_err() {
                log::error!("Capture thread panicked");
            }
            log::debug!("Capture stopped");
        } else {
            log::warn!(
                "Capture source still blocked after {:?}, detaching producer thread",
                CAPTURE_STOP_GRACE
            );
        }
    }

    /// Stop capture, then stop ticking and wait for the tick thread
    pub fn shutdown(mut self) {
        self.stop_all();
    }

    fn stop_all(&mut self) {
        self.stop_capture();

        // Dropping the sender wakes the tick thread immediately
        self.tick_shutdown.take();
        if let Some(handle) = self.tick_thread.take() {
            if handle.join().is_err() {
                log::error!("Tick thread panicked");
            }
            log::debug!("Ticking stopped");
        }
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.stop_all();
    }
}

fn run_capture<S: CaptureSource>(
    mut source: S,
    buffer: &SlidingSampleBuffer,
    stop: &AtomicBool,
    chunk_size: usize,
) {
    let full_scale = source.full_scale();
    let mut chunk = vec![0i16; chunk_size];
    let mut total_samples: u64 = 0;

    while !stop.load(Ordering::Acquire) {
        match source.read_chunk(&mut chunk) {
            Ok(0) => {
                log::debug!("Capture source exhausted after {} samples", total_samples);
                break;
            }
            Ok(n) => {
                let n = n.min(chunk.len());
                if !buffer.append(&chunk[..n], full_scale) {
                    break;
                }
                total_samples += n as u64;
            }
            Err(e) => {
                log::error!("Capture stopped after {} samples: {}", total_samples, e);
                break;
            }
        }
    }
}

fn run_ticks<G, C>(
    mut pipeline: Pipeline<G, C>,
    buffer: &SlidingSampleBuffer,
    interval: Duration,
    shutdown: &Receiver<()>,
    reports: &SyncSender<TickReport>,
) where
    G: SpectrogramGenerator,
    C: Classifier,
{
    let mut deadline = Instant::now() + interval;

    loop {
        let wait = deadline.saturating_duration_since(Instant::now());
        match shutdown.recv_timeout(wait) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }

        match pipeline.tick(buffer) {
            Ok(report) => match reports.try_send(report) {
                Ok(()) => {}
                Err(TrySendError::Full(report)) => {
                    log::debug!("Report backlog full, dropping tick {}", report.sequence);
                }
                Err(TrySendError::Disconnected(_)) => {}
            },
            Err(e) => log::warn!("Tick skipped: {}", e),
        }

        deadline += interval;
        let now = Instant::now();
        if deadline < now {
            log::debug!("Tick overran its period by {:?}, skipping ahead", now - deadline);
            deadline = now + interval;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorConfig;
    use crate::features::spectral::SpectralMatrix;
    use crate::ml::model_input::{FeatureShape, ModelInput};
    use crate::pipeline::SpectrogramParams;

    /// Endless source producing a ramp, one millisecond per chunk
    struct RampSource {
        next: i16,
    }

    impl CaptureSource for RampSource {
        fn read_chunk(&mut self, chunk: &mut [i16]) -> Result<usize, MonitorError> {
            for slot in chunk.iter_mut() {
                *slot = self.next;
                self.next = self.next.wrapping_add(1);
            }
            thread::sleep(Duration::from_millis(1));
            Ok(chunk.len())
        }
    }

    fn test_config() -> MonitorConfig {
        MonitorConfig {
            sample_rate: 64,
            window_seconds: 1.0,
            capture_chunk_size: 16,
            tick_interval_ms: 10,
            n_mels: 4,
            feature_shape: FeatureShape::new(4, 4),
            ..MonitorConfig::default()
        }
    }

    fn block_generator(
        samples: &[f32],
        params: &SpectrogramParams,
    ) -> Result<SpectralMatrix, MonitorError> {
        let data: Vec<f32> = samples
            .chunks(samples.len() / 16)
            .map(|c| c.iter().map(|v| v * v).sum::<f32>() + 1e-6)
            .collect();
        SpectralMatrix::new(params.n_bands, 4, data)
    }

    fn zero_score() -> impl FnMut(&ModelInput) -> Result<f32, MonitorError> + Send {
        |_| Ok(0.0)
    }

    #[test]
    fn test_reports_flow_and_stop_freezes_window() {
        let pipeline = Pipeline::new(test_config(), block_generator, zero_score()).unwrap();
        let mut monitor = Monitor::start(RampSource { next: 1 }, pipeline).unwrap();

        let report = monitor
            .reports()
            .recv_timeout(Duration::from_secs(5))
            .expect("a tick report");
        assert_eq!(report.feature_shape, FeatureShape::new(4, 4));
        assert!(monitor.is_capturing());

        monitor.stop_capture();
        assert!(!monitor.is_capturing());

        let buffer = monitor.buffer();
        let frozen = buffer.snapshot();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(buffer.snapshot(), frozen);
        assert_eq!(frozen.len(), 64);

        // Ticking keeps running on the frozen window
        while monitor.reports().try_recv().is_ok() {}
        assert!(monitor
            .reports()
            .recv_timeout(Duration::from_secs(5))
            .is_ok());

        monitor.shutdown();
        assert_eq!(buffer.snapshot(), frozen);
    }

    #[test]
    fn test_stop_does_not_wait_for_blocked_source() {
        /// Delivers one chunk, then blocks far longer than any test waits
        struct Stalled {
            delivered: bool,
        }

        impl CaptureSource for Stalled {
            fn read_chunk(&mut self, chunk: &mut [i16]) -> Result<usize, MonitorError> {
                if self.delivered {
                    thread::sleep(Duration::from_secs(3));
                }
                self.delivered = true;
                chunk.fill(500);
                Ok(chunk.len())
            }
        }

        let pipeline = Pipeline::new(test_config(), block_generator, zero_score()).unwrap();
        let mut monitor = Monitor::start(Stalled { delivered: false }, pipeline).unwrap();
        let buffer = monitor.buffer();

        let deadline = Instant::now() + Duration::from_secs(2);
        while buffer.snapshot()[63] == 0.0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        let frozen = buffer.snapshot();
        assert_ne!(frozen[63], 0.0);

        let started = Instant::now();
        monitor.stop_capture();
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(buffer.is_closed());
        assert!(!monitor.is_capturing());

        // The detached read returns after 3 s; its chunk must be discarded
        thread::sleep(Duration::from_millis(50));
        assert_eq!(buffer.snapshot(), frozen);

        let started = Instant::now();
        monitor.shutdown();
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_exhausted_source_ends_capture() {
        struct Finite(usize);
        impl CaptureSource for Finite {
            fn read_chunk(&mut self, chunk: &mut [i16]) -> Result<usize, MonitorError> {
                if self.0 == 0 {
                    return Ok(0);
                }
                self.0 -= 1;
                chunk.fill(100);
                Ok(chunk.len())
            }
        }

        let pipeline = Pipeline::new(test_config(), block_generator, zero_score()).unwrap();
        let monitor = Monitor::start(Finite(2), pipeline).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while monitor.is_capturing() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(!monitor.is_capturing());

        let window = monitor.buffer().snapshot();
        let expected = 100.0 / f32::from(i16::MAX);
        assert!(window[32..].iter().all(|&v| v == expected));
        assert!(window[..32].iter().all(|&v| v == 0.0));
    }
}
