//! Score thresholding with an alarm hold
//!
//! A classifier score strictly above the threshold raises the alarm and
//! keeps it up for `hold_ticks` ticks. Further high scores while the alarm
//! is up re-arm the hold without raising a second trigger, so one sustained
//! event produces one [`DetectionEvent::Triggered`].

use crate::error::MonitorError;
use serde::{Deserialize, Serialize};

/// Default score above which a detection is reported
pub const DEFAULT_DETECTION_THRESHOLD: f32 = 0.8;

/// Default number of ticks the alarm stays up after the last detection
pub const DEFAULT_HOLD_TICKS: u32 = 5;

/// Latch state transition produced by one score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectionEvent {
    /// Alarm raised by this tick
    Triggered,
    /// Alarm still held from an earlier trigger
    Active,
    /// First tick without the alarm after it was up
    Cleared,
    /// No alarm
    Idle,
}

impl DetectionEvent {
    /// `true` while the alarm is up (triggered or held)
    pub fn is_alarm(&self) -> bool {
        matches!(self, DetectionEvent::Triggered | DetectionEvent::Active)
    }
}

/// Threshold plus hold counter
#[derive(Debug, Clone)]
pub struct DetectionLatch {
    threshold: f32,
    hold_ticks: u32,
    remaining: u32,
    alarm: bool,
}

impl DetectionLatch {
    /// Create a latch
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::InvalidConfig` if `threshold` is not finite or
    /// `hold_ticks` is zero.
    pub fn new(threshold: f32, hold_ticks: u32) -> Result<Self, MonitorError> {
        if !threshold.is_finite() {
            return Err(MonitorError::InvalidConfig(format!(
                "Detection threshold must be finite, got {}",
                threshold
            )));
        }
        if hold_ticks == 0 {
            return Err(MonitorError::InvalidConfig(
                "Alarm hold must be at least one tick".to_string(),
            ));
        }

        Ok(Self {
            threshold,
            hold_ticks,
            remaining: 0,
            alarm: false,
        })
    }

    /// Feed one classifier score
    ///
    /// The triggering tick counts toward the hold, so the alarm is up for
    /// `hold_ticks` ticks and [`DetectionEvent::Cleared`] follows on the
    /// next one, even with a one-tick hold.
    pub fn update(&mut self, score: f32) -> DetectionEvent {
        let was_alarm = self.alarm;
        let mut triggered = false;

        if score > self.threshold {
            triggered = self.remaining == 0;
            self.remaining = self.hold_ticks;
        }

        self.remaining = self.remaining.saturating_sub(1);

        let event = if triggered {
            log::debug!("Detection triggered (score {:.3} > {:.3})", score, self.threshold);
            DetectionEvent::Triggered
        } else if self.remaining > 0 {
            DetectionEvent::Active
        } else if was_alarm {
            DetectionEvent::Cleared
        } else {
            DetectionEvent::Idle
        };

        self.alarm = event.is_alarm();
        event
    }

    /// Ticks left before the alarm clears
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Drop any held alarm
    pub fn reset(&mut self) {
        self.remaining = 0;
        self.alarm = false;
    }
}

impl Default for DetectionLatch {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_DETECTION_THRESHOLD,
            hold_ticks: DEFAULT_HOLD_TICKS,
            remaining: 0,
            alarm: false,
        }
    }
}
