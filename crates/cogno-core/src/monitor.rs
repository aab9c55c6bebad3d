//! Tick state machine of the distraction monitor, free of I/O.
//!
//! A driver calls [`FocusMonitor::poll`] once per scheduling tick. When it
//! answers [`Poll::Submit`], the driver runs the detector and hands the
//! outcome to [`FocusMonitor::on_detection`]. Until then every further poll
//! is skipped, so at most one detector call is ever outstanding.

use std::mem;
use std::time::Instant;

use crate::alert::AlertGate;
use crate::classifier::{FocusClassifier, FocusState};
use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::landmarks::DetectionResult;

/// Why a tick did not reach the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Stopped,
    Failed,
    InFlight,
    DetectorNotReady,
    NoFrame,
}

/// Answer to a scheduling tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Poll {
    Submit { timestamp_ms: f64 },
    Skip(SkipReason),
}

/// A classified tick and the side effects it calls for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified {
    pub state: FocusState,
    pub previous: FocusState,
    pub alert: bool,
}

impl Classified {
    #[must_use]
    pub fn changed(&self) -> bool {
        self.state != self.previous
    }
}

/// What one tick amounted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Skipped(SkipReason),
    /// The detector returned an error; swallowed
    DetectionFailed,
    /// A result arrived after stop and was dropped
    Discarded,
    Classified(Classified),
}

pub struct FocusMonitor {
    classifier: FocusClassifier,
    gate: AlertGate,
    state: FocusState,
    epoch: Instant,
    last_timestamp_ms: f64,
    detector_ready: bool,
    in_flight: bool,
    failed: bool,
    stopped: bool,
}

impl FocusMonitor {
    #[must_use]
    pub fn new(config: &MonitorConfig, epoch: Instant) -> Self {
        Self {
            classifier: FocusClassifier::from_config(config),
            gate: AlertGate::new(config.alert_cooldown()),
            state: FocusState::Initializing,
            epoch,
            last_timestamp_ms: f64::NEG_INFINITY,
            detector_ready: false,
            in_flight: false,
            failed: false,
            stopped: false,
        }
    }

    pub fn mark_detector_ready(&mut self) {
        self.detector_ready = true;
    }

    pub fn mark_failed(&mut self) {
        self.failed = true;
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    #[must_use]
    pub const fn state(&self) -> FocusState {
        self.state
    }

    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        self.failed
    }

    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Decide whether this tick may call the detector.
    ///
    /// On `Submit` the monitor is in flight until `on_detection` or
    /// `abandon` is called.
    pub fn poll(&mut self, now: Instant) -> Poll {
        if self.stopped {
            return Poll::Skip(SkipReason::Stopped);
        }
        if self.failed {
            return Poll::Skip(SkipReason::Failed);
        }
        if self.in_flight {
            return Poll::Skip(SkipReason::InFlight);
        }
        if !self.detector_ready {
            return Poll::Skip(SkipReason::DetectorNotReady);
        }

        self.in_flight = true;
        Poll::Submit {
            timestamp_ms: self.next_timestamp(now),
        }
    }

    /// Give up a submitted tick without a detection (no frame available)
    pub fn abandon(&mut self) {
        self.in_flight = false;
    }

    /// Apply the outcome of the outstanding detector call
    pub fn on_detection(
        &mut self,
        result: Result<DetectionResult, MonitorError>,
        now: Instant,
    ) -> StepOutcome {
        self.in_flight = false;

        if self.stopped {
            return StepOutcome::Discarded;
        }

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                log::debug!("Detection failed, skipping tick: {e}");
                return StepOutcome::DetectionFailed;
            }
        };

        let state = self.classifier.classify(&result);
        let alert = self.gate.observe(state.is_distracted(), now);
        let previous = mem::replace(&mut self.state, state);

        StepOutcome::Classified(Classified {
            state,
            previous,
            alert,
        })
    }

    /// Milliseconds since the epoch, bumped if needed to stay strictly increasing
    fn next_timestamp(&mut self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.epoch).as_secs_f64() * 1000.0;
        let timestamp = if elapsed > self.last_timestamp_ms {
            elapsed
        } else {
            self.last_timestamp_ms + 0.001
        };
        self.last_timestamp_ms = timestamp;
        timestamp
    }
}
