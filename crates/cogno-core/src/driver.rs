use anyhow::Result;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

use crate::monitor::StepOutcome;
use crate::recorder::SessionRecorder;
use crate::session::FocusSession;

/// Drives a `FocusSession` at the display frame rate until Ctrl-C, a stop
/// request, or a terminal failure
pub struct FocusDaemon {
    session: FocusSession,
    recorder: Option<SessionRecorder>,
    frame_interval: Duration,
    max_ticks: Option<u64>,
}

impl FocusDaemon {
    #[must_use]
    pub fn new(session: FocusSession, frame_interval: Duration) -> Self {
        Self {
            session,
            recorder: None,
            frame_interval,
            max_ticks: None,
        }
    }

    /// Persist the run through `recorder`
    #[must_use]
    pub fn with_recorder(mut self, recorder: SessionRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Stop after this many scheduling ticks
    #[must_use]
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    #[must_use]
    pub const fn session(&self) -> &FocusSession {
        &self.session
    }

    #[must_use]
    pub fn into_recorder(mut self) -> Option<SessionRecorder> {
        self.recorder.take()
    }

    /// Run until shut down.
    ///
    /// # Errors
    ///
    /// Returns an error if the session fails to initialize
    pub async fn run_with_signals(&mut self) -> Result<()> {
        if let Err(e) = self.session.start().await {
            self.session.stop().await;
            return Err(e.into());
        }

        if let Some(recorder) = self.recorder.as_mut() {
            if let Err(e) = recorder.begin(chrono::Utc::now()) {
                log::warn!("Failed to record focus session: {e}");
                self.recorder = None;
            }
        }

        let stop = self.session.stop_handle();
        let mut interval = interval(self.frame_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        log::info!(
            "Focus monitor started ({} ms per tick)",
            self.frame_interval.as_millis()
        );

        let mut ticks: u64 = 0;
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let outcome = self.session.step().await;
                    self.record(&outcome);
                    ticks += 1;
                }
                _ = tokio::signal::ctrl_c() => {
                    log::info!("Received Ctrl-C, shutting down...");
                    stop.stop();
                }
            }

            if self.max_ticks.is_some_and(|max| ticks >= max) {
                stop.stop();
            }
            if stop.is_stopped() || self.session.is_failed() {
                break;
            }
        }

        let failure = self.session.failure().cloned();
        self.session.stop().await;
        if let Some(recorder) = self.recorder.as_mut() {
            if let Err(e) = recorder.finish(chrono::Utc::now()) {
                log::warn!("Failed to finalize focus session: {e}");
            }
        }

        match failure {
            Some(e) => Err(e.into()),
            None => {
                log::info!("Focus monitor shut down gracefully.");
                Ok(())
            }
        }
    }

    fn record(&mut self, outcome: &StepOutcome) {
        let StepOutcome::Classified(classified) = outcome else {
            return;
        };
        if let Some(recorder) = self.recorder.as_mut() {
            if let Err(e) = recorder.observe(classified, chrono::Utc::now()) {
                log::warn!("Failed to record tick: {e}");
            }
        }
    }
}
