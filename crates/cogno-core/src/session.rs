use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::task::{JoinError, JoinHandle};

use crate::capture::{
    AlertSound, CameraSource, CaptureRequest, DetectorLoader, DetectorOptions, LandmarkDetector,
    StatusSurface, VideoStream,
};
use crate::classifier::FocusState;
use crate::config::Config;
use crate::error::MonitorError;
use crate::monitor::{Classified, FocusMonitor, Poll, SkipReason, StepOutcome};

#[cfg(test)]
mod tests;

type LoadResult = Result<Box<dyn LandmarkDetector>, MonitorError>;
type PendingLoad = JoinHandle<LoadResult>;

/// Shareable stop flag for a session
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One monitoring session: owns the camera stream, the detector and the
/// alert bookkeeping from `start` to `stop`.
pub struct FocusSession {
    config: Config,
    camera: Arc<dyn CameraSource>,
    loader: Arc<dyn DetectorLoader>,
    surface: Box<dyn StatusSurface>,
    sound: Box<dyn AlertSound>,
    monitor: FocusMonitor,
    stream: Option<Box<dyn VideoStream>>,
    detector: Option<Box<dyn LandmarkDetector>>,
    pending_load: Option<PendingLoad>,
    stop: StopHandle,
    status: String,
    failure: Option<MonitorError>,
    released: bool,
}

impl FocusSession {
    #[must_use]
    pub fn new(
        config: Config,
        camera: Arc<dyn CameraSource>,
        loader: Arc<dyn DetectorLoader>,
        surface: Box<dyn StatusSurface>,
        sound: Box<dyn AlertSound>,
    ) -> Self {
        let monitor = FocusMonitor::new(&config.monitor, Instant::now());
        Self {
            config,
            camera,
            loader,
            surface,
            sound,
            monitor,
            stream: None,
            detector: None,
            pending_load: None,
            stop: StopHandle::default(),
            status: FocusState::Initializing.description().to_string(),
            failure: None,
            released: false,
        }
    }

    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    #[must_use]
    pub const fn state(&self) -> FocusState {
        self.monitor.state()
    }

    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// The terminal initialization failure, if any
    #[must_use]
    pub const fn failure(&self) -> Option<&MonitorError> {
        self.failure.as_ref()
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        self.monitor.is_failed()
    }

    #[must_use]
    pub fn is_detector_ready(&self) -> bool {
        self.detector.is_some()
    }

    /// Begin loading the detector in the background and open the camera.
    ///
    /// Steps are skipped until the detector finishes loading. Starting an
    /// already started session acquires nothing new.
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::CameraUnavailable` if the camera cannot be
    /// opened, or the earlier failure if the session already failed. The
    /// failure is terminal and shown on the status surface.
    pub async fn start(&mut self) -> Result<(), MonitorError> {
        if self.stop.is_stopped() {
            return Ok(());
        }
        if let Some(e) = &self.failure {
            return Err(e.clone());
        }
        if self.stream.is_some() || self.detector.is_some() || self.pending_load.is_some() {
            log::debug!("Focus session already started");
            return Ok(());
        }

        self.set_status("Loading detector...");
        let loader = Arc::clone(&self.loader);
        let options = DetectorOptions::from_config(&self.config.detector);
        self.pending_load = Some(tokio::spawn(async move { loader.load(&options).await }));

        self.set_status("Starting camera...");
        let request = CaptureRequest::from_config(&self.config.camera);
        match self.camera.open(&request).await {
            Ok(stream) => {
                log::info!(
                    "Camera stream acquired ({}x{})",
                    request.width,
                    request.height
                );
                self.stream = Some(stream);
            }
            Err(e) => {
                self.fail(&e);
                return Err(e);
            }
        }

        if !self.is_detector_ready() {
            self.set_status("Waiting for detector...");
        }
        Ok(())
    }

    /// Wait for a pending detector load to finish and install it.
    ///
    /// # Errors
    ///
    /// Returns the session's terminal failure, e.g. `MonitorError::ModelLoadError`
    pub async fn wait_for_detector(&mut self) -> Result<(), MonitorError> {
        if let Some(handle) = self.pending_load.take() {
            self.install(handle.await);
        }
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    /// Run one scheduling tick at the current time
    pub async fn step(&mut self) -> StepOutcome {
        self.step_at(Instant::now()).await
    }

    /// Run one scheduling tick submitted at `now`. Classification is
    /// timed at `now` plus however long the detector took.
    pub async fn step_at(&mut self, now: Instant) -> StepOutcome {
        if self.stop.is_stopped() {
            self.monitor.stop();
            return StepOutcome::Skipped(SkipReason::Stopped);
        }

        if self
            .pending_load
            .as_ref()
            .is_some_and(JoinHandle::is_finished)
        {
            if let Some(handle) = self.pending_load.take() {
                self.install(handle.await);
            }
        }

        let timestamp_ms = match self.monitor.poll(now) {
            Poll::Submit { timestamp_ms } => timestamp_ms,
            Poll::Skip(reason) => {
                log::trace!("Tick skipped: {reason:?}");
                return StepOutcome::Skipped(reason);
            }
        };

        let Some(frame) = self.stream.as_mut().and_then(|s| s.current_frame()) else {
            self.monitor.abandon();
            return StepOutcome::Skipped(SkipReason::NoFrame);
        };
        let Some(detector) = self.detector.as_mut() else {
            self.monitor.abandon();
            return StepOutcome::Skipped(SkipReason::DetectorNotReady);
        };

        let submitted = Instant::now();
        let result = detector.detect(&frame, timestamp_ms).await;
        // The alert cooldown is measured at completion, not submission
        let completed = now + submitted.elapsed();

        // A stop issued while the detector ran discards its result
        if self.stop.is_stopped() {
            self.monitor.stop();
        }

        let outcome = self.monitor.on_detection(result, completed);
        if let StepOutcome::Classified(classified) = outcome {
            self.apply(&classified);
        }
        outcome
    }

    /// Tear the session down: stop ticking, close the detector, stop the camera.
    ///
    /// Idempotent, and safe before `start` or after a failed `start`.
    pub async fn stop(&mut self) {
        self.stop.stop();
        self.monitor.stop();

        // A finished load still owns a detector that must be closed
        if let Some(handle) = self.pending_load.take() {
            if handle.is_finished() {
                if let Ok(Ok(mut detector)) = handle.await {
                    detector.close();
                }
            } else {
                handle.abort();
            }
        }

        if !self.released {
            self.release();
            self.set_status("Stopped");
            log::info!("Focus session stopped");
        }
    }

    fn install(&mut self, loaded: Result<LoadResult, JoinError>) {
        match loaded {
            Ok(Ok(mut detector)) => {
                if self.monitor.is_failed() || self.stop.is_stopped() {
                    detector.close();
                    return;
                }
                self.detector = Some(detector);
                self.monitor.mark_detector_ready();
                self.set_status("Detecting...");
                log::info!("Landmark detector ready");
            }
            Ok(Err(e)) => self.fail(&e),
            Err(e) => self.fail(&MonitorError::ModelLoadError(e.to_string())),
        }
    }

    fn apply(&mut self, classified: &Classified) {
        let state = classified.state;
        self.set_status(state.description());
        self.surface.set_tint(state.is_distracted());

        if classified.alert {
            if let Err(e) = self.sound.play() {
                log::debug!("Alert playback failed: {e}");
            }
        }

        if classified.changed() {
            log::info!("Focus state: {} -> {}", classified.previous, state);
        }
    }

    fn fail(&mut self, error: &MonitorError) {
        log::error!("Focus session failed: {error}");
        self.monitor.mark_failed();
        self.failure = Some(error.clone());
        self.set_status(&format!("Init failed: {error}"));
        if let Some(handle) = self.pending_load.take() {
            handle.abort();
        }
        self.release();
    }

    fn release(&mut self) {
        if let Some(mut detector) = self.detector.take() {
            detector.close();
        }
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
        }
        self.surface.set_tint(false);
        self.released = true;
    }

    fn set_status(&mut self, status: &str) {
        if self.status != status {
            log::debug!("Status: {status}");
        }
        self.status = status.to_string();
        self.surface.set_status(status);
    }
}

impl Drop for FocusSession {
    fn drop(&mut self) {
        self.stop.stop();
        if let Some(handle) = self.pending_load.take() {
            handle.abort();
        }
        if let Some(mut detector) = self.detector.take() {
            detector.close();
        }
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
        }
    }
}
