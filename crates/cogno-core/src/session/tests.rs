use super::*;
use crate::capture::Frame;
use crate::classifier::DistractionReason;
use crate::landmarks::{
    DetectionResult, Landmark, LandmarkSetBuilder, LEFT_EYE, LEFT_FACE_EDGE, NOSE_TIP, RIGHT_EYE,
    RIGHT_FACE_EDGE,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::AtomicUsize;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;

type Script = Arc<Mutex<VecDeque<Result<DetectionResult, MonitorError>>>>;

// ============================================================================
// Test doubles
// ============================================================================

struct MockCamera {
    fail: bool,
    opens: Arc<AtomicUsize>,
    stops: Arc<AtomicUsize>,
}

struct MockStream {
    stops: Arc<AtomicUsize>,
    stopped: bool,
    sequence: u64,
}

#[async_trait]
impl CameraSource for MockCamera {
    async fn open(&self, _request: &CaptureRequest) -> Result<Box<dyn VideoStream>, MonitorError> {
        if self.fail {
            return Err(MonitorError::CameraUnavailable("permission denied".into()));
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockStream {
            stops: Arc::clone(&self.stops),
            stopped: false,
            sequence: 0,
        }))
    }
}

impl VideoStream for MockStream {
    fn current_frame(&mut self) -> Option<Frame> {
        self.sequence += 1;
        Some(Frame {
            width: 640,
            height: 480,
            sequence: self.sequence,
            pixels: Arc::from(Vec::new()),
        })
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }
}

struct MockLoader {
    fail: bool,
    gate: Option<Arc<Notify>>,
    script: Script,
    delay: Arc<Mutex<Duration>>,
    stop_on_detect: Arc<Mutex<Option<StopHandle>>>,
    closes: Arc<AtomicUsize>,
}

struct MockDetector {
    script: Script,
    delay: Arc<Mutex<Duration>>,
    stop_on_detect: Arc<Mutex<Option<StopHandle>>>,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl DetectorLoader for MockLoader {
    async fn load(
        &self,
        _options: &DetectorOptions,
    ) -> Result<Box<dyn LandmarkDetector>, MonitorError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail {
            return Err(MonitorError::ModelLoadError("asset not found".into()));
        }
        Ok(Box::new(MockDetector {
            script: Arc::clone(&self.script),
            delay: Arc::clone(&self.delay),
            stop_on_detect: Arc::clone(&self.stop_on_detect),
            closes: Arc::clone(&self.closes),
        }))
    }
}

#[async_trait]
impl LandmarkDetector for MockDetector {
    async fn detect(
        &mut self,
        _frame: &Frame,
        _timestamp_ms: f64,
    ) -> Result<DetectionResult, MonitorError> {
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Some(handle) = self.stop_on_detect.lock().unwrap().as_ref() {
            handle.stop();
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(DetectionResult::no_face()))
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

struct RecordingSurface {
    statuses: Arc<Mutex<Vec<String>>>,
    tinted: Arc<AtomicBool>,
}

impl StatusSurface for RecordingSurface {
    fn set_status(&mut self, status: &str) {
        self.statuses.lock().unwrap().push(status.to_string());
    }

    fn set_tint(&mut self, tinted: bool) {
        self.tinted.store(tinted, Ordering::SeqCst);
    }
}

struct CountingSound {
    plays: Arc<AtomicUsize>,
    fail: bool,
}

impl AlertSound for CountingSound {
    fn play(&mut self) -> anyhow::Result<()> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("autoplay blocked");
        }
        Ok(())
    }
}

#[derive(Default)]
struct Harness {
    camera_fails: bool,
    model_fails: bool,
    sound_fails: bool,
    gate: Option<Arc<Notify>>,
    script: Script,
    delay: Arc<Mutex<Duration>>,
    stop_on_detect: Arc<Mutex<Option<StopHandle>>>,
    camera_opens: Arc<AtomicUsize>,
    camera_stops: Arc<AtomicUsize>,
    detector_closes: Arc<AtomicUsize>,
    statuses: Arc<Mutex<Vec<String>>>,
    tinted: Arc<AtomicBool>,
    plays: Arc<AtomicUsize>,
}

impl Harness {
    fn session(&self) -> FocusSession {
        FocusSession::new(
            Config::default(),
            Arc::new(MockCamera {
                fail: self.camera_fails,
                opens: Arc::clone(&self.camera_opens),
                stops: Arc::clone(&self.camera_stops),
            }),
            Arc::new(MockLoader {
                fail: self.model_fails,
                gate: self.gate.clone(),
                script: Arc::clone(&self.script),
                delay: Arc::clone(&self.delay),
                stop_on_detect: Arc::clone(&self.stop_on_detect),
                closes: Arc::clone(&self.detector_closes),
            }),
            Box::new(RecordingSurface {
                statuses: Arc::clone(&self.statuses),
                tinted: Arc::clone(&self.tinted),
            }),
            Box::new(CountingSound {
                plays: Arc::clone(&self.plays),
                fail: self.sound_fails,
            }),
        )
    }

    fn push(&self, result: Result<DetectionResult, MonitorError>) {
        self.script.lock().unwrap().push_back(result);
    }

    fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }

    fn tinted(&self) -> bool {
        self.tinted.load(Ordering::SeqCst)
    }
}

async fn running(harness: &Harness) -> FocusSession {
    let mut session = harness.session();
    session.start().await.unwrap();
    session.wait_for_detector().await.unwrap();
    session
}

fn face(eye_y: f32, nose: (f32, f32)) -> DetectionResult {
    DetectionResult::single(
        LandmarkSetBuilder::new()
            .with(LEFT_EYE, Landmark::new(0.45, eye_y))
            .with(RIGHT_EYE, Landmark::new(0.55, eye_y))
            .with(NOSE_TIP, Landmark::new(nose.0, nose.1))
            .with(LEFT_FACE_EDGE, Landmark::new(0.30, 0.40))
            .with(RIGHT_FACE_EDGE, Landmark::new(0.70, 0.40))
            .build(),
    )
}

fn focused_face() -> DetectionResult {
    face(0.40, (0.50, 0.40))
}

fn looking_down_face() -> DetectionResult {
    face(0.50, (0.50, 0.40))
}

fn state_of(outcome: StepOutcome) -> FocusState {
    match outcome {
        StepOutcome::Classified(c) => c.state,
        other => panic!("expected classification, got {other:?}"),
    }
}

// ============================================================================
// Initialization
// ============================================================================

#[tokio::test]
async fn test_camera_unavailable_is_terminal() {
    let harness = Harness {
        camera_fails: true,
        ..Harness::default()
    };
    let mut session = harness.session();

    let err = session.start().await.unwrap_err();
    assert!(matches!(err, MonitorError::CameraUnavailable(_)));
    assert!(session.is_failed());
    assert!(session.status().starts_with("Init failed:"));
    assert_eq!(
        session.step().await,
        StepOutcome::Skipped(SkipReason::Failed)
    );

    session.stop().await;
    assert!(session.status().starts_with("Init failed:"));
}

#[tokio::test]
async fn test_model_load_error_is_terminal() {
    let harness = Harness {
        model_fails: true,
        ..Harness::default()
    };
    let mut session = harness.session();
    session.start().await.unwrap();

    let err = session.wait_for_detector().await.unwrap_err();
    assert!(matches!(err, MonitorError::ModelLoadError(_)));
    assert!(session.status().contains("asset not found"));
    assert_eq!(harness.camera_stops.load(Ordering::SeqCst), 1);
    assert_eq!(
        session.step().await,
        StepOutcome::Skipped(SkipReason::Failed)
    );
}

#[tokio::test]
async fn test_steps_skip_until_model_is_ready() {
    let gate = Arc::new(Notify::new());
    let harness = Harness {
        gate: Some(Arc::clone(&gate)),
        ..Harness::default()
    };
    harness.push(Ok(focused_face()));
    let mut session = harness.session();
    session.start().await.unwrap();
    assert_eq!(session.status(), "Waiting for detector...");

    for _ in 0..3 {
        assert_eq!(
            session.step().await,
            StepOutcome::Skipped(SkipReason::DetectorNotReady)
        );
    }

    gate.notify_one();
    session.wait_for_detector().await.unwrap();
    assert_eq!(session.status(), "Detecting...");
    assert_eq!(state_of(session.step().await), FocusState::Focused);
}

#[tokio::test]
async fn test_lifecycle_statuses_in_order() {
    let harness = Harness::default();
    let mut session = running(&harness).await;
    harness.push(Ok(focused_face()));
    session.step().await;

    let statuses = harness.statuses.lock().unwrap().clone();
    assert_eq!(statuses[0], "Loading detector...");
    assert_eq!(statuses[1], "Starting camera...");
    assert!(statuses.contains(&"Detecting...".to_string()));
    assert_eq!(statuses.last().unwrap(), "Focused");
}

// ============================================================================
// Ticks
// ============================================================================

#[tokio::test]
async fn test_distracted_tints_and_alerts_focused_clears() {
    let harness = Harness::default();
    let mut session = running(&harness).await;
    let t0 = Instant::now();

    harness.push(Ok(looking_down_face()));
    harness.push(Ok(focused_face()));

    assert_eq!(
        state_of(session.step_at(t0).await),
        FocusState::Distracted(DistractionReason::LookingDown)
    );
    assert_eq!(session.status(), "Looking down");
    assert!(harness.tinted());
    assert_eq!(harness.plays(), 1);

    assert_eq!(
        state_of(session.step_at(t0 + Duration::from_millis(50)).await),
        FocusState::Focused
    );
    assert_eq!(session.status(), "Focused");
    assert!(!harness.tinted());
    assert_eq!(harness.plays(), 1);
}

#[tokio::test]
async fn test_refocus_rearms_alert_within_cooldown() {
    let harness = Harness::default();
    let mut session = running(&harness).await;
    let t0 = Instant::now();

    harness.push(Ok(DetectionResult::no_face()));
    harness.push(Ok(focused_face()));
    harness.push(Ok(DetectionResult::no_face()));

    session.step_at(t0).await;
    session.step_at(t0 + Duration::from_millis(100)).await;
    session.step_at(t0 + Duration::from_millis(200)).await;

    assert_eq!(harness.plays(), 2);
    assert_eq!(session.status(), "No face detected");
}

#[tokio::test]
async fn test_continuous_distraction_alerts_once_per_cooldown() {
    let harness = Harness::default();
    let mut session = running(&harness).await;
    let t0 = Instant::now();

    // Empty script: every tick sees no face, for 7 seconds
    for step in 0..70u64 {
        session.step_at(t0 + Duration::from_millis(step * 100)).await;
    }

    // One alert at the start, then one per elapsed cooldown
    assert_eq!(harness.plays(), 3);
}

#[tokio::test]
async fn test_cooldown_measured_after_slow_detection() {
    let harness = Harness::default();
    let mut session = running(&harness).await;
    let t0 = Instant::now();

    session.step_at(t0).await;
    assert_eq!(harness.plays(), 1);

    // Submitted inside the cooldown, but completes after it
    *harness.delay.lock().unwrap() = Duration::from_millis(100);
    session.step_at(t0 + Duration::from_millis(2990)).await;
    assert_eq!(harness.plays(), 2);
}

#[tokio::test]
async fn test_detector_error_is_swallowed() {
    let harness = Harness::default();
    let mut session = running(&harness).await;

    harness.push(Err(MonitorError::Detection("inference crashed".into())));
    harness.push(Ok(focused_face()));

    assert_eq!(session.step().await, StepOutcome::DetectionFailed);
    assert_eq!(session.status(), "Detecting...");
    assert_eq!(session.state(), FocusState::Initializing);
    assert_eq!(state_of(session.step().await), FocusState::Focused);
}

#[tokio::test]
async fn test_playback_failure_is_ignored() {
    let harness = Harness {
        sound_fails: true,
        ..Harness::default()
    };
    let mut session = running(&harness).await;

    assert_eq!(
        state_of(session.step().await),
        FocusState::Distracted(DistractionReason::NoFace)
    );
    assert_eq!(harness.plays(), 1);
    assert!(harness.tinted());
}

// ============================================================================
// Teardown
// ============================================================================

#[tokio::test]
async fn test_stop_before_start_is_safe() {
    let harness = Harness::default();
    let mut session = harness.session();

    session.stop().await;
    session.stop().await;

    assert_eq!(session.status(), "Stopped");
    assert_eq!(harness.camera_stops.load(Ordering::SeqCst), 0);
    assert_eq!(harness.detector_closes.load(Ordering::SeqCst), 0);
    assert_eq!(
        session.step().await,
        StepOutcome::Skipped(SkipReason::Stopped)
    );
}

#[tokio::test]
async fn test_start_after_stop_acquires_nothing() {
    let harness = Harness::default();
    let mut session = harness.session();
    session.stop().await;

    session.start().await.unwrap();
    assert!(!session.is_detector_ready());
    assert_eq!(session.status(), "Stopped");
}

#[tokio::test]
async fn test_stop_releases_camera_and_detector_once() {
    let harness = Harness::default();
    let mut session = running(&harness).await;
    session.step().await;

    session.stop().await;
    session.stop().await;

    assert_eq!(harness.camera_stops.load(Ordering::SeqCst), 1);
    assert_eq!(harness.detector_closes.load(Ordering::SeqCst), 1);
    assert!(!harness.tinted());
    assert_eq!(
        session.step().await,
        StepOutcome::Skipped(SkipReason::Stopped)
    );
}

#[tokio::test]
async fn test_stop_while_model_loading() {
    let gate = Arc::new(Notify::new());
    let harness = Harness {
        gate: Some(Arc::clone(&gate)),
        ..Harness::default()
    };
    let mut session = harness.session();
    session.start().await.unwrap();

    session.stop().await;
    gate.notify_one();
    tokio::task::yield_now().await;

    assert_eq!(harness.camera_stops.load(Ordering::SeqCst), 1);
    assert_eq!(harness.detector_closes.load(Ordering::SeqCst), 0);
    assert!(!session.is_detector_ready());
}

#[tokio::test]
async fn test_second_start_acquires_nothing() {
    let harness = Harness::default();
    let mut session = running(&harness).await;

    session.start().await.unwrap();
    session.wait_for_detector().await.unwrap();
    assert_eq!(harness.camera_opens.load(Ordering::SeqCst), 1);

    session.stop().await;
    assert_eq!(harness.camera_stops.load(Ordering::SeqCst), 1);
    assert_eq!(harness.detector_closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_start_after_failure_returns_failure() {
    let harness = Harness {
        camera_fails: true,
        ..Harness::default()
    };
    let mut session = harness.session();
    session.start().await.unwrap_err();

    let err = session.start().await.unwrap_err();
    assert!(matches!(err, MonitorError::CameraUnavailable(_)));
    assert_eq!(harness.camera_opens.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_stop_during_detection_discards_result() {
    let harness = Harness::default();
    let mut session = running(&harness).await;
    harness.push(Ok(looking_down_face()));
    *harness.stop_on_detect.lock().unwrap() = Some(session.stop_handle());

    assert_eq!(session.step().await, StepOutcome::Discarded);
    assert_eq!(session.status(), "Detecting...");
    assert_eq!(session.state(), FocusState::Initializing);
    assert!(!harness.tinted());
    assert_eq!(harness.plays(), 0);
    assert_eq!(
        session.step().await,
        StepOutcome::Skipped(SkipReason::Stopped)
    );
}

#[tokio::test]
async fn test_stop_handle_cancels_pending_ticks() {
    let harness = Harness::default();
    let mut session = running(&harness).await;
    let handle = session.stop_handle();

    handle.stop();
    assert!(handle.is_stopped());
    assert_eq!(
        session.step().await,
        StepOutcome::Skipped(SkipReason::Stopped)
    );
    assert_eq!(session.state(), FocusState::Initializing);
}

#[tokio::test]
async fn test_drop_releases_resources() {
    let harness = Harness::default();
    let session = running(&harness).await;
    drop(session);

    assert_eq!(harness.camera_stops.load(Ordering::SeqCst), 1);
    assert_eq!(harness.detector_closes.load(Ordering::SeqCst), 1);
}
