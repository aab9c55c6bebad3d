use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{CameraConfig, DetectorConfig, Facing};
use crate::error::MonitorError;
use crate::landmarks::DetectionResult;

pub mod replay;
pub mod synthetic;

/// Opaque video frame handed to the detector for one call
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub sequence: u64,
    pub pixels: Arc<[u8]>,
}

/// Parameters for acquiring the camera stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub width: u32,
    pub height: u32,
    pub facing: Facing,
    pub audio: bool,
}

impl CaptureRequest {
    #[must_use]
    pub const fn from_config(config: &CameraConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            facing: config.facing,
            audio: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunningMode {
    Image,
    Video,
}

/// Configuration the landmark detector is created with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorOptions {
    pub running_mode: RunningMode,
    pub max_faces: u32,
    pub model_path: PathBuf,
}

impl DetectorOptions {
    #[must_use]
    pub fn from_config(config: &DetectorConfig) -> Self {
        Self {
            running_mode: RunningMode::Video,
            max_faces: config.max_faces,
            model_path: config.model_path.clone(),
        }
    }
}

/// Source of camera streams (device enumeration and permission live behind this)
#[async_trait]
pub trait CameraSource: Send + Sync {
    /// Acquire a stream
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::CameraUnavailable` if permission is denied or no device exists
    async fn open(&self, request: &CaptureRequest) -> Result<Box<dyn VideoStream>, MonitorError>;
}

/// A live camera stream
pub trait VideoStream: Send {
    /// Latest frame, if the stream has produced one
    fn current_frame(&mut self) -> Option<Frame>;

    /// Stop every track of the stream. Must be safe to call more than once.
    fn stop(&mut self);
}

/// Asynchronously creates a landmark detector (model fetch and init)
#[async_trait]
pub trait DetectorLoader: Send + Sync {
    /// # Errors
    ///
    /// Returns `MonitorError::ModelLoadError` if the model asset cannot be fetched or initialized
    async fn load(
        &self,
        options: &DetectorOptions,
    ) -> Result<Box<dyn LandmarkDetector>, MonitorError>;
}

/// Face landmark detector consumed as a black box
#[async_trait]
pub trait LandmarkDetector: Send {
    /// Detect faces in `frame`. `timestamp_ms` strictly increases between calls.
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::Detection` if inference fails for this frame
    async fn detect(
        &mut self,
        frame: &Frame,
        timestamp_ms: f64,
    ) -> Result<DetectionResult, MonitorError>;

    /// Release model resources
    fn close(&mut self);
}

/// Plays the distraction alert
pub trait AlertSound: Send {
    /// # Errors
    ///
    /// Returns an error if playback is refused; callers ignore it
    fn play(&mut self) -> anyhow::Result<()>;
}

/// The single user-visible channel: a status line and a screen tint
pub trait StatusSurface: Send {
    fn set_status(&mut self, status: &str);
    fn set_tint(&mut self, tinted: bool);
}
