//! Landmark detector that replays a recording instead of running a model.
//!
//! A recording is a JSON Lines file: one `DetectionResult` per line, e.g.
//! `{"faces":[[{"x":0.41,"y":0.38}, ...]]}`. An empty object means no face.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{DetectorLoader, DetectorOptions, Frame, LandmarkDetector};
use crate::error::MonitorError;
use crate::landmarks::DetectionResult;

/// Parse a recording. Blank lines and `#` comments are skipped.
///
/// # Errors
///
/// Returns `MonitorError::ModelLoadError` naming the first malformed line
pub fn parse_recording(content: &str) -> Result<Vec<DetectionResult>, MonitorError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|e| {
                MonitorError::ModelLoadError(format!("recording line {}: {e}", index + 1))
            })
        })
        .collect()
}

/// Loads a `ReplayDetector` from the configured model path
#[derive(Debug, Clone)]
pub struct ReplayLoader {
    looping: bool,
}

impl ReplayLoader {
    #[must_use]
    pub const fn new(looping: bool) -> Self {
        Self { looping }
    }

    async fn read(path: &Path) -> Result<String, MonitorError> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| MonitorError::ModelLoadError(format!("{}: {e}", path.display())))
    }
}

#[async_trait]
impl DetectorLoader for ReplayLoader {
    async fn load(
        &self,
        options: &DetectorOptions,
    ) -> Result<Box<dyn LandmarkDetector>, MonitorError> {
        let content = Self::read(&options.model_path).await?;
        let frames = parse_recording(&content)?;
        if frames.is_empty() {
            return Err(MonitorError::ModelLoadError(format!(
                "{}: recording has no frames",
                options.model_path.display()
            )));
        }
        log::info!(
            "Loaded {} recorded frames from {}",
            frames.len(),
            options.model_path.display()
        );
        Ok(Box::new(ReplayDetector::new(
            options.model_path.clone(),
            frames,
            self.looping,
        )))
    }
}

/// Returns recorded results in order, one per `detect` call
#[derive(Debug)]
pub struct ReplayDetector {
    source: PathBuf,
    frames: Vec<DetectionResult>,
    cursor: usize,
    looping: bool,
    closed: bool,
}

impl ReplayDetector {
    #[must_use]
    pub fn new(source: PathBuf, frames: Vec<DetectionResult>, looping: bool) -> Self {
        Self {
            source,
            frames,
            cursor: 0,
            looping,
            closed: false,
        }
    }

    /// Whether a non-looping recording has been fully consumed
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        !self.looping && self.cursor >= self.frames.len()
    }
}

#[async_trait]
impl LandmarkDetector for ReplayDetector {
    async fn detect(
        &mut self,
        _frame: &Frame,
        _timestamp_ms: f64,
    ) -> Result<DetectionResult, MonitorError> {
        if self.closed {
            return Err(MonitorError::Detection("detector closed".into()));
        }
        if self.frames.is_empty() || self.is_exhausted() {
            // Past the end the camera sees nobody
            return Ok(DetectionResult::no_face());
        }
        let result = self.frames[self.cursor % self.frames.len()].clone();
        self.cursor += 1;
        Ok(result)
    }

    fn close(&mut self) {
        if !self.closed {
            log::debug!("Closed replay detector for {}", self.source.display());
        }
        self.closed = true;
    }
}
