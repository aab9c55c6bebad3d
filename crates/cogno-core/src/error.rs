use thiserror::Error;

/// Failures of the distraction monitor.
///
/// The first two are terminal for a session. Detection failures are
/// per-tick and never escape a step.
#[derive(Debug, Clone, Error)]
pub enum MonitorError {
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("failed to load landmark model: {0}")]
    ModelLoadError(String),

    #[error("detection failed: {0}")]
    Detection(String),
}

impl MonitorError {
    /// Whether this error ends the session
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::CameraUnavailable(_) | Self::ModelLoadError(_))
    }
}
