use async_trait::async_trait;
use std::sync::Arc;

use super::{CameraSource, CaptureRequest, Frame, VideoStream};
use crate::error::MonitorError;

/// Camera that yields blank frames of the requested size.
///
/// Used with the replay detector, which ignores pixel data.
#[derive(Debug, Default)]
pub struct SyntheticCamera;

#[async_trait]
impl CameraSource for SyntheticCamera {
    async fn open(&self, request: &CaptureRequest) -> Result<Box<dyn VideoStream>, MonitorError> {
        if request.width == 0 || request.height == 0 {
            return Err(MonitorError::CameraUnavailable(format!(
                "unsupported resolution {}x{}",
                request.width, request.height
            )));
        }
        log::info!(
            "Opened synthetic camera at {}x{}",
            request.width,
            request.height
        );
        Ok(Box::new(SyntheticStream::new(request.width, request.height)))
    }
}

pub struct SyntheticStream {
    width: u32,
    height: u32,
    blank: Arc<[u8]>,
    sequence: u64,
    stopped: bool,
}

impl SyntheticStream {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            blank: Arc::from(Vec::new()),
            sequence: 0,
            stopped: false,
        }
    }

    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl VideoStream for SyntheticStream {
    fn current_frame(&mut self) -> Option<Frame> {
        if self.stopped {
            return None;
        }
        self.sequence += 1;
        Some(Frame {
            width: self.width,
            height: self.height,
            sequence: self.sequence,
            pixels: Arc::clone(&self.blank),
        })
    }

    fn stop(&mut self) {
        if !self.stopped {
            log::debug!("Synthetic camera track stopped");
        }
        self.stopped = true;
    }
}
