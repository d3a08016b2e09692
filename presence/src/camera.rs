use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::CameraError;

/// One encoded image captured from a camera stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// When the frame was captured
    pub when: DateTime<Utc>,
    /// Encoded image bytes (JPEG, PNG, ...)
    pub bytes: Vec<u8>,
}

impl Frame {
    /// Wrap `bytes` with the current timestamp.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            when: Utc::now(),
            bytes: bytes.into(),
        }
    }
}

/// Devices requested when opening a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Constraints {
    pub video: bool,
    pub audio: bool,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            video: true,
            audio: true,
        }
    }
}

/// Source of live camera streams, e.g. a webcam behind a permission prompt.
#[async_trait]
pub trait CameraProvider: Send + Sync {
    /// Open a stream satisfying `constraints`.
    async fn acquire(&self, constraints: &Constraints) -> Result<Box<dyn CameraStream>, CameraError>;
}

/// An open camera stream.
pub trait CameraStream: Send + Sync {
    /// Most recent usable frame, or `None` while nothing has been buffered.
    fn latest_frame(&self) -> Option<Frame>;

    /// Stop every track of the stream. Calling it again does nothing.
    fn release(&self);
}
