use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{DetectError, Frame};

/// Settings passed to the detector on every cycle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectOptions {
    /// Side length, in pixels, the frame is scaled to before inference.
    pub min_input_size: u32,
    /// Minimum confidence, between 0 and 1, for a detection to count.
    pub score_threshold: f32,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            min_input_size: 416,
            score_threshold: 0.5,
        }
    }
}

/// Counts faces in camera frames.
#[async_trait]
pub trait FaceDetector: Send + Sync {
    /// Whether the underlying model has finished loading.
    fn ready(&self) -> bool;

    /// Number of faces found in `frame`.
    async fn detect(&self, frame: &Frame, options: &DetectOptions) -> Result<usize, DetectError>;
}
