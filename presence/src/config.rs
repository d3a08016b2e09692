use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::{ConfigError, Constraints, DetectOptions, MISS_THRESHOLD};

/// Default text of the absence warning.
pub const DEFAULT_WARNING: &str = "Face not detected. Please stay in the frame.";

/// Tunables for a [`crate::LivenessMonitor`].
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```json
/// { "poll_interval_ms": 500, "miss_threshold": 5 }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub poll_interval_ms: u64,
    pub miss_threshold: u32,
    pub min_input_size: u32,
    pub score_threshold: f32,
    pub warning_message: String,
    /// Request the microphone together with the camera.
    pub audio: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        let detect = DetectOptions::default();
        Self {
            poll_interval_ms: 1000,
            miss_threshold: MISS_THRESHOLD,
            min_input_size: detect.min_input_size,
            score_threshold: detect.score_threshold,
            warning_message: DEFAULT_WARNING.to_string(),
            audio: true,
        }
    }
}

impl MonitorConfig {
    /// Load and validate a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be positive".into()));
        }
        if self.miss_threshold == 0 {
            return Err(ConfigError::Invalid("miss_threshold must be at least 1".into()));
        }
        if self.min_input_size == 0 {
            return Err(ConfigError::Invalid("min_input_size must be positive".into()));
        }
        if !(self.score_threshold > 0.0 && self.score_threshold <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "score_threshold must be in (0, 1], got {}",
                self.score_threshold
            )));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn detect_options(&self) -> DetectOptions {
        DetectOptions {
            min_input_size: self.min_input_size,
            score_threshold: self.score_threshold,
        }
    }

    pub fn constraints(&self) -> Constraints {
        Constraints {
            video: true,
            audio: self.audio,
        }
    }
}
