use serde::{Deserialize, Serialize};

/// Lifecycle and presence changes published by a [`crate::LivenessMonitor`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum MonitorEvent {
    /// A camera session began.
    Started,
    /// The camera could not be opened; the monitor stays idle.
    StartFailed { reason: String },
    /// The camera session ended and the stream was released.
    Stopped,
    /// The absence warning was issued after `misses` empty cycles.
    Warned { misses: u32 },
    /// A face came back after a warning.
    Recovered,
}
