//! Face-presence monitoring for a live camera session.
//!
//! A [`LivenessMonitor`] owns a camera stream, polls a [`FaceDetector`] on a
//! fixed interval and tells the user (through a [`Notifier`]) when nobody has
//! been in frame for a few cycles in a row. The debounce logic lives in the
//! pure [`MonitorState::apply`] transition so it can be exercised without any
//! timers or devices.

pub mod camera;
pub mod config;
pub mod detector;
pub mod error;
pub mod event;
pub mod monitor;
pub mod notify;
pub mod state;

pub use camera::{CameraProvider, CameraStream, Constraints, Frame};
pub use config::MonitorConfig;
pub use detector::{DetectOptions, FaceDetector};
pub use error::{CameraError, ConfigError, DetectError, MonitorError};
pub use event::MonitorEvent;
pub use monitor::LivenessMonitor;
pub use notify::{ChannelNotifier, Notice, Notifier, NoopNotifier, TracingNotifier};
pub use state::{apply_detection_result, MonitorState, Phase, Verdict, MISS_THRESHOLD};
