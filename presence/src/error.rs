use thiserror::Error;

/// Why a camera stream could not be opened.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("no camera device available")]
    NoDevice,
    #[error("camera error: {0}")]
    Other(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DetectError {
    #[error("detector model not loaded")]
    NotReady,
    #[error("could not decode frame: {0}")]
    Decode(String),
    #[error("detection failed: {0}")]
    Failed(String),
}

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error("start cancelled by stop")]
    Cancelled,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
