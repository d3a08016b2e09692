use async_trait::async_trait;
use clap::Parser;
use presence::{
    CameraError, CameraProvider, CameraStream, Constraints, DetectError, DetectOptions,
    FaceDetector, Frame, LivenessMonitor, MonitorConfig, MonitorError, NoopNotifier,
};
use proctor::{start_with_retry, Cli};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn flags_override_defaults() {
    let cli = Cli::try_parse_from([
        "proctor",
        "--frames",
        "frames/*.jpg",
        "--model",
        "seeta.bin",
        "--miss-threshold",
        "5",
        "--poll-interval-ms",
        "500",
        "--no-audio",
    ])
    .unwrap();
    let config = cli.monitor_config().unwrap();
    assert_eq!(config.miss_threshold, 5);
    assert_eq!(config.poll_interval_ms, 500);
    assert!(!config.audio);
    assert_eq!(config.warning_message, MonitorConfig::default().warning_message);
    assert_eq!(cli.frame_interval(), Duration::from_millis(200));
    assert_eq!(cli.retries, 3);
}

#[test]
fn invalid_flags_are_rejected() {
    let cli = Cli::try_parse_from([
        "proctor",
        "--frames",
        "*.png",
        "--model",
        "m.bin",
        "--miss-threshold",
        "0",
    ])
    .unwrap();
    assert!(cli.monitor_config().is_err());
}

#[test]
fn config_file_is_overridden_by_flags() {
    let path = std::env::temp_dir().join(format!("proctor-config-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "miss_threshold": 4, "poll_interval_ms": 750 }"#).unwrap();
    let cli = Cli::try_parse_from([
        "proctor",
        "--frames",
        "*.png",
        "--model",
        "m.bin",
        "--config",
        path.to_str().unwrap(),
        "--miss-threshold",
        "6",
    ])
    .unwrap();
    let config = cli.monitor_config().unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(config.miss_threshold, 6);
    assert_eq!(config.poll_interval_ms, 750);
}

#[test]
fn zero_frame_interval_is_rejected() {
    let parsed = Cli::try_parse_from([
        "proctor",
        "--frames",
        "*.png",
        "--model",
        "m.bin",
        "--frame-interval-ms",
        "0",
    ]);
    assert!(parsed.is_err());
}

struct StillStream;

impl CameraStream for StillStream {
    fn latest_frame(&self) -> Option<Frame> {
        None
    }
    fn release(&self) {}
}

/// Fails the first `failures` acquisitions.
struct FlakyCamera {
    failures: usize,
    attempts: AtomicUsize,
}

#[async_trait]
impl CameraProvider for FlakyCamera {
    async fn acquire(&self, _c: &Constraints) -> Result<Box<dyn CameraStream>, CameraError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            Err(CameraError::NoDevice)
        } else {
            Ok(Box::new(StillStream))
        }
    }
}

struct NoFaces;

#[async_trait]
impl FaceDetector for NoFaces {
    fn ready(&self) -> bool {
        true
    }
    async fn detect(&self, _f: &Frame, _o: &DetectOptions) -> Result<usize, DetectError> {
        Ok(0)
    }
}

fn monitor(camera: Arc<FlakyCamera>) -> LivenessMonitor {
    LivenessMonitor::new(
        camera,
        Arc::new(NoFaces),
        Arc::new(NoopNotifier),
        MonitorConfig::default(),
    )
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn retries_until_camera_opens() {
    let camera = Arc::new(FlakyCamera {
        failures: 2,
        attempts: AtomicUsize::new(0),
    });
    let m = monitor(camera.clone());
    start_with_retry(&m, 3, Duration::from_secs(1)).await.unwrap();
    assert!(m.is_active());
    assert_eq!(camera.attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_last_attempt() {
    let camera = Arc::new(FlakyCamera {
        failures: 10,
        attempts: AtomicUsize::new(0),
    });
    let m = monitor(camera.clone());
    let err = start_with_retry(&m, 2, Duration::from_secs(1)).await.unwrap_err();
    assert!(matches!(err, MonitorError::Camera(CameraError::NoDevice)));
    assert!(!m.is_active());
    assert_eq!(camera.attempts.load(Ordering::SeqCst), 2);
}
