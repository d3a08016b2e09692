//! Command-line host for the presence monitor.
//!
//! Plays a directory of frames through [`vision::FrameDirCamera`], counts
//! faces with [`vision::RustfaceDetector`] and prints a warning whenever the
//! user leaves the frame.

pub mod logging;

pub use logging::init_logging;

use clap::Parser;
use presence::{ConfigError, LivenessMonitor, MonitorConfig, MonitorError, MonitorEvent, Notice};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Glob pattern of image files played back as the camera feed
    #[arg(long, env = "PROCTOR_FRAMES")]
    pub frames: String,
    /// SeetaFace model file used for face detection
    #[arg(long, env = "PROCTOR_MODEL")]
    pub model: PathBuf,
    /// JSON file with monitor settings; flags below override it
    #[arg(long, env = "PROCTOR_CONFIG")]
    pub config: Option<PathBuf>,
    /// Delay between frames of the simulated camera
    #[arg(long, default_value_t = 200, value_parser = clap::value_parser!(u64).range(1..))]
    pub frame_interval_ms: u64,
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,
    /// Empty cycles in a row before warning
    #[arg(long)]
    pub miss_threshold: Option<u32>,
    #[arg(long)]
    pub warning: Option<String>,
    /// Skip the microphone request
    #[arg(long)]
    pub no_audio: bool,
    /// Attempts at opening the camera before giving up
    #[arg(long, default_value_t = 3)]
    pub retries: u32,
    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    pub duration_secs: Option<u64>,
}

impl Cli {
    /// Build the monitor config: file first, then explicit flags.
    pub fn monitor_config(&self) -> Result<MonitorConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => MonitorConfig::from_json_file(path)?,
            None => MonitorConfig::default(),
        };
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval_ms = ms;
        }
        if let Some(threshold) = self.miss_threshold {
            config.miss_threshold = threshold;
        }
        if let Some(message) = &self.warning {
            config.warning_message = message.clone();
        }
        if self.no_audio {
            config.audio = false;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

/// Try to start `monitor` up to `attempts` times, sleeping `backoff` between
/// failures.
pub async fn start_with_retry(
    monitor: &LivenessMonitor,
    attempts: u32,
    backoff: Duration,
) -> Result<(), MonitorError> {
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match monitor.start().await {
            Ok(()) => return Ok(()),
            Err(e) if attempt < attempts => {
                warn!(attempt, error = %e, "camera start failed; retrying");
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Print user-facing warnings as they arrive.
pub async fn print_notices(mut notices: broadcast::Receiver<Notice>) {
    loop {
        match notices.recv().await {
            Ok(notice) => println!("[{}] {}", notice.when.format("%H:%M:%S"), notice.message),
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Log presence changes and monitor lifecycle events.
pub async fn log_activity(
    mut visible: watch::Receiver<bool>,
    mut events: broadcast::Receiver<MonitorEvent>,
) {
    loop {
        tokio::select! {
            changed = visible.changed() => {
                if changed.is_err() { break; }
                let face_visible = *visible.borrow_and_update();
                info!(face_visible, "presence changed");
            }
            event = events.recv() => {
                match event {
                    Ok(event) => info!(?event, "monitor event"),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
}
