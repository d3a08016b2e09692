use async_trait::async_trait;
use glob::glob;
use presence::{CameraError, CameraProvider, CameraStream, Constraints, Frame};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::{
    fs,
    sync::watch,
    task::JoinHandle,
    time::{self, Duration},
};
use tracing::{debug, error};

/// Plays image files matching a glob pattern as a simulated webcam.
pub struct FrameDirCamera {
    pattern: String,
    frame_interval: Duration,
}

impl FrameDirCamera {
    /// Cycle files matching `pattern`, advancing one every `frame_interval`.
    ///
    /// A zero interval is rejected; the player could never tick.
    pub fn new(pattern: impl Into<String>, frame_interval: Duration) -> Result<Self, CameraError> {
        if frame_interval.is_zero() {
            return Err(CameraError::Other("frame interval must be positive".into()));
        }
        Ok(Self {
            pattern: pattern.into(),
            frame_interval,
        })
    }

    fn frame_paths(&self) -> Result<Vec<PathBuf>, CameraError> {
        let mut paths: Vec<PathBuf> = glob(&self.pattern)
            .map_err(|e| CameraError::Other(format!("bad frame pattern: {}", e.msg)))?
            .filter_map(Result::ok)
            .collect();
        paths.sort();
        Ok(paths)
    }
}

fn camera_error(e: io::Error) -> CameraError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => CameraError::PermissionDenied,
        io::ErrorKind::NotFound => CameraError::NoDevice,
        _ => CameraError::Other(e.to_string()),
    }
}

#[async_trait]
impl CameraProvider for FrameDirCamera {
    async fn acquire(&self, constraints: &Constraints) -> Result<Box<dyn CameraStream>, CameraError> {
        if !constraints.video {
            return Err(CameraError::Other("video track required".into()));
        }
        if constraints.audio {
            debug!("frame directory has no microphone; ignoring audio request");
        }
        let paths = self.frame_paths()?;
        let Some(first) = paths.first() else {
            return Err(CameraError::NoDevice);
        };
        fs::File::open(first).await.map_err(camera_error)?;

        let (tx, rx) = watch::channel(None);
        let task = tokio::spawn(play(paths, self.frame_interval, tx));
        debug!(pattern = %self.pattern, "frame stream opened");
        Ok(Box::new(FrameDirStream {
            frames: rx,
            task: Mutex::new(Some(task)),
            released: AtomicBool::new(false),
        }))
    }
}

async fn play(paths: Vec<PathBuf>, interval: Duration, tx: watch::Sender<Option<Frame>>) {
    let mut ticker = time::interval(interval);
    let mut index = 0;
    loop {
        ticker.tick().await;
        if tx.is_closed() {
            break;
        }
        if index >= paths.len() {
            index = 0;
        }
        let path = &paths[index];
        index += 1;
        match fs::read(path).await {
            Ok(bytes) => {
                tx.send_replace(Some(Frame::new(bytes)));
            }
            Err(e) => error!(path = %path.display(), "frame read error: {e}"),
        }
    }
}

/// Stream returned by [`FrameDirCamera`]. Dropping it releases it.
pub struct FrameDirStream {
    frames: watch::Receiver<Option<Frame>>,
    task: Mutex<Option<JoinHandle<()>>>,
    released: AtomicBool,
}

impl CameraStream for FrameDirStream {
    fn latest_frame(&self) -> Option<Frame> {
        if self.released.load(Ordering::SeqCst) {
            return None;
        }
        self.frames.borrow().clone()
    }

    fn release(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        let task = self
            .task
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
        }
        debug!("frame stream released");
    }
}

impl Drop for FrameDirStream {
    fn drop(&mut self) {
        self.release();
    }
}
