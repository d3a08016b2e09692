use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, trace, warn};

use crate::{
    CameraProvider, CameraStream, ConfigError, FaceDetector, MonitorConfig, MonitorError,
    MonitorEvent, MonitorState, Notifier, Phase, Verdict,
};

/// Everything that belongs to one camera session.
///
/// `epoch` increases on every start and stop; a poll cycle that started
/// under an older epoch must not touch the state.
struct Session {
    state: MonitorState,
    epoch: u64,
    stream: Option<Arc<dyn CameraStream>>,
    poller: Option<JoinHandle<()>>,
}

struct Core {
    detector: Arc<dyn FaceDetector>,
    notifier: Arc<dyn Notifier>,
    config: MonitorConfig,
    session: Mutex<Session>,
    /// Held for the whole of a poll cycle so cycles never overlap.
    gate: tokio::sync::Mutex<()>,
    visible: watch::Sender<bool>,
    events: broadcast::Sender<MonitorEvent>,
}

/// Watches a camera feed and warns when no face has been seen for a while.
///
/// The monitor owns the camera stream for the duration of a session. Dropping
/// it stops the session and releases the stream.
///
/// # Example
/// ```no_run
/// # use std::sync::Arc;
/// # use presence::{LivenessMonitor, MonitorConfig, TracingNotifier};
/// # async fn run(camera: Arc<dyn presence::CameraProvider>, detector: Arc<dyn presence::FaceDetector>) {
/// let monitor = LivenessMonitor::new(camera, detector, Arc::new(TracingNotifier), MonitorConfig::default())
///     .expect("default config is valid");
/// monitor.start().await.ok();
/// let mut visible = monitor.subscribe_visibility();
/// while visible.changed().await.is_ok() {
///     println!("face visible: {}", *visible.borrow());
/// }
/// # }
/// ```
pub struct LivenessMonitor {
    camera: Arc<dyn CameraProvider>,
    core: Arc<Core>,
}

impl LivenessMonitor {
    /// Capacity of the [`MonitorEvent`] broadcast channel.
    pub const EVENT_CAPACITY: usize = 16;

    /// Build a monitor, rejecting a config that [`MonitorConfig::validate`]
    /// refuses.
    pub fn new(
        camera: Arc<dyn CameraProvider>,
        detector: Arc<dyn FaceDetector>,
        notifier: Arc<dyn Notifier>,
        config: MonitorConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let (visible, _) = watch::channel(true);
        let (events, _) = broadcast::channel(Self::EVENT_CAPACITY);
        let core = Core {
            detector,
            notifier,
            config,
            session: Mutex::new(Session {
                state: MonitorState::default(),
                epoch: 0,
                stream: None,
                poller: None,
            }),
            gate: tokio::sync::Mutex::new(()),
            visible,
            events,
        };
        Ok(Self {
            camera,
            core: Arc::new(core),
        })
    }

    /// Open the camera and begin polling the detector.
    ///
    /// A failure leaves the monitor idle so the caller can try again. Calling
    /// this while a session is running does nothing.
    pub async fn start(&self) -> Result<(), MonitorError> {
        let epoch = {
            let session = self.core.session();
            if session.state.camera_active {
                debug!("camera already active");
                return Ok(());
            }
            session.epoch
        };

        let constraints = self.core.config.constraints();
        let stream: Arc<dyn CameraStream> = match self.camera.acquire(&constraints).await {
            Ok(stream) => Arc::from(stream),
            Err(e) => {
                error!(error = %e, "failed to start camera");
                self.core.publish(MonitorEvent::StartFailed {
                    reason: e.to_string(),
                });
                return Err(e.into());
            }
        };

        let mut session = self.core.session();
        if session.state.camera_active {
            drop(session);
            debug!("camera started concurrently; releasing duplicate stream");
            stream.release();
            return Ok(());
        }
        if session.epoch != epoch {
            drop(session);
            debug!("camera stopped while starting; releasing stream");
            stream.release();
            return Err(MonitorError::Cancelled);
        }

        session.epoch += 1;
        let epoch = session.epoch;
        session.state = MonitorState::active();
        session.stream = Some(stream);
        session.poller = Some(tokio::spawn(poll_loop(self.core.clone(), epoch)));
        self.core.visible.send_replace(true);
        self.core.publish(MonitorEvent::Started);
        drop(session);

        info!(epoch, "camera started");
        Ok(())
    }

    /// End the session: cancel polling, release the stream and reset state.
    ///
    /// Safe to call at any time, any number of times.
    pub fn stop(&self) {
        let (stream, poller, was_active) = {
            let mut session = self.core.session();
            session.epoch += 1;
            let was_active = session.state.camera_active;
            session.state = MonitorState::default();
            self.core.visible.send_replace(true);
            if was_active {
                self.core.publish(MonitorEvent::Stopped);
            }
            (session.stream.take(), session.poller.take(), was_active)
        };
        if let Some(poller) = poller {
            poller.abort();
        }
        if let Some(stream) = stream {
            stream.release();
        }
        if was_active {
            info!("camera stopped");
        }
    }

    /// Run one detection cycle against the latest frame.
    ///
    /// Returns `None` when the cycle was skipped: no session, detector still
    /// loading, no frame buffered yet, another cycle in flight, or the
    /// session ended while the detector was running.
    pub async fn poll_cycle(&self) -> Option<Verdict> {
        let epoch = self.core.session().epoch;
        self.core.cycle(epoch).await
    }

    pub fn state(&self) -> MonitorState {
        self.core.session().state
    }

    pub fn phase(&self) -> Phase {
        self.state().phase()
    }

    pub fn is_active(&self) -> bool {
        self.state().camera_active
    }

    pub fn face_visible(&self) -> bool {
        self.state().face_visible
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.core.config
    }

    /// Follow changes of the presence verdict shown to the user.
    pub fn subscribe_visibility(&self) -> watch::Receiver<bool> {
        self.core.visible.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<MonitorEvent> {
        self.core.events.subscribe()
    }
}

impl Drop for LivenessMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Core {
    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, epoch: u64) -> bool {
        let session = self.session();
        session.epoch == epoch && session.state.camera_active
    }

    fn publish(&self, event: MonitorEvent) {
        let _ = self.events.send(event);
    }

    async fn cycle(&self, epoch: u64) -> Option<Verdict> {
        let Ok(_gate) = self.gate.try_lock() else {
            trace!("poll cycle already in flight");
            return None;
        };

        let stream = {
            let session = self.session();
            if session.epoch != epoch || !session.state.camera_active {
                return None;
            }
            session.stream.clone()?
        };
        if !self.detector.ready() {
            trace!("face detector still loading");
            return None;
        }
        let Some(frame) = stream.latest_frame() else {
            trace!("no frame buffered yet");
            return None;
        };

        let options = self.config.detect_options();
        let faces = match self.detector.detect(&frame, &options).await {
            Ok(faces) => faces,
            Err(e) => {
                warn!(error = %e, "face detection failed; counting cycle as a miss");
                0
            }
        };

        let (next, verdict) = {
            let mut session = self.session();
            if session.epoch != epoch || !session.state.camera_active {
                debug!(epoch, "discarding detection from a finished session");
                return None;
            }
            let (next, verdict) = session.state.apply(faces, self.config.miss_threshold);
            session.state = next;
            debug!(faces, misses = next.consecutive_misses, ?verdict, "poll cycle");

            match verdict {
                Verdict::Absent => self.publish(MonitorEvent::Warned {
                    misses: next.consecutive_misses,
                }),
                Verdict::Recovered => self.publish(MonitorEvent::Recovered),
                _ => {}
            }
            self.visible.send_if_modified(|visible| {
                let changed = *visible != next.face_visible;
                *visible = next.face_visible;
                changed
            });
            (next, verdict)
        };

        // Notifiers may read the monitor; never call them under the session lock.
        match verdict {
            Verdict::Absent => {
                info!(misses = next.consecutive_misses, "no face in frame; warning user");
                self.notifier.warn(&self.config.warning_message);
            }
            Verdict::Recovered => info!("face back in frame"),
            _ => {}
        }
        Some(verdict)
    }
}

/// Drive [`Core::cycle`] once per poll interval until the session ends.
///
/// The first cycle runs one full interval after the session starts. A slow
/// detector delays the following tick instead of stacking cycles.
async fn poll_loop(core: Arc<Core>, epoch: u64) {
    let period = core.config.poll_interval();
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if !core.is_current(epoch) {
            break;
        }
        core.cycle(epoch).await;
    }
    trace!(epoch, "poll loop finished");
}
