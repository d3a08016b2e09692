use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::warn;

/// User-visible message sink, e.g. a toast.
///
/// Delivery is fire-and-forget; implementations must not block.
pub trait Notifier: Send + Sync {
    fn warn(&self, message: &str);
}

/// [`Notifier`] that drops every message.
#[derive(Clone, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn warn(&self, _message: &str) {}
}

/// [`Notifier`] that writes messages to the log.
#[derive(Clone, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn warn(&self, message: &str) {
        warn!(target: "presence::notice", "{message}");
    }
}

/// A message delivered through a [`ChannelNotifier`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub when: DateTime<Utc>,
    pub message: String,
}

/// [`Notifier`] that forwards messages over a broadcast channel.
#[derive(Clone)]
pub struct ChannelNotifier {
    tx: broadcast::Sender<Notice>,
}

impl ChannelNotifier {
    /// Create a notifier with its own channel of the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Wrap an existing sender.
    pub fn with_sender(tx: broadcast::Sender<Notice>) -> Self {
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }
}

impl Notifier for ChannelNotifier {
    fn warn(&self, message: &str) {
        let _ = self.tx.send(Notice {
            when: Utc::now(),
            message: message.to_string(),
        });
    }
}
