use presence::{ChannelNotifier, Notifier, NoopNotifier, TracingNotifier};
use tokio::sync::broadcast;

#[tokio::test]
async fn channel_notifier_broadcasts_warnings() {
    let notifier = ChannelNotifier::new(4);
    let mut rx = notifier.subscribe();
    notifier.warn("stay in frame");
    let notice = rx.recv().await.unwrap();
    assert_eq!(notice.message, "stay in frame");
}

#[tokio::test]
async fn channel_notifier_wraps_existing_sender() {
    let (tx, mut rx) = broadcast::channel(2);
    let notifier = ChannelNotifier::with_sender(tx);
    notifier.warn("hello");
    assert_eq!(rx.recv().await.unwrap().message, "hello");
}

#[test]
fn warning_without_listeners_is_dropped() {
    ChannelNotifier::new(1).warn("nobody listening");
    NoopNotifier.warn("ignored");
    TracingNotifier.warn("logged");
}
