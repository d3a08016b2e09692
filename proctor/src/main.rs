use clap::Parser;
use presence::{ChannelNotifier, LivenessMonitor};
use proctor::{init_logging, log_activity, print_notices, start_with_retry, Cli};
use std::{sync::Arc, time::Duration};
use tracing::info;
use vision::{FrameDirCamera, RustfaceDetector, RustfaceSettings};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging("info");

    let config = cli.monitor_config()?;
    let camera = Arc::new(FrameDirCamera::new(cli.frames.clone(), cli.frame_interval())?);
    let detector = Arc::new(RustfaceDetector::load(
        cli.model.clone(),
        RustfaceSettings::default(),
    ));
    let notifier = ChannelNotifier::new(16);
    tokio::spawn(print_notices(notifier.subscribe()));

    let monitor = LivenessMonitor::new(camera, detector, Arc::new(notifier), config)?;
    tokio::spawn(log_activity(
        monitor.subscribe_visibility(),
        monitor.subscribe_events(),
    ));

    start_with_retry(&monitor, cli.retries, Duration::from_secs(1)).await?;
    println!("Watching {}; press Ctrl-C to stop", cli.frames);

    match cli.duration_secs {
        Some(secs) => {
            tokio::select! {
                res = tokio::signal::ctrl_c() => res?,
                _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
            }
        }
        None => tokio::signal::ctrl_c().await?,
    }

    monitor.stop();
    info!("session ended");
    Ok(())
}
