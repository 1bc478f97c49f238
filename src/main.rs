use std::{env, sync::Arc, time::Duration};

use anyhow::Result;
use log::info;

use focusflow::{
    config::ConfigStore,
    store::HttpSessionStore,
    timer::{CountdownClock, FocusController, FocusEvent},
};

/// Demo driver: runs one short focus session against the configured API,
/// printing state changes as they stream in. Without a backend running the
/// session still completes locally and the failed writes land in the log.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("focusflow starting up...");

    let config_path = env::var("FOCUSFLOW_CONFIG").unwrap_or_else(|_| "focusflow.json".into());
    let config = ConfigStore::new(config_path.into())?.config();
    info!("Using session API at {}", config.api_base_url);

    let store = Arc::new(HttpSessionStore::new(config.api_base_url.clone()));
    // A fast clock so the demo session finishes in seconds, not minutes.
    let clock = CountdownClock::with_period(Duration::from_millis(50));
    let controller = FocusController::with_clock(store, clock);
    controller.set_volume(config.ambient.volume);

    let mut events = controller.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(FocusEvent::StateChanged(snapshot)) => {
                    if snapshot.remaining_secs % 15 == 0 {
                        info!(
                            "{} remaining ({:?}, playing: {})",
                            snapshot.remaining_clock, snapshot.view, snapshot.is_playing
                        );
                    }
                }
                Ok(FocusEvent::SessionCompleted(summary)) => {
                    info!("Session complete: {} focused", summary.formatted_elapsed);
                    break;
                }
                Err(_) => break,
            }
        }
    });

    controller.start_session(None, 1).await;
    controller.toggle_play().await;
    printer.await?;

    Ok(())
}
