use async_ocr_worker::{
    app_state::AppState, config::AppConfig, handlers::dispatch, models::event::EventEnvelope,
};
use std::time::Duration;
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting pending-job poller");

    let config = AppConfig::from_env().expect("Failed to load configuration");
    let state = AppState::from_config(&config).expect("Failed to initialize services");
    let interval = Duration::from_secs(config.poll_interval_secs);

    tracing::info!(interval_secs = config.poll_interval_secs, "Poller ready");

    // Each tick is the same timer envelope the scheduler trigger would deliver.
    let tick = EventEnvelope::timer();
    loop {
        let summary = dispatch(&state, &tick).await;
        let failures = summary.results.iter().filter(|o| o.is_failure()).count();

        if failures > 0 {
            tracing::warn!(checked = summary.results.len(), failures, "Poll cycle finished with errors");
        } else {
            tracing::debug!(checked = summary.results.len(), "Poll cycle finished");
        }

        sleep(interval).await;
    }
}
