use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use crate::app_state::AppState;

pub mod events;
pub mod health;

/// Event intake and health routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(events::receive_event))
        .route("/health", get(health::health_check))
        .with_state(state)
}

/// Router with the Prometheus scrape endpoint mounted at `/metrics`.
pub fn router_with_metrics(state: AppState, prometheus: Arc<PrometheusHandle>) -> Router {
    router(state).route(
        "/metrics",
        get(|State(handle): State<Arc<PrometheusHandle>>| async move { handle.render() })
            .with_state(prometheus),
    )
}
