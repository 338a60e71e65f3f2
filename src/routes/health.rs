use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_store_latency_ms: Option<u64>,
}

/// GET /health: liveness plus job store reachability.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let start = std::time::Instant::now();

    let (status_code, status, latency) = match state.jobs.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            "ok",
            Some(start.elapsed().as_millis() as u64),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Job store health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", None)
        }
    };

    let response = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        job_store_latency_ms: latency,
    };
    (status_code, Json(response))
}
