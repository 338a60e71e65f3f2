use axum::extract::State;
use axum::Json;

use crate::app_state::AppState;
use crate::handlers::dispatch;
use crate::models::event::EventEnvelope;
use crate::models::outcome::ProcessingSummary;

/// POST /: deliver a trigger envelope and return per-item outcomes.
pub async fn receive_event(
    State(state): State<AppState>,
    Json(envelope): Json<EventEnvelope>,
) -> Json<ProcessingSummary> {
    let summary = dispatch(&state, &envelope).await;

    tracing::info!(
        outcomes = summary.results.len(),
        failures = summary.results.iter().filter(|o| o.is_failure()).count(),
        "Event envelope processed"
    );
    Json(summary)
}
