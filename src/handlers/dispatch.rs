use crate::app_state::AppState;
use crate::models::event::{EventEnvelope, EventType};
use crate::models::outcome::ProcessingSummary;
use crate::observability::PipelineEvent;

use super::{poll, submission};

pub const POLL_SUMMARY: &str = "Processed pending OCR operations";
pub const SUBMIT_SUMMARY: &str = "OCR recognition tasks submitted";

/// Route an envelope to the handler selected by its first message.
///
/// Unknown discriminators and empty batches produce no outcomes.
pub async fn dispatch(state: &AppState, envelope: &EventEnvelope) -> ProcessingSummary {
    let raw_type = envelope
        .messages
        .first()
        .map(|m| m.event_metadata.event_type.as_str())
        .unwrap_or_default();
    state.events.emit(PipelineEvent::BatchReceived {
        event_type: raw_type.to_string(),
        messages: envelope.messages.len(),
    });

    match envelope.event_type() {
        Some(EventType::Timer) => ProcessingSummary {
            message: POLL_SUMMARY.to_string(),
            results: poll::poll_pending(state).await,
        },
        Some(EventType::ObjectCreate) => ProcessingSummary {
            message: SUBMIT_SUMMARY.to_string(),
            results: submission::submit_batch(state, &envelope.messages).await,
        },
        None => {
            if !raw_type.is_empty() {
                tracing::warn!(event_type = %raw_type, "Ignoring unrecognized event type");
            }
            ProcessingSummary {
                message: SUBMIT_SUMMARY.to_string(),
                results: Vec::new(),
            }
        }
    }
}
