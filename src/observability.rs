//! Pipeline events and the sinks that receive them.
//!
//! Handlers never log or count directly; they report [`PipelineEvent`]s to
//! the [`EventSink`] carried in the application state.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

/// Something noteworthy that happened while processing an envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    BatchReceived {
        event_type: String,
        messages: usize,
    },
    Submitted {
        operation_id: String,
        object_id: String,
    },
    Rejected {
        object_id: Option<String>,
        status: &'static str,
        reason: String,
    },
    PollStarted {
        pending: usize,
    },
    InProgress {
        operation_id: String,
    },
    Completed {
        operation_id: String,
        text_path: PathBuf,
        structured_path: PathBuf,
    },
    JobFailed {
        operation_id: String,
        reason: String,
    },
}

/// Receiver for pipeline events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: PipelineEvent);
}

/// Default sink: structured `tracing` logs plus Prometheus-style counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::BatchReceived {
                event_type,
                messages,
            } => {
                tracing::info!(event_type = %event_type, messages, "Processing event batch");
            }
            PipelineEvent::Submitted {
                operation_id,
                object_id,
            } => {
                metrics::counter!("ocr_jobs_submitted_total").increment(1);
                tracing::info!(operation_id = %operation_id, object_id = %object_id, "Recognition request submitted");
            }
            PipelineEvent::Rejected {
                object_id,
                status,
                reason,
            } => {
                metrics::counter!("ocr_jobs_rejected_total", "status" => status).increment(1);
                tracing::error!(
                    object_id = object_id.as_deref().unwrap_or("unknown"),
                    status,
                    error = %reason,
                    "Object rejected"
                );
            }
            PipelineEvent::PollStarted { pending } => {
                metrics::gauge!("ocr_pending_jobs").set(pending as f64);
                tracing::info!(pending, "Checking pending OCR operations");
            }
            PipelineEvent::InProgress { operation_id } => {
                metrics::counter!("ocr_jobs_in_progress_total").increment(1);
                tracing::info!(operation_id = %operation_id, "Operation in progress");
            }
            PipelineEvent::Completed {
                operation_id,
                text_path,
                structured_path,
            } => {
                metrics::counter!("ocr_jobs_completed_total").increment(1);
                tracing::info!(
                    operation_id = %operation_id,
                    saved_to = %text_path.display(),
                    json_results = %structured_path.display(),
                    "Operation completed"
                );
            }
            PipelineEvent::JobFailed {
                operation_id,
                reason,
            } => {
                metrics::counter!("ocr_job_errors_total").increment(1);
                tracing::error!(operation_id = %operation_id, error = %reason, "Error processing operation");
            }
        }
    }
}

/// Register metric descriptions with the installed recorder.
pub fn describe_metrics() {
    metrics::describe_counter!(
        "ocr_jobs_submitted_total",
        "Recognition requests accepted by the OCR service"
    );
    metrics::describe_counter!(
        "ocr_jobs_rejected_total",
        "Objects rejected before or during submission"
    );
    metrics::describe_counter!(
        "ocr_jobs_completed_total",
        "Operations whose results were materialized"
    );
    metrics::describe_counter!(
        "ocr_jobs_in_progress_total",
        "Poll checks that found an operation still running"
    );
    metrics::describe_counter!(
        "ocr_job_errors_total",
        "Poll checks that failed and will be retried"
    );
    metrics::describe_gauge!("ocr_pending_jobs", "Job records found by the last poll");
}

/// In-memory sink for tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<PipelineEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: PipelineEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.emit(PipelineEvent::PollStarted { pending: 2 });
        sink.emit(PipelineEvent::InProgress {
            operation_id: "op-1".into(),
        });

        assert_eq!(
            sink.events(),
            vec![
                PipelineEvent::PollStarted { pending: 2 },
                PipelineEvent::InProgress {
                    operation_id: "op-1".into()
                },
            ]
        );
    }

    #[test]
    fn test_tracing_sink_without_recorder() {
        // No subscriber or recorder installed: emitting must be a no-op.
        TracingSink.emit(PipelineEvent::JobFailed {
            operation_id: "op-1".into(),
            reason: "timeout".into(),
        });
    }
}
