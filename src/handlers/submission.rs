use garde::Validate;

use crate::app_state::AppState;
use crate::models::event::{EventMessage, ObjectDetails};
use crate::models::job::JobRecord;
use crate::models::outcome::Outcome;
use crate::observability::PipelineEvent;
use crate::services::ocr::OcrError;

/// Submit every object in an object-creation batch.
///
/// Messages are handled one after another and independently: a rejected
/// object never prevents its siblings from being submitted.
pub async fn submit_batch(state: &AppState, messages: &[EventMessage]) -> Vec<Outcome> {
    let mut outcomes = Vec::with_capacity(messages.len());
    for message in messages {
        outcomes.push(submit_object(state, message).await);
    }
    outcomes
}

/// Validate, submit and record one newly created object.
pub async fn submit_object(state: &AppState, message: &EventMessage) -> Outcome {
    let Some(details) = message.details.as_ref() else {
        return reject_other(state, None, "message has no object details".to_string());
    };
    if let Err(report) = details.validate() {
        return reject_other(state, Some(details), format!("invalid object details: {}", report));
    }

    let path = state.bucket_root.join(&details.object_id);
    tracing::debug!(path = %path.display(), bucket_id = %details.bucket_id, "Submitting OCR request");

    let token = match state.ocr.submit(&path).await {
        Ok(token) => token,
        Err(e) => return reject_submission(state, details, e),
    };

    let record = JobRecord::new(&details.bucket_id, &details.object_id);
    if let Err(e) = state.jobs.create(&token, &record).await {
        // The remote job exists but is untracked; it will never be materialized.
        return reject_other(
            state,
            Some(details),
            format!("failed to record operation {}: {}", token, e),
        );
    }

    state.events.emit(PipelineEvent::Submitted {
        operation_id: token.clone(),
        object_id: details.object_id.clone(),
    });
    Outcome::Submitted {
        bucket_id: details.bucket_id.clone(),
        object_id: details.object_id.clone(),
        operation_id: token,
    }
}

fn reject_submission(state: &AppState, details: &ObjectDetails, error: OcrError) -> Outcome {
    let (bucket_id, object_id, reason) = (
        details.bucket_id.clone(),
        details.object_id.clone(),
        error.to_string(),
    );

    let outcome = match error {
        OcrError::UnsupportedFormat { .. } => Outcome::RejectedUnsupportedFormat {
            bucket_id,
            object_id,
            error: reason.clone(),
        },
        OcrError::FileTooLarge { .. } => Outcome::RejectedFileTooLarge {
            bucket_id,
            object_id,
            error: reason.clone(),
        },
        _ => return reject_other(state, Some(details), reason),
    };

    state.events.emit(PipelineEvent::Rejected {
        object_id: Some(details.object_id.clone()),
        status: status_of(&outcome),
        reason,
    });
    outcome
}

fn reject_other(state: &AppState, details: Option<&ObjectDetails>, reason: String) -> Outcome {
    let outcome = Outcome::RejectedOtherError {
        bucket_id: details.map(|d| d.bucket_id.clone()),
        object_id: details.map(|d| d.object_id.clone()),
        error: reason.clone(),
    };
    state.events.emit(PipelineEvent::Rejected {
        object_id: details.map(|d| d.object_id.clone()),
        status: status_of(&outcome),
        reason,
    });
    outcome
}

fn status_of(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::RejectedUnsupportedFormat { .. } => "rejected_unsupported_format",
        Outcome::RejectedFileTooLarge { .. } => "rejected_file_too_large",
        _ => "rejected_other_error",
    }
}
