use crate::app_state::AppState;
use crate::models::job::JobRecord;
use crate::models::outcome::Outcome;
use crate::observability::PipelineEvent;
use crate::services::job_store::StoreError;
use crate::services::results::MaterializedPaths;

/// Check every pending job once.
///
/// Finished jobs are materialized and removed from the store; running jobs
/// get their timestamp refreshed. Any failure leaves the record in place for
/// the next timer tick.
pub async fn poll_pending(state: &AppState) -> Vec<Outcome> {
    let pending = match state.jobs.list_all().await {
        Ok(pending) => pending,
        Err(e) => {
            return vec![fail(state, "unknown", format!("failed to list pending jobs: {}", e))];
        }
    };
    state.events.emit(PipelineEvent::PollStarted {
        pending: pending.len(),
    });

    let mut outcomes = Vec::with_capacity(pending.len());
    for (token, record) in pending {
        outcomes.push(poll_job(state, &token, record).await);
    }
    outcomes
}

/// Advance one job by a single completion check.
pub async fn poll_job(state: &AppState, token: &str, mut record: JobRecord) -> Outcome {
    tracing::debug!(operation_id = %token, object_id = %record.source_object, "Checking results");

    let pages = match state.ocr.fetch_results(token).await {
        Ok(pages) => pages,
        Err(e) => return fail(state, token, e.to_string()),
    };

    if pages.is_empty() {
        record.touch();
        if let Err(e) = state.jobs.update(token, &record).await {
            return fail(state, token, e.to_string());
        }
        state.events.emit(PipelineEvent::InProgress {
            operation_id: token.to_string(),
        });
        return Outcome::InProgress {
            operation_id: token.to_string(),
        };
    }

    if !record.done {
        record.mark_done();
        match state.jobs.update(token, &record).await {
            Ok(()) => {}
            // Another instance materialized and removed it since listing.
            Err(StoreError::NotFound(_)) => {
                tracing::debug!(operation_id = %token, "Job already completed elsewhere");
                return match state.results.paths_for(&record.source_object) {
                    Ok(paths) => completed(token, &paths),
                    Err(e) => fail(state, token, e.to_string()),
                };
            }
            Err(e) => return fail(state, token, e.to_string()),
        }
    }

    let paths = match state.results.write(&record.source_object, &pages).await {
        Ok(paths) => paths,
        Err(e) => return fail(state, token, e.to_string()),
    };

    match state.jobs.delete(token).await {
        // Another instance materialized and removed it first.
        Ok(()) | Err(StoreError::NotFound(_)) => {}
        Err(e) => return fail(state, token, e.to_string()),
    }

    state.events.emit(PipelineEvent::Completed {
        operation_id: token.to_string(),
        text_path: paths.text.clone(),
        structured_path: paths.structured.clone(),
    });
    completed(token, &paths)
}

fn completed(token: &str, paths: &MaterializedPaths) -> Outcome {
    Outcome::Completed {
        operation_id: token.to_string(),
        saved_to: paths.text.display().to_string(),
        json_results: paths.structured.display().to_string(),
    }
}

fn fail(state: &AppState, token: &str, reason: String) -> Outcome {
    state.events.emit(PipelineEvent::JobFailed {
        operation_id: token.to_string(),
        reason: reason.clone(),
    });
    Outcome::Error {
        operation_id: token.to_string(),
        error: reason,
    }
}
