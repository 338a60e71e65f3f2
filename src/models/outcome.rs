use serde::{Deserialize, Serialize};

/// Per-item result of processing an event batch.
///
/// Serialized with a `status` tag so callers can branch on it without
/// inspecting which other fields are present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Submitted {
        bucket_id: String,
        object_id: String,
        operation_id: String,
    },
    RejectedUnsupportedFormat {
        bucket_id: String,
        object_id: String,
        error: String,
    },
    RejectedFileTooLarge {
        bucket_id: String,
        object_id: String,
        error: String,
    },
    RejectedOtherError {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bucket_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        object_id: Option<String>,
        error: String,
    },
    Completed {
        operation_id: String,
        saved_to: String,
        json_results: String,
    },
    InProgress {
        operation_id: String,
    },
    Error {
        operation_id: String,
        error: String,
    },
}

impl Outcome {
    pub fn operation_id(&self) -> Option<&str> {
        match self {
            Outcome::Submitted { operation_id, .. }
            | Outcome::Completed { operation_id, .. }
            | Outcome::InProgress { operation_id }
            | Outcome::Error { operation_id, .. } => Some(operation_id),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Outcome::RejectedUnsupportedFormat { .. }
                | Outcome::RejectedFileTooLarge { .. }
                | Outcome::RejectedOtherError { .. }
                | Outcome::Error { .. }
        )
    }
}

/// Response body for one delivered envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessingSummary {
    pub message: String,
    pub results: Vec<Outcome>,
}
