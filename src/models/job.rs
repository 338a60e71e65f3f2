use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Operation id assigned by the recognition service at submission time.
pub type JobToken = String;

/// A recognition job that has been submitted but not yet materialized.
///
/// Serialized as `{ "done", "last_updated", "bucket_id", "object_id" }`, which
/// is the on-disk layout of the filesystem job store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobRecord {
    pub done: bool,

    /// Unix timestamp (seconds, fractional) of the last state transition.
    pub last_updated: f64,

    #[serde(rename = "bucket_id")]
    pub source_container: String,

    #[serde(rename = "object_id")]
    pub source_object: String,
}

impl JobRecord {
    /// A fresh, not-yet-done record stamped with the current time.
    pub fn new(source_container: impl Into<String>, source_object: impl Into<String>) -> Self {
        Self {
            done: false,
            last_updated: unix_now(),
            source_container: source_container.into(),
            source_object: source_object.into(),
        }
    }

    /// Record a poll that found the job still running.
    pub fn touch(&mut self) {
        self.last_updated = unix_now();
    }

    /// Record a poll that found results.
    pub fn mark_done(&mut self) {
        self.done = true;
        self.touch();
    }
}

/// Current time as fractional Unix seconds.
pub fn unix_now() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persisted_field_names() {
        let record = JobRecord::new("images", "inbox/photo.jpg");
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["done"], false);
        assert_eq!(value["bucket_id"], "images");
        assert_eq!(value["object_id"], "inbox/photo.jpg");
        assert!(value["last_updated"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn test_parses_integer_timestamp() {
        let record: JobRecord = serde_json::from_str(
            r#"{"done": false, "last_updated": 1700000000, "bucket_id": "b", "object_id": "o.png"}"#,
        )
        .unwrap();
        assert_eq!(record.last_updated, 1_700_000_000.0);
    }

    #[test]
    fn test_mark_done_flips_flag_and_stamps() {
        let mut record = JobRecord::new("b", "o.png");
        record.last_updated = 0.0;
        record.mark_done();
        assert!(record.done);
        assert!(record.last_updated > 0.0);
    }
}
