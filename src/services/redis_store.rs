use async_trait::async_trait;
use redis::AsyncCommands;
use std::collections::HashMap;

use super::job_store::{JobStore, StoreError};
use crate::models::job::{JobRecord, JobToken};

pub const DEFAULT_KEY: &str = "ocr:jobs";

/// Overwrite a hash field only if it is already present.
const UPDATE_EXISTING: &str = r#"
if redis.call('HEXISTS', KEYS[1], ARGV[1]) == 1 then
    redis.call('HSET', KEYS[1], ARGV[1], ARGV[2])
    return 1
end
return 0
"#;

/// Redis-backed job store: one hash, field = job token, value = record JSON.
///
/// Every operation is a single command (or script), so concurrent workers
/// never observe a partially written record.
pub struct RedisJobStore {
    client: redis::Client,
    key: String,
    update_script: redis::Script,
}

impl RedisJobStore {
    pub fn new(redis_url: &str, key: impl Into<String>) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self {
            client,
            key: key.into(),
            update_script: redis::Script::new(UPDATE_EXISTING),
        })
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, StoreError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl JobStore for RedisJobStore {
    async fn create(&self, token: &str, record: &JobRecord) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let payload = serde_json::to_string(record)?;
        let inserted: bool = conn.hset_nx(&self.key, token, payload).await?;
        if !inserted {
            return Err(StoreError::DuplicateToken(token.to_string()));
        }
        Ok(())
    }

    async fn read(&self, token: &str) -> Result<JobRecord, StoreError> {
        let mut conn = self.connection().await?;
        let payload: Option<String> = conn.hget(&self.key, token).await?;
        match payload {
            Some(payload) => Ok(serde_json::from_str(&payload)?),
            None => Err(StoreError::NotFound(token.to_string())),
        }
    }

    async fn update(&self, token: &str, record: &JobRecord) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let payload = serde_json::to_string(record)?;
        let updated: i64 = self
            .update_script
            .key(&self.key)
            .arg(token)
            .arg(payload)
            .invoke_async(&mut conn)
            .await?;
        if updated == 0 {
            return Err(StoreError::NotFound(token.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, token: &str) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let removed: i64 = conn.hdel(&self.key, token).await?;
        if removed == 0 {
            return Err(StoreError::NotFound(token.to_string()));
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<(JobToken, JobRecord)>, StoreError> {
        let mut conn = self.connection().await?;
        let entries: HashMap<String, String> = conn.hgetall(&self.key).await?;

        let mut records = Vec::with_capacity(entries.len());
        for (token, payload) in entries {
            match serde_json::from_str(&payload) {
                Ok(record) => records.push((token, record)),
                Err(e) => {
                    tracing::warn!(operation_id = %token, error = %e, "Skipping unreadable job record");
                }
            }
        }
        Ok(records)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }
}
