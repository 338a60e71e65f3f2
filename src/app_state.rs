use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{AppConfig, JobStoreKind};
use crate::observability::{EventSink, TracingSink};
use crate::services::{
    job_store::{FsJobStore, JobStore, StoreError},
    ocr::{OcrClient, OcrError, RecognitionService},
    redis_store::RedisJobStore,
    results::ResultWriter,
};

/// Collaborators shared by the event handlers and route handlers.
#[derive(Clone)]
pub struct AppState {
    pub ocr: Arc<dyn RecognitionService>,
    pub jobs: Arc<dyn JobStore>,
    pub results: Arc<ResultWriter>,
    pub events: Arc<dyn EventSink>,
    /// Object ids are resolved relative to this directory.
    pub bucket_root: PathBuf,
}

impl AppState {
    pub fn new(
        ocr: Arc<dyn RecognitionService>,
        jobs: Arc<dyn JobStore>,
        results: ResultWriter,
        events: Arc<dyn EventSink>,
        bucket_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            ocr,
            jobs,
            results: Arc::new(results),
            events,
            bucket_root: bucket_root.into(),
        }
    }

    /// Wire the production collaborators described by `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        let settings = config.ocr_settings();
        if settings.api_key.is_none() {
            tracing::warn!("API_KEY environment variable not set; OCR requests will be unauthenticated");
        }
        let ocr = OcrClient::new(settings)?;

        let jobs: Arc<dyn JobStore> = match config.job_store {
            JobStoreKind::Fs => {
                tracing::info!(dir = %config.process_dir.display(), "Using filesystem job store");
                Arc::new(FsJobStore::new(&config.process_dir))
            }
            JobStoreKind::Redis => {
                let url = config
                    .redis_url
                    .as_deref()
                    .ok_or(StartupError::MissingRedisUrl)?;
                tracing::info!(key = %config.redis_key, "Using Redis job store");
                Arc::new(RedisJobStore::new(url, config.redis_key.clone())?)
            }
        };

        Ok(Self::new(
            Arc::new(ocr),
            jobs,
            ResultWriter::new(&config.results_dir),
            Arc::new(TracingSink),
            &config.bucket_root,
        ))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Failed to initialize OCR client: {0}")]
    Ocr(#[from] OcrError),

    #[error("Failed to initialize job store: {0}")]
    Store(#[from] StoreError),

    #[error("REDIS_URL is required for the Redis job store")]
    MissingRedisUrl,
}
