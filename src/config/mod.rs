use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::services::ocr::{OcrClientSettings, DEFAULT_ENDPOINT, DEFAULT_MAX_FILE_SIZE};
use crate::services::redis_store::DEFAULT_KEY;

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobStoreKind {
    /// One file per job under `process_dir`.
    #[default]
    Fs,
    /// One hash in Redis at `redis_url`.
    Redis,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Port injected by serverless container runtimes; overrides the port of `bind_addr`.
    #[serde(default)]
    pub port: Option<u16>,

    /// OCR service API key, sent as `Authorization: Api-Key ...`
    #[serde(default)]
    pub api_key: Option<String>,

    /// Mount point of the source bucket; object ids are resolved against it.
    #[serde(default = "default_bucket_root")]
    pub bucket_root: PathBuf,

    /// Directory of pending job records (filesystem store).
    #[serde(default = "default_process_dir")]
    pub process_dir: PathBuf,

    /// Directory receiving `.txt` and `.json` results.
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,

    #[serde(default = "default_ocr_endpoint")]
    pub ocr_endpoint: String,

    /// Upper bound for every call to the OCR service.
    #[serde(default = "default_ocr_timeout_secs")]
    pub ocr_timeout_secs: u64,

    /// Language hints, comma-separated in the environment.
    #[serde(default = "default_language_codes")]
    pub ocr_language_codes: Vec<String>,

    #[serde(default)]
    pub job_store: JobStoreKind,

    /// Redis connection string, required when `job_store = redis`
    #[serde(default)]
    pub redis_url: Option<String>,

    #[serde(default = "default_redis_key")]
    pub redis_key: String,

    /// Interval of the standalone poller.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_bucket_root() -> PathBuf {
    PathBuf::from("/bucket")
}

fn default_process_dir() -> PathBuf {
    PathBuf::from("/bucket/process")
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("/bucket/results")
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_ocr_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_ocr_timeout_secs() -> u64 {
    30
}

fn default_language_codes() -> Vec<String> {
    vec!["en".to_string(), "ru".to_string()]
}

fn default_redis_key() -> String {
    DEFAULT_KEY.to_string()
}

fn default_poll_interval_secs() -> u64 {
    60
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config: Self = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// OCR client settings alone, for tools that never touch the job store
    /// or the server.
    pub fn ocr_settings_from_env() -> Result<OcrClientSettings, ConfigError> {
        dotenvy::dotenv().ok();
        let config: Self = envy::from_env()?;
        config.validate_ocr()?;
        Ok(config.ocr_settings())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.job_store == JobStoreKind::Redis && self.redis_url.is_none() {
            return Err(ConfigError::Invalid(
                "REDIS_URL is required when JOB_STORE=redis".to_string(),
            ));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "POLL_INTERVAL_SECS must be positive".to_string(),
            ));
        }
        self.validate_ocr()
    }

    /// Checks limited to the settings the OCR client reads.
    pub fn validate_ocr(&self) -> Result<(), ConfigError> {
        if self.ocr_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "OCR_TIMEOUT_SECS must be positive".to_string(),
            ));
        }
        if self.max_file_size_bytes == 0 {
            return Err(ConfigError::Invalid(
                "MAX_FILE_SIZE_BYTES must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Address to listen on, honoring `PORT` when set.
    pub fn listen_addr(&self) -> String {
        match self.port {
            Some(port) => {
                let host = self
                    .bind_addr
                    .rsplit_once(':')
                    .map(|(host, _)| host)
                    .unwrap_or("0.0.0.0");
                format!("{}:{}", host, port)
            }
            None => self.bind_addr.clone(),
        }
    }

    pub fn ocr_settings(&self) -> OcrClientSettings {
        OcrClientSettings {
            endpoint: self.ocr_endpoint.clone(),
            api_key: self.api_key.clone().filter(|k| !k.is_empty()),
            language_codes: self.ocr_language_codes.clone(),
            max_file_size: self.max_file_size_bytes,
            timeout: Duration::from_secs(self.ocr_timeout_secs),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration from environment: {0}")]
    Env(#[from] envy::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
