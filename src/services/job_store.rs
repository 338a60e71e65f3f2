use async_trait::async_trait;
use fs4::fs_std::FileExt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::models::job::{JobRecord, JobToken};

/// Durable mapping from job token to [`JobRecord`].
///
/// Implementations must be safe to share between process instances:
/// `create` is atomic with respect to duplicate tokens and a record is never
/// observable half-written.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new record. Fails with `DuplicateToken` if one exists.
    async fn create(&self, token: &str, record: &JobRecord) -> Result<(), StoreError>;

    async fn read(&self, token: &str) -> Result<JobRecord, StoreError>;

    /// Overwrite an existing record. Fails with `NotFound` if absent.
    async fn update(&self, token: &str, record: &JobRecord) -> Result<(), StoreError>;

    /// Remove a record. Fails with `NotFound` if absent; callers racing
    /// another deleter treat that as success.
    async fn delete(&self, token: &str) -> Result<(), StoreError>;

    /// Every stored record, in no particular order.
    async fn list_all(&self) -> Result<Vec<(JobToken, JobRecord)>, StoreError>;

    /// Check backend connectivity (for health checks).
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

const TEMP_PREFIX: &str = ".tmp-";
const LOCK_FILE: &str = ".lock";

/// One JSON file per job in a "process" directory, named by the token.
///
/// Records are staged in a temp file next to their destination and moved
/// into place, so concurrent readers see either the old or the new record.
/// `update` and `delete` hold an exclusive advisory lock on `.lock` in the
/// same directory, so an update never restores a record a delete removed.
pub struct FsJobStore {
    dir: PathBuf,
}

impl FsJobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, token: &str) -> Result<PathBuf, StoreError> {
        validate_token(token)?;
        Ok(self.dir.join(token))
    }

    /// Stage `record` and move it onto `path`.
    ///
    /// `replace` overwrites an existing record under the store lock and fails
    /// with `NotFound` if there is none; otherwise the move fails if a record
    /// already exists.
    async fn persist(
        &self,
        token: &str,
        path: PathBuf,
        record: &JobRecord,
        replace: bool,
    ) -> Result<(), StoreError> {
        let payload = serde_json::to_vec(record)?;
        fs::create_dir_all(&self.dir).await?;

        let dir = self.dir.clone();
        let token = token.to_string();
        blocking(move || {
            let _lock = if replace {
                let lock = lock_store(&dir)?;
                if !path.try_exists()? {
                    return Err(StoreError::NotFound(token));
                }
                Some(lock)
            } else {
                None
            };

            let mut staged = tempfile::Builder::new()
                .prefix(TEMP_PREFIX)
                .tempfile_in(&dir)?;
            staged.write_all(&payload)?;
            staged.as_file().sync_all()?;

            let persisted = if replace {
                staged.persist(&path)
            } else {
                staged.persist_noclobber(&path)
            };
            match persisted {
                Ok(_) => Ok(()),
                Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                    Err(StoreError::DuplicateToken(token))
                }
                Err(e) => Err(StoreError::Io(e.error)),
            }
        })
        .await
    }
}

async fn blocking<T, F>(task: F) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| StoreError::Io(io::Error::other(e)))?
}

/// Exclusive lock over the whole store, held until the file is dropped.
fn lock_store(dir: &Path) -> io::Result<std::fs::File> {
    let lock = std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(dir.join(LOCK_FILE))?;
    lock.lock_exclusive()?;
    Ok(lock)
}

/// Tokens become filenames, so only plain names are accepted.
fn validate_token(token: &str) -> Result<(), StoreError> {
    let valid = !token.is_empty()
        && token.len() <= 255
        && !token.starts_with('.')
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidToken(token.to_string()))
    }
}

fn not_found(token: &str) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |e| {
        if e.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound(token.to_string())
        } else {
            StoreError::Io(e)
        }
    }
}

#[async_trait]
impl JobStore for FsJobStore {
    async fn create(&self, token: &str, record: &JobRecord) -> Result<(), StoreError> {
        let path = self.entry_path(token)?;
        self.persist(token, path, record, false).await
    }

    async fn read(&self, token: &str) -> Result<JobRecord, StoreError> {
        let path = self.entry_path(token)?;
        let raw = fs::read(&path).await.map_err(not_found(token))?;
        Ok(serde_json::from_slice(&raw)?)
    }

    async fn update(&self, token: &str, record: &JobRecord) -> Result<(), StoreError> {
        let path = self.entry_path(token)?;
        self.persist(token, path, record, true).await
    }

    async fn delete(&self, token: &str) -> Result<(), StoreError> {
        let path = self.entry_path(token)?;
        let dir = self.dir.clone();
        let token = token.to_string();
        blocking(move || {
            // A missing lock file means a missing store directory.
            let _lock = lock_store(&dir).map_err(not_found(&token))?;
            std::fs::remove_file(&path).map_err(not_found(&token))
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<(JobToken, JobRecord)>, StoreError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Some(token) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if validate_token(&token).is_err() || !entry.file_type().await?.is_file() {
                continue;
            }

            match self.read(&token).await {
                Ok(record) => records.push((token, record)),
                // Completed by another instance between listing and reading.
                Err(StoreError::NotFound(_)) => continue,
                Err(StoreError::Serialize(e)) => {
                    tracing::warn!(operation_id = %token, error = %e, "Skipping unreadable job record");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(records)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Job {0} already exists")]
    DuplicateToken(String),

    #[error("Job {0} not found")]
    NotFound(String),

    #[error("Job token {0:?} is not a valid store key")]
    InvalidToken(String),

    #[error("Job store I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
