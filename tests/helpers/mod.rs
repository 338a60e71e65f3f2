//! Test helper utilities: a scripted recognition service and a wired state

use async_ocr_worker::app_state::AppState;
use async_ocr_worker::models::job::JobToken;
use async_ocr_worker::models::page::PageResult;
use async_ocr_worker::observability::RecordingSink;
use async_ocr_worker::services::job_store::FsJobStore;
use async_ocr_worker::services::ocr::{
    load_for_submission, OcrError, RecognitionService, DEFAULT_MAX_FILE_SIZE,
};
use async_ocr_worker::services::results::ResultWriter;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// What `fetch_results` should answer for a token.
#[derive(Debug, Clone)]
pub enum Scripted {
    Pending,
    Done(Vec<PageResult>),
    Unavailable,
}

/// In-process stand-in for the OCR service.
///
/// `submit` performs the real file validation, then hands out tokens from a
/// queue; `fetch_results` answers from a per-token script.
pub struct FakeRecognition {
    tokens: Mutex<VecDeque<String>>,
    results: Mutex<HashMap<String, Scripted>>,
    submitted: Mutex<Vec<PathBuf>>,
    fetches: Mutex<Vec<String>>,
    fail_submit_for: Mutex<Vec<String>>,
}

impl FakeRecognition {
    pub fn new() -> Self {
        Self {
            tokens: Mutex::new(VecDeque::new()),
            results: Mutex::new(HashMap::new()),
            submitted: Mutex::new(Vec::new()),
            fetches: Mutex::new(Vec::new()),
            fail_submit_for: Mutex::new(Vec::new()),
        }
    }

    pub fn with_tokens(self, tokens: &[&str]) -> Self {
        self.tokens
            .lock()
            .unwrap()
            .extend(tokens.iter().map(|t| t.to_string()));
        self
    }

    /// Make `submit` fail with a remote error for files with this name.
    pub fn failing_submit(self, file_name: &str) -> Self {
        self.fail_submit_for.lock().unwrap().push(file_name.to_string());
        self
    }

    pub fn script(&self, token: &str, answer: Scripted) {
        self.results.lock().unwrap().insert(token.to_string(), answer);
    }

    pub fn submitted(&self) -> Vec<PathBuf> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn fetch_count(&self, token: &str) -> usize {
        self.fetches.lock().unwrap().iter().filter(|t| *t == token).count()
    }
}

#[async_trait]
impl RecognitionService for FakeRecognition {
    async fn submit(&self, path: &Path) -> Result<JobToken, OcrError> {
        load_for_submission(path, DEFAULT_MAX_FILE_SIZE).await?;

        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if self.fail_submit_for.lock().unwrap().iter().any(|n| n == name) {
            return Err(OcrError::RemoteStatus {
                status: 503,
                body: "service unavailable".to_string(),
            });
        }

        self.submitted.lock().unwrap().push(path.to_path_buf());
        let token = self
            .tokens
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted token left");
        Ok(token)
    }

    async fn fetch_results(&self, token: &str) -> Result<Vec<PageResult>, OcrError> {
        self.fetches.lock().unwrap().push(token.to_string());
        let answer = self
            .results
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .unwrap_or(Scripted::Pending);

        match answer {
            Scripted::Pending => Ok(Vec::new()),
            Scripted::Done(pages) => Ok(pages),
            Scripted::Unavailable => Err(OcrError::RemoteStatus {
                status: 503,
                body: "service unavailable".to_string(),
            }),
        }
    }
}

/// A fully wired state over temp directories.
pub struct Harness {
    pub dir: TempDir,
    pub ocr: Arc<FakeRecognition>,
    pub jobs: Arc<FsJobStore>,
    pub sink: Arc<RecordingSink>,
    pub state: AppState,
}

impl Harness {
    pub fn new(ocr: FakeRecognition) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("bucket")).unwrap();

        let ocr = Arc::new(ocr);
        let jobs = Arc::new(FsJobStore::new(dir.path().join("bucket/process")));
        let sink = Arc::new(RecordingSink::new());
        let state = AppState::new(
            ocr.clone(),
            jobs.clone(),
            ResultWriter::new(dir.path().join("bucket/results")),
            sink.clone(),
            dir.path().join("bucket"),
        );

        Self {
            dir,
            ocr,
            jobs,
            sink,
            state,
        }
    }

    pub fn bucket_root(&self) -> PathBuf {
        self.dir.path().join("bucket")
    }

    pub fn results_dir(&self) -> PathBuf {
        self.dir.path().join("bucket/results")
    }
}
