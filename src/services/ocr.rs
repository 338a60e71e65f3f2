use async_trait::async_trait;
use base64::Engine;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use strum::{AsRefStr, Display};

use crate::models::job::JobToken;
use crate::models::page::PageResult;

pub const DEFAULT_ENDPOINT: &str = "https://ocr.api.cloud.yandex.net";
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

const RECOGNIZE_PATH: &str = "/ocr/v1/recognizeTextAsync";
const GET_RECOGNITION_PATH: &str = "/ocr/v1/getRecognition";

/// Document formats accepted by the recognition service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum MimeType {
    #[strum(serialize = "image/jpeg")]
    Jpeg,
    #[strum(serialize = "image/png")]
    Png,
    #[strum(serialize = "application/pdf")]
    Pdf,
}

impl MimeType {
    /// Map a file extension (case-insensitive) onto the allow-list.
    pub fn from_path(path: &Path) -> Result<Self, OcrError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "jpg" | "jpeg" => Ok(MimeType::Jpeg),
            "png" => Ok(MimeType::Png),
            "pdf" => Ok(MimeType::Pdf),
            _ => Err(OcrError::UnsupportedFormat { extension }),
        }
    }
}

/// Validate a file and read it into memory for submission.
///
/// The format is checked first, then the size from file metadata, and only
/// then is the content read, so oversized files are never loaded.
pub async fn load_for_submission(
    path: &Path,
    max_bytes: u64,
) -> Result<(Vec<u8>, MimeType), OcrError> {
    let mime = MimeType::from_path(path)?;

    let size = tokio::fs::metadata(path)
        .await
        .map_err(|source| OcrError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    if size > max_bytes {
        return Err(OcrError::FileTooLarge {
            size,
            limit: max_bytes,
        });
    }

    let content = tokio::fs::read(path).await.map_err(|source| OcrError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((content, mime))
}

/// Remote text recognition: submit a document, later fetch its pages.
#[async_trait]
pub trait RecognitionService: Send + Sync {
    /// Validate and submit the file, returning the service's operation id.
    async fn submit(&self, path: &Path) -> Result<JobToken, OcrError>;

    /// Fetch results for an operation. An empty vec means "still running".
    async fn fetch_results(&self, token: &str) -> Result<Vec<PageResult>, OcrError>;
}

/// Connection settings for [`OcrClient`].
#[derive(Debug, Clone)]
pub struct OcrClientSettings {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub language_codes: Vec<String>,
    pub max_file_size: u64,
    pub timeout: Duration,
}

impl Default for OcrClientSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            language_codes: vec!["en".to_string(), "ru".to_string()],
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            timeout: Duration::from_secs(30),
        }
    }
}

/// REST client for the asynchronous Yandex Cloud OCR API.
pub struct OcrClient {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
    language_codes: Vec<String>,
    max_file_size: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeRequest<'a> {
    mime_type: &'a str,
    language_codes: &'a [String],
    content: String,
}

#[derive(Deserialize)]
struct Operation {
    id: String,
}

#[derive(Deserialize)]
struct RecognitionChunk {
    #[serde(default)]
    result: Option<RawPage>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPage {
    #[serde(default, deserialize_with = "page_number")]
    page: Option<u64>,
    #[serde(default)]
    text_annotation: Option<serde_json::Value>,
}

/// Int64 fields arrive as JSON strings from the gateway, but accept numbers too.
fn page_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Normalize a `getRecognition` body into ordered pages.
///
/// The body is a stream of JSON documents, one per page; a blank body or a
/// stream without `result` entries means the operation is not finished.
pub fn parse_recognition_body(body: &str) -> Result<Vec<PageResult>, OcrError> {
    let mut pages = Vec::new();
    for chunk in serde_json::Deserializer::from_str(body).into_iter::<RecognitionChunk>() {
        let chunk = chunk?;
        if let Some(error) = chunk.error {
            return Err(OcrError::RemoteRejected(error.to_string()));
        }
        let Some(raw) = chunk.result else { continue };

        let text = raw
            .text_annotation
            .as_ref()
            .and_then(|a| a.get("fullText"))
            .and_then(|t| t.as_str())
            .unwrap_or_default()
            .to_string();
        pages.push(PageResult {
            page: raw.page,
            text,
            annotation: raw.text_annotation,
        });
    }
    Ok(pages)
}

impl OcrClient {
    pub fn new(settings: OcrClientSettings) -> Result<Self, OcrError> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(OcrError::RemoteService)?;

        Ok(Self {
            http,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            api_key: settings.api_key,
            language_codes: settings.language_codes,
            max_file_size: settings.max_file_size,
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(AUTHORIZATION, format!("Api-Key {}", key)),
            None => request,
        }
    }

    async fn check_status(response: Response) -> Result<Response, OcrError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(OcrError::RemoteStatus {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl RecognitionService for OcrClient {
    async fn submit(&self, path: &Path) -> Result<JobToken, OcrError> {
        let (content, mime) = load_for_submission(path, self.max_file_size).await?;

        let body = RecognizeRequest {
            mime_type: mime.as_ref(),
            language_codes: &self.language_codes,
            content: base64::engine::general_purpose::STANDARD.encode(&content),
        };

        let response = self
            .authorize(self.http.post(format!("{}{}", self.endpoint, RECOGNIZE_PATH)))
            .json(&body)
            .send()
            .await?;
        let operation: Operation = Self::check_status(response).await?.json().await?;

        tracing::debug!(
            path = %path.display(),
            mime_type = %mime,
            bytes = content.len(),
            operation_id = %operation.id,
            "Recognition request accepted"
        );
        Ok(operation.id)
    }

    async fn fetch_results(&self, token: &str) -> Result<Vec<PageResult>, OcrError> {
        let response = self
            .authorize(
                self.http
                    .get(format!("{}{}", self.endpoint, GET_RECOGNITION_PATH))
                    .query(&[("operationId", token)]),
            )
            .send()
            .await?;
        let body = Self::check_status(response).await?.text().await?;

        parse_recognition_body(&body)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("Unsupported file format: {extension:?}. Supported formats are: JPEG, PNG, and PDF.")]
    UnsupportedFormat { extension: String },

    #[error("File size ({size} bytes) exceeds the maximum allowed size of {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Recognition service request failed: {0}")]
    RemoteService(#[from] reqwest::Error),

    #[error("Recognition service returned HTTP {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    #[error("Recognition service reported an error: {0}")]
    RemoteRejected(String),

    #[error("Malformed recognition service response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}

impl OcrError {
    /// Transport, auth, timeout or service-side failure, as opposed to a
    /// problem with the submitted file.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            OcrError::RemoteService(_)
                | OcrError::RemoteStatus { .. }
                | OcrError::RemoteRejected(_)
                | OcrError::MalformedResponse(_)
        )
    }
}
