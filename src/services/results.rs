use std::path::{Path, PathBuf};
use tokio::fs;

use crate::models::page::PageResult;

/// Where the renditions of one job were written.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializedPaths {
    pub text: PathBuf,
    pub structured: PathBuf,
}

/// Writes recognized pages as `{base}.txt` and `{base}.json` in a results directory.
pub struct ResultWriter {
    results_dir: PathBuf,
}

impl ResultWriter {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
        }
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Output paths for a source object, keyed by its final path component.
    pub fn paths_for(&self, source_object: &str) -> Result<MaterializedPaths, ResultWriteError> {
        let base = Path::new(source_object)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ResultWriteError::InvalidObjectId(source_object.to_string()))?;

        Ok(MaterializedPaths {
            text: self.results_dir.join(format!("{base}.txt")),
            structured: self.results_dir.join(format!("{base}.json")),
        })
    }

    /// Write both renditions. Success means both files are fully written.
    pub async fn write(
        &self,
        source_object: &str,
        pages: &[PageResult],
    ) -> Result<MaterializedPaths, ResultWriteError> {
        let paths = self.paths_for(source_object)?;
        let text = render_text(pages);
        let structured = render_structured(pages)?;

        fs::create_dir_all(&self.results_dir)
            .await
            .map_err(|source| ResultWriteError::CreateDir {
                path: self.results_dir.clone(),
                source,
            })?;

        fs::write(&paths.text, text)
            .await
            .map_err(|source| ResultWriteError::Text {
                path: paths.text.clone(),
                source,
            })?;
        fs::write(&paths.structured, structured)
            .await
            .map_err(|source| ResultWriteError::Structured {
                path: paths.structured.clone(),
                source,
            })?;

        Ok(paths)
    }
}

/// Plain-text rendition: page texts in order, each followed by a blank line.
///
/// Multi-page results get a `--- Page N ---` header per page. Pages with no
/// text are left out of this rendition (they remain in the structured one).
pub fn render_text(pages: &[PageResult]) -> String {
    let multi_page = pages.len() > 1;
    let mut out = String::new();

    for (position, page) in pages.iter().enumerate() {
        if page.text.is_empty() {
            continue;
        }
        if multi_page {
            out.push_str(&format!("--- Page {} ---\n", page.number(position)));
        }
        out.push_str(&page.text);
        out.push_str("\n\n");
    }
    out
}

/// Structured rendition: every page, in result order, as pretty JSON.
pub fn render_structured(pages: &[PageResult]) -> Result<String, ResultWriteError> {
    Ok(serde_json::to_string_pretty(pages)?)
}

#[derive(Debug, thiserror::Error)]
pub enum ResultWriteError {
    #[error("Cannot derive a result filename from object id {0:?}")]
    InvalidObjectId(String),

    #[error("Failed to create results directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write text results to {path}: {source}")]
    Text {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write structured results to {path}: {source}")]
    Structured {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode structured results: {0}")]
    Encode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_page_has_no_header() {
        let text = render_text(&[PageResult::new(Some(0), "Hello World")]);
        assert_eq!(text, "Hello World\n\n");
    }

    #[test]
    fn test_multi_page_headers() {
        let pages = [
            PageResult::new(Some(1), "first"),
            PageResult::new(None, ""),
            PageResult::new(None, "third"),
        ];
        assert_eq!(
            render_text(&pages),
            "--- Page 1 ---\nfirst\n\n--- Page 3 ---\nthird\n\n"
        );
    }

    #[test]
    fn test_paths_strip_directories() {
        let writer = ResultWriter::new("/bucket/results");
        let paths = writer.paths_for("uploads/2024/photo.jpg").unwrap();
        assert_eq!(paths.text, Path::new("/bucket/results/photo.jpg.txt"));
        assert_eq!(paths.structured, Path::new("/bucket/results/photo.jpg.json"));

        assert!(matches!(
            writer.paths_for("uploads/.."),
            Err(ResultWriteError::InvalidObjectId(_))
        ));
    }

    #[tokio::test]
    async fn test_write_both_renditions() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ResultWriter::new(dir.path().join("results"));
        let mut first = PageResult::new(Some(1), "alpha");
        first.annotation = Some(serde_json::json!({"fullText": "alpha", "blocks": []}));
        let pages = vec![first, PageResult::new(Some(2), "beta")];

        let paths = writer.write("in/doc.pdf", &pages).await.unwrap();

        let text = std::fs::read_to_string(&paths.text).unwrap();
        assert!(text.contains("--- Page 1 ---\nalpha"));
        assert!(text.contains("--- Page 2 ---\nbeta"));

        let decoded: Vec<PageResult> =
            serde_json::from_str(&std::fs::read_to_string(&paths.structured).unwrap()).unwrap();
        assert_eq!(decoded, pages);
    }

    #[tokio::test]
    async fn test_unwritable_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("results");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let writer = ResultWriter::new(&blocker);
        let err = writer
            .write("photo.jpg", &[PageResult::new(None, "x")])
            .await
            .unwrap_err();
        assert!(matches!(err, ResultWriteError::CreateDir { .. }));
    }
}
