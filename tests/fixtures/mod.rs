//! Test fixtures: source files and canned recognition results

use async_ocr_worker::models::page::PageResult;
use std::path::Path;

pub const BUCKET: &str = "scans";

/// Write a source object of `size` bytes under the bucket root.
pub fn write_object(bucket_root: &Path, object_id: &str, size: usize) {
    let path = bucket_root.join(object_id);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, vec![0u8; size]).unwrap();
}

/// Create a source object whose size exists only in metadata.
pub fn write_sparse_object(bucket_root: &Path, object_id: &str, size: u64) {
    let file = std::fs::File::create(bucket_root.join(object_id)).unwrap();
    file.set_len(size).unwrap();
}

pub fn single_page(text: &str) -> Vec<PageResult> {
    vec![PageResult::new(Some(0), text)]
}

pub fn two_pages() -> Vec<PageResult> {
    vec![
        PageResult::new(Some(1), "Chapter one"),
        PageResult::new(Some(2), "Chapter two"),
    ]
}
