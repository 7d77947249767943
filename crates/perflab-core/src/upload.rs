//! Upload spooling.
//!
//! Uploaded bytes are kept for audit compatibility. The pipeline reads the
//! named corpus file under the input root, never the spooled copy.

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Record of a spooled upload.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    /// Where the bytes were written.
    pub path: PathBuf,

    /// Client-supplied file name, kept as metadata only.
    pub original_name: String,

    /// Size in bytes.
    pub size: u64,
}

/// Write uploaded bytes into the spool directory under a random name.
///
/// The client file name never becomes part of the on-disk path, so it
/// cannot influence where the bytes land.
pub fn store_upload(upload_dir: &Path, original_name: &str, bytes: &[u8]) -> Result<StoredUpload> {
    fs::create_dir_all(upload_dir)?;
    let path = upload_dir.join(Uuid::new_v4().simple().to_string());
    fs::write(&path, bytes)?;

    tracing::debug!(
        path = %path.display(),
        original_name,
        size = bytes.len(),
        "spooled upload"
    );

    Ok(StoredUpload {
        path,
        original_name: original_name.to_string(),
        size: bytes.len() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_store_upload_writes_bytes() {
        let dir = TempDir::new().expect("tempdir");
        let stored =
            store_upload(dir.path(), "test_1.c", b"int main(void) { return 0; }").expect("store");
        assert_eq!(stored.original_name, "test_1.c");
        assert_eq!(stored.size, 28);
        let on_disk = fs::read(&stored.path).expect("read back");
        assert_eq!(on_disk, b"int main(void) { return 0; }");
    }

    #[test]
    fn test_store_upload_ignores_client_name_for_path() {
        let dir = TempDir::new().expect("tempdir");
        let stored = store_upload(dir.path(), "../../escape.c", b"x").expect("store");
        assert!(stored.path.starts_with(dir.path()));
        assert!(!stored.path.ends_with("escape.c"));
    }

    #[test]
    fn test_store_upload_creates_spool_dir() {
        let dir = TempDir::new().expect("tempdir");
        let spool = dir.path().join("nested").join("spool");
        let stored = store_upload(&spool, "a.c", b"y").expect("store");
        assert!(stored.path.starts_with(&spool));
    }

    #[test]
    fn test_distinct_uploads_get_distinct_paths() {
        let dir = TempDir::new().expect("tempdir");
        let first = store_upload(dir.path(), "a.c", b"1").expect("store");
        let second = store_upload(dir.path(), "a.c", b"2").expect("store");
        assert_ne!(first.path, second.path);
    }
}
