//! Directory-backed storage.
//!
//! The directory plays the bucket: it has to exist already, files are never
//! overwritten, and metadata rows are appended to `exports.jsonl` inside it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::warn;

use crate::error::StorageError;
use crate::traits::{ExportRecord, ObjectStore, RecordStore};

/// Name of the metadata log inside the bucket directory
pub const RECORDS_FILE: &str = "exports.jsonl";

pub struct LocalStorage {
    root: PathBuf,
    bucket: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let bucket = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| root.display().to_string());
        Self { root, bucket }
    }

    /// Stored metadata rows, oldest first
    pub async fn records(&self) -> Result<Vec<ExportRecord>, StorageError> {
        let path = self.root.join(RECORDS_FILE);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            records.push(serde_json::from_str(line)?);
        }
        Ok(records)
    }
}

#[async_trait]
impl ObjectStore for LocalStorage {
    fn name(&self) -> &str {
        "local"
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn bucket_exists(&self) -> Result<bool, StorageError> {
        match tokio::fs::metadata(&self.root).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn upload(
        &self,
        path: &str,
        body: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        let target = self.root.join(path);
        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await;

        let mut file = match file {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(StorageError::AlreadyExists(path.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::BucketNotFound(self.bucket.clone()))
            }
            Err(e) => return Err(e.into()),
        };

        write_or_discard(&mut file, &target, &body).await
    }

    fn public_url(&self, path: &str) -> String {
        format!("file://{}", self.root.join(path).display())
    }
}

/// Write a freshly created object. A partial write is deleted so the name
/// never holds a truncated object.
async fn write_or_discard<W>(
    writer: &mut W,
    target: &Path,
    body: &[u8],
) -> Result<(), StorageError>
where
    W: AsyncWrite + Unpin,
{
    let written = match writer.write_all(body).await {
        Ok(()) => writer.flush().await,
        Err(e) => Err(e),
    };

    if let Err(e) = written {
        if let Err(remove_err) = tokio::fs::remove_file(target).await {
            warn!(path = %target.display(), error = %remove_err, "Failed to remove partial upload");
        }
        return Err(e.into());
    }
    Ok(())
}

#[async_trait]
impl RecordStore for LocalStorage {
    async fn insert(&self, record: &ExportRecord) -> Result<(), StorageError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.root.join(RECORDS_FILE))
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
