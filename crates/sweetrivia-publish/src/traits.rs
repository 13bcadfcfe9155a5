use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Metadata row written after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub filename: String,
    pub created_at: DateTime<Utc>,
    pub path: String,
    pub download_url: String,
    pub active: bool,
}

/// A bucket of uploaded export files.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Human-readable backend name (e.g., "supabase", "local")
    fn name(&self) -> &str;

    /// Bucket the exports go to
    fn bucket(&self) -> &str;

    /// Check that the bucket exists. Never creates it.
    async fn bucket_exists(&self) -> Result<bool, StorageError>;

    /// Store `body` at `path`. Must fail with [`StorageError::AlreadyExists`]
    /// instead of replacing an existing object.
    async fn upload(&self, path: &str, body: Vec<u8>, content_type: &str)
        -> Result<(), StorageError>;

    /// Public download URL of `path`
    fn public_url(&self, path: &str) -> String;
}

/// Append-only table of export metadata.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, record: &ExportRecord) -> Result<(), StorageError>;
}
