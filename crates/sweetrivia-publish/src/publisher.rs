//! Upload a CSV export and record where it went.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sweetrivia_core::export::publish_filename;
use tracing::{info, warn};

use crate::error::{PublishError, StorageError};
use crate::flight::SingleFlight;
use crate::traits::{ExportRecord, ObjectStore, RecordStore};

const CSV_CONTENT_TYPE: &str = "text/csv";

/// What a successful publish produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReceipt {
    pub filename: String,
    pub path: String,
    pub download_url: String,
    pub created_at: DateTime<Utc>,
    /// Set when the upload went through but the metadata row did not
    pub metadata_error: Option<String>,
}

/// Publishes exports for any number of sessions, one at a time per session.
pub struct Publisher {
    objects: Arc<dyn ObjectStore>,
    records: Arc<dyn RecordStore>,
    flights: SingleFlight,
    last_millis: AtomicI64,
}

impl Publisher {
    pub fn new(objects: Arc<dyn ObjectStore>, records: Arc<dyn RecordStore>) -> Self {
        Self {
            objects,
            records,
            flights: SingleFlight::new(),
            last_millis: AtomicI64::new(0),
        }
    }

    /// Backend name, for display
    pub fn backend(&self) -> &str {
        self.objects.name()
    }

    pub fn is_in_flight(&self, session_id: &str) -> bool {
        self.flights.is_running(session_id)
    }

    /// Upload `csv` under a fresh timestamped name and insert its metadata.
    ///
    /// Fails without touching storage when another publish for the same
    /// session is still running, or when the bucket does not exist.
    pub async fn publish(
        &self,
        session_id: &str,
        csv: &str,
    ) -> Result<PublishReceipt, PublishError> {
        if csv.trim().is_empty() {
            return Err(PublishError::Empty);
        }

        let _flight = self
            .flights
            .try_begin(session_id)
            .ok_or_else(|| PublishError::InFlight(session_id.to_string()))?;

        let bucket = self.objects.bucket().to_string();
        match self.objects.bucket_exists().await {
            Ok(true) => {}
            Ok(false) => return Err(PublishError::BucketMissing(bucket)),
            Err(e) => return Err(PublishError::Transport(e.to_string())),
        }

        let created_at = Utc::now();
        let filename = publish_filename(self.next_millis(created_at.timestamp_millis()));
        let path = filename.clone();

        self.objects
            .upload(&path, csv.as_bytes().to_vec(), CSV_CONTENT_TYPE)
            .await
            .map_err(|e| match e {
                StorageError::BucketNotFound(b) => PublishError::BucketMissing(b),
                StorageError::AlreadyExists(_) | StorageError::Rejected { .. } => {
                    PublishError::UploadRejected {
                        filename: filename.clone(),
                        reason: e.to_string(),
                    }
                }
                other => PublishError::Transport(other.to_string()),
            })?;

        let download_url = self.objects.public_url(&path);
        info!(
            session = session_id,
            backend = self.objects.name(),
            filename = %filename,
            "Uploaded export"
        );

        let record = ExportRecord {
            filename: filename.clone(),
            created_at,
            path: path.clone(),
            download_url: download_url.clone(),
            active: true,
        };
        let metadata_error = match self.records.insert(&record).await {
            Ok(()) => None,
            Err(e) => {
                warn!(filename = %filename, error = %e, "Failed to record export metadata");
                Some(e.to_string())
            }
        };

        Ok(PublishReceipt {
            filename,
            path,
            download_url,
            created_at,
            metadata_error,
        })
    }

    /// Timestamp for the next filename, strictly greater than the last one.
    fn next_millis(&self, now: i64) -> i64 {
        let mut last = self.last_millis.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match self.last_millis.compare_exchange_weak(
                last,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(current) => last = current,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalStorage;

    #[test]
    fn test_next_millis_is_monotonic() {
        let dir = tempfile::tempdir().unwrap();
        let local = Arc::new(LocalStorage::new(dir.path()));
        let publisher = Publisher::new(local.clone(), local);

        assert_eq!(publisher.next_millis(100), 100);
        assert_eq!(publisher.next_millis(100), 101);
        assert_eq!(publisher.next_millis(50), 102);
        assert_eq!(publisher.next_millis(500), 500);
    }

    #[tokio::test]
    async fn test_empty_csv_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let local = Arc::new(LocalStorage::new(dir.path()));
        let publisher = Publisher::new(local.clone(), local);

        let err = publisher.publish("s", "").await.unwrap_err();
        assert!(matches!(err, PublishError::Empty));
        assert_eq!(err.user_message(), "No questions to upload");
    }
}
