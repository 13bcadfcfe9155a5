//! Supabase storage and REST backend.
//!
//! Uploads go to the Storage API with upsert disabled; metadata rows go to
//! a PostgREST table.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use tracing::debug;

use crate::error::StorageError;
use crate::traits::{ExportRecord, ObjectStore, RecordStore};

/// HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for a Supabase project
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abc.supabase.co`
    pub url: String,
    pub api_key: String,
    pub bucket: String,
    pub table: String,
}

/// Client for one bucket and one metadata table.
pub struct SupabaseStorage {
    client: Client,
    base_url: String,
    api_key: String,
    bucket: String,
    table: String,
}

impl SupabaseStorage {
    pub fn new(config: SupabaseConfig) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("sweetrivia/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            bucket: config.bucket,
            table: config.table,
        })
    }

    fn bucket_url(&self) -> String {
        format!("{}/storage/v1/bucket/{}", self.base_url, self.bucket)
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path)
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
    }
}

/// Turn a non-success response into a `Rejected` error.
async fn rejected(response: Response) -> StorageError {
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    StorageError::Rejected { status, message }
}

fn mentions(message: &str, needles: &[&str]) -> bool {
    let lower = message.to_lowercase();
    needles.iter().any(|n| lower.contains(n))
}

#[async_trait]
impl ObjectStore for SupabaseStorage {
    fn name(&self) -> &str {
        "supabase"
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn bucket_exists(&self) -> Result<bool, StorageError> {
        debug!(bucket = %self.bucket, "Checking storage bucket");
        let response = self.authorized(self.client.get(self.bucket_url())).send().await?;

        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            // Storage reports a missing bucket as a 400 with a "not found" body
            StatusCode::BAD_REQUEST => match rejected(response).await {
                StorageError::Rejected { message, .. } if mentions(&message, &["not found"]) => {
                    Ok(false)
                }
                other => Err(other),
            },
            _ => Err(rejected(response).await),
        }
    }

    async fn upload(
        &self,
        path: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        debug!(bucket = %self.bucket, path, bytes = body.len(), "Uploading object");
        let response = self
            .authorized(self.client.post(self.object_url(path)))
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        match rejected(response).await {
            StorageError::Rejected { message, .. }
                if status == StatusCode::CONFLICT
                    || mentions(&message, &["duplicate", "already exists"]) =>
            {
                Err(StorageError::AlreadyExists(path.to_string()))
            }
            StorageError::Rejected { message, .. }
                if status == StatusCode::NOT_FOUND || mentions(&message, &["bucket not found"]) =>
            {
                Err(StorageError::BucketNotFound(self.bucket.clone()))
            }
            other => Err(other),
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }
}

#[async_trait]
impl RecordStore for SupabaseStorage {
    async fn insert(&self, record: &ExportRecord) -> Result<(), StorageError> {
        debug!(table = %self.table, filename = %record.filename, "Inserting export record");
        let response = self
            .authorized(self.client.post(self.table_url()))
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(rejected(response).await)
        }
    }
}
