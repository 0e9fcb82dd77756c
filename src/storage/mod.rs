//! Object storage layer
//!
//! Handlers never talk to a bucket directly; they go through [`ObjectStore`],
//! which has two implementations:
//! - [`S3Store`] - any S3-compatible service via `rust-s3`
//! - [`MemoryStore`] - an in-process bucket for local runs and tests

pub mod memory;
pub mod s3_client;

pub use memory::MemoryStore;
pub use s3_client::S3Store;

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

use crate::config::{StorageConfig, StorageProvider};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("URL signing error: {0}")]
    Signing(String),
}

impl From<s3::error::S3Error> for StorageError {
    fn from(err: s3::error::S3Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// An object about to be written to the store.
#[derive(Debug, Clone)]
pub struct NewObject {
    pub key: String,
    pub data: Bytes,
    pub content_type: String,
}

/// One entry of a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores the object and returns its location URL.
    async fn put(&self, object: NewObject) -> StorageResult<String>;

    /// Lists every object in the bucket, in backend order.
    async fn list(&self) -> StorageResult<Vec<ObjectSummary>>;

    /// Returns a time-limited read URL for `key`.
    async fn presign_get(&self, key: &str, expires_in_secs: u32) -> StorageResult<String>;

    /// Removes `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Short provider name, reported by the health endpoint.
    fn provider(&self) -> &'static str;
}

/// Build the store selected by the configuration
pub fn create_store(config: &StorageConfig) -> anyhow::Result<Arc<dyn ObjectStore>> {
    match config.provider {
        StorageProvider::S3 => Ok(Arc::new(S3Store::new(config)?)),
        StorageProvider::Memory => Ok(Arc::new(MemoryStore::new(&config.bucket))),
    }
}

/// Build a storage key for an uploaded file.
///
/// Format: `{unix_millis}-{8 random hex chars}-{sanitized filename}`. The
/// random part keeps two uploads of the same name in the same millisecond
/// apart. The filename is reduced to `[A-Za-z0-9._-]` so a key is always a
/// single path segment.
pub fn object_key(original_filename: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let nonce = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", millis, &nonce[..8], sanitize_filename(original_filename))
}

fn sanitize_filename(name: &str) -> String {
    // Browsers on Windows may send the full client path
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Resolve the MIME type of an upload.
pub fn content_type_for(declared: Option<&str>, filename: &str) -> String {
    match declared {
        Some(ct) if !ct.trim().is_empty() => ct.to_string(),
        _ => mime_guess::from_path(filename)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    }
}
