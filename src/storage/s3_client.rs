// S3-compatible object store backed by rust-s3

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use s3::creds::Credentials;
use s3::region::Region;
use s3::Bucket;
use tracing::debug;

use super::{NewObject, ObjectStore, ObjectSummary, StorageError, StorageResult};
use crate::config::StorageConfig;

pub struct S3Store {
    bucket: Bucket,
}

impl S3Store {
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .region
                .parse::<Region>()
                .map_err(|e| anyhow!("Invalid region {}: {}", config.region, e))?,
        };

        // With no explicit keys rust-s3 falls back to the usual AWS
        // environment variables, profile and instance metadata.
        let credentials = Credentials::new(
            config.access_key_id.as_deref(),
            config.secret_access_key.as_deref(),
            None,
            None,
            None,
        )
        .context("Failed to resolve S3 credentials")?;

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .context("Failed to create S3 bucket handle")?;

        if config.path_style {
            bucket = bucket.with_path_style();
        }

        Ok(Self { bucket })
    }

    fn location(&self, key: &str) -> String {
        format!("{}/{}", self.bucket.url().trim_end_matches('/'), key)
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, object: NewObject) -> StorageResult<String> {
        let response = self
            .bucket
            .put_object_with_content_type(&object.key, &object.data, &object.content_type)
            .await?;
        debug!(key = %object.key, status = response.status_code(), "put_object finished");

        Ok(self.location(&object.key))
    }

    async fn list(&self) -> StorageResult<Vec<ObjectSummary>> {
        // rust-s3 follows continuation tokens for us
        let pages = self.bucket.list(String::new(), None).await?;

        Ok(pages
            .into_iter()
            .flat_map(|page| page.contents)
            .map(|object| ObjectSummary {
                key: object.key,
                size: object.size,
            })
            .collect())
    }

    async fn presign_get(&self, key: &str, expires_in_secs: u32) -> StorageResult<String> {
        self.bucket
            .presign_get(key, expires_in_secs, None)
            .await
            .map_err(|e| StorageError::Signing(e.to_string()))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let response = self.bucket.delete_object(key).await?;
        debug!(key = %key, status = response.status_code(), "delete_object finished");
        Ok(())
    }

    fn provider(&self) -> &'static str {
        "s3"
    }
}
