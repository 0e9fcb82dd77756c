// In-process object store, used for local runs and tests

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{NewObject, ObjectStore, ObjectSummary, StorageResult};

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: String,
}

/// A bucket held in memory. Keys are listed in lexicographic order, the same
/// order S3 uses for ListObjectsV2.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    bucket: String,
    objects: Arc<RwLock<BTreeMap<String, StoredObject>>>,
}

impl MemoryStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    pub async fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    fn location(&self, key: &str) -> String {
        format!("memory://{}/{}", self.bucket, key)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, object: NewObject) -> StorageResult<String> {
        let location = self.location(&object.key);
        self.objects.write().await.insert(
            object.key,
            StoredObject {
                data: object.data,
                content_type: object.content_type,
            },
        );
        Ok(location)
    }

    async fn list(&self) -> StorageResult<Vec<ObjectSummary>> {
        let objects = self.objects.read().await;
        Ok(objects
            .iter()
            .map(|(key, object)| ObjectSummary {
                key: key.clone(),
                size: object.data.len() as u64,
            })
            .collect())
    }

    async fn presign_get(&self, key: &str, expires_in_secs: u32) -> StorageResult<String> {
        Ok(format!("{}?expires={}", self.location(key), expires_in_secs))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.objects.write().await.remove(key);
        Ok(())
    }

    fn provider(&self) -> &'static str {
        "memory"
    }
}
