//! In-memory object store for tests and local development.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{ByteStream, ObjectDownload, ObjectStore, ObjectSummary};
use crate::{Result, VaultError};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
    last_modified: DateTime<Utc>,
}

/// Object store holding everything in a map.
///
/// [`set_failing`](Self::set_failing) makes every operation return a
/// storage fault, for exercising error paths.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    bucket: String,
    bucket_exists: AtomicBool,
    failing: AtomicBool,
    objects: RwLock<BTreeMap<String, StoredObject>>,
}

impl MemoryObjectStore {
    /// Create an empty store for `bucket`. The bucket starts out missing.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    /// Toggle simulated storage faults.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Check whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Raw bytes of a stored object.
    pub async fn get_bytes(&self, key: &str) -> Option<Bytes> {
        self.objects.read().await.get(key).map(|o| o.data.clone())
    }

    /// Content type of a stored object.
    pub async fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|o| o.content_type.clone())
    }

    /// Insert an object directly, bypassing the upload path.
    pub async fn insert(&self, key: &str, data: impl Into<Bytes>, content_type: &str) {
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                data: data.into(),
                content_type: content_type.to_string(),
                last_modified: Utc::now(),
            },
        );
    }

    fn check(&self, operation: &str) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(VaultError::Storage(format!(
                "{operation} failed: simulated fault"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn ensure_bucket(&self) -> Result<bool> {
        self.check("head bucket")?;
        Ok(!self.bucket_exists.swap(true, Ordering::SeqCst))
    }

    async fn put(
        &self,
        key: &str,
        body: ByteStream,
        _size: u64,
        content_type: &str,
    ) -> Result<()> {
        self.check("put object")?;
        let data = body
            .collect()
            .await
            .map_err(|e| VaultError::Storage(format!("put object failed: {e}")))?
            .into_bytes();
        self.insert(key, data, content_type).await;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ObjectSummary>> {
        self.check("list objects")?;
        Ok(self
            .objects
            .read()
            .await
            .iter()
            .map(|(key, object)| ObjectSummary {
                key: key.clone(),
                size: object.data.len() as u64,
                last_modified: object.last_modified,
            })
            .collect())
    }

    async fn get(&self, key: &str) -> Result<ObjectDownload> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(VaultError::NotFound(format!("file '{key}'")));
        }
        let objects = self.objects.read().await;
        let object = objects
            .get(key)
            .ok_or_else(|| VaultError::NotFound(format!("file '{key}'")))?;

        Ok(ObjectDownload {
            content_type: object.content_type.clone(),
            size: object.data.len() as u64,
            body: ByteStream::from(object.data.clone()),
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check("delete object")?;
        self.objects.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryObjectStore::new("test");
        store
            .put("a.txt", ByteStream::from_static(b"hello"), 5, "text/plain")
            .await
            .unwrap();

        let download = store.get("a.txt").await.unwrap();
        assert_eq!(download.size, 5);
        assert_eq!(download.content_type, "text/plain");
        let bytes = download.body.collect().await.unwrap().into_bytes();
        assert_eq!(&bytes[..], b"hello");

        store.delete("a.txt").await.unwrap();
        assert!(matches!(
            store.get("a.txt").await,
            Err(VaultError::NotFound(_))
        ));
        // Deleting again is fine
        store.delete("a.txt").await.unwrap();
    }

    #[tokio::test]
    async fn test_ensure_bucket_reports_creation_once() {
        let store = MemoryObjectStore::new("test");
        assert!(store.ensure_bucket().await.unwrap());
        assert!(!store.ensure_bucket().await.unwrap());
    }

    #[tokio::test]
    async fn test_failing_store() {
        let store = MemoryObjectStore::new("test");
        store.insert("a.txt", "x", "text/plain").await;
        store.set_failing(true);

        assert!(matches!(store.list().await, Err(VaultError::Storage(_))));
        assert!(matches!(
            store.delete("a.txt").await,
            Err(VaultError::Storage(_))
        ));
        assert!(matches!(
            store.get("a.txt").await,
            Err(VaultError::NotFound(_))
        ));
    }
}
