//! Upload, list, download and delete over an [`ObjectStore`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::{ByteStream, ObjectDownload, ObjectStore, ObjectSummary};
use crate::{Result, VaultError};

/// Largest accepted upload: 1 GiB.
pub const MAX_UPLOAD_SIZE: u64 = 1_073_741_824;

/// Content type used when the client sends none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Derive an object key from a client-supplied filename.
///
/// Only the final path component is kept, with both `/` and `\` treated
/// as separators. Names that reduce to nothing, `.` or `..` are rejected.
pub fn object_key(filename: &str) -> Result<String> {
    let base = filename
        .trim_end_matches(is_separator)
        .rsplit(is_separator)
        .next()
        .unwrap_or_default();

    match base {
        "" | "." | ".." => Err(VaultError::BadRequest(format!(
            "invalid filename: {filename:?}"
        ))),
        _ => Ok(base.to_string()),
    }
}

/// Result of a completed upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Key the object was stored under.
    pub key: String,
    /// Bytes stored.
    pub size: u64,
    /// Time spent transferring to the store.
    pub duration: Duration,
}

/// File operations against a single bucket.
#[derive(Clone)]
pub struct ObjectGateway {
    store: Arc<dyn ObjectStore>,
}

impl ObjectGateway {
    /// Create a gateway over a store.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Bucket name.
    pub fn bucket(&self) -> &str {
        self.store.bucket()
    }

    /// Create the bucket if it does not exist.
    pub async fn ensure_bucket(&self) -> Result<bool> {
        let created = self.store.ensure_bucket().await?;
        if created {
            info!(bucket = %self.bucket(), "Bucket created");
        }
        Ok(created)
    }

    /// Store `body` under the key derived from `filename`.
    ///
    /// The size ceiling is checked before anything is sent.
    pub async fn upload(
        &self,
        body: ByteStream,
        filename: &str,
        declared_size: u64,
        content_type: Option<&str>,
    ) -> Result<UploadOutcome> {
        if declared_size > MAX_UPLOAD_SIZE {
            return Err(VaultError::TooLarge {
                size: declared_size,
                limit: MAX_UPLOAD_SIZE,
            });
        }

        let key = object_key(filename)?;
        let content_type = content_type
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE);

        let started = Instant::now();
        self.store
            .put(&key, body, declared_size, content_type)
            .await?;
        let duration = started.elapsed();

        info!(key = %key, size = declared_size, ?duration, "File uploaded");
        Ok(UploadOutcome {
            key,
            size: declared_size,
            duration,
        })
    }

    /// List every object, sorted by key.
    pub async fn list(&self) -> Result<Vec<ObjectSummary>> {
        let mut objects = self.store.list().await?;
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        debug!(count = objects.len(), "Listed files");
        Ok(objects)
    }

    /// Fetch an object for download.
    pub async fn download(&self, key: &str) -> Result<ObjectDownload> {
        require_key(key)?;
        self.store.get(key).await
    }

    /// Delete an object.
    pub async fn delete(&self, key: &str) -> Result<()> {
        require_key(key)?;
        self.store.delete(key).await?;
        info!(key, "File deleted");
        Ok(())
    }
}

impl std::fmt::Debug for ObjectGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectGateway")
            .field("bucket", &self.store.bucket())
            .finish()
    }
}

fn require_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(VaultError::BadRequest("filename is required".to_string()));
    }
    Ok(())
}
