//! Object storage for uploaded files.
//!
//! Files are blobs in a single bucket, addressed by key. The production
//! backend talks to MinIO (or any S3-compatible service); tests use the
//! in-memory store.

mod gateway;
mod memory;
mod s3;
mod spool;

pub use aws_sdk_s3::primitives::ByteStream;
pub use gateway::{
    object_key, ObjectGateway, UploadOutcome, DEFAULT_CONTENT_TYPE, MAX_UPLOAD_SIZE,
};
pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;
pub use spool::{spool_to_tempfile, SpooledUpload};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::Result;

/// Listing entry for a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Object key.
    pub key: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub last_modified: DateTime<Utc>,
}

/// A retrieved object with its streaming body.
#[derive(Debug)]
pub struct ObjectDownload {
    /// Stored content type.
    pub content_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Object bytes.
    pub body: ByteStream,
}

/// Bucket-scoped blob storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Bucket this store reads and writes.
    fn bucket(&self) -> &str;

    /// Create the bucket if it does not exist. Returns `true` if created.
    async fn ensure_bucket(&self) -> Result<bool>;

    /// Store an object, replacing any existing object with the same key.
    async fn put(&self, key: &str, body: ByteStream, size: u64, content_type: &str)
        -> Result<()>;

    /// List every object in the bucket, following pagination to the end.
    async fn list(&self) -> Result<Vec<ObjectSummary>>;

    /// Fetch an object. Fails with `NotFound` if it cannot be retrieved.
    async fn get(&self, key: &str) -> Result<ObjectDownload>;

    /// Remove an object. Missing keys are not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}
