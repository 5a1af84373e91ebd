//! Response DTOs for the HTTP API.

use chrono::SecondsFormat;
use serde::Serialize;

use crate::storage::{ObjectSummary, UploadOutcome};

/// Plain `{"message": ...}` body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// Create a message body.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Upload result.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Message.
    pub message: String,
    /// Stored object key.
    pub filename: String,
    /// Bytes stored.
    pub size: u64,
    /// Elapsed transfer time, e.g. `"12.3ms"`.
    pub duration: String,
}

impl From<UploadOutcome> for UploadResponse {
    fn from(outcome: UploadOutcome) -> Self {
        Self {
            message: "File uploaded successfully".to_string(),
            filename: outcome.key,
            size: outcome.size,
            duration: format!("{:?}", outcome.duration),
        }
    }
}

/// One entry of the file listing.
#[derive(Debug, Serialize)]
pub struct FileEntry {
    /// Object key.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// RFC 3339 modification time.
    #[serde(rename = "lastModified")]
    pub last_modified: String,
}

impl From<ObjectSummary> for FileEntry {
    fn from(summary: ObjectSummary) -> Self {
        Self {
            name: summary.key,
            size: summary.size,
            last_modified: summary
                .last_modified
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Delete result.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// Message.
    pub message: String,
    /// Deleted object key.
    pub filename: String,
}

impl DeleteResponse {
    /// Response for a deleted key.
    pub fn deleted(filename: impl Into<String>) -> Self {
        Self {
            message: "File deleted successfully".to_string(),
            filename: filename.into(),
        }
    }
}
