//! Spooling incoming uploads to disk.
//!
//! The multipart stream is written to a temporary file while bytes are
//! counted, so the object store receives an exact length without the whole
//! upload being held in memory.

use std::path::Path;
use std::pin::pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

use super::ByteStream;
use crate::{Result, VaultError};

/// An upload written to a temporary file.
///
/// The file is removed when this value is dropped.
#[derive(Debug)]
pub struct SpooledUpload {
    path: TempPath,
    size: u64,
}

impl SpooledUpload {
    /// Number of bytes received.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Location of the spool file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the spool file as a request body.
    ///
    /// `self` must outlive the returned stream.
    pub async fn body(&self) -> Result<ByteStream> {
        ByteStream::from_path(&self.path)
            .await
            .map_err(|e| VaultError::Internal(format!("failed to open spooled upload: {e}")))
    }
}

/// Write `stream` to a temporary file, failing once more than `limit`
/// bytes have arrived.
pub async fn spool_to_tempfile<S, E>(stream: S, limit: u64) -> Result<SpooledUpload>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: std::fmt::Display,
{
    let (file, path) = tempfile::NamedTempFile::new()?.into_parts();
    let mut file = tokio::fs::File::from_std(file);
    let mut stream = pin!(stream);
    let mut size: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|e| VaultError::BadRequest(format!("failed to read upload: {e}")))?;
        size += chunk.len() as u64;
        if size > limit {
            return Err(VaultError::TooLarge { size, limit });
        }
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    Ok(SpooledUpload { path, size })
}
