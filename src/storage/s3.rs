//! S3-compatible backend (MinIO).

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::{ByteStream, ObjectDownload, ObjectStore, ObjectSummary, DEFAULT_CONTENT_TYPE};
use crate::config::MinioConfig;
use crate::{Result, VaultError};

/// Object store backed by an S3 client.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Wrap an existing client.
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build a client for the configured MinIO endpoint.
    ///
    /// Uses static credentials and path-style addressing. No request is
    /// made here; reachability is first tested by [`ObjectStore::ensure_bucket`].
    pub async fn connect(config: &MinioConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "filevault",
        );

        let endpoint = config.endpoint_url();
        info!(endpoint = %endpoint, bucket = %config.bucket_name, "Configuring object storage");

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        Self::new(Client::from_conf(s3_config), &config.bucket_name)
    }
}

fn storage_error<E>(operation: &str, err: E) -> VaultError
where
    E: std::error::Error,
{
    VaultError::Storage(format!("{operation} failed: {}", DisplayErrorContext(&err)))
}

fn to_utc(time: &aws_sdk_s3::primitives::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp(time.secs(), time.subsec_nanos()).unwrap_or_default()
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn ensure_bucket(&self) -> Result<bool> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                debug!(bucket = %self.bucket, "Bucket exists");
                Ok(false)
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if !service_err.is_not_found() {
                    return Err(storage_error("head bucket", service_err));
                }

                self.client
                    .create_bucket()
                    .bucket(&self.bucket)
                    .send()
                    .await
                    .map_err(|e| storage_error("create bucket", e))?;
                info!(bucket = %self.bucket, "Bucket created");
                Ok(true)
            }
        }
    }

    async fn put(
        &self,
        key: &str,
        body: ByteStream,
        size: u64,
        content_type: &str,
    ) -> Result<()> {
        let content_length = i64::try_from(size)
            .map_err(|_| VaultError::BadRequest(format!("object size {size} out of range")))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_length(content_length)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| storage_error("put object", e))?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ObjectSummary>> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .into_paginator()
            .send();

        let mut objects = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| storage_error("list objects", e))?;
            for object in page.contents() {
                let Some(key) = object.key() else {
                    continue;
                };
                objects.push(ObjectSummary {
                    key: key.to_string(),
                    size: object.size().unwrap_or(0).max(0) as u64,
                    last_modified: object.last_modified().map(to_utc).unwrap_or_default(),
                });
            }
        }
        Ok(objects)
    }

    async fn get(&self, key: &str) -> Result<ObjectDownload> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                debug!(key, error = %DisplayErrorContext(&e), "Get object failed");
                VaultError::NotFound(format!("file '{key}'"))
            })?;

        Ok(ObjectDownload {
            content_type: output
                .content_type()
                .unwrap_or(DEFAULT_CONTENT_TYPE)
                .to_string(),
            size: output.content_length().unwrap_or(0).max(0) as u64,
            body: output.body,
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| storage_error("delete object", e))?;
        Ok(())
    }
}
