//! S3 storage for mockup images
//!
//! Mockups are downloaded from Printful's CDN and re-hosted in a public S3
//! bucket under a deterministic key (see [`super::naming`]).

use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_s3::{config::Region, primitives::ByteStream, Client as S3Client};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, instrument, trace};
use utoipa::ToSchema;

use crate::config::StorageSettings;

use super::naming::{content_type_for_extension, guess_extension, public_url, ObjectName};

/// Errors that can occur while storing mockups
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage not configured: {0}")]
    NotConfigured(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),
}

/// A mockup stored in the bucket
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredMockup {
    /// Object key
    pub key: String,

    /// Public URL
    pub url: String,

    /// Content type the object was stored with
    pub content_type: String,
}

/// Stores a mockup image found at a URL
#[async_trait]
pub trait MockupUploader: Send + Sync {
    /// Download `source_url` and store it under a key built from `name`
    ///
    /// Returns `None` when there is no source URL.
    async fn upload_from_url(
        &self,
        source_url: Option<&str>,
        name: &ObjectName<'_>,
    ) -> Result<Option<StoredMockup>, StorageError>;
}

/// Load the shared AWS configuration for a region
pub async fn load_aws_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}

/// S3-backed [`MockupUploader`]
#[derive(Clone)]
pub struct S3Uploader {
    client: S3Client,
    http: reqwest::Client,
    bucket: String,
}

impl S3Uploader {
    /// Create an uploader from the shared AWS config and storage settings
    pub fn new(aws_config: &SdkConfig, settings: &StorageSettings) -> Result<Self, StorageError> {
        if settings.bucket.is_empty() {
            return Err(StorageError::NotConfigured("S3 bucket is required for uploader".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.download_timeout_secs))
            .build()
            .map_err(|e| StorageError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client: S3Client::new(aws_config),
            http,
            bucket: settings.bucket.clone(),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn download(&self, url: &str) -> Result<(Vec<u8>, Option<String>), StorageError> {
        info!(url = %url, "Downloading mockup image");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| StorageError::DownloadFailed(format!("HTTP error from {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(StorageError::DownloadFailed(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }
        trace!(headers = ?response.headers(), "Mockup image download headers");

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(String::from);

        let data = response
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(format!("Body error from {}: {}", url, e)))?
            .to_vec();

        Ok((data, content_type))
    }
}

#[async_trait]
impl MockupUploader for S3Uploader {
    #[instrument(skip(self, name), fields(style_id = %name.style_id))]
    async fn upload_from_url(
        &self,
        source_url: Option<&str>,
        name: &ObjectName<'_>,
    ) -> Result<Option<StoredMockup>, StorageError> {
        let Some(url) = source_url.filter(|u| !u.is_empty()) else {
            info!("No mockup URL found for style, skipping download");
            return Ok(None);
        };

        let extension = guess_extension(url);
        let key = name.object_key(&extension);

        let (data, content_type) = self.download(url).await?;
        let content_type = content_type.unwrap_or_else(|| content_type_for_extension(&extension).to_string());

        info!(bucket = %self.bucket, key = %key, bytes = data.len(), "Uploading mockup to S3");
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(data))
            .content_type(&content_type)
            .send()
            .await
            .map_err(|e| {
                error!(key = %key, "Failed to upload mockup to S3");
                StorageError::UploadFailed(format!("{:?}", e))
            })?;

        let url = public_url(&self.bucket, &key);
        debug!(url = %url, "Uploaded mockup");

        Ok(Some(StoredMockup { key, url, content_type }))
    }
}
