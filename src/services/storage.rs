//! S3 storage service for defect images.
//!
//! Handles uploads, reads, permanent public URLs and presigned URLs.
//! Supports both AWS S3 and MinIO for development.

use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use tracing::info;
use uuid::Uuid;

use crate::config::StorageSettings;
use crate::error::{AppError, AppResult};

/// Validity of signed URLs handed out by the API.
pub const AD_HOC_URL_TTL: Duration = Duration::from_secs(3600);
/// Validity of long-lived evidence links.
pub const EVIDENCE_URL_TTL: Duration = Duration::from_secs(86_400);
/// Longest validity S3 accepts for a presigned URL.
pub const MAX_URL_TTL: Duration = Duration::from_secs(7 * 86_400);

/// Image extensions accepted for upload.
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "webp", "heic"];

/// S3 storage client wrapper.
#[derive(Clone)]
pub struct Storage {
    client: Client,
    bucket: String,
    public_base: Option<String>,
}

impl Storage {
    /// Create a new S3 storage client from configuration.
    pub async fn new(config: &StorageSettings) -> AppResult<Self> {
        let credentials = Credentials::new(
            &config.access_key,
            config.secret_key.expose_secret(),
            None,
            None,
            "linedefect",
        );

        let region = Region::new(config.region.clone());

        let mut s3_config_builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(region)
            .credentials_provider(credentials)
            .force_path_style(true); // Required for MinIO

        if let Some(ref endpoint) = config.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(s3_config_builder.build());

        let storage = Self {
            client,
            bucket: config.bucket.clone(),
            public_base: config.public_base(),
        };

        storage.ensure_bucket_exists().await?;

        info!("S3 storage initialized: bucket={}", config.bucket);

        Ok(storage)
    }

    /// Ensure the bucket exists, creating it if necessary.
    async fn ensure_bucket_exists(&self) -> AppResult<()> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                info!("S3 bucket '{}' exists", self.bucket);
                Ok(())
            }
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    info!("Creating S3 bucket '{}'", self.bucket);
                    self.client
                        .create_bucket()
                        .bucket(&self.bucket)
                        .send()
                        .await
                        .map_err(|e| {
                            AppError::Storage(format!("Failed to create bucket: {}", e))
                        })?;
                    info!("S3 bucket '{}' created", self.bucket);
                    Ok(())
                } else {
                    Err(AppError::Storage(format!(
                        "Failed to access bucket '{}': {}",
                        self.bucket, service_error
                    )))
                }
            }
        }
    }

    /// Check that the bucket is reachable.
    pub async fn ping(&self) -> AppResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| AppError::Storage(format!("Bucket '{}' unreachable: {}", self.bucket, e)))
    }

    /// Get the content type for an image based on its extension.
    pub fn content_type_for_extension(ext: &str) -> &'static str {
        match ext.to_lowercase().as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "heic" => "image/heic",
            _ => "application/octet-stream",
        }
    }

    /// Lower-cased extension of `filename` if it is an accepted image type.
    pub fn image_extension(filename: &str) -> Option<String> {
        let (_, ext) = filename.rsplit_once('.')?;
        let ext = ext.to_lowercase();
        ALLOWED_IMAGE_EXTENSIONS
            .contains(&ext.as_str())
            .then_some(ext)
    }

    /// Build a fresh object key for an uploaded image: `<uuidv7>.<ext>`.
    pub fn image_key(ext: &str) -> String {
        format!("{}.{}", Uuid::now_v7(), ext.to_lowercase())
    }

    /// Upload a file to S3.
    pub async fn put(&self, key: &str, data: Vec<u8>, content_type: Option<&str>) -> AppResult<()> {
        let body = aws_sdk_s3::primitives::ByteStream::from(data);
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body);

        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        request
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload file to S3: {}", e)))?;

        Ok(())
    }

    /// Permanent URL for `key` under the configured public base.
    pub fn public_url(&self, key: &str) -> Option<String> {
        self.public_base
            .as_deref()
            .map(|base| join_public_url(base, key))
    }

    /// Time-limited signed GET URL for `key`.
    ///
    /// `ttl` is clamped to [`MAX_URL_TTL`].
    pub async fn presigned_get(
        &self,
        key: &str,
        ttl: Duration,
    ) -> AppResult<(String, DateTime<Utc>)> {
        let ttl = clamp_ttl(ttl);
        let presigning = PresigningConfig::expires_in(ttl)
            .map_err(|e| AppError::InvalidInput(format!("Invalid URL expiry: {}", e)))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to sign URL for {}: {}", key, e)))?;

        let expires_at = Utc::now() + chrono::Duration::seconds(ttl.as_secs() as i64);
        Ok((request.uri().to_string(), expires_at))
    }

    /// Reduce a stored image reference to its object key.
    ///
    /// References may be bare keys or full URLs (public or signed) pointing
    /// into this bucket.
    pub fn object_key<'a>(&self, reference: &'a str) -> &'a str {
        extract_object_key(reference, &self.bucket)
    }
}

/// Clamp a requested signed URL lifetime to `1s..=MAX_URL_TTL`.
pub fn clamp_ttl(ttl: Duration) -> Duration {
    ttl.clamp(Duration::from_secs(1), MAX_URL_TTL)
}

fn join_public_url(base: &str, key: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        urlencoding::encode(key.trim_start_matches('/'))
    )
}

/// Reduce a stored reference to an object key.
///
/// Full URLs are cut after `/<bucket>/`; query strings are dropped. A bare
/// key is returned as is.
pub fn extract_object_key<'a>(reference: &'a str, bucket: &str) -> &'a str {
    if !reference.starts_with("http://") && !reference.starts_with("https://") {
        return reference;
    }

    let without_query = reference.split('?').next().unwrap_or(reference);
    let marker = format!("/{}/", bucket);
    match without_query.find(&marker) {
        Some(idx) => &without_query[idx + marker.len()..],
        None => without_query
            .rsplit_once('/')
            .map(|(_, last)| last)
            .unwrap_or(without_query),
    }
}
