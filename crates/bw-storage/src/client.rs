//! GCS client over the S3-interoperable XML API.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::store::{public_url_for, ObjectStore, StoredObject};

/// Configuration for the GCS client.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Interoperability endpoint
    pub endpoint_url: String,
    /// HMAC access key ID
    pub access_key_id: String,
    /// HMAC secret
    pub secret_access_key: String,
    /// Bucket name
    pub bucket_name: String,
    /// Signing region ("auto" for GCS)
    pub region: String,
}

impl StorageConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            endpoint_url: std::env::var("GCS_ENDPOINT_URL")
                .unwrap_or_else(|_| "https://storage.googleapis.com".to_string()),
            access_key_id: std::env::var("GCS_HMAC_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("GCS_HMAC_ACCESS_KEY not set"))?,
            secret_access_key: std::env::var("GCS_HMAC_SECRET")
                .map_err(|_| StorageError::config_error("GCS_HMAC_SECRET not set"))?,
            bucket_name: std::env::var("GENMEDIA_BUCKET")
                .ok()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| StorageError::config_error("GENMEDIA_BUCKET env var not set"))?,
            region: std::env::var("GCS_REGION").unwrap_or_else(|_| "auto".to_string()),
        })
    }
}

/// Google Cloud Storage client.
#[derive(Clone)]
pub struct GcsClient {
    client: Client,
    bucket: String,
}

impl GcsClient {
    /// Create a new client from configuration.
    pub fn new(config: StorageConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "gcs-hmac",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        info!("Storage Service initialized for bucket: {}", config.bucket_name);

        Self {
            client: Client::from_conf(sdk_config),
            bucket: config.bucket_name,
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self::new(StorageConfig::from_env()?))
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn gs_uri(&self, key: &str) -> String {
        format!("gs://{}/{}", self.bucket, key)
    }
}

#[async_trait]
impl ObjectStore for GcsClient {
    async fn upload(
        &self,
        data: Vec<u8>,
        key: &str,
        content_type: &str,
    ) -> StorageResult<StoredObject> {
        debug!("Uploading {} bytes to {}", data.len(), key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(DisplayErrorContext(&e).to_string()))?;

        let uri = self.gs_uri(key);
        let public_url = public_url_for(&uri)?;
        info!("Uploaded {} to {}", key, uri);

        Ok(StoredObject { uri, public_url })
    }

    async fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        debug!("Reading {}", key);

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_get_error(e, key))?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?
            .into_bytes()
            .to_vec();

        Ok(bytes)
    }
}

/// `NoSuchKey`, or a bare 404 when the body carries no S3 error code.
fn map_get_error(err: SdkError<GetObjectError, HttpResponse>, key: &str) -> StorageError {
    let missing = err.as_service_error().is_some_and(|se| se.is_no_such_key())
        || err.raw_response().map(|r| r.status().as_u16()) == Some(404);

    if missing {
        StorageError::not_found(key)
    } else {
        StorageError::DownloadFailed(DisplayErrorContext(&err).to_string())
    }
}
