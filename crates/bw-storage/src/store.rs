//! Object store abstraction.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::error::{StorageError, StorageResult};

/// Public host for objects in publicly readable buckets.
pub const PUBLIC_BASE_URL: &str = "https://storage.googleapis.com";

const GS_SCHEME: &str = "gs://";

/// Location of an uploaded object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Internal `gs://bucket/key` URI, consumable by Vertex AI.
    pub uri: String,
    /// Publicly fetchable URL.
    pub public_url: String,
}

/// Durable blob storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `data` under `key`, overwriting any existing object.
    async fn upload(&self, data: Vec<u8>, key: &str, content_type: &str)
        -> StorageResult<StoredObject>;

    /// Read the whole object at `key`.
    async fn read(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Translate an internal `gs://` URI into a public URL.
    fn public_url(&self, uri: &str) -> StorageResult<String> {
        public_url_for(uri)
    }
}

/// Content-addressed object name for a PNG image.
pub fn content_key(data: &[u8]) -> String {
    format!("image_{:x}.png", Sha256::digest(data))
}

/// `gs://bucket/path` -> `https://storage.googleapis.com/bucket/path`.
///
/// URLs that are already HTTP(S) are returned unchanged.
pub fn public_url_for(uri: &str) -> StorageResult<String> {
    if uri.starts_with("https://") || uri.starts_with("http://") {
        return Ok(uri.to_string());
    }

    match uri.strip_prefix(GS_SCHEME) {
        Some(path) if !path.is_empty() && !path.starts_with('/') => {
            Ok(format!("{}/{}", PUBLIC_BASE_URL, path))
        }
        _ => Err(StorageError::InvalidUri(uri.to_string())),
    }
}

/// Upload a generated image under its content-addressed name.
pub async fn upload_image(store: &dyn ObjectStore, data: Vec<u8>) -> StorageResult<StoredObject> {
    let key = content_key(&data);
    store.upload(data, &key, "image/png").await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_key_is_stable() {
        let a = content_key(b"png-bytes");
        let b = content_key(b"png-bytes");
        let c = content_key(b"other-bytes");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("image_"));
        assert!(a.ends_with(".png"));
        // 64 hex chars + prefix + suffix
        assert_eq!(a.len(), "image_".len() + 64 + ".png".len());
    }

    #[test]
    fn test_public_url_for() {
        assert_eq!(
            public_url_for("gs://media/videos/123/sample_0.mp4").unwrap(),
            "https://storage.googleapis.com/media/videos/123/sample_0.mp4"
        );
    }

    #[test]
    fn test_public_url_passes_http_through() {
        assert_eq!(
            public_url_for("https://example.com/video.mp4").unwrap(),
            "https://example.com/video.mp4"
        );
    }

    #[test]
    fn test_public_url_rejects_unknown_scheme() {
        assert!(matches!(
            public_url_for("s3://media/video.mp4"),
            Err(StorageError::InvalidUri(_))
        ));
        assert!(public_url_for("gs://").is_err());
        assert!(public_url_for("").is_err());
    }
}
