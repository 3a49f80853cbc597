//! Object storage client
//!
//! Uploads are plain HTTP `PUT {endpoint}/{bucket}/{key}`; the stored object is
//! then reachable at `{public_url}/{key}`. Bucket creation and access policy are
//! managed outside this service.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("ucms-migrate/", env!("CARGO_PKG_VERSION"));
const UPLOAD_TIMEOUT_SECS: u64 = 60;

/// Object storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Network communication error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Storage endpoint answered with a non-success status
    #[error("Storage error {0}: {1}")]
    ApiError(u16, String),
}

/// Write-only object store
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under `key`, returning the public URL of the object
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// Public URL prefix of stored objects
    ///
    /// URLs starting with this prefix already point at object storage.
    fn public_url(&self) -> &str;
}

/// S3-compatible storage reached over HTTP PUT
pub struct HttpObjectStorage {
    http_client: reqwest::Client,
    endpoint: String,
    bucket: String,
    public_url: String,
    access_token: Option<String>,
}

impl HttpObjectStorage {
    /// Create new storage client
    pub fn new(
        endpoint: &str,
        bucket: &str,
        public_url: &str,
        access_token: Option<String>,
    ) -> Result<Self, StorageError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .build()
            .map_err(|e| StorageError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket: bucket.trim_matches('/').to_string(),
            public_url: public_url.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key)
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let url = self.object_url(key);
        let size = bytes.len();

        let mut request = self
            .http_client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);

        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StorageError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::ApiError(status.as_u16(), body));
        }

        tracing::debug!(key = %key, bytes = size, "Object stored");

        Ok(format!("{}/{}", self.public_url, key))
    }

    fn public_url(&self) -> &str {
        &self.public_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_ignore_trailing_slashes() {
        let storage = HttpObjectStorage::new(
            "https://s3.example.com/",
            "/ucms/",
            "https://cdn.example.com/ucms/",
            None,
        )
        .unwrap();

        assert_eq!(
            storage.object_url("articles/a.webp"),
            "https://s3.example.com/ucms/articles/a.webp"
        );
        assert_eq!(storage.public_url(), "https://cdn.example.com/ucms");
    }
}
