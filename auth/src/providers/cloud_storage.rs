//! Cloud Storage JSON API blob store.

use crate::error::{AuthError, Result};
use crate::providers::BlobStore;
use reqwest::{Client, StatusCode, Url};

/// Default JSON API endpoint.
pub const DEFAULT_API_URL: &str = "https://storage.googleapis.com";

/// Default host serving public objects.
pub const DEFAULT_PUBLIC_URL: &str = "https://storage.googleapis.com";

/// Cloud Storage connection settings.
#[derive(Clone)]
pub struct CloudStorageConfig {
    /// Bucket holding event images.
    pub bucket: String,

    /// OAuth access token with write access to the bucket.
    pub access_token: String,

    /// JSON API base URL.
    ///
    /// Default: `https://storage.googleapis.com`
    pub api_url: String,

    /// Base URL of public object links.
    ///
    /// Default: `https://storage.googleapis.com`
    pub public_url: String,
}

impl CloudStorageConfig {
    /// Create a configuration against the public endpoints.
    #[must_use]
    pub fn new(bucket: String, access_token: String) -> Self {
        Self {
            bucket,
            access_token,
            api_url: DEFAULT_API_URL.to_string(),
            public_url: DEFAULT_PUBLIC_URL.to_string(),
        }
    }

    /// Point the store at another endpoint (e.g. a local emulator).
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Serve public links from another host.
    #[must_use]
    pub fn with_public_url(mut self, public_url: impl Into<String>) -> Self {
        self.public_url = public_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Public link of the object at `path`.
    #[must_use]
    pub fn public_link(&self, path: &str) -> String {
        format!("{}/{}/{path}", self.public_url, self.bucket)
    }

    /// Object path behind a public link, if the link points into this bucket.
    #[must_use]
    pub fn object_path<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(&self.public_url)?
            .strip_prefix('/')?
            .strip_prefix(self.bucket.as_str())?
            .strip_prefix('/')
            .filter(|path| !path.is_empty())
    }
}

impl std::fmt::Debug for CloudStorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudStorageConfig")
            .field("bucket", &self.bucket)
            .field("api_url", &self.api_url)
            .field("public_url", &self.public_url)
            .finish_non_exhaustive()
    }
}

/// Blob store backed by the Cloud Storage JSON API.
#[derive(Clone, Debug)]
pub struct CloudStorageBlobStore {
    config: CloudStorageConfig,
    http_client: Client,
}

impl CloudStorageBlobStore {
    /// Create a store with a fresh HTTP client.
    #[must_use]
    pub fn new(config: CloudStorageConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create a store sharing an existing HTTP client.
    #[must_use]
    pub const fn with_client(config: CloudStorageConfig, http_client: Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    fn api_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.config.api_url)
            .map_err(|e| AuthError::BlobStore(format!("invalid storage URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| AuthError::BlobStore("storage URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn upload_url(&self, path: &str) -> Result<Url> {
        let mut url = self.api_url(&["upload", "storage", "v1", "b", &self.config.bucket, "o"])?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", path)
            .append_pair("predefinedAcl", "publicRead");
        Ok(url)
    }

    fn object_url(&self, path: &str) -> Result<Url> {
        self.api_url(&["storage", "v1", "b", &self.config.bucket, "o", path])
    }
}

impl BlobStore for CloudStorageBlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let size = bytes.len();
        let response = self
            .http_client
            .post(self.upload_url(path)?)
            .bearer_auth(&self.config.access_token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AuthError::BlobStore(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(path, %status, "Object upload failed");
            return Err(AuthError::BlobStore(format!("upload returned {status}")));
        }

        tracing::debug!(path, size, "Uploaded object");
        Ok(self.config.public_link(path))
    }

    async fn delete(&self, url: &str) -> Result<()> {
        let Some(path) = self.config.object_path(url) else {
            tracing::debug!(url, "Not an object of this bucket, nothing to delete");
            return Ok(());
        };

        let response = self
            .http_client
            .delete(self.object_url(path)?)
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(|e| AuthError::BlobStore(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => {
                tracing::debug!(path, "Object already deleted");
                Ok(())
            }
            status => {
                tracing::error!(path, %status, "Object delete failed");
                Err(AuthError::BlobStore(format!("delete returned {status}")))
            }
        }
    }
}
