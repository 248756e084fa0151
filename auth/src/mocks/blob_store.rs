//! Mock blob store for testing.

use super::poisoned;
use crate::error::{AuthError, Result};
use crate::providers::BlobStore;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Public URL prefix of mock objects.
pub const MOCK_BLOB_URL: &str = "https://blobs.test";

/// Stored object metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Content type given on upload.
    pub content_type: String,

    /// Object size in bytes.
    pub size: usize,
}

/// Mock blob store.
///
/// Objects live at `https://blobs.test/{path}`. Uploads and deletes can be
/// made to fail independently.
#[derive(Debug, Clone, Default)]
pub struct MockBlobStore {
    objects: Arc<Mutex<BTreeMap<String, StoredObject>>>,
    fail_upload: Arc<AtomicBool>,
    fail_delete: Arc<AtomicBool>,
}

impl MockBlobStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs of every stored object, in order.
    #[must_use]
    pub fn urls(&self) -> Vec<String> {
        self.objects
            .lock()
            .map(|o| o.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Metadata of the object at `url`.
    #[must_use]
    pub fn object(&self, url: &str) -> Option<StoredObject> {
        self.objects.lock().ok()?.get(url).cloned()
    }

    /// Number of stored objects.
    #[must_use]
    pub fn count(&self) -> usize {
        self.objects.lock().map(|o| o.len()).unwrap_or(0)
    }

    /// Make uploads fail with `BlobStore`.
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_upload.store(fail, Ordering::SeqCst);
    }

    /// Make deletes fail with `BlobStore`.
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }
}

impl BlobStore for MockBlobStore {
    fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<String>> + Send {
        let result = if self.fail_upload.load(Ordering::SeqCst) {
            Err(AuthError::BlobStore(format!("injected upload failure for {path}")))
        } else {
            let url = format!("{MOCK_BLOB_URL}/{path}");
            self.objects
                .lock()
                .map_err(poisoned)
                .map(|mut objects| {
                    objects.insert(
                        url.clone(),
                        StoredObject {
                            content_type: content_type.to_string(),
                            size: bytes.len(),
                        },
                    );
                    url
                })
        };
        async move { result }
    }

    fn delete(&self, url: &str) -> impl Future<Output = Result<()>> + Send {
        let result = if self.fail_delete.load(Ordering::SeqCst) {
            Err(AuthError::BlobStore(format!("injected delete failure for {url}")))
        } else {
            self.objects.lock().map_err(poisoned).map(|mut objects| {
                objects.remove(url);
            })
        };
        async move { result }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_then_delete() {
        let blobs = MockBlobStore::new();
        let url = blobs.upload("a/b.png", vec![0; 4], "image/png").await.unwrap();

        assert_eq!(url, "https://blobs.test/a/b.png");
        assert_eq!(blobs.object(&url).unwrap().size, 4);

        blobs.delete(&url).await.unwrap();
        blobs.delete(&url).await.unwrap();
        assert_eq!(blobs.count(), 0);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let blobs = MockBlobStore::new();
        blobs.fail_uploads(true);
        assert!(matches!(
            blobs.upload("a.png", vec![], "image/png").await,
            Err(AuthError::BlobStore(_))
        ));

        blobs.fail_deletes(true);
        assert!(blobs.delete("https://blobs.test/a.png").await.is_err());
    }
}
