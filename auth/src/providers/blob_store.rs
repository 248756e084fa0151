//! Object storage trait for event images.

use crate::error::Result;

/// Public object storage.
///
/// Objects are addressed by path on upload and by their public URL
/// afterwards, which is what event documents store. Every transport
/// failure surfaces as `AuthError::BlobStore`.
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `path` and make the object publicly readable.
    ///
    /// # Returns
    ///
    /// The object's public URL.
    ///
    /// # Errors
    ///
    /// Returns error if the upload fails.
    fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    /// Delete the object behind a public URL.
    ///
    /// URLs that do not point into this store, and objects that are
    /// already gone, are ignored.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be reached.
    fn delete(&self, url: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}
