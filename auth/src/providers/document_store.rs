//! Directory document store trait.

use super::{Document, StoredDocument};
use crate::error::Result;
use serde_json::Value;

/// Document store over named collections.
///
/// Documents are JSON objects addressed by `(collection, id)`. Every
/// transport failure surfaces as `AuthError::StoreUnavailable`.
pub trait DocumentStore: Send + Sync {
    /// Fetch a document.
    ///
    /// # Returns
    ///
    /// `None` if the document does not exist.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be reached.
    fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Document>>> + Send;

    /// Create or replace a document.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be reached.
    fn set(
        &self,
        collection: &str,
        id: &str,
        data: &Document,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Shallow-merge `fields` into an existing document.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The document does not exist → `AuthError::NotFound`
    /// - The store cannot be reached → `AuthError::StoreUnavailable`
    fn update(
        &self,
        collection: &str,
        id: &str,
        fields: &Document,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Delete a document. Deleting a missing document succeeds.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be reached.
    fn delete(
        &self,
        collection: &str,
        id: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Read every document in a collection.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be reached.
    fn stream_all(
        &self,
        collection: &str,
    ) -> impl std::future::Future<Output = Result<Vec<StoredDocument>>> + Send;

    /// Read every document whose top-level `field` equals `value`.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be reached.
    fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> impl std::future::Future<Output = Result<Vec<StoredDocument>>> + Send;
}
