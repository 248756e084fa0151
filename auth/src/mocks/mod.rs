//! Mock provider implementations for testing.
//!
//! In-memory implementations of every provider trait, with failure injection
//! so tests can exercise partial-failure paths.

pub mod blob_store;
pub mod document_store;
pub mod identity;
pub mod local_identity;

pub use blob_store::{MOCK_BLOB_URL, MockBlobStore, StoredObject};
pub use document_store::{MockDocumentStore, StoreOp};
pub use identity::{IdentityOp, MockIdentityProvider};
pub use local_identity::MockLocalIdentityRepository;

use crate::error::AuthError;

pub(crate) fn poisoned<T>(_: T) -> AuthError {
    AuthError::Internal("mock lock poisoned".to_string())
}
