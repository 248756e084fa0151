//! Local identity repository trait.

use crate::error::Result;
use crate::state::{LocalId, LocalIdentity, SubjectId};

/// Local identity table.
///
/// Implementations enforce uniqueness of `subject_id` and `email`.
pub trait LocalIdentityRepository: Send + Sync {
    /// Find the row bound to a subject id.
    ///
    /// # Errors
    ///
    /// Returns error if the table cannot be reached.
    fn find_by_subject(
        &self,
        subject_id: &SubjectId,
    ) -> impl std::future::Future<Output = Result<Option<LocalIdentity>>> + Send;

    /// Find the row with an email address.
    ///
    /// # Errors
    ///
    /// Returns error if the table cannot be reached.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<LocalIdentity>>> + Send;

    /// Insert a new row.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The email or subject id is already taken → `AuthError::DuplicateEmail`
    /// - The table cannot be reached → `AuthError::StoreUnavailable`
    fn insert(
        &self,
        identity: &LocalIdentity,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Overwrite an existing row, matched by `local_id`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No row has this `local_id` → `AuthError::NotFound`
    /// - The update violates uniqueness → `AuthError::DuplicateEmail`
    /// - The table cannot be reached → `AuthError::StoreUnavailable`
    fn update(
        &self,
        identity: &LocalIdentity,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Delete a row. Deleting a missing row succeeds.
    ///
    /// # Errors
    ///
    /// Returns error if the table cannot be reached.
    fn delete(
        &self,
        local_id: LocalId,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
