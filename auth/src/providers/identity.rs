//! Identity provider trait.

use super::{IdentityAccount, NewAccount};
use crate::error::Result;
use crate::state::{ExternalCredential, SubjectId, VerifiedIdentity};

/// Identity provider.
///
/// Verifies bearer credentials and manages the accounts behind them. The
/// provider owns passwords and sign-in; the application only stores
/// directory records keyed by the provider's subject id.
pub trait IdentityProvider: Send + Sync {
    /// Verify a bearer credential.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The credential is malformed, expired or revoked → `AuthError::InvalidCredential`
    /// - The identity has no email address → `AuthError::MissingEmail`
    /// - The provider cannot be reached → `AuthError::IdentityProvider`
    fn verify_token(
        &self,
        credential: &ExternalCredential,
    ) -> impl std::future::Future<Output = Result<VerifiedIdentity>> + Send;

    /// Look up an account by subject id.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No such account → `AuthError::NotFound`
    /// - The provider cannot be reached → `AuthError::IdentityProvider`
    fn get_account(
        &self,
        subject_id: &SubjectId,
    ) -> impl std::future::Future<Output = Result<IdentityAccount>> + Send;

    /// Look up an account by email.
    ///
    /// # Returns
    ///
    /// `None` if no account uses the email.
    ///
    /// # Errors
    ///
    /// Returns error if the provider cannot be reached.
    fn get_account_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<IdentityAccount>>> + Send;

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The email is already registered → `AuthError::DuplicateEmail`
    /// - The provider cannot be reached → `AuthError::IdentityProvider`
    fn create_account(
        &self,
        account: &NewAccount,
    ) -> impl std::future::Future<Output = Result<IdentityAccount>> + Send;

    /// Enable or disable sign-in for an account.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No such account → `AuthError::NotFound`
    /// - The provider cannot be reached → `AuthError::IdentityProvider`
    fn set_disabled(
        &self,
        subject_id: &SubjectId,
        disabled: bool,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Change an account's display name.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No such account → `AuthError::NotFound`
    /// - The provider cannot be reached → `AuthError::IdentityProvider`
    fn update_display_name(
        &self,
        subject_id: &SubjectId,
        display_name: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Permanently delete an account.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No such account → `AuthError::NotFound`
    /// - The provider cannot be reached → `AuthError::IdentityProvider`
    fn delete_account(
        &self,
        subject_id: &SubjectId,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Generate a password reset (or first-time setup) link.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No account uses the email → `AuthError::NotFound`
    /// - The provider cannot be reached → `AuthError::IdentityProvider`
    fn generate_password_reset_link(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}
