//! Error types for identity reconciliation, authorization, admin lifecycle
//! and the event catalog.

use crate::state::AdminState;
use thiserror::Error;

/// Result type alias for access-control operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Error taxonomy for the access-control core.
///
/// Variants are grouped by the stage that raises them: credential
/// verification, directory access, admin validation and authorization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Credential Errors
    // ═══════════════════════════════════════════════════════════

    /// The presented credential was rejected by the identity provider.
    #[error("Invalid credential")]
    InvalidCredential,

    /// The credential verified but carries no email claim.
    #[error("Verified identity has no email address")]
    MissingEmail,

    // ═══════════════════════════════════════════════════════════
    // Storage Errors
    // ═══════════════════════════════════════════════════════════

    /// The directory store or local identity table could not be reached.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Requested record not found.
    #[error("Not found: {0}")]
    NotFound(String),

    // ═══════════════════════════════════════════════════════════
    // Validation Errors
    // ═══════════════════════════════════════════════════════════

    /// An account or directory record already uses this email.
    #[error("An account with email {email} already exists")]
    DuplicateEmail {
        /// Conflicting email address
        email: String,
    },

    /// Role is unknown or not allowed for the operation.
    #[error("Invalid role: {role}")]
    InvalidRole {
        /// Offending role value
        role: String,
    },

    /// Role is venue-scoped but no venue was supplied.
    #[error("Role {role} requires a venue")]
    MissingVenue {
        /// Role that requires the venue
        role: String,
    },

    /// The venue is not present in the venue catalog.
    #[error("Venue {venue_id} does not exist")]
    UnknownVenue {
        /// Venue identifier that was not found
        venue_id: String,
    },

    /// Email address is malformed.
    #[error("Invalid email address")]
    InvalidEmail,

    /// Supplied password is shorter than the configured minimum.
    #[error("Password must be at least {min_length} characters")]
    WeakPassword {
        /// Minimum accepted length
        min_length: usize,
    },

    /// Event details failed validation.
    #[error("Invalid event: {reason}")]
    InvalidEvent {
        /// What was wrong with the event
        reason: String,
    },

    /// Admin account is not in a state that allows the transition.
    #[error("Cannot move admin from {from:?} to {to:?}")]
    InvalidStateTransition {
        /// Current state
        from: AdminState,
        /// Requested state
        to: AdminState,
    },

    // ═══════════════════════════════════════════════════════════
    // Authorization Errors
    // ═══════════════════════════════════════════════════════════

    /// Actor lacks the permission required by the operation.
    #[error("Permission denied: {required}")]
    PermissionDenied {
        /// Permission that was missing
        required: String,
    },

    /// An administrator attempted to delete their own account.
    #[error("Administrators cannot delete their own account")]
    SelfDeletionForbidden,

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Identity provider call failed for a reason other than a bad credential.
    #[error("Identity provider error: {0}")]
    IdentityProvider(String),

    /// Object storage for event images failed.
    #[error("Blob store error: {0}")]
    BlobStore(String),

    /// Stored document could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not be exposed to users).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Returns `true` if this error is due to invalid caller input.
    ///
    /// # Examples
    ///
    /// ```
    /// # use boxoffice_auth::AuthError;
    /// assert!(AuthError::InvalidEmail.is_user_error());
    /// assert!(!AuthError::StoreUnavailable("down".into()).is_user_error());
    /// ```
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredential
                | Self::MissingEmail
                | Self::DuplicateEmail { .. }
                | Self::InvalidRole { .. }
                | Self::MissingVenue { .. }
                | Self::UnknownVenue { .. }
                | Self::InvalidEmail
                | Self::WeakPassword { .. }
                | Self::InvalidEvent { .. }
                | Self::InvalidStateTransition { .. }
                | Self::SelfDeletionForbidden
        )
    }

    /// Returns `true` if this error should be surfaced in the security audit log.
    ///
    /// # Examples
    ///
    /// ```
    /// # use boxoffice_auth::AuthError;
    /// assert!(AuthError::SelfDeletionForbidden.is_security_issue());
    /// assert!(!AuthError::InvalidEmail.is_security_issue());
    /// ```
    pub const fn is_security_issue(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredential | Self::PermissionDenied { .. } | Self::SelfDeletionForbidden
        )
    }

    /// Shorthand for an [`AuthError::InvalidEvent`].
    #[must_use]
    pub fn invalid_event(reason: impl Into<String>) -> Self {
        Self::InvalidEvent {
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`AuthError::PermissionDenied`] with the given requirement.
    #[must_use]
    pub fn permission_denied(required: impl Into<String>) -> Self {
        Self::PermissionDenied {
            required: required.into(),
        }
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_errors() {
        assert!(AuthError::MissingVenue { role: "venueAdmin".into() }.is_user_error());
        assert!(AuthError::DuplicateEmail { email: "a@x.com".into() }.is_user_error());
        assert!(!AuthError::PermissionDenied { required: "siteAdmin".into() }.is_user_error());
        assert!(!AuthError::Internal("boom".into()).is_user_error());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            AuthError::WeakPassword { min_length: 6 }.to_string(),
            "Password must be at least 6 characters"
        );
        assert_eq!(
            AuthError::InvalidStateTransition {
                from: AdminState::Active,
                to: AdminState::Active,
            }
            .to_string(),
            "Cannot move admin from Active to Active"
        );
    }
}
