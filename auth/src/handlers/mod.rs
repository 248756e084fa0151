//! HTTP handlers for the access-control endpoints.
//!
//! Handlers share an [`AccessState`] (or an [`EventState`] for the event
//! routes) and authenticate callers through the [`Actor`] extractor, which
//! verifies the bearer token and reconciles the identity on every request. Every response uses the same envelope:
//!
//! ```json
//! { "success": true, "message": "Admin created", ... }
//! ```

pub mod admins;
pub mod events;
pub mod session;
pub mod venues;

use crate::catalog::EventCatalog;
use crate::directory::Directory;
use crate::environment::AccessEnvironment;
use crate::error::AuthError;
use crate::lifecycle::AdminLifecycleManager;
use crate::providers::{BlobStore, DocumentStore, IdentityProvider, LocalIdentityRepository};
use crate::reconciler::IdentityReconciler;
use crate::state::{ExternalCredential, LocalIdentity, SubjectId};
use axum::{
    Json, async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use boxoffice_web::{AppError, BearerToken};
use serde::Serialize;
use std::sync::Arc;

/// Shared state of the access router.
pub struct AccessState<P, S, L>
where
    P: IdentityProvider + Clone,
    S: DocumentStore + Clone,
    L: LocalIdentityRepository + Clone,
{
    /// Reconciler used by [`Actor`] and the session endpoint.
    pub reconciler: IdentityReconciler<P, S, L>,

    /// Admin lifecycle operations.
    pub lifecycle: AdminLifecycleManager<P, S, L>,

    /// Read access to the venue catalog.
    pub directory: Directory<S>,
}

impl<P, S, L> AccessState<P, S, L>
where
    P: IdentityProvider + Clone,
    S: DocumentStore + Clone,
    L: LocalIdentityRepository + Clone,
{
    /// Build the state from one environment with default configuration.
    #[must_use]
    pub fn new(env: AccessEnvironment<P, S, L>) -> Self {
        Self::from_parts(
            IdentityReconciler::new(env.clone()),
            AdminLifecycleManager::new(env.clone()),
            env.directory,
        )
    }

    /// Build the state from separately configured parts.
    #[must_use]
    pub const fn from_parts(
        reconciler: IdentityReconciler<P, S, L>,
        lifecycle: AdminLifecycleManager<P, S, L>,
        directory: Directory<S>,
    ) -> Self {
        Self {
            reconciler,
            lifecycle,
            directory,
        }
    }
}

/// State handed to the router.
pub type SharedAccessState<P, S, L> = Arc<AccessState<P, S, L>>;

/// Shared state of the event router.
pub struct EventState<P, S, L, B>
where
    P: IdentityProvider + Clone,
    S: DocumentStore + Clone,
    L: LocalIdentityRepository + Clone,
    B: BlobStore + Clone,
{
    /// Reconciler used by [`Actor`].
    pub reconciler: IdentityReconciler<P, S, L>,

    /// Event operations.
    pub catalog: EventCatalog<S, B>,
}

impl<P, S, L, B> EventState<P, S, L, B>
where
    P: IdentityProvider + Clone,
    S: DocumentStore + Clone,
    L: LocalIdentityRepository + Clone,
    B: BlobStore + Clone,
{
    /// Build the state from one environment and an image store.
    #[must_use]
    pub fn new(env: AccessEnvironment<P, S, L>, blobs: B) -> Self {
        Self {
            catalog: EventCatalog::new(env.directory.clone(), blobs, env.clock.clone()),
            reconciler: IdentityReconciler::new(env),
        }
    }
}

/// State handed to the event router.
pub type SharedEventState<P, S, L, B> = Arc<EventState<P, S, L, B>>;

/// The authenticated, reconciled caller.
#[derive(Debug, Clone)]
pub struct Actor(pub LocalIdentity);

#[async_trait]
impl<P, S, L> FromRequestParts<SharedAccessState<P, S, L>> for Actor
where
    P: IdentityProvider + Clone + 'static,
    S: DocumentStore + Clone + 'static,
    L: LocalIdentityRepository + Clone + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedAccessState<P, S, L>,
    ) -> Result<Self, Self::Rejection> {
        Self::authenticate(parts, &state.reconciler).await
    }
}

#[async_trait]
impl<P, S, L, B> FromRequestParts<SharedEventState<P, S, L, B>> for Actor
where
    P: IdentityProvider + Clone + 'static,
    S: DocumentStore + Clone + 'static,
    L: LocalIdentityRepository + Clone + 'static,
    B: BlobStore + Clone + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedEventState<P, S, L, B>,
    ) -> Result<Self, Self::Rejection> {
        Self::authenticate(parts, &state.reconciler).await
    }
}

impl Actor {
    async fn authenticate<P, S, L>(
        parts: &mut Parts,
        reconciler: &IdentityReconciler<P, S, L>,
    ) -> Result<Self, AppError>
    where
        P: IdentityProvider + Clone,
        S: DocumentStore + Clone,
        L: LocalIdentityRepository + Clone,
    {
        let BearerToken(token) = BearerToken::from_request_parts(parts, &()).await?;
        let identity = reconciler
            .authenticate(&ExternalCredential::new(token))
            .await?;
        Ok(Self(identity))
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        let error = match &err {
            AuthError::InvalidCredential | AuthError::MissingEmail => Self::unauthorized(message),
            AuthError::PermissionDenied { .. } | AuthError::SelfDeletionForbidden => {
                Self::forbidden(message)
            }
            AuthError::NotFound(_) => Self::not_found(message),
            AuthError::DuplicateEmail { .. } => Self::conflict(message),
            AuthError::InvalidRole { .. }
            | AuthError::MissingVenue { .. }
            | AuthError::UnknownVenue { .. }
            | AuthError::InvalidEmail
            | AuthError::WeakPassword { .. }
            | AuthError::InvalidEvent { .. }
            | AuthError::InvalidStateTransition { .. } => Self::bad_request(message),
            AuthError::StoreUnavailable(_) => {
                Self::unavailable("Directory temporarily unavailable")
            }
            AuthError::IdentityProvider(_) => Self::bad_gateway("Identity provider error"),
            AuthError::BlobStore(_) => Self::bad_gateway("Image storage error"),
            AuthError::Serialization(_) | AuthError::Internal(_) => {
                Self::internal("Internal server error")
            }
        };
        error.with_source(anyhow::Error::new(err))
    }
}

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Always `true`; failures go through [`AppError`].
    pub success: bool,

    /// Human-readable outcome.
    pub message: String,

    /// Endpoint-specific fields, inlined next to `success` and `message`.
    #[serde(flatten)]
    pub data: T,
}

/// Envelope without extra fields.
pub type MessageResponse = ApiResponse<serde_json::Map<String, serde_json::Value>>;

/// Wrap `data` in a success envelope.
pub fn ok<T: Serialize>(message: impl Into<String>, data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        message: message.into(),
        data,
    })
}

/// Success envelope carrying only a message.
pub fn ok_message(message: impl Into<String>) -> Json<MessageResponse> {
    ok(message, serde_json::Map::new())
}

/// Parse a subject id from a request body.
///
/// # Errors
///
/// Returns 400 when the id is blank.
pub fn parse_uid(uid: &str) -> Result<SubjectId, AppError> {
    SubjectId::new(uid.trim()).map_err(|_| AppError::bad_request("uid is required"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::state::AdminState;
    use axum::http::StatusCode;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (AuthError::InvalidCredential, StatusCode::UNAUTHORIZED),
            (AuthError::permission_denied("manage admins"), StatusCode::FORBIDDEN),
            (AuthError::SelfDeletionForbidden, StatusCode::FORBIDDEN),
            (AuthError::NotFound("admin uid-1".into()), StatusCode::NOT_FOUND),
            (
                AuthError::DuplicateEmail {
                    email: "a@x.com".into(),
                },
                StatusCode::CONFLICT,
            ),
            (AuthError::InvalidEmail, StatusCode::BAD_REQUEST),
            (
                AuthError::InvalidStateTransition {
                    from: AdminState::Active,
                    to: AdminState::Active,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                AuthError::StoreUnavailable("redis down".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AuthError::IdentityProvider("timeout".into()),
                StatusCode::BAD_GATEWAY,
            ),
            (AuthError::invalid_event("date must be in the future"), StatusCode::BAD_REQUEST),
            (AuthError::BlobStore("bucket gone".into()), StatusCode::BAD_GATEWAY),
            (AuthError::Internal("lock".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn test_infrastructure_details_are_not_exposed() {
        let err = AppError::from(AuthError::StoreUnavailable("10.0.0.5:6379 refused".into()));
        assert!(!err.message().contains("10.0.0.5"));
    }

    #[test]
    fn test_parse_uid_rejects_blank() {
        assert_eq!(parse_uid("  ").unwrap_err().status(), StatusCode::BAD_REQUEST);
        assert_eq!(parse_uid(" uid-1 ").map(|s| s.to_string()).ok(), Some("uid-1".into()));
    }
}
