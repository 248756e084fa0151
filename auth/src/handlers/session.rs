//! Session handlers.
//!
//! The client signs in with the identity provider and presents the
//! resulting ID token. The server keeps no session of its own: every
//! request carries the token and is reconciled again.

use super::{Actor, ApiResponse, SharedAccessState, ok};
use crate::policy::{can_access_venue_dashboard, can_manage_admins, can_scan_tickets};
use crate::providers::{DocumentStore, IdentityProvider, LocalIdentityRepository};
use crate::state::{ExternalCredential, LocalIdentity, Role};
use axum::{Json, extract::State};
use boxoffice_web::{AppError, CorrelationId};
use serde::{Deserialize, Serialize};

/// Request to open a session.
#[derive(Clone, Deserialize)]
pub struct SessionRequest {
    /// ID token issued by the identity provider.
    pub id_token: String,
}

impl std::fmt::Debug for SessionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRequest").finish_non_exhaustive()
    }
}

/// Capabilities derived from the role, for client-side navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// May manage admins.
    pub manage_admins: bool,
    /// May scan tickets.
    pub scan_tickets: bool,
    /// May open a venue dashboard.
    pub venue_dashboard: bool,
}

/// The caller's reconciled identity.
#[derive(Debug, Clone, Serialize)]
pub struct IdentitySummary {
    /// Local identity id.
    pub local_id: String,
    /// Identity-provider subject, absent for legacy rows.
    pub uid: Option<String>,
    /// Email address.
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// Role.
    pub role: Role,
    /// Venue scope.
    pub venue_id: Option<String>,
    /// Sign-in provider.
    pub provider: String,
    /// Derived capabilities.
    pub capabilities: Capabilities,
}

impl From<&LocalIdentity> for IdentitySummary {
    fn from(identity: &LocalIdentity) -> Self {
        Self {
            local_id: identity.local_id.to_string(),
            uid: identity.subject_id.as_ref().map(ToString::to_string),
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
            role: identity.role,
            venue_id: identity.venue_id.as_ref().map(ToString::to_string),
            provider: identity.provider.clone(),
            capabilities: Capabilities {
                manage_admins: can_manage_admins(identity),
                scan_tickets: can_scan_tickets(identity),
                venue_dashboard: can_access_venue_dashboard(identity),
            },
        }
    }
}

/// Wrapper that puts the summary under `user`.
#[derive(Debug, Serialize)]
pub struct SessionBody {
    /// The caller.
    pub user: IdentitySummary,
}

/// Verify an ID token and reconcile the identity behind it.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/access/session
/// Content-Type: application/json
///
/// { "id_token": "eyJ..." }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "message": "Signed in",
///   "user": { "email": "ann@example.com", "role": "venueAdmin", "venue_id": "v1", ... }
/// }
/// ```
pub async fn create_session<P, S, L>(
    State(state): State<SharedAccessState<P, S, L>>,
    correlation_id: CorrelationId,
    Json(request): Json<SessionRequest>,
) -> Result<Json<ApiResponse<SessionBody>>, AppError>
where
    P: IdentityProvider + Clone + 'static,
    S: DocumentStore + Clone + 'static,
    L: LocalIdentityRepository + Clone + 'static,
{
    if request.id_token.trim().is_empty() {
        return Err(AppError::bad_request("id_token is required"));
    }

    let identity = state
        .reconciler
        .authenticate(&ExternalCredential::new(request.id_token))
        .await?;

    tracing::info!(
        correlation_id = %correlation_id.0,
        email = %identity.email,
        role = %identity.role,
        "Session opened"
    );

    Ok(ok(
        "Signed in",
        SessionBody {
            user: IdentitySummary::from(&identity),
        },
    ))
}

/// The caller's identity.
///
/// # Endpoint
///
/// ```text
/// GET /api/v1/access/me
/// Authorization: Bearer <id token>
/// ```
#[allow(clippy::unused_async)]
pub async fn me(Actor(identity): Actor) -> Json<ApiResponse<SessionBody>> {
    ok(
        "Current user",
        SessionBody {
            user: IdentitySummary::from(&identity),
        },
    )
}
