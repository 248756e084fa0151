//! Admin management handlers.
//!
//! Thin adapters over [`AdminLifecycleManager`](crate::lifecycle::AdminLifecycleManager):
//! parse the body, call the operation with the authenticated [`Actor`],
//! wrap the result in the success envelope.

use super::{Actor, ApiResponse, MessageResponse, SharedAccessState, ok, ok_message, parse_uid};
use crate::constants::DELETE_CONFIRMATION;
use crate::lifecycle::{AdminPage, AdminQuery, NewAdmin};
use crate::providers::{AdminRecord, DocumentStore, IdentityProvider, LocalIdentityRepository};
use crate::state::{Role, VenueId};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use boxoffice_web::AppError;
use serde::{Deserialize, Serialize};

fn parse_role(role: &str) -> Result<Role, AppError> {
    Ok(role.trim().parse::<Role>()?)
}

fn parse_venue(venue_id: Option<&str>) -> Option<VenueId> {
    venue_id.and_then(VenueId::parse)
}

// ═══════════════════════════════════════════════════════════════════════
// List
// ═══════════════════════════════════════════════════════════════════════

/// Query string of the admin listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListAdminsParams {
    /// Role filter; empty or `all` means every role.
    pub role: Option<String>,
    /// Case-insensitive search over email and display name.
    pub search: Option<String>,
    /// One-based page number.
    pub page: Option<usize>,
    /// Page size.
    pub per_page: Option<usize>,
}

impl ListAdminsParams {
    fn into_query(self) -> Result<AdminQuery, AppError> {
        let role = match self.role.as_deref().map(str::trim) {
            None | Some("" | "all") => None,
            Some(role) => Some(parse_role(role)?),
        };
        Ok(AdminQuery {
            role,
            search: self.search,
            page: self.page.unwrap_or(1),
            per_page: self.per_page,
        })
    }
}

/// List admins with filters, pagination and stats.
///
/// # Endpoint
///
/// ```text
/// GET /api/v1/access/admins?role=venueAdmin&search=ann&page=2
/// Authorization: Bearer <id token>
/// ```
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "message": "3 admins",
///   "admins": [{ "uid": "abc", "email": "ann@example.com", "role": "venueAdmin", ... }],
///   "page": 1,
///   "total_pages": 1,
///   "total_matches": 3,
///   "stats": { "total": 7, "site_admins": 1, "venue_admins": 3, "sub_admins": 3, "active": 6 }
/// }
/// ```
pub async fn list_admins<P, S, L>(
    State(state): State<SharedAccessState<P, S, L>>,
    Actor(actor): Actor,
    Query(params): Query<ListAdminsParams>,
) -> Result<Json<ApiResponse<AdminPage>>, AppError>
where
    P: IdentityProvider + Clone + 'static,
    S: DocumentStore + Clone + 'static,
    L: LocalIdentityRepository + Clone + 'static,
{
    let page = state
        .lifecycle
        .list_admins(&actor, params.into_query()?)
        .await?;
    Ok(ok(format!("{} admins", page.total_matches), page))
}

// ═══════════════════════════════════════════════════════════════════════
// Create
// ═══════════════════════════════════════════════════════════════════════

/// Request to create an admin.
#[derive(Clone, Deserialize)]
pub struct CreateAdminRequest {
    /// Admin email.
    pub email: String,
    /// `siteAdmin`, `venueAdmin` or `subAdmin`.
    pub role: String,
    /// Venue scope for venue-scoped roles.
    #[serde(default)]
    pub venue_id: Option<String>,
    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Initial password; without one a setup link is returned.
    #[serde(default)]
    pub password: Option<String>,
}

impl std::fmt::Debug for CreateAdminRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateAdminRequest")
            .field("email", &self.email)
            .field("role", &self.role)
            .field("venue_id", &self.venue_id)
            .finish_non_exhaustive()
    }
}

/// Body of a created admin.
#[derive(Debug, Serialize)]
pub struct CreatedAdminBody {
    /// Subject id of the new account.
    pub uid: String,
    /// Directory record as written.
    pub admin: AdminRecord,
    /// Password-setup link, when no password was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_setup_link: Option<String>,
}

/// Create an admin account and record.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/access/admins
/// Authorization: Bearer <id token>
///
/// { "email": "ann@example.com", "role": "venueAdmin", "venue_id": "v1" }
/// ```
pub async fn create_admin<P, S, L>(
    State(state): State<SharedAccessState<P, S, L>>,
    Actor(actor): Actor,
    Json(request): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedAdminBody>>), AppError>
where
    P: IdentityProvider + Clone + 'static,
    S: DocumentStore + Clone + 'static,
    L: LocalIdentityRepository + Clone + 'static,
{
    let new_admin = NewAdmin {
        role: parse_role(&request.role)?,
        venue_id: parse_venue(request.venue_id.as_deref()),
        email: request.email,
        display_name: request.display_name,
        password: request.password.filter(|p| !p.is_empty()),
    };

    let created = state.lifecycle.create_admin(&actor, new_admin).await?;
    let message = format!("Admin {} created", created.record.email);

    Ok((
        StatusCode::CREATED,
        ok(
            message,
            CreatedAdminBody {
                uid: created.subject_id.to_string(),
                admin: created.record,
                password_setup_link: created.password_setup_link,
            },
        ),
    ))
}

// ═══════════════════════════════════════════════════════════════════════
// Update
// ═══════════════════════════════════════════════════════════════════════

/// Request to change an admin's role, venue or display name.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAdminRequest {
    /// Subject id.
    pub uid: String,
    /// New role.
    pub role: String,
    /// New venue scope.
    #[serde(default)]
    pub venue_id: Option<String>,
    /// New display name; unchanged when absent.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Body carrying one admin record.
#[derive(Debug, Serialize)]
pub struct AdminBody {
    /// Subject id.
    pub uid: String,
    /// Record after the change.
    pub admin: AdminRecord,
}

/// Change an admin's role and venue scope, and optionally the display name.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/access/admins/update
///
/// { "uid": "abc", "role": "subAdmin", "venue_id": "v2" }
/// ```
pub async fn update_admin<P, S, L>(
    State(state): State<SharedAccessState<P, S, L>>,
    Actor(actor): Actor,
    Json(request): Json<UpdateAdminRequest>,
) -> Result<Json<ApiResponse<AdminBody>>, AppError>
where
    P: IdentityProvider + Clone + 'static,
    S: DocumentStore + Clone + 'static,
    L: LocalIdentityRepository + Clone + 'static,
{
    let subject_id = parse_uid(&request.uid)?;
    let role = parse_role(&request.role)?;

    let mut record = state
        .lifecycle
        .update_admin_role(
            &actor,
            &subject_id,
            role,
            parse_venue(request.venue_id.as_deref()),
        )
        .await?;

    if let Some(display_name) = request.display_name.as_deref() {
        record = state
            .lifecycle
            .rename_admin(&actor, &subject_id, display_name)
            .await?;
    }

    Ok(ok(
        format!("Admin {} updated", record.email),
        AdminBody {
            uid: subject_id.to_string(),
            admin: record,
        },
    ))
}

// ═══════════════════════════════════════════════════════════════════════
// Status
// ═══════════════════════════════════════════════════════════════════════

/// Request to activate or deactivate an admin.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusRequest {
    /// Subject id.
    pub uid: String,
    /// `activate` or `deactivate`.
    pub action: String,
}

/// Activate or deactivate an admin.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/access/admins/status
///
/// { "uid": "abc", "action": "deactivate" }
/// ```
pub async fn change_status<P, S, L>(
    State(state): State<SharedAccessState<P, S, L>>,
    Actor(actor): Actor,
    Json(request): Json<StatusRequest>,
) -> Result<Json<MessageResponse>, AppError>
where
    P: IdentityProvider + Clone + 'static,
    S: DocumentStore + Clone + 'static,
    L: LocalIdentityRepository + Clone + 'static,
{
    let subject_id = parse_uid(&request.uid)?;
    match request.action.trim() {
        "activate" => {
            state.lifecycle.activate_admin(&actor, &subject_id).await?;
            Ok(ok_message("Admin activated"))
        }
        "deactivate" => {
            state.lifecycle.deactivate_admin(&actor, &subject_id).await?;
            Ok(ok_message("Admin deactivated"))
        }
        other => Err(AppError::bad_request(format!(
            "Unknown action '{other}', expected activate or deactivate"
        ))),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Delete
// ═══════════════════════════════════════════════════════════════════════

/// Request to delete an admin.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteRequest {
    /// Subject id.
    pub uid: String,
    /// Must be exactly `DELETE`.
    #[serde(default)]
    pub confirm: String,
}

/// Permanently delete an admin.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/access/admins/delete
///
/// { "uid": "abc", "confirm": "DELETE" }
/// ```
pub async fn delete_admin<P, S, L>(
    State(state): State<SharedAccessState<P, S, L>>,
    Actor(actor): Actor,
    Json(request): Json<DeleteRequest>,
) -> Result<Json<MessageResponse>, AppError>
where
    P: IdentityProvider + Clone + 'static,
    S: DocumentStore + Clone + 'static,
    L: LocalIdentityRepository + Clone + 'static,
{
    if request.confirm != DELETE_CONFIRMATION {
        return Err(AppError::bad_request(format!(
            "Type {DELETE_CONFIRMATION} to confirm deletion"
        )));
    }
    let subject_id = parse_uid(&request.uid)?;
    state.lifecycle.delete_admin(&actor, &subject_id).await?;
    Ok(ok_message("Admin deleted"))
}

// ═══════════════════════════════════════════════════════════════════════
// Password reset
// ═══════════════════════════════════════════════════════════════════════

/// Request for a password reset link.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordResetRequest {
    /// Account email.
    pub email: String,
}

/// Reset link body.
#[derive(Debug, Serialize)]
pub struct PasswordResetBody {
    /// Link to hand to the admin.
    pub link: String,
}

/// Generate a password reset link.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/access/admins/password-reset
///
/// { "email": "ann@example.com" }
/// ```
pub async fn password_reset<P, S, L>(
    State(state): State<SharedAccessState<P, S, L>>,
    Actor(actor): Actor,
    Json(request): Json<PasswordResetRequest>,
) -> Result<Json<ApiResponse<PasswordResetBody>>, AppError>
where
    P: IdentityProvider + Clone + 'static,
    S: DocumentStore + Clone + 'static,
    L: LocalIdentityRepository + Clone + 'static,
{
    let link = state
        .lifecycle
        .send_password_reset(&actor, &request.email)
        .await?;
    Ok(ok("Password reset link generated", PasswordResetBody { link }))
}

// ═══════════════════════════════════════════════════════════════════════
// Promotion / demotion
// ═══════════════════════════════════════════════════════════════════════

/// Request to promote a user to an admin role.
#[derive(Debug, Clone, Deserialize)]
pub struct PromoteRequest {
    /// Subject id of the user.
    pub uid: String,
    /// Admin role to grant.
    pub role: String,
    /// Venue scope for venue-scoped roles.
    #[serde(default)]
    pub venue_id: Option<String>,
}

/// Request naming one admin.
#[derive(Debug, Clone, Deserialize)]
pub struct UidRequest {
    /// Subject id.
    pub uid: String,
}

/// Move a user into the admins collection.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/access/admins/promote
///
/// { "uid": "abc", "role": "venueAdmin", "venue_id": "v1" }
/// ```
pub async fn promote_user<P, S, L>(
    State(state): State<SharedAccessState<P, S, L>>,
    Actor(actor): Actor,
    Json(request): Json<PromoteRequest>,
) -> Result<Json<ApiResponse<AdminBody>>, AppError>
where
    P: IdentityProvider + Clone + 'static,
    S: DocumentStore + Clone + 'static,
    L: LocalIdentityRepository + Clone + 'static,
{
    let subject_id = parse_uid(&request.uid)?;
    let record = state
        .lifecycle
        .promote_user(
            &actor,
            &subject_id,
            parse_role(&request.role)?,
            parse_venue(request.venue_id.as_deref()),
        )
        .await?;
    Ok(ok(
        format!("{} promoted to {}", record.email, record.role),
        AdminBody {
            uid: subject_id.to_string(),
            admin: record,
        },
    ))
}

/// Move an admin back into the users collection.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/access/admins/demote
///
/// { "uid": "abc" }
/// ```
pub async fn demote_admin<P, S, L>(
    State(state): State<SharedAccessState<P, S, L>>,
    Actor(actor): Actor,
    Json(request): Json<UidRequest>,
) -> Result<Json<MessageResponse>, AppError>
where
    P: IdentityProvider + Clone + 'static,
    S: DocumentStore + Clone + 'static,
    L: LocalIdentityRepository + Clone + 'static,
{
    let subject_id = parse_uid(&request.uid)?;
    let user = state.lifecycle.demote_admin(&actor, &subject_id).await?;
    Ok(ok_message(format!("{} demoted to user", user.email)))
}
