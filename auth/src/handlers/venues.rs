//! Venue catalog handler.

use super::{Actor, ApiResponse, SharedAccessState, ok};
use crate::policy::{Permission, can_manage_venue, require};
use crate::providers::{DocumentStore, IdentityProvider, LocalIdentityRepository, Venue};
use axum::{Json, extract::State};
use boxoffice_web::AppError;
use serde::Serialize;

/// Venue list body.
#[derive(Debug, Serialize)]
pub struct VenueList {
    /// Venues visible to the caller, sorted by name.
    pub venues: Vec<Venue>,
}

/// List the venues the caller may manage.
///
/// Site admins see the whole catalog; venue admins and sub admins see their
/// own venue.
///
/// # Endpoint
///
/// ```text
/// GET /api/v1/access/venues
/// Authorization: Bearer <id token>
/// ```
pub async fn list_venues<P, S, L>(
    State(state): State<SharedAccessState<P, S, L>>,
    Actor(actor): Actor,
) -> Result<Json<ApiResponse<VenueList>>, AppError>
where
    P: IdentityProvider + Clone + 'static,
    S: DocumentStore + Clone + 'static,
    L: LocalIdentityRepository + Clone + 'static,
{
    require(&actor, &Permission::VenueDashboard)?;

    let venues: Vec<Venue> = state
        .directory
        .list_venues()
        .await?
        .into_iter()
        .filter(|venue| can_manage_venue(&actor, &venue.id))
        .collect();

    Ok(ok(format!("{} venues", venues.len()), VenueList { venues }))
}
