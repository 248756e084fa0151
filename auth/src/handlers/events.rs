//! Event catalog handlers.
//!
//! Thin adapters over [`EventCatalog`](crate::catalog::EventCatalog). Venue
//! scoping and the featured-flag rule are enforced by the catalog; these
//! handlers only parse requests and shape responses.

use super::{Actor, ApiResponse, MessageResponse, SharedEventState, ok, ok_message};
use crate::catalog::{EventDraft, EventEntry, EventImage, EventListing};
use crate::providers::{BlobStore, DocumentStore, IdentityProvider, LocalIdentityRepository};
use crate::state::VenueId;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
};
use boxoffice_web::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Query string of the event listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListEventsParams {
    /// Case-insensitive search over name, venue and description.
    pub search: Option<String>,
}

/// List the events the caller manages.
///
/// # Endpoint
///
/// ```text
/// GET /api/v1/access/events?search=jazz
/// Authorization: Bearer <id token>
/// ```
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "message": "2 events",
///   "events": [{ "id": "...", "name": "Late Jazz", "venueId": "v1", "sold_out": false, ... }],
///   "stats": { "total": 2, "featured": 0, "sold_out": 1 }
/// }
/// ```
pub async fn list_events<P, S, L, B>(
    State(state): State<SharedEventState<P, S, L, B>>,
    Actor(actor): Actor,
    Query(params): Query<ListEventsParams>,
) -> Result<Json<ApiResponse<EventListing>>, AppError>
where
    P: IdentityProvider + Clone + 'static,
    S: DocumentStore + Clone + 'static,
    L: LocalIdentityRepository + Clone + 'static,
    B: BlobStore + Clone + 'static,
{
    let listing = state
        .catalog
        .list_events(&actor, params.search.as_deref())
        .await?;
    Ok(ok(format!("{} events", listing.stats.total), listing))
}

/// Body carrying one event.
#[derive(Debug, Serialize)]
pub struct EventBody {
    /// The event.
    pub event: EventEntry,
}

/// Public event detail. No credential required.
///
/// # Endpoint
///
/// ```text
/// GET /api/v1/access/events/{id}
/// ```
pub async fn get_event<P, S, L, B>(
    State(state): State<SharedEventState<P, S, L, B>>,
    Path(event_id): Path<String>,
) -> Result<Json<ApiResponse<EventBody>>, AppError>
where
    P: IdentityProvider + Clone + 'static,
    S: DocumentStore + Clone + 'static,
    L: LocalIdentityRepository + Clone + 'static,
    B: BlobStore + Clone + 'static,
{
    let event = state.catalog.get_event(&event_id).await?;
    Ok(ok(event.record.name.clone(), EventBody { event }))
}

/// Event details on create and update.
#[derive(Debug, Clone, Deserialize)]
pub struct EventRequest {
    /// Event name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Hosting venue. Defaults to the caller's venue on create.
    #[serde(default)]
    pub venue_id: Option<String>,
    /// Start time, RFC 3339.
    pub date: DateTime<Utc>,
    /// Ticket price.
    pub price: f64,
    /// Ticket allocation.
    pub max_tickets: u32,
    /// Featured flag, honoured for site admins only.
    #[serde(default)]
    pub is_featured: bool,
}

impl From<EventRequest> for EventDraft {
    fn from(request: EventRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            venue_id: request.venue_id.as_deref().and_then(VenueId::parse),
            date: request.date,
            price: request.price,
            max_tickets: request.max_tickets,
            is_featured: request.is_featured,
        }
    }
}

/// Create an event. Attach an image afterwards through the image route.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/access/events
/// Authorization: Bearer <id token>
///
/// { "name": "Late Jazz", "date": "2025-06-01T20:00:00Z", "price": 12.5, "max_tickets": 150 }
/// ```
pub async fn create_event<P, S, L, B>(
    State(state): State<SharedEventState<P, S, L, B>>,
    Actor(actor): Actor,
    Json(request): Json<EventRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EventBody>>), AppError>
where
    P: IdentityProvider + Clone + 'static,
    S: DocumentStore + Clone + 'static,
    L: LocalIdentityRepository + Clone + 'static,
    B: BlobStore + Clone + 'static,
{
    let event = state
        .catalog
        .create_event(&actor, request.into(), None)
        .await?;
    Ok((
        StatusCode::CREATED,
        ok(format!("Event '{}' created", event.record.name), EventBody { event }),
    ))
}

/// Replace an event's details.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/access/events/{id}/update
/// ```
pub async fn update_event<P, S, L, B>(
    State(state): State<SharedEventState<P, S, L, B>>,
    Actor(actor): Actor,
    Path(event_id): Path<String>,
    Json(request): Json<EventRequest>,
) -> Result<Json<ApiResponse<EventBody>>, AppError>
where
    P: IdentityProvider + Clone + 'static,
    S: DocumentStore + Clone + 'static,
    L: LocalIdentityRepository + Clone + 'static,
    B: BlobStore + Clone + 'static,
{
    let event = state
        .catalog
        .update_event(&actor, &event_id, request.into(), None)
        .await?;
    Ok(ok(
        format!("Event '{}' updated", event.record.name),
        EventBody { event },
    ))
}

/// Image link body.
#[derive(Debug, Serialize)]
pub struct ImageBody {
    /// Public link of the new image.
    pub image_url: String,
}

/// Upload a new event image. The request body is the raw image.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/access/events/{id}/image
/// Content-Type: image/png
///
/// <bytes>
/// ```
pub async fn replace_image<P, S, L, B>(
    State(state): State<SharedEventState<P, S, L, B>>,
    Actor(actor): Actor,
    Path(event_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiResponse<ImageBody>>, AppError>
where
    P: IdentityProvider + Clone + 'static,
    S: DocumentStore + Clone + 'static,
    L: LocalIdentityRepository + Clone + 'static,
    B: BlobStore + Clone + 'static,
{
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::bad_request("Content-Type header is required"))?;
    let image_url = state
        .catalog
        .replace_event_image(&actor, &event_id, EventImage::new(content_type, body.to_vec()))
        .await?;
    Ok(ok("Event image updated", ImageBody { image_url }))
}

/// Delete an event.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/access/events/{id}/delete
/// ```
pub async fn delete_event<P, S, L, B>(
    State(state): State<SharedEventState<P, S, L, B>>,
    Actor(actor): Actor,
    Path(event_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError>
where
    P: IdentityProvider + Clone + 'static,
    S: DocumentStore + Clone + 'static,
    L: LocalIdentityRepository + Clone + 'static,
    B: BlobStore + Clone + 'static,
{
    state.catalog.delete_event(&actor, &event_id).await?;
    Ok(ok_message("Event deleted"))
}

/// Featured flag body.
#[derive(Debug, Serialize)]
pub struct FeaturedBody {
    /// Flag after the toggle.
    pub featured: bool,
}

/// Flip an event's featured flag (site admins only).
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/access/events/{id}/featured
/// ```
pub async fn toggle_featured<P, S, L, B>(
    State(state): State<SharedEventState<P, S, L, B>>,
    Actor(actor): Actor,
    Path(event_id): Path<String>,
) -> Result<Json<ApiResponse<FeaturedBody>>, AppError>
where
    P: IdentityProvider + Clone + 'static,
    S: DocumentStore + Clone + 'static,
    L: LocalIdentityRepository + Clone + 'static,
    B: BlobStore + Clone + 'static,
{
    let featured = state.catalog.toggle_featured(&actor, &event_id).await?;
    let message = if featured {
        "Event featured"
    } else {
        "Event unfeatured"
    };
    Ok(ok(message, FeaturedBody { featured }))
}
