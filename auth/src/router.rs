//! Access-control router composition.

use crate::constants::MAX_EVENT_IMAGE_BYTES;
use crate::handlers::{
    AccessState, EventState, SharedAccessState, SharedEventState, admins, events, session, venues,
};
use crate::providers::{BlobStore, DocumentStore, IdentityProvider, LocalIdentityRepository};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;

/// Create the access-control router.
///
/// # Routes
///
/// ## Session
/// - `POST /session` - Verify an ID token and reconcile the caller
/// - `GET /me` - The caller's reconciled identity
///
/// ## Admins (site admins only)
/// - `GET /admins` - List with `role`, `search`, `page` filters
/// - `POST /admins` - Create an admin
/// - `POST /admins/update` - Change role, venue or display name
/// - `POST /admins/status` - Activate or deactivate
/// - `POST /admins/delete` - Delete (requires `"confirm": "DELETE"`)
/// - `POST /admins/password-reset` - Generate a reset link
/// - `POST /admins/promote` - Move a user into the admins collection
/// - `POST /admins/demote` - Move an admin back into the users collection
///
/// ## Venues
/// - `GET /venues` - Venues the caller may manage
///
/// # Example
///
/// ```rust,ignore
/// let state = AccessState::new(environment);
///
/// let app = Router::new()
///     .nest("/api/v1/access", access_router(state))
///     .layer(TraceLayer::new_for_http());
/// ```
pub fn access_router<P, S, L>(state: AccessState<P, S, L>) -> Router
where
    P: IdentityProvider + Clone + 'static,
    S: DocumentStore + Clone + 'static,
    L: LocalIdentityRepository + Clone + 'static,
{
    let state: SharedAccessState<P, S, L> = Arc::new(state);

    Router::new()
        // Session routes
        .route("/session", post(session::create_session::<P, S, L>))
        .route("/me", get(session::me))
        // Admin routes
        .route(
            "/admins",
            get(admins::list_admins::<P, S, L>).post(admins::create_admin::<P, S, L>),
        )
        .route("/admins/update", post(admins::update_admin::<P, S, L>))
        .route("/admins/status", post(admins::change_status::<P, S, L>))
        .route("/admins/delete", post(admins::delete_admin::<P, S, L>))
        .route(
            "/admins/password-reset",
            post(admins::password_reset::<P, S, L>),
        )
        .route("/admins/promote", post(admins::promote_user::<P, S, L>))
        .route("/admins/demote", post(admins::demote_admin::<P, S, L>))
        // Venue routes
        .route("/venues", get(venues::list_venues::<P, S, L>))
        .with_state(state)
}

/// Create the event catalog router.
///
/// # Routes
///
/// - `GET /events` - Events the caller manages, with a `search` filter
/// - `POST /events` - Create an event
/// - `GET /events/:id` - Public event detail
/// - `POST /events/:id/update` - Replace an event's details
/// - `POST /events/:id/image` - Upload a new image (raw body)
/// - `POST /events/:id/delete` - Delete an event and its image
/// - `POST /events/:id/featured` - Toggle the featured flag (site admins only)
///
/// Mount it next to the access router:
///
/// ```rust,ignore
/// let api = access_router(AccessState::new(env.clone()))
///     .merge(event_router(EventState::new(env, blobs)));
/// ```
pub fn event_router<P, S, L, B>(state: EventState<P, S, L, B>) -> Router
where
    P: IdentityProvider + Clone + 'static,
    S: DocumentStore + Clone + 'static,
    L: LocalIdentityRepository + Clone + 'static,
    B: BlobStore + Clone + 'static,
{
    let state: SharedEventState<P, S, L, B> = Arc::new(state);

    Router::new()
        .route(
            "/events",
            get(events::list_events::<P, S, L, B>).post(events::create_event::<P, S, L, B>),
        )
        .route("/events/:id", get(events::get_event::<P, S, L, B>))
        .route("/events/:id/update", post(events::update_event::<P, S, L, B>))
        .route(
            "/events/:id/image",
            post(events::replace_image::<P, S, L, B>)
                .layer(DefaultBodyLimit::max(MAX_EVENT_IMAGE_BYTES + 1)),
        )
        .route("/events/:id/delete", post(events::delete_event::<P, S, L, B>))
        .route("/events/:id/featured", post(events::toggle_featured::<P, S, L, B>))
        .with_state(state)
}
