//! Venue-scoped event catalog.
//!
//! Venue admins and sub admins manage the events of their own venue. Site
//! admins manage every venue and are the only ones who decide which events
//! are featured. Event images live in a [`BlobStore`]; the event document
//! keeps the public link.
//!
//! A failed document write removes the image uploaded for it, and an image
//! replaced by a successful write is removed afterwards. Image removal is
//! best effort: a leftover object is logged, never surfaced.

use crate::constants::{
    EVENT_IMAGE_PREFIX, MAX_EVENT_DESCRIPTION_LENGTH, MAX_EVENT_IMAGE_BYTES, MAX_EVENT_NAME_LENGTH,
};
use crate::directory::Directory;
use crate::environment::Clock;
use crate::error::{AuthError, Result};
use crate::policy::{Permission, allows, is_site_admin, require};
use crate::providers::{BlobStore, Document, DocumentStore, EventRecord, Venue};
use crate::state::{LocalIdentity, VenueId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;

/// Event details supplied on create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    /// Event name, 1 to 200 characters after trimming.
    pub name: String,

    /// Description, at most 500 characters.
    pub description: String,

    /// Hosting venue.
    ///
    /// On create, defaults to the actor's own venue. On update, `None`
    /// keeps the event where it is.
    pub venue_id: Option<VenueId>,

    /// Start time. Must be in the future.
    pub date: DateTime<Utc>,

    /// Ticket price, zero or more.
    pub price: f64,

    /// Ticket allocation, at least one.
    pub max_tickets: u32,

    /// Requested featured flag. Ignored unless the actor may feature events.
    pub is_featured: bool,
}

/// Image uploaded with an event.
#[derive(Clone, PartialEq, Eq)]
pub struct EventImage {
    /// MIME type as sent by the client.
    pub content_type: String,

    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

impl EventImage {
    /// Wrap uploaded bytes.
    #[must_use]
    pub fn new(content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Object file extension for the image.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEvent` for empty or oversized uploads and
    /// for content types other than JPEG, PNG, WebP and GIF.
    pub fn extension(&self) -> Result<&'static str> {
        if self.bytes.is_empty() {
            return Err(AuthError::invalid_event("image is empty"));
        }
        if self.bytes.len() > MAX_EVENT_IMAGE_BYTES {
            return Err(AuthError::invalid_event(format!(
                "image is larger than {} MB",
                MAX_EVENT_IMAGE_BYTES / (1024 * 1024)
            )));
        }
        let essence = self
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" => Ok("jpg"),
            "image/png" => Ok("png"),
            "image/webp" => Ok("webp"),
            "image/gif" => Ok("gif"),
            other => Err(AuthError::invalid_event(format!(
                "unsupported image type '{other}'"
            ))),
        }
    }
}

impl std::fmt::Debug for EventImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventImage")
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// An event with its id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventEntry {
    /// Event id.
    pub id: String,

    /// Stored event.
    #[serde(flatten)]
    pub record: EventRecord,

    /// Every ticket sold.
    pub sold_out: bool,
}

impl EventEntry {
    fn new(id: String, record: EventRecord) -> Self {
        Self {
            sold_out: record.is_sold_out(),
            id,
            record,
        }
    }
}

/// Counts over a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventStats {
    /// Events listed.
    pub total: usize,
    /// Featured events listed.
    pub featured: usize,
    /// Sold-out events listed.
    pub sold_out: usize,
}

/// Events visible to an actor.
#[derive(Debug, Clone, Serialize)]
pub struct EventListing {
    /// Events by date, undated ones last.
    pub events: Vec<EventEntry>,

    /// Counts over `events`.
    pub stats: EventStats,
}

/// Event catalog over the `events` collection and the image store.
#[derive(Clone)]
pub struct EventCatalog<S, B>
where
    S: DocumentStore + Clone,
    B: BlobStore + Clone,
{
    directory: Directory<S>,
    blobs: B,
    clock: Arc<dyn Clock>,
}

impl<S, B> EventCatalog<S, B>
where
    S: DocumentStore + Clone,
    B: BlobStore + Clone,
{
    /// Create a catalog.
    #[must_use]
    pub fn new(directory: Directory<S>, blobs: B, clock: Arc<dyn Clock>) -> Self {
        Self {
            directory,
            blobs,
            clock,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Read
    // ═══════════════════════════════════════════════════════════════════

    /// Events the actor manages, optionally filtered by a case-insensitive
    /// search over name, venue and description.
    ///
    /// Site admins see every event. Venue admins and sub admins see their
    /// own venue's events, or none when they have no venue.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The actor has no dashboard access → `AuthError::PermissionDenied`
    /// - The store fails
    pub async fn list_events(&self, actor: &LocalIdentity, search: Option<&str>) -> Result<EventListing> {
        let result = async {
            require(actor, &Permission::VenueDashboard)?;
            let events = if is_site_admin(actor) {
                self.directory.list_events().await?
            } else if let Some(venue_id) = &actor.venue_id {
                self.directory.events_by_venue(venue_id).await?
            } else {
                tracing::warn!(email = %actor.email, "No venue assigned, listing no events");
                Vec::new()
            };
            Ok::<_, AuthError>(listing(events, search))
        }
        .await;
        audit("list_events", &actor.email, result)
    }

    /// One event, for public display.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No such event → `AuthError::NotFound`
    /// - The store fails
    pub async fn get_event(&self, event_id: &str) -> Result<EventEntry> {
        let record = self.existing_event(event_id).await?;
        Ok(EventEntry::new(event_id.to_string(), record))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Create
    // ═══════════════════════════════════════════════════════════════════

    /// Create an event at the draft's venue, or the actor's own venue.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The actor has no dashboard access, or does not manage the venue → `AuthError::PermissionDenied`
    /// - The draft or image is invalid → `AuthError::InvalidEvent`
    /// - No venue was given and the actor has none → `AuthError::MissingVenue`
    /// - The venue is not in the catalog → `AuthError::UnknownVenue`
    /// - The image store or the directory fails
    pub async fn create_event(
        &self,
        actor: &LocalIdentity,
        draft: EventDraft,
        image: Option<EventImage>,
    ) -> Result<EventEntry> {
        let target = draft.name.clone();
        audit("create_event", &target, self.try_create_event(actor, draft, image).await)
    }

    async fn try_create_event(
        &self,
        actor: &LocalIdentity,
        draft: EventDraft,
        image: Option<EventImage>,
    ) -> Result<EventEntry> {
        require(actor, &Permission::VenueDashboard)?;
        let now = self.clock.now();
        let (name, description) = validate_draft(&draft, now)?;

        let venue_id = draft
            .venue_id
            .or_else(|| actor.venue_id.clone())
            .ok_or_else(|| AuthError::MissingVenue {
                role: actor.role.to_string(),
            })?;
        require(actor, &Permission::ManageVenue(venue_id.to_string()))?;
        let venue = self.venue(&venue_id).await?;
        if let Some(image) = &image {
            image.extension()?;
        }

        let event_id = Uuid::new_v4().to_string();
        let image_url = match image {
            Some(image) => Some(self.upload_image(&event_id, image).await?),
            None => None,
        };

        let record = EventRecord {
            name,
            description,
            venue: venue.name,
            venue_id: Some(venue_id),
            date: Some(draft.date),
            price: draft.price,
            max_tickets: draft.max_tickets,
            tickets_sold: 0,
            is_featured: featured_flag(actor, draft.is_featured),
            image_url,
            created_at: Some(now),
            created_by: Some(actor.email.clone()),
            updated_at: Some(now),
        };

        if let Err(e) = self.directory.set_event(&event_id, &record).await {
            tracing::error!(event_id = %event_id, error = %e, "Event write failed, removing uploaded image");
            if let Some(url) = record.image() {
                self.discard_image(url).await;
            }
            return Err(e);
        }

        tracing::info!(
            event_id = %event_id,
            venue_id = %venue_id_of(&record),
            created_by = %actor.email,
            "Created event"
        );
        Ok(EventEntry::new(event_id, record))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Update
    // ═══════════════════════════════════════════════════════════════════

    /// Replace an event's details, and optionally its image.
    ///
    /// Moving the event requires managing both venues. Tickets sold and
    /// fields this catalog does not model are left untouched.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No such event → `AuthError::NotFound`
    /// - The actor does not manage the event's venue, or the new venue → `AuthError::PermissionDenied`
    /// - The draft or image is invalid → `AuthError::InvalidEvent`
    /// - The new venue is not in the catalog → `AuthError::UnknownVenue`
    /// - The image store or the directory fails
    pub async fn update_event(
        &self,
        actor: &LocalIdentity,
        event_id: &str,
        draft: EventDraft,
        image: Option<EventImage>,
    ) -> Result<EventEntry> {
        audit(
            "update_event",
            event_id,
            self.try_update_event(actor, event_id, draft, image).await,
        )
    }

    async fn try_update_event(
        &self,
        actor: &LocalIdentity,
        event_id: &str,
        draft: EventDraft,
        image: Option<EventImage>,
    ) -> Result<EventEntry> {
        require(actor, &Permission::VenueDashboard)?;
        let mut record = self.existing_event(event_id).await?;
        require_event_venue(actor, &record)?;

        let now = self.clock.now();
        let (name, description) = validate_draft(&draft, now)?;
        let mut fields = document(json!({
            "name": name,
            "description": description,
            "date": draft.date,
            "price": draft.price,
            "maxTickets": draft.max_tickets,
            "updatedAt": now,
        }));

        if let Some(venue_id) = draft.venue_id.filter(|v| record.venue_id.as_ref() != Some(v)) {
            require(actor, &Permission::ManageVenue(venue_id.to_string()))?;
            let venue = self.venue(&venue_id).await?;
            tracing::info!(event_id, from = %venue_id_of(&record), to = %venue_id, "Moving event");
            fields.insert("venueId".into(), json!(venue_id));
            fields.insert("venue".into(), json!(venue.name));
            record.venue_id = Some(venue_id);
            record.venue = venue.name;
        }
        if allows(actor, &Permission::FeatureEvents) {
            fields.insert("isFeatured".into(), json!(draft.is_featured));
            record.is_featured = draft.is_featured;
        }

        if let Some(image) = &image {
            image.extension()?;
        }
        let previous_image = record.image().map(str::to_string);
        let new_image = match image {
            Some(image) => Some(self.upload_image(event_id, image).await?),
            None => None,
        };
        if let Some(url) = &new_image {
            fields.insert("imageUrl".into(), json!(url));
        }

        self.write_with_image(event_id, &fields, new_image.as_deref(), previous_image.as_deref())
            .await?;

        record.name = name;
        record.description = description;
        record.date = Some(draft.date);
        record.price = draft.price;
        record.max_tickets = draft.max_tickets;
        record.updated_at = Some(now);
        if new_image.is_some() {
            record.image_url = new_image;
        }

        tracing::info!(event_id, updated_by = %actor.email, "Updated event");
        Ok(EventEntry::new(event_id.to_string(), record))
    }

    /// Replace an event's image and return the new public link.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No such event → `AuthError::NotFound`
    /// - The actor does not manage the event's venue → `AuthError::PermissionDenied`
    /// - The image is invalid → `AuthError::InvalidEvent`
    /// - The image store or the directory fails
    pub async fn replace_event_image(
        &self,
        actor: &LocalIdentity,
        event_id: &str,
        image: EventImage,
    ) -> Result<String> {
        let result = async {
            require(actor, &Permission::VenueDashboard)?;
            let record = self.existing_event(event_id).await?;
            require_event_venue(actor, &record)?;

            let url = self.upload_image(event_id, image).await?;
            let fields = document(json!({ "imageUrl": url, "updatedAt": self.clock.now() }));
            self.write_with_image(event_id, &fields, Some(&url), record.image())
                .await?;

            tracing::info!(event_id, updated_by = %actor.email, "Replaced event image");
            Ok::<_, AuthError>(url)
        }
        .await;
        audit("replace_event_image", event_id, result)
    }

    /// Flip an event's featured flag and return the new value.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The actor is not a site admin → `AuthError::PermissionDenied`
    /// - No such event → `AuthError::NotFound`
    /// - The store fails
    pub async fn toggle_featured(&self, actor: &LocalIdentity, event_id: &str) -> Result<bool> {
        let result = async {
            require(actor, &Permission::FeatureEvents)?;
            let record = self.existing_event(event_id).await?;
            let featured = !record.is_featured;
            let fields = document(json!({ "isFeatured": featured, "updatedAt": self.clock.now() }));
            self.directory.update_event(event_id, &fields).await?;

            tracing::info!(event_id, featured, updated_by = %actor.email, "Toggled featured event");
            Ok::<_, AuthError>(featured)
        }
        .await;
        audit("toggle_featured", event_id, result)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Delete
    // ═══════════════════════════════════════════════════════════════════

    /// Delete an event and, best effort, its image.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No such event → `AuthError::NotFound`
    /// - The actor does not manage the event's venue → `AuthError::PermissionDenied`
    /// - The store fails
    pub async fn delete_event(&self, actor: &LocalIdentity, event_id: &str) -> Result<()> {
        let result = async {
            require(actor, &Permission::VenueDashboard)?;
            let record = self.existing_event(event_id).await?;
            require_event_venue(actor, &record)?;

            self.directory.delete_event(event_id).await?;
            if let Some(url) = record.image() {
                self.discard_image(url).await;
            }

            tracing::info!(event_id, deleted_by = %actor.email, "Deleted event");
            Ok::<_, AuthError>(())
        }
        .await;
        audit("delete_event", event_id, result)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Helpers
    // ═══════════════════════════════════════════════════════════════════

    async fn existing_event(&self, event_id: &str) -> Result<EventRecord> {
        self.directory
            .get_event(event_id)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("event {event_id}")))
    }

    async fn venue(&self, venue_id: &VenueId) -> Result<Venue> {
        self.directory
            .get_venue(venue_id.as_str())
            .await?
            .ok_or_else(|| AuthError::UnknownVenue {
                venue_id: venue_id.to_string(),
            })
    }

    async fn upload_image(&self, event_id: &str, image: EventImage) -> Result<String> {
        let extension = image.extension()?;
        let path = format!("{EVENT_IMAGE_PREFIX}/{event_id}/{}.{extension}", Uuid::new_v4());
        self.blobs
            .upload(&path, image.bytes, &image.content_type)
            .await
    }

    /// Merge `fields`, then drop whichever image lost: the new one when the
    /// write failed, the previous one when it succeeded.
    async fn write_with_image(
        &self,
        event_id: &str,
        fields: &Document,
        new_image: Option<&str>,
        previous_image: Option<&str>,
    ) -> Result<()> {
        if let Err(e) = self.directory.update_event(event_id, fields).await {
            if let Some(url) = new_image {
                tracing::error!(event_id, error = %e, "Event write failed, removing uploaded image");
                self.discard_image(url).await;
            }
            return Err(e);
        }
        if let (Some(_), Some(old)) = (new_image, previous_image) {
            self.discard_image(old).await;
        }
        Ok(())
    }

    async fn discard_image(&self, url: &str) {
        if let Err(e) = self.blobs.delete(url).await {
            tracing::warn!(url, error = %e, "Could not delete event image");
        }
    }
}

fn validate_draft(draft: &EventDraft, now: DateTime<Utc>) -> Result<(String, String)> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(AuthError::invalid_event("name is required"));
    }
    if name.chars().count() > MAX_EVENT_NAME_LENGTH {
        return Err(AuthError::invalid_event(format!(
            "name must be at most {MAX_EVENT_NAME_LENGTH} characters"
        )));
    }
    let description = draft.description.trim();
    if description.chars().count() > MAX_EVENT_DESCRIPTION_LENGTH {
        return Err(AuthError::invalid_event(format!(
            "description must be at most {MAX_EVENT_DESCRIPTION_LENGTH} characters"
        )));
    }
    if !draft.price.is_finite() || draft.price < 0.0 {
        return Err(AuthError::invalid_event("price must be zero or more"));
    }
    if draft.max_tickets == 0 {
        return Err(AuthError::invalid_event("at least one ticket is required"));
    }
    if draft.date <= now {
        return Err(AuthError::invalid_event("date must be in the future"));
    }
    Ok((name.to_string(), description.to_string()))
}

fn featured_flag(actor: &LocalIdentity, requested: bool) -> bool {
    if requested && !allows(actor, &Permission::FeatureEvents) {
        tracing::debug!(email = %actor.email, "Ignoring featured flag from non site admin");
        return false;
    }
    requested
}

fn require_event_venue(actor: &LocalIdentity, record: &EventRecord) -> Result<()> {
    require(actor, &Permission::ManageVenue(venue_id_of(record).to_string()))
}

fn venue_id_of(record: &EventRecord) -> &str {
    record.venue_id.as_ref().map_or("", VenueId::as_str)
}

fn listing(events: Vec<(String, EventRecord)>, search: Option<&str>) -> EventListing {
    let needle = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    let mut events: Vec<EventEntry> = events
        .into_iter()
        .filter(|(_, record)| {
            needle.as_deref().is_none_or(|needle| {
                record.name.to_lowercase().contains(needle)
                    || record.venue.to_lowercase().contains(needle)
                    || record.description.to_lowercase().contains(needle)
            })
        })
        .map(|(id, record)| EventEntry::new(id, record))
        .collect();
    events.sort_by(|a, b| {
        (a.record.date.is_none(), a.record.date, &a.record.name)
            .cmp(&(b.record.date.is_none(), b.record.date, &b.record.name))
    });

    let stats = EventStats {
        total: events.len(),
        featured: events.iter().filter(|e| e.record.is_featured).count(),
        sold_out: events.iter().filter(|e| e.sold_out).count(),
    };
    EventListing { events, stats }
}

fn document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}

/// Log a failed catalog operation with its target.
fn audit<T>(operation: &'static str, target: &str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        if e.is_user_error() || matches!(e, AuthError::NotFound(_)) {
            tracing::warn!(operation, target, error = %e, "Event operation rejected");
        } else if e.is_security_issue() {
            tracing::warn!(operation, target, error = %e, security = true, "Event operation denied");
        } else {
            tracing::error!(operation, target, error = %e, "Event operation failed");
        }
    }
    result
}
