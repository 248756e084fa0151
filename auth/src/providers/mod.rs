//! Access-control providers.
//!
//! Traits for every external collaborator, plus the document models they
//! exchange. The reconciler and lifecycle manager depend only on these
//! traits; the application injects concrete implementations.
//!
//! ```text
//! ┌──────────────────────┐   verify / accounts   ┌──────────────────────┐
//! │ IdentityReconciler   │──────────────────────▶│ IdentityProvider     │
//! │ AdminLifecycleManager│                       └──────────────────────┘
//! │                      │   admins/users/venues ┌──────────────────────┐
//! │                      │──────────────────────▶│ DocumentStore        │
//! │                      │                       └──────────────────────┘
//! │                      │   local identities    ┌──────────────────────┐
//! │                      │──────────────────────▶│ LocalIdentityRepo    │
//! └──────────────────────┘                       └──────────────────────┘
//!
//! EventCatalog ── event images ──▶ BlobStore
//! ```

use crate::constants::DEFAULT_PROVIDER;
use crate::state::{AdminState, Role, SubjectId, VenueId, lenient_role, venue_field};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

pub mod blob_store;
pub mod cloud_storage;
pub mod document_store;
pub mod identity;
pub mod identity_toolkit;
pub mod local_identity;

pub use blob_store::BlobStore;
pub use cloud_storage::{CloudStorageBlobStore, CloudStorageConfig};
pub use document_store::DocumentStore;
pub use identity::IdentityProvider;
pub use identity_toolkit::{IdentityToolkitConfig, IdentityToolkitProvider};
pub use local_identity::LocalIdentityRepository;

/// Raw directory document.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// A document together with its id, as returned by collection scans.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Document id within its collection.
    pub id: String,

    /// Document fields.
    pub data: Document,
}

// ═══════════════════════════════════════════════════════════════════════
// Directory records
// ═══════════════════════════════════════════════════════════════════════

fn default_true() -> bool {
    true
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

/// Admin record stored in `admins/{subject}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRecord {
    /// Admin email.
    #[serde(default)]
    pub email: String,

    /// Display name. May be empty.
    #[serde(default)]
    pub display_name: String,

    /// Admin role.
    #[serde(default, deserialize_with = "lenient_role")]
    pub role: Role,

    /// Venue scope. Stored as `""` when absent.
    #[serde(default, with = "venue_field")]
    pub venue_id: Option<VenueId>,

    /// Record-level active flag.
    #[serde(default = "default_true")]
    pub is_active: bool,

    /// Mirror of the identity account's disabled flag.
    #[serde(default)]
    pub disabled: bool,

    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Email of the admin that created this record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    /// Sign-in provider.
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Last role update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Whether the admin has verified their email. Written `false` at creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,

    /// Whether the admin has chosen their own password. Written `false` at creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_set: Option<bool>,
}

impl AdminRecord {
    /// Lifecycle state implied by the record's flags.
    #[must_use]
    pub const fn state(&self) -> AdminState {
        if self.is_active && !self.disabled {
            AdminState::Active
        } else {
            AdminState::Deactivated
        }
    }
}

/// Regular user record stored in `users/{subject}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// User email.
    #[serde(default)]
    pub email: String,

    /// Display name. May be empty.
    #[serde(default)]
    pub display_name: String,

    /// Role (`user` when absent).
    #[serde(default, deserialize_with = "lenient_role")]
    pub role: Role,

    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn email_keys<'de, D>(deserializer: D) -> std::result::Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let map: Option<serde_json::Map<String, serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(map.map(|m| m.into_iter().map(|(k, _)| k).collect()).unwrap_or_default())
}

/// Venue catalog entry stored in `venues/{id}`. Read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    /// Venue id (the document id).
    #[serde(default)]
    pub id: String,

    /// Venue name.
    #[serde(default)]
    pub name: String,

    /// City.
    #[serde(default)]
    pub city: String,

    /// Emails listed as venue admins.
    #[serde(default, rename = "admins", deserialize_with = "email_keys")]
    pub admin_emails: BTreeSet<String>,

    /// Emails listed as sub admins.
    #[serde(default, rename = "subAdmins", deserialize_with = "email_keys")]
    pub sub_admin_emails: BTreeSet<String>,
}

// ═══════════════════════════════════════════════════════════════════════
// Events
// ═══════════════════════════════════════════════════════════════════════

/// Event stored in `events/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Event name.
    #[serde(default)]
    pub name: String,

    /// Short description. May be empty.
    #[serde(default)]
    pub description: String,

    /// Venue name, copied from the catalog when the venue is set.
    #[serde(default)]
    pub venue: String,

    /// Hosting venue.
    #[serde(default, with = "venue_field")]
    pub venue_id: Option<VenueId>,

    /// Start time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,

    /// Ticket price.
    #[serde(default)]
    pub price: f64,

    /// Ticket allocation.
    #[serde(default)]
    pub max_tickets: u32,

    /// Tickets sold so far. Owned by the ticketing flow.
    #[serde(default)]
    pub tickets_sold: u32,

    /// Shown on the featured rail.
    #[serde(default)]
    pub is_featured: bool,

    /// Public image link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Email of the admin that created the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    /// Last change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl EventRecord {
    /// Whether every ticket has been sold.
    #[must_use]
    pub const fn is_sold_out(&self) -> bool {
        self.tickets_sold >= self.max_tickets
    }

    /// Image link, treating a blank one as absent.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|url| !url.trim().is_empty())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Identity provider accounts
// ═══════════════════════════════════════════════════════════════════════

/// Account held by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityAccount {
    /// Provider subject id.
    pub subject_id: SubjectId,

    /// Account email.
    pub email: String,

    /// Display name, if set.
    pub display_name: Option<String>,

    /// Whether sign-in is disabled.
    pub disabled: bool,

    /// Whether the email has been verified.
    pub email_verified: bool,
}

/// Parameters for creating an identity provider account.
#[derive(Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Account email.
    pub email: String,

    /// Display name.
    pub display_name: String,

    /// Initial password. `None` leaves the account without one until the
    /// password-setup link is used.
    pub password: Option<String>,

    /// Initial verification flag.
    pub email_verified: bool,

    /// Initial disabled flag.
    pub disabled: bool,
}

impl NewAccount {
    /// New enabled, unverified account.
    #[must_use]
    pub fn new(email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            display_name: display_name.into(),
            password: None,
            email_verified: false,
            disabled: false,
        }
    }

    /// Set the initial password.
    #[must_use]
    pub fn with_password(mut self, password: Option<String>) -> Self {
        self.password = password;
        self
    }
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("email_verified", &self.email_verified)
            .field("disabled", &self.disabled)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_admin_record_lenient_decoding() {
        let record: AdminRecord = serde_json::from_value(json!({
            "email": "a@x.com",
            "role": "superuser",
            "venueId": ""
        }))
        .unwrap();

        assert_eq!(record.role, Role::User);
        assert_eq!(record.venue_id, None);
        assert!(record.is_active);
        assert!(!record.disabled);
        assert_eq!(record.provider, "password");
        assert_eq!(record.state(), AdminState::Active);
    }

    #[test]
    fn test_admin_record_writes_camel_case() {
        let record: AdminRecord = serde_json::from_value(json!({
            "email": "a@x.com",
            "displayName": "Ann",
            "role": "venueAdmin",
            "venueId": "v1",
            "isActive": false
        }))
        .unwrap();
        assert_eq!(record.state(), AdminState::Deactivated);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["venueId"], "v1");
        assert_eq!(value["isActive"], false);
        assert_eq!(value["displayName"], "Ann");
        assert!(value.get("updatedAt").is_none());
        assert!(value.get("emailVerified").is_none());
    }

    #[test]
    fn test_missing_venue_serializes_empty() {
        let record: AdminRecord =
            serde_json::from_value(json!({ "email": "s@x.com", "role": "siteAdmin" })).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["venueId"], "");
    }

    #[test]
    fn test_venue_email_maps() {
        let venue: Venue = serde_json::from_value(json!({
            "id": "v1",
            "name": "Hall",
            "city": "Leeds",
            "admins": { "a@x.com": true },
            "subAdmins": { "b@x.com": true }
        }))
        .unwrap();
        assert!(venue.admin_emails.contains("a@x.com"));
        assert!(venue.sub_admin_emails.contains("b@x.com"));
        assert!(!venue.admin_emails.contains("b@x.com"));
    }

    #[test]
    fn test_event_record_reads_legacy_fields() {
        let event: EventRecord = serde_json::from_value(json!({
            "name": "Gig",
            "venue": "Hall",
            "venueId": "v1",
            "price": 12.5,
            "maxTickets": 100,
            "ticketsSold": 100,
            "imageUrl": ""
        }))
        .unwrap();

        assert_eq!(event.venue_id.as_ref().map(VenueId::as_str), Some("v1"));
        assert!(event.is_sold_out());
        assert!(!event.is_featured);
        assert_eq!(event.image(), None);
    }

    #[test]
    fn test_new_account_debug_hides_password() {
        let account = NewAccount::new("a@x.com", "a").with_password(Some("hunter22".into()));
        assert!(!format!("{account:?}").contains("hunter22"));
    }
}
