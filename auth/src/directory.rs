//! Typed view over the shared directory collections.

use crate::constants::collections::{ADMINS, EVENTS, USERS, VENUES};
use crate::error::{AuthError, Result};
use crate::providers::{
    AdminRecord, Document, DocumentStore, EventRecord, IdentityProvider, StoredDocument,
    UserRecord, Venue,
};
use crate::state::{SubjectId, VenueId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Typed access to the `admins`, `users`, `venues` and `events` collections.
#[derive(Debug, Clone)]
pub struct Directory<S> {
    store: S,
}

impl<S: DocumentStore> Directory<S> {
    /// Wrap a document store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    // ═══════════════════════════════════════════════════════════════════
    // Admins
    // ═══════════════════════════════════════════════════════════════════

    /// Fetch `admins/{subject}`.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable or the document is malformed.
    pub async fn get_admin(&self, subject_id: &SubjectId) -> Result<Option<AdminRecord>> {
        self.get(ADMINS, subject_id.as_str()).await
    }

    /// Write `admins/{subject}`, replacing any existing record.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    pub async fn set_admin(&self, subject_id: &SubjectId, record: &AdminRecord) -> Result<()> {
        self.set(ADMINS, subject_id.as_str(), record).await
    }

    /// Merge fields into `admins/{subject}`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No record exists → `AuthError::NotFound`
    /// - The store is unreachable → `AuthError::StoreUnavailable`
    pub async fn update_admin(&self, subject_id: &SubjectId, fields: &Document) -> Result<()> {
        self.store
            .update(ADMINS, subject_id.as_str(), fields)
            .await
    }

    /// Delete `admins/{subject}`.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    pub async fn delete_admin(&self, subject_id: &SubjectId) -> Result<()> {
        self.store.delete(ADMINS, subject_id.as_str()).await
    }

    /// All admin records with their subject ids.
    ///
    /// Documents that fail to decode are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    pub async fn list_admins(&self) -> Result<Vec<(String, AdminRecord)>> {
        let docs = self.store.stream_all(ADMINS).await?;
        Ok(decode_all(ADMINS, docs))
    }

    /// First admin record whose email matches, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    pub async fn find_admin_by_email(&self, email: &str) -> Result<Option<(String, AdminRecord)>> {
        Ok(self
            .list_admins()
            .await?
            .into_iter()
            .find(|(_, record)| record.email.trim().eq_ignore_ascii_case(email.trim())))
    }

    /// Raw `admins/{subject}` document, including fields the typed record
    /// does not model.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    pub async fn admin_snapshot(&self, subject_id: &SubjectId) -> Result<Option<Document>> {
        self.store.get(ADMINS, subject_id.as_str()).await
    }

    /// Write a raw snapshot back to `admins/{subject}`.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    pub async fn restore_admin(&self, subject_id: &SubjectId, snapshot: &Document) -> Result<()> {
        self.store.set(ADMINS, subject_id.as_str(), snapshot).await
    }

    /// Admin record of the provider account that uses `email`.
    ///
    /// Resolves the subject through the identity provider, then reads
    /// `admins/{subject}`.
    ///
    /// # Errors
    ///
    /// Returns error if the provider or the store is unreachable.
    pub async fn get_admin_by_email<P: IdentityProvider>(
        &self,
        provider: &P,
        email: &str,
    ) -> Result<Option<(SubjectId, AdminRecord)>> {
        let Some(account) = provider.get_account_by_email(email).await? else {
            return Ok(None);
        };
        Ok(self
            .get_admin(&account.subject_id)
            .await?
            .map(|record| (account.subject_id, record)))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Users
    // ═══════════════════════════════════════════════════════════════════

    /// Fetch `users/{subject}`.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable or the document is malformed.
    pub async fn get_user(&self, subject_id: &SubjectId) -> Result<Option<UserRecord>> {
        self.get(USERS, subject_id.as_str()).await
    }

    /// Write `users/{subject}`, replacing any existing record.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    pub async fn set_user(&self, subject_id: &SubjectId, record: &UserRecord) -> Result<()> {
        self.set(USERS, subject_id.as_str(), record).await
    }

    /// Delete `users/{subject}`.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    pub async fn delete_user(&self, subject_id: &SubjectId) -> Result<()> {
        self.store.delete(USERS, subject_id.as_str()).await
    }

    /// First user record whose email matches, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<(String, UserRecord)>> {
        let docs = self.store.stream_all(USERS).await?;
        Ok(decode_all::<UserRecord>(USERS, docs)
            .into_iter()
            .find(|(_, record)| record.email.trim().eq_ignore_ascii_case(email.trim())))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Venues
    // ═══════════════════════════════════════════════════════════════════

    /// Fetch `venues/{id}`.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable or the document is malformed.
    pub async fn get_venue(&self, venue_id: &str) -> Result<Option<Venue>> {
        let Some(data) = self.store.get(VENUES, venue_id).await? else {
            return Ok(None);
        };
        let mut venue: Venue = serde_json::from_value(Value::Object(data))?;
        venue.id = venue_id.to_string();
        Ok(Some(venue))
    }

    /// All venues, sorted case-insensitively by name.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    pub async fn list_venues(&self) -> Result<Vec<Venue>> {
        let docs = self.store.stream_all(VENUES).await?;
        let mut venues: Vec<Venue> = decode_all(VENUES, docs)
            .into_iter()
            .map(|(id, mut venue): (String, Venue)| {
                venue.id = id;
                venue
            })
            .collect();
        venues.sort_by_key(|v| v.name.to_lowercase());
        Ok(venues)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Events
    // ═══════════════════════════════════════════════════════════════════

    /// Fetch `events/{id}`.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable or the document is malformed.
    pub async fn get_event(&self, event_id: &str) -> Result<Option<EventRecord>> {
        self.get(EVENTS, event_id).await
    }

    /// Write `events/{id}`, replacing any existing document.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    pub async fn set_event(&self, event_id: &str, record: &EventRecord) -> Result<()> {
        self.set(EVENTS, event_id, record).await
    }

    /// Merge fields into `events/{id}`. Fields not named are kept.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No event exists → `AuthError::NotFound`
    /// - The store is unreachable → `AuthError::StoreUnavailable`
    pub async fn update_event(&self, event_id: &str, fields: &Document) -> Result<()> {
        self.store.update(EVENTS, event_id, fields).await
    }

    /// Delete `events/{id}`.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    pub async fn delete_event(&self, event_id: &str) -> Result<()> {
        self.store.delete(EVENTS, event_id).await
    }

    /// Every event with its id.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    pub async fn list_events(&self) -> Result<Vec<(String, EventRecord)>> {
        let docs = self.store.stream_all(EVENTS).await?;
        Ok(decode_all(EVENTS, docs))
    }

    /// Events held at one venue.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    pub async fn events_by_venue(&self, venue_id: &VenueId) -> Result<Vec<(String, EventRecord)>> {
        let docs = self
            .store
            .query_by_field(EVENTS, "venueId", &Value::String(venue_id.to_string()))
            .await?;
        Ok(decode_all(EVENTS, docs))
    }

    async fn get<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<Option<T>> {
        self.store
            .get(collection, id)
            .await?
            .map(|data| serde_json::from_value(Value::Object(data)).map_err(AuthError::from))
            .transpose()
    }

    async fn set<T: Serialize + Sync>(&self, collection: &str, id: &str, record: &T) -> Result<()> {
        let Value::Object(data) = serde_json::to_value(record)? else {
            return Err(AuthError::Serialization(format!(
                "{collection} record is not an object"
            )));
        };
        self.store.set(collection, id, &data).await
    }
}

fn decode_all<T: DeserializeOwned>(collection: &str, docs: Vec<StoredDocument>) -> Vec<(String, T)> {
    docs.into_iter()
        .filter_map(|doc| match serde_json::from_value(Value::Object(doc.data)) {
            Ok(record) => Some((doc.id, record)),
            Err(e) => {
                tracing::warn!(collection, id = %doc.id, error = %e, "Skipping malformed document");
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::{IdentityOp, MockDocumentStore, MockIdentityProvider};
    use crate::providers::IdentityAccount;
    use crate::state::Role;
    use serde_json::json;

    fn account(subject: &str, email: &str) -> IdentityAccount {
        IdentityAccount {
            subject_id: SubjectId::new(subject).unwrap(),
            email: email.to_string(),
            display_name: None,
            disabled: false,
            email_verified: true,
        }
    }

    fn directory() -> (Directory<MockDocumentStore>, MockDocumentStore) {
        let store = MockDocumentStore::new();
        (Directory::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_admin_by_email_resolves_through_provider() {
        let (directory, store) = directory();
        let provider = MockIdentityProvider::new();
        provider.add_account(account("abc", "ann@x.com"));
        store.insert(
            ADMINS,
            "abc",
            json!({ "email": "ann@x.com", "role": "venueAdmin", "venueId": "v1" }),
        );

        let (subject, record) = directory
            .get_admin_by_email(&provider, "Ann@X.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(subject.as_str(), "abc");
        assert_eq!(record.role, Role::VenueAdmin);
    }

    #[tokio::test]
    async fn test_admin_by_email_without_account() {
        let (directory, store) = directory();
        store.insert(ADMINS, "abc", json!({ "email": "ann@x.com" }));

        let found = directory
            .get_admin_by_email(&MockIdentityProvider::new(), "ann@x.com")
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_admin_by_email_account_without_record() {
        let (directory, _) = directory();
        let provider = MockIdentityProvider::new();
        provider.add_account(account("u1", "fan@x.com"));

        assert!(
            directory
                .get_admin_by_email(&provider, "fan@x.com")
                .await
                .unwrap()
                .is_none()
        );

        provider.fail_on(IdentityOp::LookupEmail);
        assert!(matches!(
            directory.get_admin_by_email(&provider, "fan@x.com").await,
            Err(AuthError::IdentityProvider(_))
        ));
    }

    #[tokio::test]
    async fn test_find_by_email_ignores_case() {
        let (directory, store) = directory();
        store.insert(ADMINS, "a1", json!({ "email": "Bob@X.com", "role": "subAdmin" }));
        store.insert(USERS, "u1", json!({ "email": "Ann@X.com" }));

        let (id, _) = directory.find_admin_by_email("bob@x.com").await.unwrap().unwrap();
        assert_eq!(id, "a1");
        let (id, _) = directory.find_user_by_email("ANN@x.com").await.unwrap().unwrap();
        assert_eq!(id, "u1");
        assert!(directory.find_user_by_email("bob@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_snapshot_round_trip_is_exact() {
        let (directory, store) = directory();
        let subject = SubjectId::new("abc").unwrap();
        store.insert(
            ADMINS,
            "abc",
            json!({ "email": "a@x.com", "reactivatedAt": "2024-06-01T12:00:00Z" }),
        );

        let snapshot = directory.admin_snapshot(&subject).await.unwrap().unwrap();
        directory.delete_admin(&subject).await.unwrap();
        directory.restore_admin(&subject, &snapshot).await.unwrap();

        assert_eq!(store.document(ADMINS, "abc"), Some(snapshot));
    }

    #[tokio::test]
    async fn test_events_by_venue_filters_on_venue_id() {
        let (directory, store) = directory();
        store.insert(EVENTS, "e1", json!({ "name": "Gig", "venueId": "v1" }));
        store.insert(EVENTS, "e2", json!({ "name": "Play", "venueId": "v2" }));
        store.insert(EVENTS, "e3", json!({ "name": "Orphan" }));

        let v1 = VenueId::parse("v1").unwrap();
        let events = directory.events_by_venue(&v1).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "e1");
        assert_eq!(directory.list_events().await.unwrap().len(), 3);
    }
}
