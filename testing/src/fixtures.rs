//! Fixture builders.
//!
//! Directory documents are built as raw JSON in the shape the shared
//! directory stores them (camelCase keys, `""` for "no venue", email-keyed
//! venue maps), so tests exercise the same decoding as production reads.

use crate::mocks::test_clock;
use boxoffice_auth::environment::Clock;
use boxoffice_auth::providers::IdentityAccount;
use boxoffice_auth::{LocalId, LocalIdentity, Role, SubjectId, VenueId, VerifiedIdentity};
use serde_json::{Value, json};

/// Subject id from a literal.
///
/// # Panics
///
/// Panics if `id` is blank.
#[must_use]
#[allow(clippy::expect_used)]
pub fn subject(id: &str) -> SubjectId {
    SubjectId::new(id).expect("fixture subject ids are never blank")
}

/// `admins/{subject}` document, active and enabled.
#[must_use]
pub fn admin_document(email: &str, display_name: &str, role: Role, venue_id: &str) -> Value {
    json!({
        "email": email,
        "displayName": display_name,
        "role": role.as_str(),
        "venueId": venue_id,
        "isActive": true,
        "disabled": false,
        "createdAt": test_clock().now(),
        "createdBy": "root@boxoffice.test",
        "provider": "password",
    })
}

/// `admins/{subject}` document for a deactivated admin.
#[must_use]
pub fn deactivated_admin_document(email: &str, role: Role, venue_id: &str) -> Value {
    let mut doc = admin_document(email, "", role, venue_id);
    doc["isActive"] = json!(false);
    doc["disabled"] = json!(true);
    doc
}

/// `users/{subject}` document.
#[must_use]
pub fn user_document(email: &str, display_name: &str) -> Value {
    json!({
        "email": email,
        "displayName": display_name,
        "role": "user",
        "createdAt": test_clock().now(),
    })
}

/// `venues/{id}` document with no listed admins.
#[must_use]
pub fn venue_document(name: &str, city: &str) -> Value {
    json!({
        "name": name,
        "city": city,
        "admins": {},
        "subAdmins": {},
    })
}

/// `events/{id}` document a month after the test clock, with no image.
#[must_use]
pub fn event_document(name: &str, venue_id: &str) -> Value {
    let now = test_clock().now();
    json!({
        "name": name,
        "description": "",
        "venue": format!("Venue {venue_id}"),
        "venueId": venue_id,
        "date": now + chrono::Duration::days(30),
        "price": 20.0,
        "maxTickets": 100,
        "ticketsSold": 0,
        "isFeatured": false,
        "createdAt": now,
        "createdBy": "root@boxoffice.test",
        "updatedAt": now,
    })
}

/// Enabled, verified identity-provider account.
#[must_use]
pub fn account(subject_id: &str, email: &str) -> IdentityAccount {
    IdentityAccount {
        subject_id: subject(subject_id),
        email: email.to_string(),
        display_name: None,
        disabled: false,
        email_verified: true,
    }
}

/// Identity as returned by a successful token verification.
#[must_use]
pub fn verified_identity(subject_id: &str, email: &str) -> VerifiedIdentity {
    VerifiedIdentity {
        subject_id: subject(subject_id),
        email: email.to_string(),
        provider: "password".to_string(),
        claims: serde_json::Map::new(),
    }
}

/// Reconciled local identity, as an actor for lifecycle operations.
#[must_use]
pub fn local_identity(subject_id: &str, email: &str, role: Role, venue_id: &str) -> LocalIdentity {
    LocalIdentity {
        local_id: LocalId::new(),
        subject_id: Some(subject(subject_id)),
        email: email.to_string(),
        display_name: email.split('@').next().unwrap_or_default().to_string(),
        role,
        venue_id: VenueId::parse(venue_id),
        provider: "password".to_string(),
        created_at: test_clock().now(),
    }
}

/// Site admin actor `root@boxoffice.test` with subject `root`.
#[must_use]
pub fn site_admin() -> LocalIdentity {
    local_identity("root", "root@boxoffice.test", Role::SiteAdmin, "")
}

/// Legacy local row created before subjects were recorded.
#[must_use]
pub fn legacy_identity(email: &str, role: Role) -> LocalIdentity {
    LocalIdentity {
        subject_id: None,
        ..local_identity("legacy", email, role, "")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use boxoffice_auth::providers::{AdminRecord, EventRecord};

    #[test]
    fn test_admin_document_decodes() {
        let record: AdminRecord =
            serde_json::from_value(admin_document("a@x.com", "Ann", Role::VenueAdmin, "v1")).unwrap();
        assert_eq!(record.role, Role::VenueAdmin);
        assert_eq!(record.venue_id, VenueId::parse("v1"));
        assert!(record.is_active);
    }

    #[test]
    fn test_event_document_decodes() {
        let event: EventRecord = serde_json::from_value(event_document("Gig", "v1")).unwrap();
        assert_eq!(event.venue_id, VenueId::parse("v1"));
        assert!(event.date.unwrap() > test_clock().now());
        assert!(!event.is_sold_out());
    }

    #[test]
    fn test_legacy_identity_has_no_subject() {
        assert!(legacy_identity("old@x.com", Role::User).subject_id.is_none());
    }
}
