//! Identity reconciliation integration tests.
//!
//! Covers profile resolution from the directory, the local identity upsert
//! and the guarantees around store failures:
//!
//! - Default profile for unknown subjects
//! - Admin record beats user record
//! - Admin records with an invalid venue scope resolve to a plain user
//! - Idempotence (no writes on an unchanged directory)
//! - Legacy rows matched by email get their subject filled in
//! - A directory outage leaves the local table untouched

#![allow(clippy::unwrap_used, clippy::expect_used)]

use boxoffice_auth::constants::collections::{ADMINS, USERS};
use boxoffice_auth::mocks::{IdentityOp, StoreOp};
use boxoffice_auth::reconciler::ProfileSource;
use boxoffice_auth::{AuthError, ExternalCredential, Role, VenueId};
use boxoffice_testing::TestEnvironment;
use boxoffice_testing::fixtures::{
    admin_document, legacy_identity, subject, user_document, verified_identity,
};
use serde_json::json;

#[tokio::test]
async fn test_unknown_subject_gets_default_profile() {
    let test = TestEnvironment::new();

    let identity = test
        .reconciler()
        .reconcile(&subject("new-1"), "jo.smith@example.com")
        .await
        .expect("reconcile should succeed");

    assert_eq!(identity.role, Role::User);
    assert_eq!(identity.venue_id, None);
    assert_eq!(identity.display_name, "jo.smith");
    assert_eq!(identity.subject_id, Some(subject("new-1")));
    assert_eq!(test.locals.len(), 1);
}

/// `admins/abc = {role: venueAdmin, venueId: v1, displayName: Ann}` is
/// copied verbatim onto the local identity.
#[tokio::test]
async fn test_admin_record_is_authoritative() {
    let test = TestEnvironment::new();
    test.store.insert(
        ADMINS,
        "abc",
        admin_document("a@x.com", "Ann", Role::VenueAdmin, "v1"),
    );

    let identity = test
        .reconciler()
        .reconcile(&subject("abc"), "a@x.com")
        .await
        .expect("reconcile should succeed");

    assert_eq!(identity.role, Role::VenueAdmin);
    assert_eq!(identity.venue_id, VenueId::parse("v1"));
    assert_eq!(identity.display_name, "Ann");
}

#[tokio::test]
async fn test_unscoped_venue_admin_record_falls_back_to_user() {
    let test = TestEnvironment::new();
    test.store.insert(
        ADMINS,
        "abc",
        admin_document("a@x.com", "Ann", Role::VenueAdmin, ""),
    );

    let identity = test
        .reconciler()
        .reconcile(&subject("abc"), "a@x.com")
        .await
        .expect("reconcile should succeed");

    assert_eq!(identity.role, Role::User);
    assert_eq!(identity.venue_id, None);
    assert_eq!(identity.display_name, "Ann");
}

#[tokio::test]
async fn test_site_admin_record_venue_is_dropped() {
    let test = TestEnvironment::new();
    test.store.insert(
        ADMINS,
        "root",
        admin_document("r@x.com", "Root", Role::SiteAdmin, "v1"),
    );

    let profile = test
        .reconciler()
        .resolve_profile(&subject("root"), "r@x.com")
        .await
        .expect("resolve should succeed");

    assert_eq!(profile.role, Role::SiteAdmin);
    assert_eq!(profile.venue_id, None);
}

#[tokio::test]
async fn test_user_record_has_no_venue() {
    let test = TestEnvironment::new();
    let mut doc = user_document("u@x.com", "Uma");
    doc["role"] = json!("scanner");
    doc["venueId"] = json!("v9");
    test.store.insert(USERS, "u1", doc);

    let identity = test
        .reconciler()
        .reconcile(&subject("u1"), "u@x.com")
        .await
        .expect("reconcile should succeed");

    assert_eq!(identity.role, Role::Scanner);
    assert_eq!(identity.venue_id, None);
    assert_eq!(identity.display_name, "Uma");
}

#[tokio::test]
async fn test_admin_wins_when_subject_in_both_collections() {
    let test = TestEnvironment::new();
    test.store.insert(
        ADMINS,
        "both",
        admin_document("b@x.com", "Admin Bea", Role::SubAdmin, "v2"),
    );
    test.store
        .insert(USERS, "both", user_document("b@x.com", "User Bea"));

    let profile = test
        .reconciler()
        .resolve_profile(&subject("both"), "b@x.com")
        .await
        .expect("resolve should succeed");

    assert_eq!(profile.source, ProfileSource::Admin);
    assert_eq!(profile.role, Role::SubAdmin);
    assert_eq!(profile.display_name, "Admin Bea");
}

#[tokio::test]
async fn test_unknown_role_string_falls_back_to_user() {
    let test = TestEnvironment::new();
    let mut doc = admin_document("r@x.com", "", Role::SiteAdmin, "");
    doc["role"] = json!("superuser");
    test.store.insert(ADMINS, "r1", doc);

    let identity = test
        .reconciler()
        .reconcile(&subject("r1"), "r@x.com")
        .await
        .expect("reconcile should succeed");

    assert_eq!(identity.role, Role::User);
    assert_eq!(identity.display_name, "r");
}

/// A second reconcile with an unchanged directory writes nothing and
/// returns an identical value.
#[tokio::test]
async fn test_reconcile_is_idempotent() {
    let test = TestEnvironment::new();
    test.store.insert(
        ADMINS,
        "abc",
        admin_document("a@x.com", "Ann", Role::VenueAdmin, "v1"),
    );
    let reconciler = test.reconciler();

    let first = reconciler
        .reconcile(&subject("abc"), "a@x.com")
        .await
        .expect("first reconcile");
    let writes_after_first = test.locals.write_count();

    let second = reconciler
        .reconcile(&subject("abc"), "a@x.com")
        .await
        .expect("second reconcile");

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(test.locals.write_count(), writes_after_first);
    assert_eq!(test.locals.len(), 1);
}

#[tokio::test]
async fn test_directory_change_updates_local_identity() {
    let test = TestEnvironment::new();
    test.store.insert(
        ADMINS,
        "abc",
        admin_document("a@x.com", "Ann", Role::VenueAdmin, "v1"),
    );
    let reconciler = test.reconciler();
    let first = reconciler
        .reconcile(&subject("abc"), "a@x.com")
        .await
        .expect("first reconcile");

    test.store.insert(
        ADMINS,
        "abc",
        admin_document("a@x.com", "Ann", Role::SiteAdmin, ""),
    );
    let second = reconciler
        .reconcile(&subject("abc"), "a@x.com")
        .await
        .expect("second reconcile");

    assert_eq!(second.local_id, first.local_id);
    assert_eq!(second.created_at, first.created_at);
    assert_eq!(second.role, Role::SiteAdmin);
    assert_eq!(second.venue_id, None);
}

#[tokio::test]
async fn test_legacy_row_matched_by_email_gets_subject() {
    let test = TestEnvironment::new();
    let legacy = legacy_identity("old@x.com", Role::User);
    test.locals.seed(legacy.clone());
    test.store
        .insert(USERS, "s-42", user_document("old@x.com", "Olive"));

    let identity = test
        .reconciler()
        .reconcile(&subject("s-42"), "old@x.com")
        .await
        .expect("reconcile should succeed");

    assert_eq!(identity.local_id, legacy.local_id);
    assert_eq!(identity.subject_id, Some(subject("s-42")));
    assert_eq!(identity.display_name, "Olive");
    assert_eq!(test.locals.len(), 1);
}

#[tokio::test]
async fn test_store_outage_leaves_table_untouched() {
    let test = TestEnvironment::new();
    test.store.set_available(false);

    let result = test
        .reconciler()
        .reconcile(&subject("abc"), "a@x.com")
        .await;

    assert!(matches!(result, Err(AuthError::StoreUnavailable(_))));
    assert!(test.locals.is_empty());
    assert_eq!(test.locals.write_count(), 0);
}

#[tokio::test]
async fn test_user_collection_outage_after_admin_miss() {
    let test = TestEnvironment::new();
    test.store.fail_on(USERS, StoreOp::Get);

    let result = test
        .reconciler()
        .reconcile(&subject("abc"), "a@x.com")
        .await;

    assert!(matches!(result, Err(AuthError::StoreUnavailable(_))));
    assert!(test.locals.is_empty());
}

#[tokio::test]
async fn test_authenticate_verifies_then_reconciles() {
    let test = TestEnvironment::new();
    let token = test.seed_admin("abc", "a@x.com", Role::SiteAdmin, "");

    let identity = test
        .reconciler()
        .authenticate(&token)
        .await
        .expect("authenticate should succeed");

    assert_eq!(identity.role, Role::SiteAdmin);
    assert_eq!(identity.provider, "password");
}

#[tokio::test]
async fn test_authenticate_rejections() {
    let test = TestEnvironment::new();
    test.identity
        .register_token("no-email", verified_identity("x1", ""));

    let reconciler = test.reconciler();
    assert_eq!(
        reconciler
            .authenticate(&ExternalCredential::new("forged"))
            .await,
        Err(AuthError::InvalidCredential)
    );
    assert_eq!(
        reconciler
            .authenticate(&ExternalCredential::new("no-email"))
            .await,
        Err(AuthError::MissingEmail)
    );

    test.identity.fail_on(IdentityOp::Verify);
    let token = test.seed_account("abc", "a@x.com");
    assert!(reconciler.authenticate(&token).await.is_err());
    assert!(test.locals.is_empty());
}
