//! Admin lifecycle integration tests.
//!
//! Each multi-step operation is exercised on the happy path and with a
//! failure injected into its second step, to verify that compensation
//! leaves the identity provider and the directory consistent.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use boxoffice_auth::constants::collections::{ADMINS, USERS};
use boxoffice_auth::lifecycle::AdminQuery;
use boxoffice_auth::mocks::{IdentityOp, StoreOp};
use boxoffice_auth::providers::IdentityProvider;
use boxoffice_auth::{AdminState, AuthError, NewAdmin, Role, VenueId};
use boxoffice_testing::TestEnvironment;
use boxoffice_testing::fixtures::{
    admin_document, deactivated_admin_document, legacy_identity, local_identity, site_admin,
    subject, user_document,
};
use serde_json::json;

fn venue_admin_request(email: &str, venue: &str) -> NewAdmin {
    NewAdmin {
        email: email.to_string(),
        role: Role::VenueAdmin,
        venue_id: VenueId::parse(venue),
        ..NewAdmin::default()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// create_admin
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_create_admin_writes_account_and_record() {
    let test = TestEnvironment::new();
    test.seed_venue("v1", "Roundhouse", "London");

    let created = test
        .lifecycle()
        .create_admin(&site_admin(), venue_admin_request("ann@x.com", "v1"))
        .await
        .expect("create should succeed");

    assert_eq!(created.record.role, Role::VenueAdmin);
    assert_eq!(created.record.venue_id, VenueId::parse("v1"));
    assert_eq!(created.record.display_name, "ann");
    assert_eq!(
        created.record.created_by.as_deref(),
        Some("root@boxoffice.test")
    );
    assert_eq!(
        created.password_setup_link.as_deref(),
        Some("https://auth.test/reset?email=ann@x.com")
    );

    let doc = test
        .store
        .document(ADMINS, created.subject_id.as_str())
        .expect("admin record written");
    assert_eq!(doc["isActive"], json!(true));
    assert_eq!(doc["disabled"], json!(false));
    assert_eq!(doc["provider"], json!("password"));
    assert_eq!(doc["venueId"], json!("v1"));
    assert_eq!(doc["emailVerified"], json!(false));
    assert_eq!(doc["passwordSet"], json!(false));
    assert!(test.identity.account(&created.subject_id).is_some());
}

#[tokio::test]
async fn test_create_with_password_has_no_setup_link() {
    let test = TestEnvironment::new();
    let request = NewAdmin {
        email: "sam@x.com".into(),
        role: Role::SiteAdmin,
        venue_id: VenueId::parse("ignored"),
        password: Some("s3cret!".into()),
        ..NewAdmin::default()
    };

    let created = test
        .lifecycle()
        .create_admin(&site_admin(), request)
        .await
        .expect("create should succeed");

    assert_eq!(created.password_setup_link, None);
    assert_eq!(created.record.venue_id, None);
}

#[tokio::test]
async fn test_create_venue_admin_without_venue_leaves_no_account() {
    let test = TestEnvironment::new();

    let result = test
        .lifecycle()
        .create_admin(&site_admin(), venue_admin_request("ann@x.com", ""))
        .await;

    assert!(matches!(result, Err(AuthError::MissingVenue { .. })));
    assert_eq!(test.identity.account_count(), 0);
    assert_eq!(test.store.count(ADMINS), 0);
}

/// The account is created, the record write fails, and the account is
/// deleted again.
#[tokio::test]
async fn test_create_rolls_back_account_when_record_write_fails() {
    let test = TestEnvironment::new();
    test.seed_venue("v1", "Roundhouse", "London");
    test.store.fail_on(ADMINS, StoreOp::Set);

    let result = test
        .lifecycle()
        .create_admin(&site_admin(), venue_admin_request("ann@x.com", "v1"))
        .await;

    assert!(matches!(result, Err(AuthError::StoreUnavailable(_))));
    assert_eq!(test.identity.account_count(), 0);
    assert_eq!(test.store.count(ADMINS), 0);

    // The email is free again
    test.store.clear_failures();
    test.lifecycle()
        .create_admin(&site_admin(), venue_admin_request("ann@x.com", "v1"))
        .await
        .expect("retry should succeed");
}

#[tokio::test]
async fn test_create_validation_errors() {
    let test = TestEnvironment::new();
    test.seed_venue("v1", "Roundhouse", "London");
    let lifecycle = test.lifecycle();
    let actor = site_admin();

    let bad_email = NewAdmin {
        email: "not-an-email".into(),
        role: Role::SiteAdmin,
        ..NewAdmin::default()
    };
    assert_eq!(
        lifecycle.create_admin(&actor, bad_email).await.map(|_| ()),
        Err(AuthError::InvalidEmail)
    );

    let not_admin = NewAdmin {
        email: "s@x.com".into(),
        role: Role::Scanner,
        ..NewAdmin::default()
    };
    assert!(matches!(
        lifecycle.create_admin(&actor, not_admin).await,
        Err(AuthError::InvalidRole { .. })
    ));

    let weak = NewAdmin {
        password: Some("12345".into()),
        ..venue_admin_request("w@x.com", "v1")
    };
    assert_eq!(
        lifecycle.create_admin(&actor, weak).await.map(|_| ()),
        Err(AuthError::WeakPassword { min_length: 6 })
    );

    assert_eq!(
        lifecycle
            .create_admin(&actor, venue_admin_request("u@x.com", "nowhere"))
            .await
            .map(|_| ()),
        Err(AuthError::UnknownVenue {
            venue_id: "nowhere".into()
        })
    );

    assert_eq!(test.identity.account_count(), 0);
}

#[tokio::test]
async fn test_create_rejects_email_in_use() {
    let test = TestEnvironment::new();
    test.seed_user("u1", "taken@x.com", "Taylor");

    let result = test
        .lifecycle()
        .create_admin(
            &site_admin(),
            NewAdmin {
                email: "taken@x.com".into(),
                role: Role::SiteAdmin,
                ..NewAdmin::default()
            },
        )
        .await;

    assert_eq!(
        result.map(|_| ()),
        Err(AuthError::DuplicateEmail {
            email: "taken@x.com".into()
        })
    );
    assert_eq!(test.identity.account_count(), 1);
}

#[tokio::test]
async fn test_create_rejects_record_email_in_other_case() {
    let test = TestEnvironment::new();
    test.seed_venue("v1", "Roundhouse", "London");
    test.store
        .insert(USERS, "u1", user_document("Ann@X.com", "Ann"));
    test.store.insert(
        ADMINS,
        "a1",
        admin_document("Bob@X.com", "Bob", Role::SubAdmin, "v1"),
    );
    let lifecycle = test.lifecycle();

    for email in ["ann@x.com", "bob@x.com"] {
        let result = lifecycle
            .create_admin(&site_admin(), venue_admin_request(email, "v1"))
            .await;
        assert!(
            matches!(result, Err(AuthError::DuplicateEmail { .. })),
            "{email} should be taken"
        );
    }
    assert_eq!(test.identity.account_count(), 0);
    assert_eq!(test.store.count(ADMINS), 1);
}

#[tokio::test]
async fn test_only_site_admins_manage_admins() {
    let test = TestEnvironment::new();
    test.seed_venue("v1", "Roundhouse", "London");
    let venue_admin = local_identity("va", "va@x.com", Role::VenueAdmin, "v1");

    let result = test
        .lifecycle()
        .create_admin(&venue_admin, venue_admin_request("ann@x.com", "v1"))
        .await;

    assert!(matches!(result, Err(AuthError::PermissionDenied { .. })));
    assert_eq!(test.identity.account_count(), 0);

    let listing = test
        .lifecycle()
        .list_admins(&venue_admin, AdminQuery::default())
        .await;
    assert!(matches!(listing, Err(AuthError::PermissionDenied { .. })));
}

// ═══════════════════════════════════════════════════════════════════════
// update_admin_role / rename_admin
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_update_role_syncs_local_identity() {
    let test = TestEnvironment::new();
    test.seed_venue("v2", "Corn Exchange", "Brighton");
    let token = test.seed_admin("abc", "a@x.com", Role::SiteAdmin, "");
    test.reconciler().authenticate(&token).await.unwrap();

    let record = test
        .lifecycle()
        .update_admin_role(
            &site_admin(),
            &subject("abc"),
            Role::SubAdmin,
            VenueId::parse("v2"),
        )
        .await
        .expect("update should succeed");

    assert_eq!(record.role, Role::SubAdmin);
    assert!(record.updated_at.is_some());
    let doc = test.store.document(ADMINS, "abc").unwrap();
    assert_eq!(doc["role"], json!("subAdmin"));
    assert_eq!(doc["venueId"], json!("v2"));

    let local = &test.locals.all()[0];
    assert_eq!(local.role, Role::SubAdmin);
    assert_eq!(local.venue_id, VenueId::parse("v2"));
}

#[tokio::test]
async fn test_update_role_ignores_local_sync_failure() {
    let test = TestEnvironment::new();
    test.seed_admin("abc", "a@x.com", Role::VenueAdmin, "v1");
    test.locals.set_failing(true);

    let record = test
        .lifecycle()
        .update_admin_role(&site_admin(), &subject("abc"), Role::SiteAdmin, None)
        .await
        .expect("local sync failure is not propagated");

    assert_eq!(record.role, Role::SiteAdmin);
    assert_eq!(test.store.document(ADMINS, "abc").unwrap()["venueId"], json!(""));
}

#[tokio::test]
async fn test_update_role_requires_record() {
    let test = TestEnvironment::new();

    let result = test
        .lifecycle()
        .update_admin_role(&site_admin(), &subject("ghost"), Role::SiteAdmin, None)
        .await;

    assert!(matches!(result, Err(AuthError::NotFound(_))));
}

#[tokio::test]
async fn test_rename_restores_record_when_account_update_fails() {
    let test = TestEnvironment::new();
    test.store.insert(
        ADMINS,
        "abc",
        {
            let mut doc = admin_document("a@x.com", "Ann", Role::SiteAdmin, "");
            doc["deactivatedAt"] = json!("2024-03-01T09:30:00Z");
            doc
        },
    );
    test.seed_account("abc", "a@x.com");
    let before = test.store.document(ADMINS, "abc").unwrap();
    let lifecycle = test.lifecycle();

    test.identity.fail_on(IdentityOp::UpdateProfile);
    let result = lifecycle
        .rename_admin(&site_admin(), &subject("abc"), "Annie")
        .await;
    assert!(matches!(result, Err(AuthError::IdentityProvider(_))));
    assert_eq!(test.store.document(ADMINS, "abc"), Some(before));

    test.identity.clear_failures();
    let record = lifecycle
        .rename_admin(&site_admin(), &subject("abc"), "Annie")
        .await
        .expect("rename should succeed");
    assert_eq!(record.display_name, "Annie");
    assert_eq!(
        test.identity
            .account(&subject("abc"))
            .unwrap()
            .display_name
            .as_deref(),
        Some("Annie")
    );
}

// ═══════════════════════════════════════════════════════════════════════
// activate / deactivate
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_deactivate_then_activate() {
    let test = TestEnvironment::new();
    test.seed_admin("abc", "a@x.com", Role::VenueAdmin, "v1");
    let lifecycle = test.lifecycle();
    let actor = site_admin();

    lifecycle
        .deactivate_admin(&actor, &subject("abc"))
        .await
        .expect("deactivate should succeed");

    let doc = test.store.document(ADMINS, "abc").unwrap();
    assert_eq!(doc["isActive"], json!(false));
    assert_eq!(doc["disabled"], json!(true));
    assert!(doc.contains_key("deactivatedAt"));
    assert!(test.identity.account(&subject("abc")).unwrap().disabled);
    assert_eq!(
        lifecycle.admin_state(&subject("abc")).await.unwrap(),
        AdminState::Deactivated
    );

    assert_eq!(
        lifecycle.deactivate_admin(&actor, &subject("abc")).await,
        Err(AuthError::InvalidStateTransition {
            from: AdminState::Deactivated,
            to: AdminState::Deactivated,
        })
    );

    lifecycle
        .activate_admin(&actor, &subject("abc"))
        .await
        .expect("activate should succeed");
    assert!(!test.identity.account(&subject("abc")).unwrap().disabled);
    assert!(test
        .store
        .document(ADMINS, "abc")
        .unwrap()
        .contains_key("reactivatedAt"));
    assert_eq!(
        lifecycle.admin_state(&subject("abc")).await.unwrap(),
        AdminState::Active
    );
}

#[tokio::test]
async fn test_activate_active_admin_is_rejected() {
    let test = TestEnvironment::new();
    test.seed_admin("abc", "a@x.com", Role::SubAdmin, "v1");

    let result = test
        .lifecycle()
        .activate_admin(&site_admin(), &subject("abc"))
        .await;

    assert!(matches!(
        result,
        Err(AuthError::InvalidStateTransition { .. })
    ));
}

/// The account is disabled, the record update fails, and the account is
/// enabled again.
#[tokio::test]
async fn test_deactivate_restores_account_when_record_update_fails() {
    let test = TestEnvironment::new();
    test.seed_admin("abc", "a@x.com", Role::VenueAdmin, "v1");
    test.store.fail_on(ADMINS, StoreOp::Update);

    let result = test
        .lifecycle()
        .deactivate_admin(&site_admin(), &subject("abc"))
        .await;

    assert!(matches!(result, Err(AuthError::StoreUnavailable(_))));
    assert!(!test.identity.account(&subject("abc")).unwrap().disabled);
    assert_eq!(
        test.store.document(ADMINS, "abc").unwrap()["isActive"],
        json!(true)
    );
}

#[tokio::test]
async fn test_activate_deactivated_record() {
    let test = TestEnvironment::new();
    test.store.insert(
        ADMINS,
        "abc",
        deactivated_admin_document("a@x.com", Role::SubAdmin, "v1"),
    );
    test.seed_account("abc", "a@x.com");

    test.lifecycle()
        .activate_admin(&site_admin(), &subject("abc"))
        .await
        .expect("activate should succeed");

    let doc = test.store.document(ADMINS, "abc").unwrap();
    assert_eq!(doc["isActive"], json!(true));
    assert_eq!(doc["disabled"], json!(false));
}

// ═══════════════════════════════════════════════════════════════════════
// delete_admin
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_self_deletion_is_forbidden() {
    let test = TestEnvironment::new();
    let actor = test.seed_site_admin();
    let before = test.store.document(ADMINS, "root");

    let result = test
        .lifecycle()
        .delete_admin(&actor, &subject("root"))
        .await;

    assert_eq!(result, Err(AuthError::SelfDeletionForbidden));
    assert_eq!(test.store.document(ADMINS, "root"), before);
    assert!(test.identity.account(&subject("root")).is_some());
}

#[tokio::test]
async fn test_self_deletion_detected_for_legacy_actor() {
    let test = TestEnvironment::new();
    test.seed_site_admin();
    let legacy_actor = legacy_identity("root@boxoffice.test", Role::SiteAdmin);

    let result = test
        .lifecycle()
        .delete_admin(&legacy_actor, &subject("root"))
        .await;

    assert_eq!(result, Err(AuthError::SelfDeletionForbidden));
    assert!(test.store.document(ADMINS, "root").is_some());
}

#[tokio::test]
async fn test_delete_removes_record_account_and_local_identity() {
    let test = TestEnvironment::new();
    let token = test.seed_admin("abc", "a@x.com", Role::VenueAdmin, "v1");
    test.reconciler().authenticate(&token).await.unwrap();
    assert_eq!(test.locals.len(), 1);

    test.lifecycle()
        .delete_admin(&site_admin(), &subject("abc"))
        .await
        .expect("delete should succeed");

    assert!(test.store.document(ADMINS, "abc").is_none());
    assert!(test.identity.account(&subject("abc")).is_none());
    assert!(test.locals.is_empty());
    assert_eq!(
        test.lifecycle().admin_state(&subject("abc")).await.unwrap(),
        AdminState::Nonexistent
    );
}

/// The record is deleted, the account deletion fails, and the record is
/// written back from its snapshot.
#[tokio::test]
async fn test_delete_restores_record_when_account_deletion_fails() {
    let test = TestEnvironment::new();
    test.seed_admin("abc", "a@x.com", Role::VenueAdmin, "v1");
    let before = test.store.document(ADMINS, "abc").unwrap();
    test.identity.fail_on(IdentityOp::Delete);

    let result = test
        .lifecycle()
        .delete_admin(&site_admin(), &subject("abc"))
        .await;

    assert!(matches!(result, Err(AuthError::IdentityProvider(_))));
    let after = test.store.document(ADMINS, "abc").expect("record restored");
    assert_eq!(after, before);
    assert!(test.identity.account(&subject("abc")).is_some());
}

#[tokio::test]
async fn test_delete_restore_keeps_unmodelled_fields() {
    let test = TestEnvironment::new();
    let mut doc = admin_document("a@x.com", "Ann", Role::VenueAdmin, "v1");
    doc["reactivatedAt"] = json!("2024-06-01T12:00:00Z");
    doc["emailVerified"] = json!(true);
    doc["passwordSet"] = json!(true);
    doc["phone"] = json!("+44 20 7946 0000");
    test.store.insert(ADMINS, "abc", doc);
    test.seed_account("abc", "a@x.com");
    let before = test.store.document(ADMINS, "abc").unwrap();
    test.identity.fail_on(IdentityOp::Delete);

    let result = test
        .lifecycle()
        .delete_admin(&site_admin(), &subject("abc"))
        .await;

    assert!(result.is_err());
    assert_eq!(test.store.document(ADMINS, "abc"), Some(before));
}

#[tokio::test]
async fn test_delete_record_without_account() {
    let test = TestEnvironment::new();
    test.store.insert(
        ADMINS,
        "orphan",
        admin_document("o@x.com", "", Role::SubAdmin, "v1"),
    );

    test.lifecycle()
        .delete_admin(&site_admin(), &subject("orphan"))
        .await
        .expect("orphan record is removed");

    assert!(test.store.document(ADMINS, "orphan").is_none());
}

// ═══════════════════════════════════════════════════════════════════════
// send_password_reset
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_password_reset() {
    let test = TestEnvironment::new();
    test.seed_admin("abc", "a@x.com", Role::SiteAdmin, "");
    let lifecycle = test.lifecycle();

    assert_eq!(
        lifecycle
            .send_password_reset(&site_admin(), " a@x.com ")
            .await
            .unwrap(),
        "https://auth.test/reset?email=a@x.com"
    );
    assert!(matches!(
        lifecycle
            .send_password_reset(&site_admin(), "nobody@x.com")
            .await,
        Err(AuthError::NotFound(_))
    ));
}

// ═══════════════════════════════════════════════════════════════════════
// promote_user / demote_admin
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_promote_then_demote_keeps_one_collection() {
    let test = TestEnvironment::new();
    test.seed_venue("v1", "Roundhouse", "London");
    test.seed_user("u1", "uma@x.com", "Uma");
    let lifecycle = test.lifecycle();
    let actor = site_admin();

    let record = lifecycle
        .promote_user(&actor, &subject("u1"), Role::VenueAdmin, VenueId::parse("v1"))
        .await
        .expect("promote should succeed");
    assert_eq!(record.display_name, "Uma");
    assert!(test.store.document(ADMINS, "u1").is_some());
    assert!(test.store.document(USERS, "u1").is_none());

    let user = lifecycle
        .demote_admin(&actor, &subject("u1"))
        .await
        .expect("demote should succeed");
    assert_eq!(user.role, Role::User);
    assert!(test.store.document(ADMINS, "u1").is_none());
    assert_eq!(
        test.store.document(USERS, "u1").unwrap()["role"],
        json!("user")
    );
}

#[tokio::test]
async fn test_promote_removes_admin_record_when_user_delete_fails() {
    let test = TestEnvironment::new();
    test.seed_user("u1", "uma@x.com", "Uma");
    test.store.fail_on(USERS, StoreOp::Delete);

    let result = test
        .lifecycle()
        .promote_user(&site_admin(), &subject("u1"), Role::SiteAdmin, None)
        .await;

    assert!(matches!(result, Err(AuthError::StoreUnavailable(_))));
    assert!(test.store.document(ADMINS, "u1").is_none());
    assert!(test.store.document(USERS, "u1").is_some());
}

#[tokio::test]
async fn test_promote_rejects_existing_admin() {
    let test = TestEnvironment::new();
    test.seed_user("u1", "uma@x.com", "Uma");
    test.store.insert(
        ADMINS,
        "u1",
        admin_document("uma@x.com", "Uma", Role::SubAdmin, "v1"),
    );

    let result = test
        .lifecycle()
        .promote_user(&site_admin(), &subject("u1"), Role::SiteAdmin, None)
        .await;

    assert!(matches!(result, Err(AuthError::DuplicateEmail { .. })));
}

#[tokio::test]
async fn test_demote_self_is_forbidden() {
    let test = TestEnvironment::new();
    let actor = test.seed_site_admin();

    let result = test.lifecycle().demote_admin(&actor, &subject("root")).await;

    assert!(matches!(result, Err(AuthError::SelfDeletionForbidden)));
    assert!(test.store.document(ADMINS, "root").is_some());
}

// ═══════════════════════════════════════════════════════════════════════
// list_admins
// ═══════════════════════════════════════════════════════════════════════

fn seed_roster(test: &TestEnvironment) {
    test.seed_admin("root", "root@boxoffice.test", Role::SiteAdmin, "");
    for i in 0..12 {
        test.seed_admin(
            &format!("va{i:02}"),
            &format!("venue{i:02}@x.com"),
            Role::VenueAdmin,
            "v1",
        );
    }
    test.seed_admin("sa", "helper@x.com", Role::SubAdmin, "v1");
    test.store.insert(
        ADMINS,
        "off",
        deactivated_admin_document("off@x.com", Role::SubAdmin, "v2"),
    );
}

#[tokio::test]
async fn test_list_admins_paginates_by_ten() {
    let test = TestEnvironment::new();
    seed_roster(&test);
    let lifecycle = test.lifecycle();

    let first = lifecycle
        .list_admins(
            &site_admin(),
            AdminQuery {
                page: 1,
                ..AdminQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(first.total_matches, 15);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.admins.len(), 10);
    assert_eq!(first.admins[0].record.email, "helper@x.com");

    let second = lifecycle
        .list_admins(
            &site_admin(),
            AdminQuery {
                page: 2,
                ..AdminQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(second.admins.len(), 5);

    let clamped = lifecycle
        .list_admins(
            &site_admin(),
            AdminQuery {
                page: 99,
                ..AdminQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(clamped.page, 2);
}

#[tokio::test]
async fn test_list_admins_filters_and_stats() {
    let test = TestEnvironment::new();
    seed_roster(&test);
    let lifecycle = test.lifecycle();

    let subs = lifecycle
        .list_admins(
            &site_admin(),
            AdminQuery {
                role: Some(Role::SubAdmin),
                page: 1,
                ..AdminQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(subs.total_matches, 2);
    assert_eq!(subs.stats.total, 15);
    assert_eq!(subs.stats.site_admins, 1);
    assert_eq!(subs.stats.venue_admins, 12);
    assert_eq!(subs.stats.sub_admins, 2);
    assert_eq!(subs.stats.active, 14);

    let off = subs
        .admins
        .iter()
        .find(|a| a.uid == "off")
        .expect("deactivated admin listed");
    assert!(off.account_disabled);
    assert!(!off.is_active());

    let search = lifecycle
        .list_admins(
            &site_admin(),
            AdminQuery {
                search: Some("VENUE1".into()),
                page: 1,
                ..AdminQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(search.total_matches, 2);
    assert_eq!(search.total_pages, 1);
}

#[tokio::test]
async fn test_list_admins_uses_live_disabled_flag() {
    let test = TestEnvironment::new();
    test.seed_admin("abc", "a@x.com", Role::SiteAdmin, "");
    test.identity
        .set_disabled(&subject("abc"), true)
        .await
        .unwrap();

    let page = test
        .lifecycle()
        .list_admins(&site_admin(), AdminQuery::default())
        .await
        .unwrap();

    assert!(page.admins[0].account_disabled);
    assert_eq!(page.stats.active, 0);
}
