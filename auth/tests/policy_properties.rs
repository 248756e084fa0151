//! Property tests for the role/venue authorization policy.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use boxoffice_auth::policy::{
    Permission, allows, can_access_venue_dashboard, can_manage_admins, can_manage_venue,
    can_scan_tickets, require,
};
use boxoffice_auth::{Role, VenueId};
use boxoffice_testing::fixtures::local_identity;
use boxoffice_testing::properties::{admin_role, any_role, venue_field};
use proptest::prelude::*;

proptest! {
    /// A venue is manageable iff the caller is a site admin, or a venue or
    /// sub admin scoped to exactly that (non-blank) venue.
    #[test]
    fn prop_can_manage_venue(role in any_role(), own in venue_field(), requested in venue_field()) {
        let identity = local_identity("s", "s@x.com", role, &own);

        let scoped = matches!(role, Role::VenueAdmin | Role::SubAdmin)
            && VenueId::parse(&own).is_some()
            && VenueId::parse(&own) == VenueId::parse(&requested);
        let expected = role == Role::SiteAdmin || scoped;

        prop_assert_eq!(can_manage_venue(&identity, &requested), expected);
    }

    #[test]
    fn prop_venue_admin_manages_own_venue(role in prop_oneof![Just(Role::VenueAdmin), Just(Role::SubAdmin)], venue in "[a-z0-9]{1,8}") {
        let identity = local_identity("s", "s@x.com", role, &venue);
        prop_assert!(can_manage_venue(&identity, &venue));
        let other = format!("{venue}-other");
        prop_assert!(!can_manage_venue(&identity, &other));
    }

    #[test]
    fn prop_admin_roles_reach_dashboard_and_scanner(role in admin_role(), venue in venue_field()) {
        let identity = local_identity("s", "s@x.com", role, &venue);
        prop_assert!(can_access_venue_dashboard(&identity));
        prop_assert!(can_scan_tickets(&identity));
        prop_assert_eq!(can_manage_admins(&identity), role == Role::SiteAdmin);
    }

    #[test]
    fn prop_require_agrees_with_allows(role in any_role(), venue in venue_field(), requested in venue_field()) {
        let identity = local_identity("s", "s@x.com", role, &venue);
        for permission in [
            Permission::ManageAdmins,
            Permission::ManageVenue(requested.clone()),
            Permission::ScanTickets,
            Permission::VenueDashboard,
        ] {
            prop_assert_eq!(require(&identity, &permission).is_ok(), allows(&identity, &permission));
        }
    }
}

#[test]
fn test_scanner_and_user_rights() {
    let scanner = local_identity("s", "s@x.com", Role::Scanner, "v1");
    assert!(can_scan_tickets(&scanner));
    assert!(!can_access_venue_dashboard(&scanner));
    assert!(!can_manage_venue(&scanner, "v1"));

    let user = local_identity("u", "u@x.com", Role::User, "v1");
    assert!(!can_scan_tickets(&user));
    assert!(!can_manage_venue(&user, "v1"));
}
