//! Property-based testing utilities using proptest.

use boxoffice_auth::Role;
use proptest::prelude::*;

/// Any role.
pub fn any_role() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::User),
        Just(Role::Scanner),
        Just(Role::SubAdmin),
        Just(Role::VenueAdmin),
        Just(Role::SiteAdmin),
    ]
}

/// One of the three admin roles.
pub fn admin_role() -> impl Strategy<Value = Role> {
    proptest::sample::select(Role::ADMIN_ROLES.to_vec())
}

/// Venue id as found in directory documents, including blank values.
pub fn venue_field() -> impl Strategy<Value = String> {
    prop_oneof![
        1 => Just(String::new()),
        1 => Just("   ".to_string()),
        4 => "[a-z0-9]{1,8}",
    ]
}

/// Plausible email address.
pub fn email() -> impl Strategy<Value = String> {
    ("[a-z]{1,8}", "[a-z]{1,6}").prop_map(|(local, domain)| format!("{local}@{domain}.test"))
}
