//! Access-control constants.
//!
//! Collection names and defaults shared by the directory, reconciler and
//! lifecycle manager.

/// Collection names in the shared directory store.
pub mod collections {
    /// Admin records keyed by subject id.
    pub const ADMINS: &str = "admins";

    /// Regular user records keyed by subject id.
    pub const USERS: &str = "users";

    /// Venue catalog keyed by venue id.
    pub const VENUES: &str = "venues";

    /// Events keyed by event id.
    pub const EVENTS: &str = "events";
}

/// Provider string recorded when the identity provider reports none.
pub const DEFAULT_PROVIDER: &str = "password";

/// Minimum accepted length for an admin-supplied password.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Page size for the admin listing.
pub const ADMINS_PER_PAGE: usize = 10;

/// Confirmation phrase required by the delete endpoint.
pub const DELETE_CONFIRMATION: &str = "DELETE";

/// Object path prefix for event images.
pub const EVENT_IMAGE_PREFIX: &str = "event-images";

/// Largest accepted event image.
pub const MAX_EVENT_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Longest accepted event name, in characters.
pub const MAX_EVENT_NAME_LENGTH: usize = 200;

/// Longest accepted event description, in characters.
pub const MAX_EVENT_DESCRIPTION_LENGTH: usize = 500;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_names() {
        assert_eq!(collections::ADMINS, "admins");
        assert_eq!(collections::USERS, "users");
        assert_eq!(collections::VENUES, "venues");
        assert_eq!(collections::EVENTS, "events");
    }
}
