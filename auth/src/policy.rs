//! Role and venue authorization policy.
//!
//! Pure, total predicates over a [`LocalIdentity`]. None of them touch a
//! store; callers reconcile first and ask afterwards.

use crate::error::{AuthError, Result};
use crate::state::{LocalIdentity, Role, VenueId};
use std::fmt;

/// Whether the identity is a site admin.
#[must_use]
pub fn is_site_admin(identity: &LocalIdentity) -> bool {
    identity.role == Role::SiteAdmin
}

/// Whether the identity is a venue admin.
#[must_use]
pub fn is_venue_admin(identity: &LocalIdentity) -> bool {
    identity.role == Role::VenueAdmin
}

/// Whether the identity is a sub admin.
#[must_use]
pub fn is_sub_admin(identity: &LocalIdentity) -> bool {
    identity.role == Role::SubAdmin
}

/// Whether the identity is a scanner.
#[must_use]
pub fn is_scanner(identity: &LocalIdentity) -> bool {
    identity.role == Role::Scanner
}

/// Whether the identity may manage `venue_id`.
///
/// Site admins manage every venue. Venue admins and sub admins manage only
/// their own venue; an identity without a venue scope manages none.
#[must_use]
pub fn can_manage_venue(identity: &LocalIdentity, venue_id: &str) -> bool {
    if is_site_admin(identity) {
        return true;
    }
    if !(is_venue_admin(identity) || is_sub_admin(identity)) {
        return false;
    }
    match (&identity.venue_id, VenueId::parse(venue_id)) {
        (Some(own), Some(requested)) => *own == requested,
        _ => false,
    }
}

/// Whether the identity may scan tickets.
#[must_use]
pub fn can_scan_tickets(identity: &LocalIdentity) -> bool {
    matches!(
        identity.role,
        Role::Scanner | Role::VenueAdmin | Role::SubAdmin | Role::SiteAdmin
    )
}

/// Whether the identity may open a venue dashboard.
#[must_use]
pub fn can_access_venue_dashboard(identity: &LocalIdentity) -> bool {
    identity.role.is_admin()
}

/// Whether the identity may create, modify or delete admins.
#[must_use]
pub fn can_manage_admins(identity: &LocalIdentity) -> bool {
    is_site_admin(identity)
}

/// Whether the identity may feature or unfeature events.
#[must_use]
pub fn can_feature_events(identity: &LocalIdentity) -> bool {
    is_site_admin(identity)
}

/// A permission checked by [`require`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permission {
    /// Admin management.
    ManageAdmins,
    /// Management of one venue.
    ManageVenue(String),
    /// Ticket scanning.
    ScanTickets,
    /// Venue dashboard access.
    VenueDashboard,
    /// Featured-event curation.
    FeatureEvents,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ManageAdmins => f.write_str("manage admins"),
            Self::ManageVenue(venue) => write!(f, "manage venue {venue}"),
            Self::ScanTickets => f.write_str("scan tickets"),
            Self::VenueDashboard => f.write_str("venue dashboard"),
            Self::FeatureEvents => f.write_str("feature events"),
        }
    }
}

/// Whether the identity holds `permission`.
#[must_use]
pub fn allows(identity: &LocalIdentity, permission: &Permission) -> bool {
    match permission {
        Permission::ManageAdmins => can_manage_admins(identity),
        Permission::ManageVenue(venue_id) => can_manage_venue(identity, venue_id),
        Permission::ScanTickets => can_scan_tickets(identity),
        Permission::VenueDashboard => can_access_venue_dashboard(identity),
        Permission::FeatureEvents => can_feature_events(identity),
    }
}

/// Fail with `PermissionDenied` unless the identity holds `permission`.
///
/// # Errors
///
/// Returns `AuthError::PermissionDenied` naming the missing permission.
pub fn require(identity: &LocalIdentity, permission: &Permission) -> Result<()> {
    if allows(identity, permission) {
        Ok(())
    } else {
        tracing::warn!(
            email = %identity.email,
            role = %identity.role,
            permission = %permission,
            "Permission denied"
        );
        Err(AuthError::permission_denied(permission.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LocalId;
    use chrono::Utc;

    fn identity(role: Role, venue: &str) -> LocalIdentity {
        LocalIdentity {
            local_id: LocalId::new(),
            subject_id: None,
            email: "a@x.com".into(),
            display_name: "a".into(),
            role,
            venue_id: VenueId::parse(venue),
            provider: "password".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_venue_admin_scope() {
        let admin = identity(Role::VenueAdmin, "v1");
        assert!(can_manage_venue(&admin, "v1"));
        assert!(!can_manage_venue(&admin, "v2"));
        assert!(!can_manage_venue(&admin, ""));
    }

    #[test]
    fn test_unscoped_venue_admin_manages_nothing() {
        let admin = identity(Role::VenueAdmin, "");
        assert!(!can_manage_venue(&admin, ""));
        assert!(!can_manage_venue(&admin, "v1"));
    }

    #[test]
    fn test_site_admin_manages_everything() {
        let admin = identity(Role::SiteAdmin, "");
        assert!(can_manage_venue(&admin, "v1"));
        assert!(can_manage_venue(&admin, ""));
        assert!(can_manage_admins(&admin));
    }

    #[test]
    fn test_scanner_scans_but_has_no_dashboard() {
        let scanner = identity(Role::Scanner, "v1");
        assert!(can_scan_tickets(&scanner));
        assert!(!can_access_venue_dashboard(&scanner));
        assert!(!can_manage_venue(&scanner, "v1"));
    }

    #[test]
    fn test_only_site_admins_feature_events() {
        assert!(can_feature_events(&identity(Role::SiteAdmin, "")));
        assert!(!can_feature_events(&identity(Role::VenueAdmin, "v1")));
        assert!(require(&identity(Role::SubAdmin, "v1"), &Permission::FeatureEvents).is_err());
    }

    #[test]
    fn test_plain_user_has_nothing() {
        let user = identity(Role::User, "");
        assert!(!can_scan_tickets(&user));
        assert!(!can_manage_admins(&user));
        assert!(!can_access_venue_dashboard(&user));
    }

    #[test]
    fn test_require_names_missing_permission() {
        let user = identity(Role::SubAdmin, "v1");
        assert_eq!(
            require(&user, &Permission::ManageAdmins),
            Err(AuthError::PermissionDenied {
                required: "manage admins".into()
            })
        );
        assert!(require(&user, &Permission::ManageVenue("v1".into())).is_ok());
    }
}
