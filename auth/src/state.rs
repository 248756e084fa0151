//! Core identity and role types.
//!
//! All types are `Clone` and serializable so they can be stored in the local
//! identity table and returned from HTTP handlers unchanged.

use crate::error::{AuthError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Identity-provider subject identifier (the provider's user id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    /// Wrap a subject identifier.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredential` if the identifier is blank.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AuthError::InvalidCredential);
        }
        Ok(Self(value))
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable identifier of a local identity row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalId(pub uuid::Uuid);

impl LocalId {
    /// Generate a new random `LocalId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for LocalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Venue identifier. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VenueId(String);

impl VenueId {
    /// Parse a venue identifier, treating blank input as "no venue".
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serde adapter for optional venue fields stored as strings.
///
/// `None` is written as `""`; `""`, `null` and a missing field all read back
/// as `None`. Use with `#[serde(default, with = "venue_field")]`.
pub mod venue_field {
    use super::{Deserialize, Deserializer, Serializer, VenueId};

    /// Serialize an optional venue as a string.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S>(venue: &Option<VenueId>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(venue.as_ref().map_or("", VenueId::as_str))
    }

    /// Deserialize an optional venue from a nullable string.
    ///
    /// # Errors
    ///
    /// Fails if the value is neither a string nor null.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<VenueId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(VenueId::parse))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Roles
// ═══════════════════════════════════════════════════════════════════════

/// Application role.
///
/// Wire values: `"user" | "scanner" | "subAdmin" | "venueAdmin" | "siteAdmin"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    /// Regular ticket buyer.
    #[default]
    User,
    /// Door staff allowed to scan tickets.
    Scanner,
    /// Venue-scoped assistant administrator.
    SubAdmin,
    /// Venue-scoped administrator.
    VenueAdmin,
    /// Site-wide administrator.
    SiteAdmin,
}

impl Role {
    /// Roles that live in the `admins` collection.
    pub const ADMIN_ROLES: [Self; 3] = [Self::SiteAdmin, Self::VenueAdmin, Self::SubAdmin];

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Scanner => "scanner",
            Self::SubAdmin => "subAdmin",
            Self::VenueAdmin => "venueAdmin",
            Self::SiteAdmin => "siteAdmin",
        }
    }

    /// Whether this role belongs in the `admins` collection.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::SiteAdmin | Self::VenueAdmin | Self::SubAdmin)
    }

    /// Whether this role must carry a venue scope.
    #[must_use]
    pub const fn requires_venue(self) -> bool {
        matches!(self, Self::VenueAdmin | Self::SubAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "user" => Ok(Self::User),
            "scanner" => Ok(Self::Scanner),
            "subAdmin" => Ok(Self::SubAdmin),
            "venueAdmin" => Ok(Self::VenueAdmin),
            "siteAdmin" => Ok(Self::SiteAdmin),
            other => Err(AuthError::InvalidRole {
                role: other.to_string(),
            }),
        }
    }
}

/// Deserialize a role from a directory document without failing the whole
/// document. Unknown or missing values fall back to [`Role::User`].
///
/// # Errors
///
/// Fails only if the value is neither a string nor null.
pub fn lenient_role<'de, D>(deserializer: D) -> std::result::Result<Role, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(match raw {
        None => Role::User,
        Some(value) => value.parse().unwrap_or_else(|_| {
            tracing::warn!(role = %value, "Unknown role in directory document, treating as user");
            Role::User
        }),
    })
}

/// A role together with its venue scope, validated at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    role: Role,
    venue_id: Option<VenueId>,
}

impl RoleAssignment {
    /// Build an assignment for any role.
    ///
    /// Site admins are never venue-scoped, so a supplied venue is dropped.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingVenue` if the role requires a venue and none is supplied.
    pub fn new(role: Role, venue_id: Option<VenueId>) -> Result<Self> {
        if role.requires_venue() && venue_id.is_none() {
            return Err(AuthError::MissingVenue {
                role: role.to_string(),
            });
        }
        let venue_id = if role == Role::SiteAdmin { None } else { venue_id };
        Ok(Self { role, venue_id })
    }

    /// Build an assignment restricted to the three admin roles.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidRole` for `user` and `scanner`
    /// - `AuthError::MissingVenue` as in [`RoleAssignment::new`]
    pub fn admin(role: Role, venue_id: Option<VenueId>) -> Result<Self> {
        if !role.is_admin() {
            return Err(AuthError::InvalidRole {
                role: role.to_string(),
            });
        }
        Self::new(role, venue_id)
    }

    /// The assigned role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// The venue scope, if any.
    #[must_use]
    pub const fn venue_id(&self) -> Option<&VenueId> {
        self.venue_id.as_ref()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Credentials and identities
// ═══════════════════════════════════════════════════════════════════════

/// Opaque bearer token presented by a client. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct ExternalCredential(String);

impl ExternalCredential {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the raw token.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ExternalCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ExternalCredential(<redacted>)")
    }
}

/// Identity returned by the identity provider after verifying a credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    /// Provider subject id.
    pub subject_id: SubjectId,

    /// Verified email address.
    pub email: String,

    /// Sign-in method reported by the provider (e.g. `password`, `google.com`).
    pub provider: String,

    /// Remaining token claims.
    pub claims: serde_json::Map<String, serde_json::Value>,
}

/// The application's own durable identity row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalIdentity {
    /// Stable local identifier.
    pub local_id: LocalId,

    /// Provider subject id. Legacy rows may lack it.
    pub subject_id: Option<SubjectId>,

    /// Email address (unique).
    pub email: String,

    /// Display name.
    pub display_name: String,

    /// Role copied from the directory.
    pub role: Role,

    /// Venue scope copied from the directory.
    pub venue_id: Option<VenueId>,

    /// Sign-in provider.
    pub provider: String,

    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
}

// ═══════════════════════════════════════════════════════════════════════
// Admin lifecycle
// ═══════════════════════════════════════════════════════════════════════

/// Lifecycle state of an admin account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminState {
    /// No admin record exists.
    Nonexistent,
    /// Account enabled and record active.
    Active,
    /// Account disabled or record inactive.
    Deactivated,
    /// Removed permanently. Terminal; once the record is gone a lookup
    /// reports [`AdminState::Nonexistent`].
    Deleted,
}

impl AdminState {
    /// Whether `self -> to` is a legal activation toggle.
    #[must_use]
    pub const fn can_toggle_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Active, Self::Deactivated) | (Self::Deactivated, Self::Active)
        )
    }

    /// Whether `self -> to` is an edge of the admin state machine.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        self.can_toggle_to(to)
            || matches!(
                (self, to),
                (Self::Nonexistent, Self::Active)
                    | (Self::Active | Self::Deactivated, Self::Deleted)
            )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_values_round_trip() {
        for role in [
            Role::User,
            Role::Scanner,
            Role::SubAdmin,
            Role::VenueAdmin,
            Role::SiteAdmin,
        ] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        assert_eq!(
            "superuser".parse::<Role>(),
            Err(AuthError::InvalidRole {
                role: "superuser".into()
            })
        );
    }

    #[test]
    fn test_venue_scoped_roles_need_a_venue() {
        assert_eq!(
            RoleAssignment::admin(Role::VenueAdmin, None),
            Err(AuthError::MissingVenue {
                role: "venueAdmin".into()
            })
        );
        assert!(RoleAssignment::admin(Role::SubAdmin, VenueId::parse("v1")).is_ok());
        assert!(RoleAssignment::new(Role::Scanner, None).is_ok());
    }

    #[test]
    fn test_site_admin_drops_venue() {
        let assignment = RoleAssignment::admin(Role::SiteAdmin, VenueId::parse("v1")).unwrap();
        assert_eq!(assignment.venue_id(), None);
    }

    #[test]
    fn test_admin_assignment_rejects_non_admin_roles() {
        assert!(matches!(
            RoleAssignment::admin(Role::Scanner, None),
            Err(AuthError::InvalidRole { .. })
        ));
    }

    #[test]
    fn test_blank_venue_is_none() {
        assert_eq!(VenueId::parse("   "), None);
        assert_eq!(VenueId::parse(" v2 ").unwrap().as_str(), "v2");
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = ExternalCredential::new("secret-token");
        assert!(!format!("{credential:?}").contains("secret-token"));
    }

    #[test]
    fn test_toggle_transitions() {
        assert!(AdminState::Active.can_toggle_to(AdminState::Deactivated));
        assert!(AdminState::Deactivated.can_toggle_to(AdminState::Active));
        assert!(!AdminState::Active.can_toggle_to(AdminState::Active));
        assert!(!AdminState::Deleted.can_toggle_to(AdminState::Active));
    }

    #[test]
    fn test_deleted_is_terminal() {
        assert!(AdminState::Active.can_transition_to(AdminState::Deleted));
        assert!(AdminState::Deactivated.can_transition_to(AdminState::Deleted));
        assert!(AdminState::Nonexistent.can_transition_to(AdminState::Active));
        assert!(!AdminState::Nonexistent.can_transition_to(AdminState::Deleted));
        for to in [AdminState::Active, AdminState::Deactivated, AdminState::Nonexistent] {
            assert!(!AdminState::Deleted.can_transition_to(to));
        }
    }
}
