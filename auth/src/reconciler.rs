//! Identity reconciliation.
//!
//! Turns a verified external identity into the application's local
//! identity. The directory is authoritative for role, venue scope and
//! display name:
//!
//! ```text
//! admins/{subject} ──found──▶ role, venue, displayName from the admin record
//!        │                   (venue-scoped role without a venue: user)
//!        │ missing
//!        ▼
//! users/{subject}  ──found──▶ role (default user), displayName; no venue
//!        │ missing
//!        ▼
//! default          ─────────▶ user, no venue, displayName = email local part
//! ```
//!
//! All directory reads complete before the local table is touched, so a
//! store outage never leaves a half-written row.

use crate::config::ReconcilerConfig;
use crate::environment::AccessEnvironment;
use crate::error::Result;
use crate::providers::{DocumentStore, IdentityProvider, LocalIdentityRepository};
use crate::state::{
    ExternalCredential, LocalId, LocalIdentity, Role, RoleAssignment, SubjectId, VenueId,
};
use crate::utils::email_local_part;

/// Where a profile was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSource {
    /// `admins/{subject}`
    Admin,
    /// `users/{subject}`
    User,
    /// Neither collection had the subject.
    Default,
}

/// Role, venue and display name resolved from the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryProfile {
    /// Resolved role.
    pub role: Role,

    /// Resolved venue scope.
    pub venue_id: Option<VenueId>,

    /// Resolved display name (never empty).
    pub display_name: String,

    /// Collection the profile came from.
    pub source: ProfileSource,
}

/// Identity reconciler.
#[derive(Clone)]
pub struct IdentityReconciler<P, S, L>
where
    P: IdentityProvider + Clone,
    S: DocumentStore + Clone,
    L: LocalIdentityRepository + Clone,
{
    env: AccessEnvironment<P, S, L>,
    config: ReconcilerConfig,
}

impl<P, S, L> IdentityReconciler<P, S, L>
where
    P: IdentityProvider + Clone,
    S: DocumentStore + Clone,
    L: LocalIdentityRepository + Clone,
{
    /// Create a reconciler with default configuration.
    #[must_use]
    pub fn new(env: AccessEnvironment<P, S, L>) -> Self {
        Self::with_config(env, ReconcilerConfig::default())
    }

    /// Create a reconciler with explicit configuration.
    #[must_use]
    pub const fn with_config(env: AccessEnvironment<P, S, L>, config: ReconcilerConfig) -> Self {
        Self { env, config }
    }

    /// Verify a credential and reconcile the identity behind it.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The credential is rejected → `AuthError::InvalidCredential`
    /// - The identity has no email → `AuthError::MissingEmail`
    /// - The directory or local table is unreachable → `AuthError::StoreUnavailable`
    pub async fn authenticate(&self, credential: &ExternalCredential) -> Result<LocalIdentity> {
        let verified = self.env.identity.verify_token(credential).await?;
        self.reconcile_with_provider(&verified.subject_id, &verified.email, &verified.provider)
            .await
    }

    /// Reconcile a verified identity using the configured default provider.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::StoreUnavailable` if the directory or local table
    /// is unreachable.
    pub async fn reconcile(&self, subject_id: &SubjectId, email: &str) -> Result<LocalIdentity> {
        self.reconcile_with_provider(subject_id, email, &self.config.default_provider)
            .await
    }

    /// Reconcile a verified identity, recording `provider` as its sign-in method.
    ///
    /// Idempotent: with unchanged directory data a second call writes
    /// nothing and returns an identical value.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::StoreUnavailable` if the directory or local table
    /// is unreachable.
    pub async fn reconcile_with_provider(
        &self,
        subject_id: &SubjectId,
        email: &str,
        provider: &str,
    ) -> Result<LocalIdentity> {
        let profile = self.resolve_profile(subject_id, email).await.inspect_err(|e| {
            tracing::error!(subject_id = %subject_id, email, error = %e, "Directory lookup failed");
        })?;

        let existing = match self.env.locals.find_by_subject(subject_id).await? {
            Some(row) => Some(row),
            None => self.env.locals.find_by_email(email).await?,
        };

        let Some(row) = existing else {
            let identity = LocalIdentity {
                local_id: LocalId::new(),
                subject_id: Some(subject_id.clone()),
                email: email.to_string(),
                display_name: profile.display_name,
                role: profile.role,
                venue_id: profile.venue_id,
                provider: provider.to_string(),
                created_at: self.env.clock.now(),
            };
            self.env.locals.insert(&identity).await?;
            tracing::info!(
                subject_id = %subject_id,
                email,
                role = %identity.role,
                "Created local identity"
            );
            return Ok(identity);
        };

        let mut updated = row.clone();
        match &row.subject_id {
            None => updated.subject_id = Some(subject_id.clone()),
            Some(bound) if bound != subject_id => {
                tracing::warn!(
                    subject_id = %subject_id,
                    bound_subject = %bound,
                    email,
                    "Local identity with this email is bound to another subject"
                );
            }
            Some(_) => {}
        }
        updated.role = profile.role;
        updated.venue_id = profile.venue_id;
        updated.display_name = profile.display_name;
        updated.provider = provider.to_string();

        if updated != row {
            self.env.locals.update(&updated).await?;
            tracing::info!(
                subject_id = %subject_id,
                email,
                role = %updated.role,
                "Updated local identity from directory"
            );
        }

        Ok(updated)
    }

    /// Resolve role, venue and display name from the directory.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::StoreUnavailable` if the directory is unreachable.
    pub async fn resolve_profile(
        &self,
        subject_id: &SubjectId,
        email: &str,
    ) -> Result<DirectoryProfile> {
        let directory = &self.env.directory;

        if let Some(admin) = directory.get_admin(subject_id).await? {
            if let Ok(Some(_)) = directory.get_user(subject_id).await {
                tracing::warn!(
                    subject_id = %subject_id,
                    "Subject present in both admins and users, admin record wins"
                );
            }
            let (role, venue_id) = match RoleAssignment::new(admin.role, admin.venue_id) {
                Ok(assignment) => (assignment.role(), assignment.venue_id().cloned()),
                Err(e) => {
                    tracing::warn!(
                        subject_id = %subject_id,
                        role = %admin.role,
                        error = %e,
                        "Admin record has an invalid venue scope, treating as user"
                    );
                    (Role::User, None)
                }
            };
            return Ok(DirectoryProfile {
                role,
                venue_id,
                display_name: display_name_or_local_part(admin.display_name, email),
                source: ProfileSource::Admin,
            });
        }

        if let Some(user) = directory.get_user(subject_id).await? {
            return Ok(DirectoryProfile {
                role: user.role,
                venue_id: None,
                display_name: display_name_or_local_part(user.display_name, email),
                source: ProfileSource::User,
            });
        }

        Ok(DirectoryProfile {
            role: Role::User,
            venue_id: None,
            display_name: email_local_part(email).to_string(),
            source: ProfileSource::Default,
        })
    }
}

fn display_name_or_local_part(display_name: String, email: &str) -> String {
    if display_name.trim().is_empty() {
        email_local_part(email).to_string()
    } else {
        display_name
    }
}
