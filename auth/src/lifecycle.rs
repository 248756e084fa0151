//! Admin lifecycle management.
//!
//! Every operation spans the identity-provider account and the `admins`
//! directory record. Multi-step operations run as a [`Saga`]: when a later
//! step fails, the earlier ones are compensated before the error returns.
//!
//! ```text
//!              create_admin
//! Nonexistent ─────────────▶ Active ◀──────────▶ Deactivated
//!                              │   activate /        │
//!                              │   deactivate        │
//!                              └──── delete_admin ───┴──▶ Deleted
//! ```
//!
//! All operations require the acting identity to hold
//! [`Permission::ManageAdmins`].

use crate::config::LifecycleConfig;
use crate::environment::AccessEnvironment;
use crate::error::{AuthError, Result};
use crate::policy::{Permission, require};
use crate::providers::{
    AdminRecord, Document, DocumentStore, IdentityProvider, LocalIdentityRepository, NewAccount,
    UserRecord,
};
use crate::saga::{Compensation, Saga};
use crate::state::{AdminState, LocalIdentity, Role, RoleAssignment, SubjectId, VenueId};
use crate::utils::{email_local_part, validate_email};
use serde::Serialize;
use serde_json::{Value, json};

/// Request to create an admin.
#[derive(Clone, Default)]
pub struct NewAdmin {
    /// Admin email.
    pub email: String,

    /// One of the three admin roles.
    pub role: Role,

    /// Venue scope, required for venue admins and sub admins.
    pub venue_id: Option<VenueId>,

    /// Display name. Defaults to the email's local part.
    pub display_name: Option<String>,

    /// Initial password. Without one, a password-setup link is generated.
    pub password: Option<String>,
}

impl std::fmt::Debug for NewAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAdmin")
            .field("email", &self.email)
            .field("role", &self.role)
            .field("venue_id", &self.venue_id)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

/// Result of a successful [`AdminLifecycleManager::create_admin`].
#[derive(Debug, Clone, Serialize)]
pub struct CreatedAdmin {
    /// Subject id of the new account.
    pub subject_id: SubjectId,

    /// Directory record as written.
    pub record: AdminRecord,

    /// Password-setup link, when no password was supplied.
    pub password_setup_link: Option<String>,
}

/// Filters for [`AdminLifecycleManager::list_admins`].
#[derive(Debug, Clone, Default)]
pub struct AdminQuery {
    /// Only admins with this role.
    pub role: Option<Role>,

    /// Case-insensitive substring of email or display name.
    pub search: Option<String>,

    /// One-based page number. Out-of-range pages are clamped.
    pub page: usize,

    /// Page size override.
    pub per_page: Option<usize>,
}

/// One row of the admin listing.
#[derive(Debug, Clone, Serialize)]
pub struct AdminSummary {
    /// Subject id.
    pub uid: String,

    /// Directory record.
    #[serde(flatten)]
    pub record: AdminRecord,

    /// Live disabled flag from the identity provider.
    pub account_disabled: bool,

    /// Live email verification flag from the identity provider.
    pub email_verified: bool,
}

impl AdminSummary {
    /// Active both in the directory and at the identity provider.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.record.is_active && !self.account_disabled
    }
}

/// Counts over every admin, ignoring filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AdminStats {
    /// All admins.
    pub total: usize,
    /// Site admins.
    pub site_admins: usize,
    /// Venue admins.
    pub venue_admins: usize,
    /// Sub admins.
    pub sub_admins: usize,
    /// Admins that are active and not disabled.
    pub active: usize,
}

/// One page of the admin listing.
#[derive(Debug, Clone, Serialize)]
pub struct AdminPage {
    /// Admins on this page, sorted by email.
    pub admins: Vec<AdminSummary>,

    /// Page number actually served.
    pub page: usize,

    /// Number of pages (at least one).
    pub total_pages: usize,

    /// Admins matching the filters.
    pub total_matches: usize,

    /// Unfiltered counts.
    pub stats: AdminStats,
}

/// Admin lifecycle manager.
#[derive(Clone)]
pub struct AdminLifecycleManager<P, S, L>
where
    P: IdentityProvider + Clone,
    S: DocumentStore + Clone,
    L: LocalIdentityRepository + Clone,
{
    env: AccessEnvironment<P, S, L>,
    config: LifecycleConfig,
}

impl<P, S, L> AdminLifecycleManager<P, S, L>
where
    P: IdentityProvider + Clone,
    S: DocumentStore + Clone,
    L: LocalIdentityRepository + Clone,
{
    /// Create a manager with default configuration.
    #[must_use]
    pub fn new(env: AccessEnvironment<P, S, L>) -> Self {
        Self::with_config(env, LifecycleConfig::default())
    }

    /// Create a manager with explicit configuration.
    #[must_use]
    pub const fn with_config(env: AccessEnvironment<P, S, L>, config: LifecycleConfig) -> Self {
        Self { env, config }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Create
    // ═══════════════════════════════════════════════════════════════════

    /// Create an identity-provider account and its admin record.
    ///
    /// If the record write fails the new account is deleted again, so at
    /// most one of the two writes survives a failure (and normally neither).
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The actor is not a site admin → `AuthError::PermissionDenied`
    /// - The email is malformed → `AuthError::InvalidEmail`
    /// - The role is not an admin role → `AuthError::InvalidRole`
    /// - A venue-scoped role has no venue → `AuthError::MissingVenue`
    /// - The password is too short → `AuthError::WeakPassword`
    /// - The venue is not in the catalog → `AuthError::UnknownVenue`
    /// - The email is already in use → `AuthError::DuplicateEmail`
    /// - The provider or the store fails
    pub async fn create_admin(&self, actor: &LocalIdentity, request: NewAdmin) -> Result<CreatedAdmin> {
        let target = request.email.clone();
        audit("create_admin", &target, self.try_create_admin(actor, request).await)
    }

    async fn try_create_admin(&self, actor: &LocalIdentity, request: NewAdmin) -> Result<CreatedAdmin> {
        require(actor, &Permission::ManageAdmins)?;

        let email = validate_email(&request.email)?;
        let assignment = RoleAssignment::admin(request.role, request.venue_id)?;
        if let Some(password) = &request.password {
            if password.chars().count() < self.config.min_password_length {
                return Err(AuthError::WeakPassword {
                    min_length: self.config.min_password_length,
                });
            }
        }
        self.ensure_venue_exists(&assignment).await?;
        self.ensure_email_unused(&email).await?;

        let display_name = request
            .display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| email_local_part(&email).to_string());

        let mut saga = Saga::new("create_admin");
        let account = self
            .env
            .identity
            .create_account(
                &NewAccount::new(&email, &display_name).with_password(request.password.clone()),
            )
            .await?;
        let subject_id = account.subject_id;
        saga.record(Compensation::DeleteAccount(subject_id.clone()));

        let record = AdminRecord {
            email: email.clone(),
            display_name,
            role: assignment.role(),
            venue_id: assignment.venue_id().cloned(),
            is_active: true,
            disabled: false,
            created_at: Some(self.env.clock.now()),
            created_by: Some(actor.email.clone()),
            provider: self.config.account_provider.clone(),
            updated_at: None,
            email_verified: Some(false),
            password_set: Some(false),
        };

        if let Err(e) = self.env.directory.set_admin(&subject_id, &record).await {
            tracing::error!(
                subject_id = %subject_id,
                email = %email,
                error = %e,
                "Admin record write failed, removing created account"
            );
            saga.compensate(&self.env.identity, &self.env.directory).await;
            return Err(e);
        }

        let password_setup_link = if request.password.is_none() {
            match self.env.identity.generate_password_reset_link(&email).await {
                Ok(link) => Some(link),
                Err(e) => {
                    tracing::warn!(
                        subject_id = %subject_id,
                        email = %email,
                        error = %e,
                        "Could not generate password setup link"
                    );
                    None
                }
            }
        } else {
            None
        };

        tracing::info!(
            subject_id = %subject_id,
            email = %email,
            role = %record.role,
            created_by = %actor.email,
            "Created admin"
        );

        Ok(CreatedAdmin {
            subject_id,
            record,
            password_setup_link,
        })
    }

    // ═══════════════════════════════════════════════════════════════════
    // Update
    // ═══════════════════════════════════════════════════════════════════

    /// Change an admin's role and venue scope.
    ///
    /// The directory record is the source of truth; the matching local
    /// identity is synced best effort.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The actor is not a site admin → `AuthError::PermissionDenied`
    /// - The role or venue is invalid → `AuthError::InvalidRole` / `AuthError::MissingVenue` / `AuthError::UnknownVenue`
    /// - No admin record exists → `AuthError::NotFound`
    /// - The store fails
    pub async fn update_admin_role(
        &self,
        actor: &LocalIdentity,
        subject_id: &SubjectId,
        role: Role,
        venue_id: Option<VenueId>,
    ) -> Result<AdminRecord> {
        audit(
            "update_admin_role",
            subject_id.as_str(),
            self.try_update_admin_role(actor, subject_id, role, venue_id)
                .await,
        )
    }

    async fn try_update_admin_role(
        &self,
        actor: &LocalIdentity,
        subject_id: &SubjectId,
        role: Role,
        venue_id: Option<VenueId>,
    ) -> Result<AdminRecord> {
        require(actor, &Permission::ManageAdmins)?;

        let assignment = RoleAssignment::admin(role, venue_id)?;
        let mut record = self.existing_admin(subject_id).await?;
        self.ensure_venue_exists(&assignment).await?;

        let now = self.env.clock.now();
        let fields = document(json!({
            "role": assignment.role().as_str(),
            "venueId": assignment.venue_id().map_or("", VenueId::as_str),
            "updatedAt": now,
        }));
        self.env.directory.update_admin(subject_id, &fields).await?;

        record.role = assignment.role();
        record.venue_id = assignment.venue_id().cloned();
        record.updated_at = Some(now);

        if let Err(e) = self
            .sync_local(subject_id, &record.email, record.role, record.venue_id.clone())
            .await
        {
            tracing::warn!(
                subject_id = %subject_id,
                email = %record.email,
                error = %e,
                "Local identity sync failed after role update"
            );
        }

        tracing::info!(
            subject_id = %subject_id,
            role = %record.role,
            updated_by = %actor.email,
            "Updated admin role"
        );
        Ok(record)
    }

    /// Change an admin's display name on the record and the account.
    ///
    /// The record is written first; if the account update then fails the
    /// previous record is restored.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The actor is not a site admin → `AuthError::PermissionDenied`
    /// - No admin record exists → `AuthError::NotFound`
    /// - The provider or the store fails
    pub async fn rename_admin(
        &self,
        actor: &LocalIdentity,
        subject_id: &SubjectId,
        display_name: &str,
    ) -> Result<AdminRecord> {
        audit(
            "rename_admin",
            subject_id.as_str(),
            self.try_rename_admin(actor, subject_id, display_name).await,
        )
    }

    async fn try_rename_admin(
        &self,
        actor: &LocalIdentity,
        subject_id: &SubjectId,
        display_name: &str,
    ) -> Result<AdminRecord> {
        require(actor, &Permission::ManageAdmins)?;

        let (previous, snapshot) = self.existing_admin_with_snapshot(subject_id).await?;
        let display_name = match display_name.trim() {
            "" => email_local_part(&previous.email).to_string(),
            name => name.to_string(),
        };
        if display_name == previous.display_name {
            return Ok(previous);
        }

        let now = self.env.clock.now();
        let mut saga = Saga::new("rename_admin");
        self.env
            .directory
            .update_admin(
                subject_id,
                &document(json!({ "displayName": display_name, "updatedAt": now })),
            )
            .await?;
        saga.record(Compensation::RestoreAdminRecord {
            subject_id: subject_id.clone(),
            snapshot,
        });

        if let Err(e) = self
            .env
            .identity
            .update_display_name(subject_id, &display_name)
            .await
        {
            tracing::error!(
                subject_id = %subject_id,
                error = %e,
                "Account rename failed, restoring admin record"
            );
            saga.compensate(&self.env.identity, &self.env.directory).await;
            return Err(e);
        }

        tracing::info!(subject_id = %subject_id, renamed_by = %actor.email, "Renamed admin");
        Ok(AdminRecord {
            display_name,
            updated_at: Some(now),
            ..previous
        })
    }

    // ═══════════════════════════════════════════════════════════════════
    // Activate / deactivate
    // ═══════════════════════════════════════════════════════════════════

    /// Re-enable a deactivated admin.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The actor is not a site admin → `AuthError::PermissionDenied`
    /// - No admin record exists → `AuthError::NotFound`
    /// - The admin is already active → `AuthError::InvalidStateTransition`
    /// - The provider or the store fails
    pub async fn activate_admin(&self, actor: &LocalIdentity, subject_id: &SubjectId) -> Result<()> {
        audit(
            "activate_admin",
            subject_id.as_str(),
            self.transition(actor, subject_id, AdminState::Active).await,
        )
    }

    /// Disable an active admin.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The actor is not a site admin → `AuthError::PermissionDenied`
    /// - No admin record exists → `AuthError::NotFound`
    /// - The admin is already deactivated → `AuthError::InvalidStateTransition`
    /// - The provider or the store fails
    pub async fn deactivate_admin(&self, actor: &LocalIdentity, subject_id: &SubjectId) -> Result<()> {
        audit(
            "deactivate_admin",
            subject_id.as_str(),
            self.transition(actor, subject_id, AdminState::Deactivated)
                .await,
        )
    }

    async fn transition(
        &self,
        actor: &LocalIdentity,
        subject_id: &SubjectId,
        target: AdminState,
    ) -> Result<()> {
        require(actor, &Permission::ManageAdmins)?;

        let record = self.existing_admin(subject_id).await?;
        let current = record.state();
        if !current.can_toggle_to(target) {
            return Err(AuthError::InvalidStateTransition {
                from: current,
                to: target,
            });
        }

        let disable = target == AdminState::Deactivated;
        let previously_disabled = self.env.identity.get_account(subject_id).await?.disabled;

        let mut saga = Saga::new(if disable {
            "deactivate_admin"
        } else {
            "activate_admin"
        });
        self.env.identity.set_disabled(subject_id, disable).await?;
        saga.record(Compensation::RestoreDisabled {
            subject_id: subject_id.clone(),
            disabled: previously_disabled,
        });

        let stamp = if disable { "deactivatedAt" } else { "reactivatedAt" };
        let mut fields = document(json!({
            "isActive": !disable,
            "disabled": disable,
        }));
        fields.insert(stamp.to_string(), json!(self.env.clock.now()));

        if let Err(e) = self.env.directory.update_admin(subject_id, &fields).await {
            tracing::error!(
                subject_id = %subject_id,
                error = %e,
                "Admin record update failed, restoring account flag"
            );
            saga.compensate(&self.env.identity, &self.env.directory).await;
            return Err(e);
        }

        tracing::info!(
            subject_id = %subject_id,
            state = ?target,
            changed_by = %actor.email,
            "Changed admin state"
        );
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Delete
    // ═══════════════════════════════════════════════════════════════════

    /// Permanently delete an admin's record and account.
    ///
    /// The record goes first; if the account deletion then fails the record
    /// is restored from its snapshot. Afterwards the matching local identity
    /// is removed best effort.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The actor is not a site admin → `AuthError::PermissionDenied`
    /// - The subject is the actor → `AuthError::SelfDeletionForbidden`
    /// - No admin record exists → `AuthError::NotFound`
    /// - The provider or the store fails
    pub async fn delete_admin(&self, actor: &LocalIdentity, subject_id: &SubjectId) -> Result<()> {
        audit(
            "delete_admin",
            subject_id.as_str(),
            self.try_delete_admin(actor, subject_id).await,
        )
    }

    async fn try_delete_admin(&self, actor: &LocalIdentity, subject_id: &SubjectId) -> Result<()> {
        require(actor, &Permission::ManageAdmins)?;
        self.ensure_not_self(actor, subject_id).await?;

        let (record, snapshot) = self.existing_admin_with_snapshot(subject_id).await?;
        let current = record.state();
        if !current.can_transition_to(AdminState::Deleted) {
            return Err(AuthError::InvalidStateTransition {
                from: current,
                to: AdminState::Deleted,
            });
        }

        let mut saga = Saga::new("delete_admin");
        self.env.directory.delete_admin(subject_id).await?;
        saga.record(Compensation::RestoreAdminRecord {
            subject_id: subject_id.clone(),
            snapshot,
        });

        match self.env.identity.delete_account(subject_id).await {
            Ok(()) => {}
            Err(AuthError::NotFound(_)) => {
                tracing::warn!(
                    subject_id = %subject_id,
                    email = %record.email,
                    "Admin had no identity account, record removed"
                );
            }
            Err(e) => {
                tracing::error!(
                    subject_id = %subject_id,
                    email = %record.email,
                    error = %e,
                    "Account deletion failed, restoring admin record"
                );
                saga.compensate(&self.env.identity, &self.env.directory).await;
                return Err(e);
            }
        }

        if let Err(e) = self.remove_local(subject_id, &record.email).await {
            tracing::warn!(
                subject_id = %subject_id,
                email = %record.email,
                error = %e,
                "Local identity cleanup failed after admin deletion"
            );
        }

        tracing::info!(
            subject_id = %subject_id,
            email = %record.email,
            from = ?current,
            deleted_by = %actor.email,
            "Deleted admin"
        );
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Password reset
    // ═══════════════════════════════════════════════════════════════════

    /// Generate a password reset link for `email`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The actor is not a site admin → `AuthError::PermissionDenied`
    /// - The email is malformed → `AuthError::InvalidEmail`
    /// - No account uses the email → `AuthError::NotFound`
    /// - The provider fails
    pub async fn send_password_reset(&self, actor: &LocalIdentity, email: &str) -> Result<String> {
        let result = async {
            require(actor, &Permission::ManageAdmins)?;
            let email = validate_email(email)?;
            let link = self
                .env
                .identity
                .generate_password_reset_link(&email)
                .await?;
            tracing::info!(email = %email, requested_by = %actor.email, "Generated password reset link");
            Ok::<_, AuthError>(link)
        }
        .await;
        audit("send_password_reset", email, result)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Promotion / demotion
    // ═══════════════════════════════════════════════════════════════════

    /// Move a `users` record into `admins` with the given role.
    ///
    /// The admin record is written before the user record is removed; if
    /// the removal fails the admin record is deleted again, so the subject
    /// ends in exactly one collection.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The actor is not a site admin → `AuthError::PermissionDenied`
    /// - The role or venue is invalid
    /// - No user record exists → `AuthError::NotFound`
    /// - The subject already has an admin record → `AuthError::DuplicateEmail`
    /// - The store fails
    pub async fn promote_user(
        &self,
        actor: &LocalIdentity,
        subject_id: &SubjectId,
        role: Role,
        venue_id: Option<VenueId>,
    ) -> Result<AdminRecord> {
        audit(
            "promote_user",
            subject_id.as_str(),
            self.try_promote_user(actor, subject_id, role, venue_id)
                .await,
        )
    }

    async fn try_promote_user(
        &self,
        actor: &LocalIdentity,
        subject_id: &SubjectId,
        role: Role,
        venue_id: Option<VenueId>,
    ) -> Result<AdminRecord> {
        require(actor, &Permission::ManageAdmins)?;

        let assignment = RoleAssignment::admin(role, venue_id)?;
        let user = self
            .env
            .directory
            .get_user(subject_id)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("user {subject_id}")))?;
        if self.env.directory.get_admin(subject_id).await?.is_some() {
            return Err(AuthError::DuplicateEmail { email: user.email });
        }
        self.ensure_venue_exists(&assignment).await?;

        let display_name = if user.display_name.trim().is_empty() {
            email_local_part(&user.email).to_string()
        } else {
            user.display_name.clone()
        };
        let record = AdminRecord {
            email: user.email.clone(),
            display_name,
            role: assignment.role(),
            venue_id: assignment.venue_id().cloned(),
            is_active: true,
            disabled: false,
            created_at: Some(self.env.clock.now()),
            created_by: Some(actor.email.clone()),
            provider: self.config.account_provider.clone(),
            updated_at: None,
            email_verified: None,
            password_set: None,
        };

        let mut saga = Saga::new("promote_user");
        self.env.directory.set_admin(subject_id, &record).await?;
        saga.record(Compensation::DeleteAdminRecord(subject_id.clone()));

        if let Err(e) = self.env.directory.delete_user(subject_id).await {
            saga.compensate(&self.env.identity, &self.env.directory).await;
            return Err(e);
        }

        if let Err(e) = self
            .sync_local(subject_id, &record.email, record.role, record.venue_id.clone())
            .await
        {
            tracing::warn!(subject_id = %subject_id, error = %e, "Local identity sync failed after promotion");
        }

        tracing::info!(
            subject_id = %subject_id,
            role = %record.role,
            promoted_by = %actor.email,
            "Promoted user to admin"
        );
        Ok(record)
    }

    /// Move an `admins` record back into `users` with role `user`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The actor is not a site admin → `AuthError::PermissionDenied`
    /// - The subject is the actor → `AuthError::SelfDeletionForbidden`
    /// - No admin record exists → `AuthError::NotFound`
    /// - The store fails
    pub async fn demote_admin(&self, actor: &LocalIdentity, subject_id: &SubjectId) -> Result<UserRecord> {
        audit(
            "demote_admin",
            subject_id.as_str(),
            self.try_demote_admin(actor, subject_id).await,
        )
    }

    async fn try_demote_admin(
        &self,
        actor: &LocalIdentity,
        subject_id: &SubjectId,
    ) -> Result<UserRecord> {
        require(actor, &Permission::ManageAdmins)?;
        self.ensure_not_self(actor, subject_id).await?;

        let admin = self.existing_admin(subject_id).await?;
        let user = UserRecord {
            email: admin.email.clone(),
            display_name: admin.display_name.clone(),
            role: Role::User,
            created_at: admin.created_at.or_else(|| Some(self.env.clock.now())),
        };

        let mut saga = Saga::new("demote_admin");
        self.env.directory.set_user(subject_id, &user).await?;
        saga.record(Compensation::DeleteUserRecord(subject_id.clone()));

        if let Err(e) = self.env.directory.delete_admin(subject_id).await {
            saga.compensate(&self.env.identity, &self.env.directory).await;
            return Err(e);
        }

        if let Err(e) = self
            .sync_local(subject_id, &user.email, Role::User, None)
            .await
        {
            tracing::warn!(subject_id = %subject_id, error = %e, "Local identity sync failed after demotion");
        }

        tracing::info!(
            subject_id = %subject_id,
            demoted_by = %actor.email,
            "Demoted admin to user"
        );
        Ok(user)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════

    /// List admins with filters, pagination and unfiltered stats.
    ///
    /// Each entry carries the account's live disabled flag; when the
    /// provider lookup fails the record's mirrored flag is used instead.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The actor is not a site admin → `AuthError::PermissionDenied`
    /// - The store fails
    pub async fn list_admins(&self, actor: &LocalIdentity, query: AdminQuery) -> Result<AdminPage> {
        let result = async {
            require(actor, &Permission::ManageAdmins)?;
            let records = self.env.directory.list_admins().await?;
            Ok::<_, AuthError>(self.build_page(records, &query).await)
        }
        .await;
        audit("list_admins", &actor.email, result)
    }

    async fn build_page(&self, records: Vec<(String, AdminRecord)>, query: &AdminQuery) -> AdminPage {
        let identity = &self.env.identity;
        let mut summaries: Vec<AdminSummary> =
            futures::future::join_all(records.into_iter().map(|(uid, record)| async move {
                let account = match SubjectId::new(uid.as_str()) {
                    Ok(subject_id) => identity.get_account(&subject_id).await.ok(),
                    Err(_) => None,
                };
                if account.is_none() {
                    tracing::debug!(uid = %uid, "No live account data for admin");
                }
                AdminSummary {
                    account_disabled: account.as_ref().map_or(record.disabled, |a| a.disabled),
                    email_verified: account.as_ref().is_some_and(|a| a.email_verified),
                    uid,
                    record,
                }
            }))
            .await;
        summaries.sort_by(|a, b| a.record.email.cmp(&b.record.email));

        let stats = AdminStats {
            total: summaries.len(),
            site_admins: count_role(&summaries, Role::SiteAdmin),
            venue_admins: count_role(&summaries, Role::VenueAdmin),
            sub_admins: count_role(&summaries, Role::SubAdmin),
            active: summaries.iter().filter(|s| s.is_active()).count(),
        };

        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let matches: Vec<AdminSummary> = summaries
            .into_iter()
            .filter(|s| query.role.is_none_or(|role| s.record.role == role))
            .filter(|s| {
                search.as_deref().is_none_or(|needle| {
                    s.record.email.to_lowercase().contains(needle)
                        || s.record.display_name.to_lowercase().contains(needle)
                })
            })
            .collect();

        let per_page = query.per_page.unwrap_or(self.config.per_page).max(1);
        let total_matches = matches.len();
        let total_pages = total_matches.div_ceil(per_page).max(1);
        let page = query.page.clamp(1, total_pages);

        AdminPage {
            admins: matches
                .into_iter()
                .skip((page - 1) * per_page)
                .take(per_page)
                .collect(),
            page,
            total_pages,
            total_matches,
            stats,
        }
    }

    /// Current lifecycle state of an admin.
    ///
    /// # Errors
    ///
    /// Returns error if the store fails.
    pub async fn admin_state(&self, subject_id: &SubjectId) -> Result<AdminState> {
        Ok(self
            .env
            .directory
            .get_admin(subject_id)
            .await?
            .map_or(AdminState::Nonexistent, |record| record.state()))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Helpers
    // ═══════════════════════════════════════════════════════════════════

    async fn existing_admin(&self, subject_id: &SubjectId) -> Result<AdminRecord> {
        self.env
            .directory
            .get_admin(subject_id)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("admin {subject_id}")))
    }

    /// Typed record plus the raw document it was decoded from.
    async fn existing_admin_with_snapshot(
        &self,
        subject_id: &SubjectId,
    ) -> Result<(AdminRecord, Document)> {
        let snapshot = self
            .env
            .directory
            .admin_snapshot(subject_id)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("admin {subject_id}")))?;
        let record = serde_json::from_value(Value::Object(snapshot.clone()))?;
        Ok((record, snapshot))
    }

    async fn ensure_venue_exists(&self, assignment: &RoleAssignment) -> Result<()> {
        let Some(venue_id) = assignment.venue_id() else {
            return Ok(());
        };
        if self.env.directory.get_venue(venue_id.as_str()).await?.is_none() {
            return Err(AuthError::UnknownVenue {
                venue_id: venue_id.to_string(),
            });
        }
        Ok(())
    }

    async fn ensure_email_unused(&self, email: &str) -> Result<()> {
        let taken = self.env.identity.get_account_by_email(email).await?.is_some()
            || self.env.directory.find_admin_by_email(email).await?.is_some()
            || self.env.directory.find_user_by_email(email).await?.is_some();
        if taken {
            return Err(AuthError::DuplicateEmail {
                email: email.to_string(),
            });
        }
        Ok(())
    }

    /// Refuse when `subject_id` is the actor's own account.
    ///
    /// Legacy actors without a subject id are resolved to their admin
    /// record through the provider's email lookup.
    async fn ensure_not_self(&self, actor: &LocalIdentity, subject_id: &SubjectId) -> Result<()> {
        let is_self = match &actor.subject_id {
            Some(own) => own == subject_id,
            None => self
                .env
                .directory
                .get_admin_by_email(&self.env.identity, &actor.email)
                .await?
                .is_some_and(|(own, _)| own == *subject_id),
        };
        if is_self {
            return Err(AuthError::SelfDeletionForbidden);
        }
        Ok(())
    }

    async fn find_local(&self, subject_id: &SubjectId, email: &str) -> Result<Option<LocalIdentity>> {
        match self.env.locals.find_by_subject(subject_id).await? {
            Some(row) => Ok(Some(row)),
            None => self.env.locals.find_by_email(email).await,
        }
    }

    async fn sync_local(
        &self,
        subject_id: &SubjectId,
        email: &str,
        role: Role,
        venue_id: Option<VenueId>,
    ) -> Result<()> {
        let Some(row) = self.find_local(subject_id, email).await? else {
            return Ok(());
        };
        let mut updated = row.clone();
        updated.role = role;
        updated.venue_id = venue_id;
        if updated != row {
            self.env.locals.update(&updated).await?;
        }
        Ok(())
    }

    async fn remove_local(&self, subject_id: &SubjectId, email: &str) -> Result<()> {
        if let Some(row) = self.find_local(subject_id, email).await? {
            self.env.locals.delete(row.local_id).await?;
        }
        Ok(())
    }
}

fn count_role(summaries: &[AdminSummary], role: Role) -> usize {
    summaries.iter().filter(|s| s.record.role == role).count()
}

fn document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}

/// Log a failed lifecycle operation with its target.
fn audit<T>(operation: &'static str, target: &str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        if e.is_user_error() || matches!(e, AuthError::NotFound(_)) {
            tracing::warn!(operation, target, error = %e, "Admin operation rejected");
        } else if e.is_security_issue() {
            tracing::warn!(operation, target, error = %e, security = true, "Admin operation denied");
        } else {
            tracing::error!(operation, target, error = %e, "Admin operation failed");
        }
    }
    result
}
