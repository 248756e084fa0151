//! Test environment wiring.

use crate::fixtures;
use crate::mocks::test_clock;
use boxoffice_auth::constants::collections::{ADMINS, EVENTS, USERS, VENUES};
use boxoffice_auth::mocks::{
    MockBlobStore, MockDocumentStore, MockIdentityProvider, MockLocalIdentityRepository,
};
use boxoffice_auth::{
    AccessEnvironment, AdminLifecycleManager, EventCatalog, ExternalCredential, IdentityReconciler,
    Role,
};
use std::sync::Arc;

/// Environment type built by [`TestEnvironment`].
pub type MockEnvironment =
    AccessEnvironment<MockIdentityProvider, MockDocumentStore, MockLocalIdentityRepository>;

/// Mock providers plus a fixed clock, with seeding helpers.
///
/// The mocks share state through `Arc`s, so the handles here observe every
/// write the reconciler, the lifecycle manager or the catalog makes.
#[derive(Debug, Clone, Default)]
pub struct TestEnvironment {
    /// Identity provider.
    pub identity: MockIdentityProvider,

    /// Directory store.
    pub store: MockDocumentStore,

    /// Local identity table.
    pub locals: MockLocalIdentityRepository,

    /// Event image store.
    pub blobs: MockBlobStore,
}

impl TestEnvironment {
    /// Empty mocks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Access environment over the shared mocks.
    #[must_use]
    pub fn env(&self) -> MockEnvironment {
        AccessEnvironment::new(
            self.identity.clone(),
            self.store.clone(),
            self.locals.clone(),
            Arc::new(test_clock()),
        )
    }

    /// Reconciler with default configuration.
    #[must_use]
    pub fn reconciler(
        &self,
    ) -> IdentityReconciler<MockIdentityProvider, MockDocumentStore, MockLocalIdentityRepository> {
        IdentityReconciler::new(self.env())
    }

    /// Lifecycle manager with default configuration.
    #[must_use]
    pub fn lifecycle(
        &self,
    ) -> AdminLifecycleManager<MockIdentityProvider, MockDocumentStore, MockLocalIdentityRepository>
    {
        AdminLifecycleManager::new(self.env())
    }

    /// Event catalog over the shared store and image mocks.
    #[must_use]
    pub fn catalog(&self) -> EventCatalog<MockDocumentStore, MockBlobStore> {
        let env = self.env();
        EventCatalog::new(env.directory, self.blobs.clone(), env.clock)
    }

    /// Seed `events/{id}` at a venue.
    pub fn seed_event(&self, id: &str, name: &str, venue_id: &str) {
        self.store
            .insert(EVENTS, id, fixtures::event_document(name, venue_id));
    }

    /// Seed `venues/{id}`.
    pub fn seed_venue(&self, id: &str, name: &str, city: &str) {
        self.store
            .insert(VENUES, id, fixtures::venue_document(name, city));
    }

    /// Seed an admin record and its account; returns the account's credential.
    pub fn seed_admin(
        &self,
        subject_id: &str,
        email: &str,
        role: Role,
        venue_id: &str,
    ) -> ExternalCredential {
        self.store.insert(
            ADMINS,
            subject_id,
            fixtures::admin_document(email, "", role, venue_id),
        );
        self.seed_account(subject_id, email)
    }

    /// Seed a user record and its account; returns the account's credential.
    pub fn seed_user(&self, subject_id: &str, email: &str, display_name: &str) -> ExternalCredential {
        self.store.insert(
            USERS,
            subject_id,
            fixtures::user_document(email, display_name),
        );
        self.seed_account(subject_id, email)
    }

    /// Seed an account with no directory record; returns its credential.
    pub fn seed_account(&self, subject_id: &str, email: &str) -> ExternalCredential {
        self.identity
            .add_account(fixtures::account(subject_id, email));
        ExternalCredential::new(format!("token-{subject_id}"))
    }

    /// Seed the `root` site admin and return it as an actor.
    pub fn seed_site_admin(&self) -> boxoffice_auth::LocalIdentity {
        let actor = fixtures::site_admin();
        self.seed_admin("root", &actor.email, Role::SiteAdmin, "");
        actor
    }
}

/// Install a test-friendly tracing subscriber once per process.
///
/// Honors `RUST_LOG`; output is captured by the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("boxoffice_auth=debug")),
        )
        .with_test_writer()
        .try_init();
}
