//! # Box Office Access Control
//!
//! Identity reconciliation, role/venue authorization and admin lifecycle
//! management for the box office backend.
//!
//! ## Architecture
//!
//! ```text
//! bearer token ─▶ IdentityProvider::verify_token ─▶ VerifiedIdentity
//!                                                        │
//!                        Directory (admins / users) ◀────┤ IdentityReconciler
//!                                                        ▼
//!                                   LocalIdentityRepository ─▶ LocalIdentity
//!                                                        │
//!                                                policy::require(..)
//!                                                        │
//!                          AdminLifecycleManager (sagas) / EventCatalog
//! ```
//!
//! External systems sit behind the traits in [`providers`]: the identity
//! provider, the shared document directory, the local identity table and
//! the event image store.
//! Production implementations live in [`providers::identity_toolkit`] and
//! [`stores`]; in-memory mocks in `mocks` (feature `test-utils`).
//!
//! ## Example: authenticate and authorize
//!
//! ```rust,ignore
//! use boxoffice_auth::{IdentityReconciler, policy};
//!
//! let identity = reconciler.authenticate(&ExternalCredential::new(token)).await?;
//! if policy::can_manage_venue(&identity, "v1") {
//!     // ...
//! }
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod catalog;
pub mod config;
pub mod constants;
pub mod directory;
pub mod environment;
pub mod error;
pub mod lifecycle;
pub mod policy;
pub mod providers;
pub mod reconciler;
pub mod saga;
pub mod state;
pub mod stores;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

#[cfg(feature = "axum")]
pub mod handlers;
#[cfg(feature = "axum")]
pub mod router;

// Re-export main types for convenience
pub use catalog::{EventCatalog, EventDraft, EventEntry, EventImage, EventListing};
pub use config::{LifecycleConfig, ReconcilerConfig};
pub use directory::Directory;
pub use environment::{AccessEnvironment, Clock, SystemClock};
pub use error::{AuthError, Result};
pub use lifecycle::{AdminLifecycleManager, AdminPage, AdminQuery, CreatedAdmin, NewAdmin};
pub use reconciler::IdentityReconciler;
pub use state::{
    AdminState, ExternalCredential, LocalId, LocalIdentity, Role, RoleAssignment, SubjectId,
    VenueId, VerifiedIdentity,
};
