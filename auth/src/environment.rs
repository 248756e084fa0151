//! Access-control environment.
//!
//! Clients are constructed once by the application and injected here; no
//! component reaches for a global handle.

use crate::directory::Directory;
use crate::providers::{DocumentStore, IdentityProvider, LocalIdentityRepository};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Get the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Access-control environment.
///
/// # Type Parameters
///
/// - `P`: Identity provider (token verification and account service)
/// - `S`: Directory document store
/// - `L`: Local identity repository
#[derive(Clone)]
pub struct AccessEnvironment<P, S, L>
where
    P: IdentityProvider + Clone,
    S: DocumentStore + Clone,
    L: LocalIdentityRepository + Clone,
{
    /// Identity provider.
    pub identity: P,

    /// Typed view over the shared directory.
    pub directory: Directory<S>,

    /// Local identity table.
    pub locals: L,

    /// Clock for record timestamps.
    pub clock: Arc<dyn Clock>,
}

impl<P, S, L> AccessEnvironment<P, S, L>
where
    P: IdentityProvider + Clone,
    S: DocumentStore + Clone,
    L: LocalIdentityRepository + Clone,
{
    /// Create a new access environment.
    #[must_use]
    pub fn new(identity: P, store: S, locals: L, clock: Arc<dyn Clock>) -> Self {
        Self {
            identity,
            directory: Directory::new(store),
            locals,
            clock,
        }
    }
}
