//! # Box Office Testing
//!
//! Testing utilities for the access-control crates.
//!
//! This crate provides:
//! - [`FixedClock`]: deterministic time
//! - [`fixtures`]: directory documents and identities in their wire shape
//! - [`TestEnvironment`]: mock providers wired into an `AccessEnvironment`
//! - [`properties`]: proptest strategies for roles, emails and venues
//!
//! ## Example
//!
//! ```ignore
//! use boxoffice_testing::TestEnvironment;
//! use boxoffice_auth::Role;
//!
//! #[tokio::test]
//! async fn test_venue_admin_login() {
//!     let test = TestEnvironment::new();
//!     test.seed_venue("v1", "Roundhouse", "London");
//!     let token = test.seed_admin("abc", "a@x.com", Role::VenueAdmin, "v1");
//!
//!     let identity = test.reconciler().authenticate(&token).await.unwrap();
//!     assert_eq!(identity.role, Role::VenueAdmin);
//! }
//! ```

use chrono::{DateTime, Utc};

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{DateTime, Utc};
    use boxoffice_auth::environment::Clock;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use boxoffice_testing::mocks::FixedClock;
    /// use boxoffice_auth::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::days(20_089))
    }
}

pub mod fixtures;
pub mod helpers;
pub mod properties;

// Re-export commonly used items
pub use helpers::{TestEnvironment, init_tracing};
pub use mocks::{FixedClock, test_clock};

#[cfg(test)]
mod tests {
    use super::*;
    use boxoffice_auth::environment::Clock;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }
}
