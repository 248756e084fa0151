//! Access-control configuration.
//!
//! Values are supplied by the application; the defaults match the shared
//! directory's conventions.

use crate::constants::{ADMINS_PER_PAGE, DEFAULT_PROVIDER, MIN_PASSWORD_LENGTH};

/// Identity reconciler configuration.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Provider recorded when a caller reconciles without one.
    ///
    /// Default: `"password"`
    pub default_provider: String,
}

impl ReconcilerConfig {
    /// Create a reconciler configuration with the given default provider.
    #[must_use]
    pub const fn new(default_provider: String) -> Self {
        Self { default_provider }
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PROVIDER.to_string())
    }
}

/// Admin lifecycle configuration.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Minimum length of an admin-supplied password.
    ///
    /// Default: 6
    pub min_password_length: usize,

    /// Admin listing page size.
    ///
    /// Default: 10
    pub per_page: usize,

    /// Provider written into newly created admin records.
    ///
    /// Default: `"password"`
    pub account_provider: String,
}

impl LifecycleConfig {
    /// Create a lifecycle configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum password length.
    #[must_use]
    pub const fn with_min_password_length(mut self, length: usize) -> Self {
        self.min_password_length = length;
        self
    }

    /// Set the admin listing page size. Zero is treated as one.
    #[must_use]
    pub const fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = if per_page == 0 { 1 } else { per_page };
        self
    }

    /// Set the provider recorded on created admin records.
    #[must_use]
    pub fn with_account_provider(mut self, provider: impl Into<String>) -> Self {
        self.account_provider = provider.into();
        self
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            min_password_length: MIN_PASSWORD_LENGTH,
            per_page: ADMINS_PER_PAGE,
            account_provider: DEFAULT_PROVIDER.to_string(),
        }
    }
}
