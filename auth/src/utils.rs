//! Utility functions for access control.

use crate::error::{AuthError, Result};

/// Validate email address format.
///
/// Basic structural check:
/// - exactly one `@`
/// - non-empty local part and a dotted domain
/// - length between 3 and 254 characters
///
/// # Examples
///
/// ```
/// use boxoffice_auth::utils::is_valid_email;
///
/// assert!(is_valid_email("ann@venue.example"));
/// assert!(is_valid_email("door+1@box-office.example.com"));
/// assert!(!is_valid_email("ann"));
/// assert!(!is_valid_email("@venue.example"));
/// assert!(!is_valid_email("ann@venue"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > 254 {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return false;
    }

    let valid_local = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-' | '+' | '_');
    let valid_domain = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-');

    local.chars().all(valid_local) && domain.chars().all(valid_domain)
}

/// Validate an email address, returning it trimmed.
///
/// # Errors
///
/// Returns `AuthError::InvalidEmail` when the address is malformed.
pub fn validate_email(email: &str) -> Result<String> {
    let trimmed = email.trim();
    if is_valid_email(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(AuthError::InvalidEmail)
    }
}

/// Local part of an email address (everything before the first `@`).
///
/// Used as the display name when the directory has none.
///
/// # Examples
///
/// ```
/// use boxoffice_auth::utils::email_local_part;
///
/// assert_eq!(email_local_part("ann@venue.example"), "ann");
/// assert_eq!(email_local_part("no-at-sign"), "no-at-sign");
/// ```
#[must_use]
pub fn email_local_part(email: &str) -> &str {
    email.split_once('@').map_or(email, |(local, _)| local)
}
