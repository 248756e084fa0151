//! Mock identity provider for testing.

use super::poisoned;
use crate::constants::DEFAULT_PROVIDER;
use crate::error::{AuthError, Result};
use crate::providers::{IdentityAccount, IdentityProvider, NewAccount};
use crate::state::{ExternalCredential, SubjectId, VerifiedIdentity};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Identity provider operation, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityOp {
    /// `verify_token`
    Verify,
    /// `get_account`
    GetAccount,
    /// `get_account_by_email`
    LookupEmail,
    /// `create_account`
    Create,
    /// `set_disabled`
    SetDisabled,
    /// `update_display_name`
    UpdateProfile,
    /// `delete_account`
    Delete,
    /// `generate_password_reset_link`
    ResetLink,
}

/// Mock identity provider.
///
/// Keeps accounts and accepted tokens in memory. New accounts get
/// sequential subject ids (`uid-1`, `uid-2`, ...).
#[derive(Debug, Clone)]
pub struct MockIdentityProvider {
    accounts: Arc<Mutex<HashMap<SubjectId, IdentityAccount>>>,
    tokens: Arc<Mutex<HashMap<String, VerifiedIdentity>>>,
    failures: Arc<Mutex<HashSet<IdentityOp>>>,
    next_uid: Arc<AtomicU64>,
}

impl MockIdentityProvider {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(Mutex::new(HashMap::new())),
            tokens: Arc::new(Mutex::new(HashMap::new())),
            failures: Arc::new(Mutex::new(HashSet::new())),
            next_uid: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Accept `token` as a credential for `identity`.
    pub fn register_token(&self, token: &str, identity: VerifiedIdentity) {
        if let Ok(mut tokens) = self.tokens.lock() {
            tokens.insert(token.to_string(), identity);
        }
    }

    /// Seed an account, and accept `token-{subject}` as its credential.
    pub fn add_account(&self, account: IdentityAccount) {
        self.register_token(
            &format!("token-{}", account.subject_id),
            VerifiedIdentity {
                subject_id: account.subject_id.clone(),
                email: account.email.clone(),
                provider: DEFAULT_PROVIDER.to_string(),
                claims: serde_json::Map::new(),
            },
        );
        if let Ok(mut accounts) = self.accounts.lock() {
            accounts.insert(account.subject_id.clone(), account);
        }
    }

    /// Current state of an account.
    #[must_use]
    pub fn account(&self, subject_id: &SubjectId) -> Option<IdentityAccount> {
        self.accounts.lock().ok()?.get(subject_id).cloned()
    }

    /// Number of accounts.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.accounts.lock().map(|a| a.len()).unwrap_or(0)
    }

    /// Make `op` fail with `AuthError::IdentityProvider`.
    pub fn fail_on(&self, op: IdentityOp) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(op);
        }
    }

    /// Remove every injected failure.
    pub fn clear_failures(&self) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.clear();
        }
    }

    fn check(&self, op: IdentityOp) -> Result<()> {
        if self.failures.lock().map_err(poisoned)?.contains(&op) {
            return Err(AuthError::IdentityProvider(format!("injected {op:?} failure")));
        }
        Ok(())
    }
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for MockIdentityProvider {
    fn verify_token(
        &self,
        credential: &ExternalCredential,
    ) -> impl Future<Output = Result<VerifiedIdentity>> + Send {
        let result = self.check(IdentityOp::Verify).and_then(|()| {
            let identity = self
                .tokens
                .lock()
                .map_err(poisoned)?
                .get(credential.expose())
                .cloned()
                .ok_or(AuthError::InvalidCredential)?;

            let disabled = self
                .accounts
                .lock()
                .map_err(poisoned)?
                .get(&identity.subject_id)
                .is_some_and(|a| a.disabled);
            if disabled {
                return Err(AuthError::InvalidCredential);
            }
            if identity.email.is_empty() {
                return Err(AuthError::MissingEmail);
            }
            Ok(identity)
        });
        async move { result }
    }

    fn get_account(
        &self,
        subject_id: &SubjectId,
    ) -> impl Future<Output = Result<IdentityAccount>> + Send {
        let result = self.check(IdentityOp::GetAccount).and_then(|()| {
            self.accounts
                .lock()
                .map_err(poisoned)?
                .get(subject_id)
                .cloned()
                .ok_or_else(|| AuthError::NotFound(format!("account {subject_id}")))
        });
        async move { result }
    }

    fn get_account_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<IdentityAccount>>> + Send {
        let result = self.check(IdentityOp::LookupEmail).and_then(|()| {
            Ok(self
                .accounts
                .lock()
                .map_err(poisoned)?
                .values()
                .find(|a| a.email.eq_ignore_ascii_case(email))
                .cloned())
        });
        async move { result }
    }

    fn create_account(
        &self,
        account: &NewAccount,
    ) -> impl Future<Output = Result<IdentityAccount>> + Send {
        let result = self.check(IdentityOp::Create).and_then(|()| {
            let mut accounts = self.accounts.lock().map_err(poisoned)?;
            if accounts
                .values()
                .any(|a| a.email.eq_ignore_ascii_case(&account.email))
            {
                return Err(AuthError::DuplicateEmail {
                    email: account.email.clone(),
                });
            }

            let uid = self.next_uid.fetch_add(1, Ordering::SeqCst);
            let created = IdentityAccount {
                subject_id: SubjectId::new(format!("uid-{uid}"))?,
                email: account.email.clone(),
                display_name: Some(account.display_name.clone()),
                disabled: account.disabled,
                email_verified: account.email_verified,
            };
            accounts.insert(created.subject_id.clone(), created.clone());
            Ok(created)
        });
        async move { result }
    }

    fn set_disabled(
        &self,
        subject_id: &SubjectId,
        disabled: bool,
    ) -> impl Future<Output = Result<()>> + Send {
        let result = self.check(IdentityOp::SetDisabled).and_then(|()| {
            let mut accounts = self.accounts.lock().map_err(poisoned)?;
            let account = accounts
                .get_mut(subject_id)
                .ok_or_else(|| AuthError::NotFound(format!("account {subject_id}")))?;
            account.disabled = disabled;
            Ok(())
        });
        async move { result }
    }

    fn update_display_name(
        &self,
        subject_id: &SubjectId,
        display_name: &str,
    ) -> impl Future<Output = Result<()>> + Send {
        let result = self.check(IdentityOp::UpdateProfile).and_then(|()| {
            let mut accounts = self.accounts.lock().map_err(poisoned)?;
            let account = accounts
                .get_mut(subject_id)
                .ok_or_else(|| AuthError::NotFound(format!("account {subject_id}")))?;
            account.display_name = Some(display_name.to_string());
            Ok(())
        });
        async move { result }
    }

    fn delete_account(&self, subject_id: &SubjectId) -> impl Future<Output = Result<()>> + Send {
        let result = self.check(IdentityOp::Delete).and_then(|()| {
            self.accounts
                .lock()
                .map_err(poisoned)?
                .remove(subject_id)
                .map(|_| ())
                .ok_or_else(|| AuthError::NotFound(format!("account {subject_id}")))
        });
        async move { result }
    }

    fn generate_password_reset_link(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<String>> + Send {
        let result = self.check(IdentityOp::ResetLink).and_then(|()| {
            let known = self
                .accounts
                .lock()
                .map_err(poisoned)?
                .values()
                .any(|a| a.email.eq_ignore_ascii_case(email));
            if known {
                Ok(format!("https://auth.test/reset?email={email}"))
            } else {
                Err(AuthError::NotFound(format!("account {email}")))
            }
        });
        async move { result }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let provider = MockIdentityProvider::new();
        let first = provider
            .create_account(&NewAccount::new("a@x.com", "a"))
            .await
            .unwrap();
        let second = provider
            .create_account(&NewAccount::new("b@x.com", "b"))
            .await
            .unwrap();

        assert_eq!(first.subject_id.as_str(), "uid-1");
        assert_eq!(second.subject_id.as_str(), "uid-2");
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let provider = MockIdentityProvider::new();
        provider
            .create_account(&NewAccount::new("a@x.com", "a"))
            .await
            .unwrap();

        let result = provider.create_account(&NewAccount::new("A@x.com", "a")).await;
        assert!(matches!(result, Err(AuthError::DuplicateEmail { .. })));
    }

    #[tokio::test]
    async fn test_disabled_account_token_is_rejected() {
        let provider = MockIdentityProvider::new();
        let subject = SubjectId::new("abc").unwrap();
        provider.add_account(IdentityAccount {
            subject_id: subject.clone(),
            email: "a@x.com".into(),
            display_name: None,
            disabled: false,
            email_verified: true,
        });
        let credential = ExternalCredential::new("token-abc");

        assert!(provider.verify_token(&credential).await.is_ok());

        provider.set_disabled(&subject, true).await.unwrap();
        assert_eq!(
            provider.verify_token(&credential).await,
            Err(AuthError::InvalidCredential)
        );
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let provider = MockIdentityProvider::new();
        let result = provider
            .verify_token(&ExternalCredential::new("garbage"))
            .await;
        assert_eq!(result, Err(AuthError::InvalidCredential));
    }
}
