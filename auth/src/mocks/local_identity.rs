//! Mock local identity repository for testing.

use super::poisoned;
use crate::error::{AuthError, Result};
use crate::providers::LocalIdentityRepository;
use crate::state::{LocalId, LocalIdentity, SubjectId};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mock local identity repository.
///
/// Enforces email and subject uniqueness like the real table and counts
/// writes so tests can assert idempotence.
#[derive(Debug, Clone)]
pub struct MockLocalIdentityRepository {
    rows: Arc<Mutex<HashMap<LocalId, LocalIdentity>>>,
    failing: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl MockLocalIdentityRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: Arc::new(Mutex::new(HashMap::new())),
            failing: Arc::new(AtomicBool::new(false)),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Seed a row without counting it as a write.
    pub fn seed(&self, identity: LocalIdentity) {
        if let Ok(mut rows) = self.rows.lock() {
            rows.insert(identity.local_id, identity);
        }
    }

    /// Every row, ordered by email.
    #[must_use]
    pub fn all(&self) -> Vec<LocalIdentity> {
        let mut rows: Vec<LocalIdentity> = self
            .rows
            .lock()
            .map(|r| r.values().cloned().collect())
            .unwrap_or_default();
        rows.sort_by(|a, b| a.email.cmp(&b.email));
        rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of successful inserts and updates.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every operation fail with `StoreUnavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AuthError::StoreUnavailable(
                "mock identity table offline".to_string(),
            ));
        }
        Ok(())
    }

    fn conflicts(rows: &HashMap<LocalId, LocalIdentity>, identity: &LocalIdentity) -> bool {
        rows.values().any(|row| {
            row.local_id != identity.local_id
                && (row.email.eq_ignore_ascii_case(&identity.email)
                    || (row.subject_id.is_some() && row.subject_id == identity.subject_id))
        })
    }
}

impl Default for MockLocalIdentityRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalIdentityRepository for MockLocalIdentityRepository {
    fn find_by_subject(
        &self,
        subject_id: &SubjectId,
    ) -> impl Future<Output = Result<Option<LocalIdentity>>> + Send {
        let result = self.check().and_then(|()| {
            Ok(self
                .rows
                .lock()
                .map_err(poisoned)?
                .values()
                .find(|row| row.subject_id.as_ref() == Some(subject_id))
                .cloned())
        });
        async move { result }
    }

    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<LocalIdentity>>> + Send {
        let result = self.check().and_then(|()| {
            Ok(self
                .rows
                .lock()
                .map_err(poisoned)?
                .values()
                .find(|row| row.email.eq_ignore_ascii_case(email))
                .cloned())
        });
        async move { result }
    }

    fn insert(&self, identity: &LocalIdentity) -> impl Future<Output = Result<()>> + Send {
        let result = self.check().and_then(|()| {
            let mut rows = self.rows.lock().map_err(poisoned)?;
            if rows.contains_key(&identity.local_id) || Self::conflicts(&rows, identity) {
                return Err(AuthError::DuplicateEmail {
                    email: identity.email.clone(),
                });
            }
            rows.insert(identity.local_id, identity.clone());
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        async move { result }
    }

    fn update(&self, identity: &LocalIdentity) -> impl Future<Output = Result<()>> + Send {
        let result = self.check().and_then(|()| {
            let mut rows = self.rows.lock().map_err(poisoned)?;
            if !rows.contains_key(&identity.local_id) {
                return Err(AuthError::NotFound(format!(
                    "local identity {}",
                    identity.local_id
                )));
            }
            if Self::conflicts(&rows, identity) {
                return Err(AuthError::DuplicateEmail {
                    email: identity.email.clone(),
                });
            }
            rows.insert(identity.local_id, identity.clone());
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        async move { result }
    }

    fn delete(&self, local_id: LocalId) -> impl Future<Output = Result<()>> + Send {
        let result = self.check().and_then(|()| {
            self.rows.lock().map_err(poisoned)?.remove(&local_id);
            Ok(())
        });
        async move { result }
    }
}
