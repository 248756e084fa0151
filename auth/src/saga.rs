//! Compensation log for multi-step admin operations.
//!
//! Each completed step records the action that undoes it. When a later step
//! fails, the recorded compensations run in reverse order:
//!
//! ```text
//! create account ──▶ write admin record ──✗
//!        ▲                                 │
//!        └──────── delete account ◀────────┘
//! ```

use crate::directory::Directory;
use crate::providers::{Document, DocumentStore, IdentityProvider};
use crate::state::SubjectId;

/// Action that undoes one completed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compensation {
    /// Delete an account that the operation created.
    DeleteAccount(SubjectId),

    /// Put an account's disabled flag back.
    RestoreDisabled {
        /// Account subject
        subject_id: SubjectId,
        /// Flag value before the operation
        disabled: bool,
    },

    /// Write back an admin document exactly as it was before the operation.
    RestoreAdminRecord {
        /// Record subject
        subject_id: SubjectId,
        /// Raw document, unknown fields included
        snapshot: Document,
    },

    /// Remove an admin record that the operation wrote.
    DeleteAdminRecord(SubjectId),

    /// Remove a user record that the operation wrote.
    DeleteUserRecord(SubjectId),
}

/// Completed steps of one operation.
#[derive(Debug)]
pub struct Saga {
    operation: &'static str,
    completed: Vec<Compensation>,
}

impl Saga {
    /// Start an empty saga for `operation`.
    #[must_use]
    pub const fn new(operation: &'static str) -> Self {
        Self {
            operation,
            completed: Vec::new(),
        }
    }

    /// Record a completed step by its compensation.
    pub fn record(&mut self, compensation: Compensation) {
        self.completed.push(compensation);
    }

    /// Undo every recorded step, newest first.
    ///
    /// Compensation is best effort: a failing compensation is logged at
    /// error level and the remaining ones still run.
    pub async fn compensate<P, S>(self, provider: &P, directory: &Directory<S>)
    where
        P: IdentityProvider,
        S: DocumentStore,
    {
        let operation = self.operation;
        for compensation in self.completed.into_iter().rev() {
            let result = match &compensation {
                Compensation::DeleteAccount(subject_id) => provider.delete_account(subject_id).await,
                Compensation::RestoreDisabled {
                    subject_id,
                    disabled,
                } => provider.set_disabled(subject_id, *disabled).await,
                Compensation::RestoreAdminRecord {
                    subject_id,
                    snapshot,
                } => directory.restore_admin(subject_id, snapshot).await,
                Compensation::DeleteAdminRecord(subject_id) => {
                    directory.delete_admin(subject_id).await
                }
                Compensation::DeleteUserRecord(subject_id) => directory.delete_user(subject_id).await,
            };

            match result {
                Ok(()) => tracing::info!(operation, ?compensation, "Compensated step"),
                Err(e) => tracing::error!(
                    operation,
                    ?compensation,
                    error = %e,
                    "Compensation failed, manual repair needed"
                ),
            }
        }
    }
}
