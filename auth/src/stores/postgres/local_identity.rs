//! PostgreSQL local identity repository.
//!
//! # Example
//!
//! ```no_run
//! use boxoffice_auth::stores::postgres::PostgresLocalIdentityRepository;
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgresql://localhost/boxoffice").await?;
//! let repo = PostgresLocalIdentityRepository::new(pool);
//! repo.migrate().await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::providers::LocalIdentityRepository;
use crate::state::{LocalId, LocalIdentity, Role, SubjectId, VenueId};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

const SELECT_COLUMNS: &str = "SELECT local_id, subject_id, email, display_name, role, venue_id, \
                              provider, created_at FROM local_identities";

/// PostgreSQL local identity repository.
#[derive(Clone)]
pub struct PostgresLocalIdentityRepository {
    /// PostgreSQL connection pool.
    pool: PgPool,
}

impl PostgresLocalIdentityRepository {
    /// Create a new repository.
    ///
    /// # Arguments
    ///
    /// * `pool` - PostgreSQL connection pool
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns error if migrations fail.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AuthError::StoreUnavailable(format!("Migration failed: {e}")))?;
        Ok(())
    }

    async fn fetch_one_where(&self, clause: &str, value: &str) -> Result<Option<LocalIdentity>> {
        let sql = format!("{SELECT_COLUMNS} WHERE {clause}");
        let row: Option<LocalIdentityRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(&e, value))?;
        Ok(row.map(LocalIdentity::from))
    }
}

impl LocalIdentityRepository for PostgresLocalIdentityRepository {
    async fn find_by_subject(&self, subject_id: &SubjectId) -> Result<Option<LocalIdentity>> {
        self.fetch_one_where("subject_id = $1", subject_id.as_str())
            .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<LocalIdentity>> {
        self.fetch_one_where("lower(email) = lower($1)", email).await
    }

    async fn insert(&self, identity: &LocalIdentity) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO local_identities
                (local_id, subject_id, email, display_name, role, venue_id, provider, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(identity.local_id.0)
        .bind(identity.subject_id.as_ref().map(SubjectId::as_str))
        .bind(&identity.email)
        .bind(&identity.display_name)
        .bind(identity.role.as_str())
        .bind(identity.venue_id.as_ref().map(VenueId::as_str))
        .bind(&identity.provider)
        .bind(identity.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(&e, &identity.email))?;

        tracing::debug!(local_id = %identity.local_id, email = %identity.email, "Inserted local identity");
        Ok(())
    }

    async fn update(&self, identity: &LocalIdentity) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE local_identities
            SET subject_id = $2, email = $3, display_name = $4, role = $5,
                venue_id = $6, provider = $7, updated_at = NOW()
            WHERE local_id = $1
            ",
        )
        .bind(identity.local_id.0)
        .bind(identity.subject_id.as_ref().map(SubjectId::as_str))
        .bind(&identity.email)
        .bind(&identity.display_name)
        .bind(identity.role.as_str())
        .bind(identity.venue_id.as_ref().map(VenueId::as_str))
        .bind(&identity.provider)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(&e, &identity.email))?;

        if result.rows_affected() == 0 {
            return Err(AuthError::NotFound(format!(
                "local identity {}",
                identity.local_id
            )));
        }
        Ok(())
    }

    async fn delete(&self, local_id: LocalId) -> Result<()> {
        sqlx::query("DELETE FROM local_identities WHERE local_id = $1")
            .bind(local_id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::StoreUnavailable(format!("Failed to delete local identity: {e}")))?;
        Ok(())
    }
}

/// Unique violations become `DuplicateEmail`; everything else is a store outage.
fn map_db_error(e: &sqlx::Error, email: &str) -> AuthError {
    if let sqlx::Error::Database(db) = e {
        if db.is_unique_violation() {
            return AuthError::DuplicateEmail {
                email: email.to_string(),
            };
        }
    }
    AuthError::StoreUnavailable(format!("Local identity query failed: {e}"))
}

#[derive(Debug, FromRow)]
struct LocalIdentityRow {
    local_id: Uuid,
    subject_id: Option<String>,
    email: String,
    display_name: String,
    role: String,
    venue_id: Option<String>,
    provider: String,
    created_at: DateTime<Utc>,
}

impl From<LocalIdentityRow> for LocalIdentity {
    fn from(row: LocalIdentityRow) -> Self {
        let role = row.role.parse().unwrap_or_else(|_| {
            tracing::warn!(role = %row.role, email = %row.email, "Unknown role in local identity row");
            Role::User
        });
        Self {
            local_id: LocalId(row.local_id),
            subject_id: row.subject_id.and_then(|s| SubjectId::new(s).ok()),
            email: row.email,
            display_name: row.display_name,
            role,
            venue_id: row.venue_id.as_deref().and_then(VenueId::parse),
            provider: row.provider,
            created_at: row.created_at,
        }
    }
}
