//! PostgreSQL storage implementations.
//!
//! The local identity table lives in PostgreSQL; see
//! `migrations/0001_local_identities.sql`.

pub mod local_identity;

pub use local_identity::PostgresLocalIdentityRepository;
