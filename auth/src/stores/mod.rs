//! Storage implementations for the access-control core.
//!
//! - **Directory store** (Redis) - `admins`, `users` and `venues` documents
//! - **Local identity table** (PostgreSQL, feature `postgres`)

pub mod document_redis;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use document_redis::RedisDocumentStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresLocalIdentityRepository;
