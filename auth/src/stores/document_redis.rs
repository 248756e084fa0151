//! Redis-backed directory document store.
//!
//! # Architecture
//!
//! Each collection is one Redis hash:
//! - **Key**: `directory:{collection}`
//! - **Field**: document id
//! - **Value**: JSON object text
//!
//! Partial updates run as a Lua script so the read-merge-write is atomic on
//! the server.
//!
//! # Example
//!
//! ```no_run
//! use boxoffice_auth::stores::RedisDocumentStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RedisDocumentStore::new("redis://127.0.0.1:6379").await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::providers::{Document, DocumentStore, StoredDocument};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde_json::Value;
use std::collections::HashMap;

/// Merge fields into a stored document. Returns 0 when it does not exist.
const MERGE_SCRIPT: &str = r"
    local raw = redis.call('HGET', KEYS[1], ARGV[1])
    if not raw then
        return 0
    end
    local doc = cjson.decode(raw)
    local fields = cjson.decode(ARGV[2])
    for k, v in pairs(fields) do
        doc[k] = v
    end
    redis.call('HSET', KEYS[1], ARGV[1], cjson.encode(doc))
    return 1
";

/// Redis-backed document store.
#[derive(Clone)]
pub struct RedisDocumentStore {
    /// Connection manager for connection pooling.
    conn_manager: ConnectionManager,
}

impl RedisDocumentStore {
    /// Connect to Redis.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL (e.g., "redis://127.0.0.1:6379")
    ///
    /// # Errors
    ///
    /// Returns `AuthError::StoreUnavailable` if the connection fails.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| AuthError::StoreUnavailable(format!("Invalid Redis URL: {e}")))?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            AuthError::StoreUnavailable(format!("Failed to connect to Redis: {e}"))
        })?;

        Ok(Self { conn_manager })
    }

    /// Wrap an existing connection manager.
    #[must_use]
    pub const fn from_manager(conn_manager: ConnectionManager) -> Self {
        Self { conn_manager }
    }

    fn collection_key(collection: &str) -> String {
        format!("directory:{collection}")
    }

    fn decode(collection: &str, id: &str, raw: &str) -> Result<Document> {
        match serde_json::from_str(raw)? {
            Value::Object(map) => Ok(map),
            _ => Err(AuthError::Serialization(format!(
                "{collection}/{id} is not a JSON object"
            ))),
        }
    }

    fn unavailable(action: &str, e: &redis::RedisError) -> AuthError {
        AuthError::StoreUnavailable(format!("Failed to {action}: {e}"))
    }
}

impl DocumentStore for RedisDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let mut conn = self.conn_manager.clone();
        let raw: Option<String> = conn
            .hget(Self::collection_key(collection), id)
            .await
            .map_err(|e| Self::unavailable("read document", &e))?;

        raw.map(|raw| Self::decode(collection, id, &raw)).transpose()
    }

    async fn set(&self, collection: &str, id: &str, data: &Document) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let json = serde_json::to_string(data)?;

        let _: () = conn
            .hset(Self::collection_key(collection), id, json)
            .await
            .map_err(|e| Self::unavailable("write document", &e))?;

        tracing::debug!(collection, id, "Wrote directory document");
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: &Document) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let json = serde_json::to_string(fields)?;

        let merged: i32 = redis::Script::new(MERGE_SCRIPT)
            .key(Self::collection_key(collection))
            .arg(id)
            .arg(json)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| Self::unavailable("update document", &e))?;

        if merged == 0 {
            return Err(AuthError::NotFound(format!("{collection}/{id}")));
        }

        tracing::debug!(collection, id, "Merged directory document fields");
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let _: i64 = conn
            .hdel(Self::collection_key(collection), id)
            .await
            .map_err(|e| Self::unavailable("delete document", &e))?;
        Ok(())
    }

    async fn stream_all(&self, collection: &str) -> Result<Vec<StoredDocument>> {
        let mut conn = self.conn_manager.clone();
        let raw: HashMap<String, String> = conn
            .hgetall(Self::collection_key(collection))
            .await
            .map_err(|e| Self::unavailable("scan collection", &e))?;

        let mut docs = raw
            .into_iter()
            .map(|(id, raw)| {
                let data = Self::decode(collection, &id, &raw)?;
                Ok(StoredDocument { id, data })
            })
            .collect::<Result<Vec<_>>>()?;
        docs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(docs)
    }

    async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<StoredDocument>> {
        let docs = self.stream_all(collection).await?;
        Ok(docs
            .into_iter()
            .filter(|doc| doc.data.get(field) == Some(value))
            .collect())
    }
}
