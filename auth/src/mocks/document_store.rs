//! Mock document store for testing.

use super::poisoned;
use crate::error::{AuthError, Result};
use crate::providers::{Document, DocumentStore, StoredDocument};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

type Collections = HashMap<String, BTreeMap<String, Document>>;

/// Store operation, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// `get`
    Get,
    /// `set`
    Set,
    /// `update`
    Update,
    /// `delete`
    Delete,
    /// `stream_all` and `query_by_field`
    Scan,
}

/// Mock document store.
///
/// Uses in-memory storage. Failures can be injected per collection and
/// operation, or for the whole store with [`MockDocumentStore::set_available`].
#[derive(Debug, Clone)]
pub struct MockDocumentStore {
    collections: Arc<Mutex<Collections>>,
    failures: Arc<Mutex<HashSet<(String, StoreOp)>>>,
    available: Arc<AtomicBool>,
}

impl MockDocumentStore {
    /// Create an empty, available store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            collections: Arc::new(Mutex::new(HashMap::new())),
            failures: Arc::new(Mutex::new(HashSet::new())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Seed a document. Non-object values are ignored.
    pub fn insert(&self, collection: &str, id: &str, value: Value) {
        let Value::Object(data) = value else {
            return;
        };
        if let Ok(mut collections) = self.collections.lock() {
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(id.to_string(), data);
        }
    }

    /// Current contents of a document.
    #[must_use]
    pub fn document(&self, collection: &str, id: &str) -> Option<Document> {
        self.collections
            .lock()
            .ok()?
            .get(collection)?
            .get(id)
            .cloned()
    }

    /// Number of documents in a collection.
    #[must_use]
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .map(|c| c.get(collection).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    /// Make `op` on `collection` fail with `StoreUnavailable`.
    pub fn fail_on(&self, collection: &str, op: StoreOp) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert((collection.to_string(), op));
        }
    }

    /// Remove every injected failure.
    pub fn clear_failures(&self) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.clear();
        }
    }

    /// Make every operation fail (`false`) or succeed (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check(&self, collection: &str, op: StoreOp) -> Result<()> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(AuthError::StoreUnavailable("mock store offline".to_string()));
        }
        let failures = self.failures.lock().map_err(poisoned)?;
        if failures.contains(&(collection.to_string(), op)) {
            return Err(AuthError::StoreUnavailable(format!(
                "injected {op:?} failure on {collection}"
            )));
        }
        Ok(())
    }
}

impl Default for MockDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MockDocumentStore {
    fn get(&self, collection: &str, id: &str) -> impl Future<Output = Result<Option<Document>>> + Send {
        let result = self.check(collection, StoreOp::Get).and_then(|()| {
            Ok(self
                .collections
                .lock()
                .map_err(poisoned)?
                .get(collection)
                .and_then(|c| c.get(id))
                .cloned())
        });
        async move { result }
    }

    fn set(
        &self,
        collection: &str,
        id: &str,
        data: &Document,
    ) -> impl Future<Output = Result<()>> + Send {
        let result = self.check(collection, StoreOp::Set).and_then(|()| {
            self.collections
                .lock()
                .map_err(poisoned)?
                .entry(collection.to_string())
                .or_default()
                .insert(id.to_string(), data.clone());
            Ok(())
        });
        async move { result }
    }

    fn update(
        &self,
        collection: &str,
        id: &str,
        fields: &Document,
    ) -> impl Future<Output = Result<()>> + Send {
        let result = self.check(collection, StoreOp::Update).and_then(|()| {
            let mut collections = self.collections.lock().map_err(poisoned)?;
            let doc = collections
                .get_mut(collection)
                .and_then(|c| c.get_mut(id))
                .ok_or_else(|| AuthError::NotFound(format!("{collection}/{id}")))?;
            for (key, value) in fields {
                doc.insert(key.clone(), value.clone());
            }
            Ok(())
        });
        async move { result }
    }

    fn delete(&self, collection: &str, id: &str) -> impl Future<Output = Result<()>> + Send {
        let result = self.check(collection, StoreOp::Delete).and_then(|()| {
            if let Some(c) = self.collections.lock().map_err(poisoned)?.get_mut(collection) {
                c.remove(id);
            }
            Ok(())
        });
        async move { result }
    }

    fn stream_all(
        &self,
        collection: &str,
    ) -> impl Future<Output = Result<Vec<StoredDocument>>> + Send {
        let result = self.check(collection, StoreOp::Scan).and_then(|()| {
            Ok(self
                .collections
                .lock()
                .map_err(poisoned)?
                .get(collection)
                .map(|c| {
                    c.iter()
                        .map(|(id, data)| StoredDocument {
                            id: id.clone(),
                            data: data.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default())
        });
        async move { result }
    }

    fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> impl Future<Output = Result<Vec<StoredDocument>>> + Send {
        let result = self.check(collection, StoreOp::Scan).and_then(|()| {
            Ok(self
                .collections
                .lock()
                .map_err(poisoned)?
                .get(collection)
                .map(|c| {
                    c.iter()
                        .filter(|(_, data)| data.get(field) == Some(value))
                        .map(|(id, data)| StoredDocument {
                            id: id.clone(),
                            data: data.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default())
        });
        async move { result }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = MockDocumentStore::new();
        store.insert("admins", "abc", json!({ "email": "a@x.com", "role": "subAdmin" }));

        let Value::Object(fields) = json!({ "role": "venueAdmin" }) else {
            unreachable!()
        };
        store.update("admins", "abc", &fields).await.unwrap();

        let doc = store.document("admins", "abc").unwrap();
        assert_eq!(doc["role"], "venueAdmin");
        assert_eq!(doc["email"], "a@x.com");
    }

    #[tokio::test]
    async fn test_update_missing_document() {
        let store = MockDocumentStore::new();
        let result = store.update("admins", "nobody", &Document::new()).await;
        assert!(matches!(result, Err(AuthError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_injected_failure_targets_one_collection() {
        let store = MockDocumentStore::new();
        store.fail_on("admins", StoreOp::Get);

        assert!(matches!(
            store.get("admins", "abc").await,
            Err(AuthError::StoreUnavailable(_))
        ));
        assert!(store.get("users", "abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_by_field() {
        let store = MockDocumentStore::new();
        store.insert("users", "u1", json!({ "email": "a@x.com" }));
        store.insert("users", "u2", json!({ "email": "b@x.com" }));

        let found = store
            .query_by_field("users", "email", &json!("b@x.com"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "u2");
    }
}
