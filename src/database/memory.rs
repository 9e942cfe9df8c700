use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{DocumentStore, StoreError};

/// Process-local store used in development and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<(String, Value)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        if docs.iter().any(|(existing, _)| existing == id) {
            return Err(StoreError::Duplicate {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }

        docs.push((id.to_string(), document));
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|(existing, _)| existing == id))
            .map(|(_, doc)| doc.clone()))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().map(|(_, doc)| doc.clone()).collect())
            .unwrap_or_default())
    }

    async fn replace(&self, collection: &str, id: &str, document: Value) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let slot = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|(existing, _)| existing == id));

        match slot {
            Some((_, doc)) => {
                *doc = document;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };

        let before = docs.len();
        docs.retain(|(existing, _)| existing != id);
        Ok(docs.len() != before)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn crud_cycle() {
        let store = MemoryStore::new();
        store.insert("projects", "a", json!({"title": "A"})).await.unwrap();
        store.insert("projects", "b", json!({"title": "B"})).await.unwrap();

        assert_eq!(store.get("projects", "a").await.unwrap(), Some(json!({"title": "A"})));
        assert_eq!(store.list("projects").await.unwrap().len(), 2);

        assert!(store.replace("projects", "a", json!({"title": "A2"})).await.unwrap());
        assert!(!store.replace("projects", "zzz", json!({})).await.unwrap());

        assert!(store.delete("projects", "a").await.unwrap());
        assert!(!store.delete("projects", "a").await.unwrap());
        assert_eq!(store.list("projects").await.unwrap(), vec![json!({"title": "B"})]);
    }

    #[tokio::test]
    async fn duplicate_ids_are_refused() {
        let store = MemoryStore::new();
        store.insert("users", "1", json!({})).await.unwrap();
        let err = store.insert("users", "1", json!({})).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn unknown_collection_is_empty() {
        let store = MemoryStore::new();
        assert!(store.list("blogs").await.unwrap().is_empty());
        assert!(store.get("blogs", "x").await.unwrap().is_none());
    }
}
