use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;

use super::{DocumentStore, StoreError};

/// A model persisted as one JSON document
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

/// Typed access to one collection
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _phantom: PhantomData<T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T: Document> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    pub async fn insert(&self, document: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(document)?;
        self.store.insert(T::COLLECTION, document.id(), value).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<T>, StoreError> {
        match self.store.get(T::COLLECTION, id).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Every document, in insertion order
    pub async fn all(&self) -> Result<Vec<T>, StoreError> {
        self.store
            .list(T::COLLECTION)
            .await?
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(StoreError::from))
            .collect()
    }

    pub async fn find_one<F>(&self, predicate: F) -> Result<Option<T>, StoreError>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.all().await?.into_iter().find(|doc| predicate(doc)))
    }

    pub async fn exists<F>(&self, predicate: F) -> Result<bool, StoreError>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.find_one(predicate).await?.is_some())
    }

    /// Overwrite an existing document; `false` if it is gone
    pub async fn save(&self, document: &T) -> Result<bool, StoreError> {
        let value = serde_json::to_value(document)?;
        self.store.replace(T::COLLECTION, document.id(), value).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.store.delete(T::COLLECTION, id).await
    }
}
