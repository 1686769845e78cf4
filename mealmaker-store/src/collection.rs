use std::marker::PhantomData;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::document::{Filter, Sort, Update};
use crate::error::{StoreError, StoreResult};
use crate::store::{DocumentStore, UpdateResult};

pub type SharedStore = Arc<dyn DocumentStore>;

/// Typed view over one named collection.
pub struct Collection<T> {
    store: SharedStore,
    name: &'static str,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            name: self.name,
            _record: PhantomData,
        }
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: SharedStore, name: &'static str) -> Self {
        Self {
            store,
            name,
            _record: PhantomData,
        }
    }

    fn decode(&self, document: serde_json::Value) -> StoreResult<T> {
        serde_json::from_value(document).map_err(|source| StoreError::Decode {
            collection: self.name.to_string(),
            source,
        })
    }

    fn encode(&self, record: &T) -> StoreResult<serde_json::Value> {
        serde_json::to_value(record).map_err(|source| StoreError::Encode {
            collection: self.name.to_string(),
            source,
        })
    }

    /// Decodes every match; one undecodable document fails the whole call.
    pub async fn find(&self, filter: &Filter, sort: Option<&Sort>) -> StoreResult<Vec<T>> {
        self.store
            .find(self.name, filter, sort)
            .await?
            .into_iter()
            .map(|document| self.decode(document))
            .collect()
    }

    pub async fn find_one(&self, filter: &Filter) -> StoreResult<Option<T>> {
        self.store
            .find_one(self.name, filter)
            .await?
            .map(|document| self.decode(document))
            .transpose()
    }

    pub async fn insert_one(&self, record: &T) -> StoreResult<()> {
        let document = self.encode(record)?;
        self.store.insert_one(self.name, document).await
    }

    pub async fn insert_many(&self, records: &[T]) -> StoreResult<()> {
        let documents = records
            .iter()
            .map(|record| self.encode(record))
            .collect::<StoreResult<Vec<_>>>()?;
        self.store.insert_many(self.name, documents).await
    }

    pub async fn update_one(
        &self,
        filter: &Filter,
        update: &Update,
        upsert: bool,
    ) -> StoreResult<UpdateResult> {
        self.store.update_one(self.name, filter, update, upsert).await
    }

    pub async fn delete_one(&self, filter: &Filter) -> StoreResult<u64> {
        self.store.delete_one(self.name, filter).await
    }
}
