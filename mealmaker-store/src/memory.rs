use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

use crate::document::{document_key, lookup, Filter, Sort, Update, ID_FIELD};
use crate::error::{StoreError, StoreResult};
use crate::store::{DocumentStore, UpdateResult};

/// Process-local store used by tests and `--in-memory` runs.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
    sequences: Mutex<HashMap<String, i64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

fn key_of(collection: &str, document: &Value) -> StoreResult<String> {
    lookup(document, ID_FIELD)
        .and_then(document_key)
        .ok_or_else(|| StoreError::MissingId {
            collection: collection.to_string(),
        })
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&Sort>,
    ) -> StoreResult<Vec<Value>> {
        let collections = self.collections.read().await;
        let mut found: Vec<Value> = collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|d| filter.matches(d))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if let Some(sort) = sort {
            sort.apply(&mut found);
        }
        Ok(found)
    }

    async fn insert_one(&self, collection: &str, document: Value) -> StoreResult<()> {
        let key = key_of(collection, &document)?;
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();
        let taken = documents
            .iter()
            .any(|d| key_of(collection, d).is_ok_and(|k| k == key));
        if taken {
            return Err(StoreError::Duplicate {
                collection: collection.to_string(),
                id: key,
            });
        }
        documents.push(document);
        Ok(())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
        upsert: bool,
    ) -> StoreResult<UpdateResult> {
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();

        if let Some(document) = documents.iter_mut().find(|d| filter.matches(d)) {
            let before = document.clone();
            update.apply(document);
            return Ok(UpdateResult {
                matched: 1,
                modified: u64::from(*document != before),
                upserted: false,
            });
        }

        if !upsert {
            return Ok(UpdateResult::default());
        }
        let document = update.upsert_document(filter);
        key_of(collection, &document)?;
        documents.push(document);
        Ok(UpdateResult {
            matched: 0,
            modified: 0,
            upserted: true,
        })
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(0);
        };
        match documents.iter().position(|d| filter.matches(d)) {
            Some(index) => {
                documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn next_sequence(&self, name: &str) -> StoreResult<i64> {
        let mut sequences = self.sequences.lock().await;
        let value = sequences.entry(name.to_string()).or_insert(0);
        *value += 1;
        Ok(*value)
    }
}
