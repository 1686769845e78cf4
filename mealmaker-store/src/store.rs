use async_trait::async_trait;
use serde_json::Value;

use crate::document::{Filter, Sort, Update};
use crate::error::StoreResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    pub matched: u64,
    pub modified: u64,
    pub upserted: bool,
}

/// Document store addressed by collection name and filter.
///
/// Every document is a JSON object carrying its key in `_id`. Implementations
/// never span a call with a transaction visible to the caller.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&Sort>,
    ) -> StoreResult<Vec<Value>>;

    async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Value>> {
        Ok(self.find(collection, filter, None).await?.into_iter().next())
    }

    async fn insert_one(&self, collection: &str, document: Value) -> StoreResult<()>;

    async fn insert_many(&self, collection: &str, documents: Vec<Value>) -> StoreResult<()> {
        for document in documents {
            self.insert_one(collection, document).await?;
        }
        Ok(())
    }

    /// Applies `update` to the first document matching `filter`.
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
        upsert: bool,
    ) -> StoreResult<UpdateResult>;

    /// Deletes the first document matching `filter`; returns the number removed.
    async fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<u64>;

    /// Atomically increments and returns the named sequence, starting at 1.
    async fn next_sequence(&self, name: &str) -> StoreResult<i64>;
}
