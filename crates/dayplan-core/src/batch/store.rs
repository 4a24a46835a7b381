//! Store seam the write coordinator flushes into.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::error::StoreError;

/// Remote data store the write coordinator flushes into.
///
/// Inserts are collection-scoped batches; updates and deletes address one
/// record each. A batch insert succeeds or fails as a unit.
#[async_trait]
pub trait RemoteStore: Send + Sync + 'static {
    async fn insert_many(&self, collection: &str, rows: Vec<Value>) -> Result<(), StoreError>;

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: RemoteStore> RemoteStore for Arc<S> {
    async fn insert_many(&self, collection: &str, rows: Vec<Value>) -> Result<(), StoreError> {
        (**self).insert_many(collection, rows).await
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError> {
        (**self).update(collection, id, patch).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        (**self).delete(collection, id).await
    }
}
