//! In-process [`RemoteStore`], for tests and offline use.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::store::RemoteStore;
use crate::error::StoreError;

type Collection = IndexMap<String, Value>;

/// Collections of JSON rows keyed by `id`, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Collection>> {
        self.collections.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rows of a collection in insertion order.
    pub fn rows(&self, collection: &str) -> Vec<Value> {
        self.lock()
            .get(collection)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn get(&self, collection: &str, id: &str) -> Option<Value> {
        self.lock().get(collection)?.get(id).cloned()
    }

    pub fn len(&self, collection: &str) -> usize {
        self.lock().get(collection).map_or(0, IndexMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.lock().values().all(IndexMap::is_empty)
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    /// Rows without a string `id` get a fresh UUID.
    async fn insert_many(&self, collection: &str, rows: Vec<Value>) -> Result<(), StoreError> {
        let mut prepared = Vec::with_capacity(rows.len());
        for mut row in rows {
            let obj = row
                .as_object_mut()
                .ok_or_else(|| StoreError::new(collection, "row is not an object"))?;
            let id = match obj.get("id").and_then(Value::as_str) {
                Some(id) => id.to_string(),
                None => {
                    let id = uuid::Uuid::new_v4().to_string();
                    obj.insert("id".into(), Value::String(id.clone()));
                    id
                }
            };
            prepared.push((id, row));
        }

        let mut collections = self.lock();
        let target = collections.entry(collection.to_string()).or_default();
        if let Some((id, _)) = prepared.iter().find(|(id, _)| target.contains_key(id)) {
            return Err(StoreError::new(collection, format!("duplicate id {id}")));
        }
        target.extend(prepared);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError> {
        let mut collections = self.lock();
        let row = collections
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| StoreError::new(collection, format!("no row with id {id}")))?;

        match (row.as_object_mut(), patch) {
            (Some(fields), Value::Object(changes)) => {
                fields.extend(changes);
                Ok(())
            }
            _ => Err(StoreError::new(collection, "update patch must be an object")),
        }
    }

    /// Deleting a missing row is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        if let Some(c) = self.lock().get_mut(collection) {
            c.shift_remove(id);
        }
        Ok(())
    }
}
