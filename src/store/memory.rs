//! In-process document store.
//!
//! Insertion-ordered, UUID identifiers, nothing persisted. Selected with a
//! `memory://` connection string; the test suites run against it.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Collection, Record, Repository, StoreResult};

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Record>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryStore {
    async fn find_all(&self, collection: Collection) -> StoreResult<Vec<Record>> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    async fn find_by_id(&self, collection: Collection, id: &str) -> StoreResult<Option<Record>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|records| records.iter().find(|r| r.id == id))
            .cloned())
    }

    async fn create(&self, collection: Collection, mut fields: Map<String, Value>) -> StoreResult<Record> {
        fields.remove("_id");
        let record = Record { fields, id: Uuid::new_v4().simple().to_string() };
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn delete_by_id(&self, collection: Collection, id: &str) -> StoreResult<Option<Record>> {
        let mut collections = self.collections.write().await;
        let Some(records) = collections.get_mut(&collection) else {
            return Ok(None);
        };
        Ok(records
            .iter()
            .position(|r| r.id == id)
            .map(|pos| records.remove(pos)))
    }
}
