use super::ReferenceStore;
use crate::core::reference::Collection;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory store, mostly useful for tests and one-off calculations.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<Collection, BTreeMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReferenceStore for MemoryStore {
    async fn entries(&self, collection: Collection) -> Result<Vec<(String, Vec<u8>)>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .get(&collection)
            .map(|records| {
                records
                    .iter()
                    .map(|(id, payload)| (id.clone(), payload.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Vec<u8>>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .get(&collection)
            .and_then(|records| records.get(id))
            .cloned())
    }

    async fn put(&self, collection: Collection, id: &str, payload: Vec<u8>) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner
            .entry(collection)
            .or_default()
            .insert(id.to_string(), payload);
        debug!("Memory PUT {}/{}", collection, id);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        let removed = inner
            .get_mut(&collection)
            .is_some_and(|records| records.remove(id).is_some());
        debug!("Memory DELETE {}/{} removed={}", collection, id, removed);
        Ok(removed)
    }
}
