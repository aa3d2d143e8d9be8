//! Storage for the reference collections.
//!
//! Records are kept as JSON payloads keyed by an opaque id. Ids are UUID v7
//! strings, so key order is creation order and a snapshot lists records in
//! the order they were added.
pub mod disk;
pub mod memory;

use crate::core::reference::{
    Collection, ConversionRatio, ProductType, ReferenceData, ReferenceRecord, RiskFlag,
    YieldRecord,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

pub use disk::DiskStore;
pub use memory::MemoryStore;

#[async_trait]
pub trait ReferenceStore: Send + Sync {
    /// All `(id, payload)` pairs of a collection in key order.
    async fn entries(&self, collection: Collection) -> Result<Vec<(String, Vec<u8>)>>;
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Vec<u8>>>;
    /// Inserts or replaces the payload stored under `id`.
    async fn put(&self, collection: Collection, id: &str, payload: Vec<u8>) -> Result<()>;
    /// Returns whether a record was removed.
    async fn delete(&self, collection: Collection, id: &str) -> Result<bool>;
}

pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

fn decode<R: ReferenceRecord>(id: String, payload: &[u8]) -> Result<R> {
    let mut record: R = serde_json::from_slice(payload).with_context(|| {
        format!("Failed to decode record {} in {}", id, R::COLLECTION)
    })?;
    record.set_id(id);
    Ok(record)
}

pub async fn list_records<R: ReferenceRecord>(store: &dyn ReferenceStore) -> Result<Vec<R>> {
    store
        .entries(R::COLLECTION)
        .await?
        .into_iter()
        .map(|(id, payload)| decode(id, &payload))
        .collect()
}

pub async fn get_record<R: ReferenceRecord>(
    store: &dyn ReferenceStore,
    id: &str,
) -> Result<Option<R>> {
    store
        .get(R::COLLECTION, id)
        .await?
        .map(|payload| decode(id.to_string(), &payload))
        .transpose()
}

/// Writes `record` under its own id, assigning a fresh id when it has none.
/// Returns the id used.
pub async fn put_record<R: ReferenceRecord>(store: &dyn ReferenceStore, record: &R) -> Result<String> {
    let mut record = record.clone();
    if record.id().is_empty() {
        record.set_id(new_id());
    }
    let payload = serde_json::to_vec(&record)
        .with_context(|| format!("Failed to encode record for {}", R::COLLECTION))?;
    store.put(R::COLLECTION, record.id(), payload).await?;
    debug!(collection = %R::COLLECTION, id = record.id(), "Stored record");
    Ok(record.id().to_string())
}

/// Reads all four collections into one consistent snapshot.
pub async fn load_snapshot(store: &dyn ReferenceStore) -> Result<ReferenceData> {
    let (product_types, conversion_ratios, yield_records, risk_flags) = futures::try_join!(
        list_records::<ProductType>(store),
        list_records::<ConversionRatio>(store),
        list_records::<YieldRecord>(store),
        list_records::<RiskFlag>(store),
    )?;
    let data = ReferenceData {
        product_types,
        conversion_ratios,
        yield_records,
        risk_flags,
    };
    debug!(records = data.len(), "Loaded reference snapshot");
    Ok(data)
}

pub async fn is_empty(store: &dyn ReferenceStore) -> Result<bool> {
    for collection in Collection::ALL {
        if !store.entries(collection).await?.is_empty() {
            return Ok(false);
        }
    }
    Ok(true)
}
