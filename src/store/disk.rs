use super::ReferenceStore;
use crate::core::reference::Collection;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Store backed by a fjall keyspace with one partition per collection.
pub struct DiskStore {
    keyspace: Keyspace,
    partitions: HashMap<Collection, PartitionHandle>,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;

        let keyspace = Config::new(path)
            .open()
            .with_context(|| format!("Failed to open reference store at {}", path.display()))?;

        let mut partitions = HashMap::new();
        for collection in Collection::ALL {
            let partition = keyspace
                .open_partition(collection.name(), PartitionCreateOptions::default())
                .with_context(|| format!("Failed to open partition {collection}"))?;
            partitions.insert(collection, partition);
        }
        debug!("Opened reference store at {}", path.display());

        Ok(Self {
            keyspace,
            partitions,
        })
    }

    fn partition(&self, collection: Collection) -> Result<&PartitionHandle> {
        self.partitions
            .get(&collection)
            .ok_or_else(|| anyhow!("Partition {collection} is not open"))
    }

    fn persist(&self) -> Result<()> {
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to persist reference store")
    }
}

#[async_trait]
impl ReferenceStore for DiskStore {
    async fn entries(&self, collection: Collection) -> Result<Vec<(String, Vec<u8>)>> {
        let partition = self.partition(collection)?;
        let mut entries = Vec::new();
        for item in partition.iter() {
            let (key, value) = item.with_context(|| format!("Failed to read {collection}"))?;
            let id = String::from_utf8(key.to_vec())
                .with_context(|| format!("Invalid record id in {collection}"))?;
            entries.push((id, value.to_vec()));
        }
        Ok(entries)
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Vec<u8>>> {
        let value = self
            .partition(collection)?
            .get(id)
            .with_context(|| format!("Failed to read {collection}/{id}"))?;
        Ok(value.map(|v| v.to_vec()))
    }

    async fn put(&self, collection: Collection, id: &str, payload: Vec<u8>) -> Result<()> {
        self.partition(collection)?
            .insert(id, payload)
            .with_context(|| format!("Failed to write {collection}/{id}"))?;
        self.persist()?;
        debug!("Disk PUT {}/{}", collection, id);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool> {
        let partition = self.partition(collection)?;
        let existed = partition
            .contains_key(id)
            .with_context(|| format!("Failed to read {collection}/{id}"))?;
        if existed {
            partition
                .remove(id)
                .with_context(|| format!("Failed to delete {collection}/{id}"))?;
            self.persist()?;
        }
        debug!("Disk DELETE {}/{} removed={}", collection, id, existed);
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_disk_store_put_get_delete() -> Result<()> {
        let dir = tempdir()?;
        let store = DiskStore::open(dir.path())?;

        // Initially, store is empty
        assert!(store.entries(Collection::ProductTypes).await?.is_empty());

        store
            .put(Collection::ProductTypes, "id-1", b"{}".to_vec())
            .await?;
        assert_eq!(
            store.get(Collection::ProductTypes, "id-1").await?,
            Some(b"{}".to_vec())
        );
        assert!(store.get(Collection::ConversionRatios, "id-1").await?.is_none());

        assert!(store.delete(Collection::ProductTypes, "id-1").await?);
        assert!(!store.delete(Collection::ProductTypes, "id-1").await?);
        assert!(store.get(Collection::ProductTypes, "id-1").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_disk_store_survives_reopen() -> Result<()> {
        let dir = tempdir()?;
        {
            let store = DiskStore::open(dir.path())?;
            store
                .put(Collection::RiskFlags, "a", b"first".to_vec())
                .await?;
            store
                .put(Collection::RiskFlags, "b", b"second".to_vec())
                .await?;
        }

        let store = DiskStore::open(dir.path())?;
        let entries = store.entries(Collection::RiskFlags).await?;
        assert_eq!(
            entries,
            vec![
                ("a".to_string(), b"first".to_vec()),
                ("b".to_string(), b"second".to_vec()),
            ]
        );
        Ok(())
    }
}
