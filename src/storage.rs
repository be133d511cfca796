use std::{collections::BTreeMap, sync::RwLock};

// Re-export core storage types so callers can use crate::storage::* directly
pub use padibook_core::storage::{
    check_records, Record, RecordStore, RecordStoreExt, Resource, StorageError, TenantKey,
};
pub use padibook_csv::CsvStore;

type PartitionKey = (Resource, Option<TenantKey>);

/// Record store that keeps everything in memory. Used by tests and as a
/// scratch backend.
pub struct MemoryStore {
    partitions: RwLock<BTreeMap<PartitionKey, Vec<Record>>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            partitions: RwLock::new(BTreeMap::new()),
        }
    }

    fn poisoned<T>(_: T) -> StorageError {
        StorageError::Other("memory store lock poisoned".to_string())
    }
}

impl RecordStore for MemoryStore {
    fn load(&self, resource: Resource, tenant: Option<&TenantKey>) -> Result<Vec<Record>, StorageError> {
        let partitions = self.partitions.read().map_err(Self::poisoned)?;
        Ok(partitions
            .get(&(resource, tenant.cloned()))
            .cloned()
            .unwrap_or_default())
    }

    fn append(&self, records: &[Record], resource: Resource, tenant: Option<&TenantKey>) -> Result<(), StorageError> {
        check_records(records, resource)?;
        let mut partitions = self.partitions.write().map_err(Self::poisoned)?;
        partitions
            .entry((resource, tenant.cloned()))
            .or_default()
            .extend_from_slice(records);
        tracing::debug!(%resource, count = records.len(), "Appended records");
        Ok(())
    }

    fn save(&self, records: &[Record], resource: Resource, tenant: Option<&TenantKey>) -> Result<(), StorageError> {
        check_records(records, resource)?;
        let mut partitions = self.partitions.write().map_err(Self::poisoned)?;
        partitions.insert((resource, tenant.cloned()), records.to_vec());
        tracing::debug!(%resource, count = records.len(), "Saved records");
        Ok(())
    }
}
