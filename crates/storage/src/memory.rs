//! In-memory backend, and the table type the file backend builds on.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::record::{timestamp_now, NewRepair, Repair, RepairPatch};
use crate::traits::RepairStore;

const ID_SPACE_EXHAUSTED: &str = "id space exhausted";

/// Ordered repair rows plus the identifier counter.
#[derive(Debug, Clone)]
pub(crate) struct RepairTable {
    rows: BTreeMap<u64, Repair>,
    next_id: u64,
}

impl Default for RepairTable {
    fn default() -> Self {
        RepairTable {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl RepairTable {
    /// Rebuild a table from persisted rows. The counter resumes after the
    /// highest identifier seen.
    ///
    /// Fails with a reason when two rows share an id or when no id is left
    /// after the highest one.
    pub(crate) fn from_rows(rows: Vec<Repair>) -> Result<Self, String> {
        let mut table = BTreeMap::new();
        for row in rows {
            let id = row.id;
            if table.insert(id, row).is_some() {
                return Err(format!("duplicate repair id {}", id));
            }
        }
        let next_id = match table.keys().next_back() {
            Some(&max) => max
                .checked_add(1)
                .ok_or_else(|| format!("repair id {} leaves no room for new ids", max))?,
            None => 1,
        };
        Ok(RepairTable {
            rows: table,
            next_id,
        })
    }

    pub(crate) fn list(&self) -> Vec<Repair> {
        self.rows.values().cloned().collect()
    }

    pub(crate) fn get(&self, id: u64) -> Option<Repair> {
        self.rows.get(&id).cloned()
    }

    /// The last representable id is never handed out, so a reloaded table
    /// can always resume its counter.
    pub(crate) fn create(&mut self, new: NewRepair) -> Result<Repair, StorageError> {
        let id = self.next_id;
        self.next_id = id
            .checked_add(1)
            .ok_or_else(|| StorageError::Backend(ID_SPACE_EXHAUSTED.to_string()))?;
        let repair = Repair::from_new(id, new, &timestamp_now());
        self.rows.insert(id, repair.clone());
        Ok(repair)
    }

    pub(crate) fn update(&mut self, id: u64, patch: RepairPatch) -> Option<Repair> {
        let row = self.rows.get_mut(&id)?;
        row.apply_patch(patch, &timestamp_now());
        Some(row.clone())
    }

    pub(crate) fn delete(&mut self, id: u64) -> bool {
        self.rows.remove(&id).is_some()
    }
}

/// A `RepairStore` that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: RwLock<RepairTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing rows, e.g. fixtures in tests.
    pub fn with_repairs(rows: Vec<Repair>) -> Result<Self, StorageError> {
        let table = RepairTable::from_rows(rows).map_err(StorageError::Backend)?;
        Ok(MemoryStore {
            table: RwLock::new(table),
        })
    }
}

#[async_trait]
impl RepairStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Repair>, StorageError> {
        Ok(self.table.read().await.list())
    }

    async fn get(&self, id: u64) -> Result<Option<Repair>, StorageError> {
        Ok(self.table.read().await.get(id))
    }

    async fn create(&self, new: NewRepair) -> Result<Repair, StorageError> {
        self.table.write().await.create(new)
    }

    async fn update(&self, id: u64, patch: RepairPatch) -> Result<Option<Repair>, StorageError> {
        Ok(self.table.write().await.update(id, patch))
    }

    async fn delete(&self, id: u64) -> Result<bool, StorageError> {
        Ok(self.table.write().await.delete(id))
    }
}
