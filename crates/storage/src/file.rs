//! JSON-file backend.
//!
//! The whole table is held in memory and the file is rewritten after every
//! mutation: serialize to a sibling temp file, then rename over the target,
//! so a crash mid-write never leaves a truncated data file behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::StorageError;
use crate::memory::RepairTable;
use crate::record::{NewRepair, Repair, RepairPatch};
use crate::traits::RepairStore;

/// A `RepairStore` persisted as a JSON array of repairs.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    table: Mutex<RepairTable>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store; it is
    /// created on the first mutation.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let rows = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice::<Vec<Repair>>(&bytes).map_err(|e| {
                StorageError::Corrupt {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(StorageError::Io {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        };
        let repairs = rows.len();
        let table = RepairTable::from_rows(rows).map_err(|reason| StorageError::Corrupt {
            path: path.display().to_string(),
            reason,
        })?;
        tracing::info!(path = %path.display(), repairs, "opened repair store");
        Ok(JsonFileStore {
            path,
            table: Mutex::new(table),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, table: &RepairTable) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.display().to_string(),
            source,
        };
        let bytes = serde_json::to_vec_pretty(&table.list())
            .map_err(|e| StorageError::Backend(format!("serialize repairs: {}", e)))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        tokio::fs::write(&tmp, &bytes).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;
        Ok(())
    }
}

#[async_trait]
impl RepairStore for JsonFileStore {
    async fn list(&self) -> Result<Vec<Repair>, StorageError> {
        Ok(self.table.lock().await.list())
    }

    async fn get(&self, id: u64) -> Result<Option<Repair>, StorageError> {
        Ok(self.table.lock().await.get(id))
    }

    async fn create(&self, new: NewRepair) -> Result<Repair, StorageError> {
        let mut table = self.table.lock().await;
        let mut staged = table.clone();
        let repair = staged.create(new)?;
        self.persist(&staged).await?;
        *table = staged;
        Ok(repair)
    }

    async fn update(&self, id: u64, patch: RepairPatch) -> Result<Option<Repair>, StorageError> {
        let mut table = self.table.lock().await;
        let mut staged = table.clone();
        let Some(repair) = staged.update(id, patch) else {
            return Ok(None);
        };
        self.persist(&staged).await?;
        *table = staged;
        Ok(Some(repair))
    }

    async fn delete(&self, id: u64) -> Result<bool, StorageError> {
        let mut table = self.table.lock().await;
        let mut staged = table.clone();
        if !staged.delete(id) {
            return Ok(false);
        }
        self.persist(&staged).await?;
        *table = staged;
        Ok(true)
    }
}
