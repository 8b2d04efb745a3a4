use async_trait::async_trait;

use crate::error::StorageError;
use crate::record::{NewRepair, Repair, RepairPatch};

/// The domain service over repair tickets.
///
/// Both HTTP surfaces and the offline `query` command talk to repairs only
/// through this trait, so any backend that implements it can sit behind
/// either of them.
///
/// ## Absence
///
/// A missing record is data, not failure: `get` and `update` return
/// `Ok(None)` and `delete` returns `Ok(false)`. `Err` is reserved for the
/// backend itself misbehaving (I/O, corruption).
///
/// ## Identifiers
///
/// `create` assigns the next identifier. Identifiers increase monotonically
/// and are never reused within the lifetime of a store, even after delete.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` to be used in axum
/// application state and across async task boundaries.
#[async_trait]
pub trait RepairStore: Send + Sync + 'static {
    /// Every stored repair in ascending identifier order.
    async fn list(&self) -> Result<Vec<Repair>, StorageError>;

    /// Read a single repair.
    async fn get(&self, id: u64) -> Result<Option<Repair>, StorageError>;

    /// Store a new repair and return it with its assigned identifier.
    async fn create(&self, new: NewRepair) -> Result<Repair, StorageError>;

    /// Apply a partial update. Returns the updated record, or `None` if no
    /// repair has this identifier.
    async fn update(&self, id: u64, patch: RepairPatch) -> Result<Option<Repair>, StorageError>;

    /// Remove a repair. Returns whether a record was removed.
    async fn delete(&self, id: u64) -> Result<bool, StorageError>;
}
