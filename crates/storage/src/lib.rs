pub mod conformance;
mod error;
mod file;
mod memory;
mod record;
mod traits;

pub use error::StorageError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use record::{NewRepair, Repair, RepairPatch};
pub use traits::RepairStore;
