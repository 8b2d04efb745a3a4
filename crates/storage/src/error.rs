/// All errors that can be returned by a RepairStore implementation.
///
/// A missing record is not an error at this layer; `get` and `update`
/// return `None` and `delete` returns `false`.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but does not hold a JSON array of repairs.
    #[error("corrupt repair data in {path}: {reason}")]
    Corrupt { path: String, reason: String },

    /// A backend-specific storage error (DB connection, serialization, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}
