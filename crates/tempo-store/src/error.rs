//! Data store error types for tempo-store.

use thiserror::Error;

/// Errors from data store reads and snapshot persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Snapshot journal file I/O failed.
    #[error("Journal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific failure of a `DataStore` implementation.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
