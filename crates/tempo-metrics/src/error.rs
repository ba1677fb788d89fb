//! Metric computation error types.

use tempo_core::errors::CoreError;
use tempo_store::StoreError;
use thiserror::Error;

/// Errors from metric entry points.
///
/// Only caller contract violations and store failures surface here; empty
/// inputs always produce empty or zero results.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Malformed month filter or other caller error.
    #[error("{0}")]
    Core(#[from] CoreError),

    /// The data store failed to serve a read.
    #[error("data store error: {0}")]
    Store(#[from] StoreError),
}
