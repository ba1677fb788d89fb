//! KPI engine error types.

use tempo_core::errors::CoreError;
use tempo_metrics::MetricsError;
use tempo_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KpiError {
    #[error(transparent)]
    Metrics(#[from] MetricsError),

    /// Snapshot read or write failed.
    #[error("data store error: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Core(#[from] CoreError),
}
