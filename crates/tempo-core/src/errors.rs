//! Cross-cutting error types for Tempo.
//!
//! Errors here are caller contract violations. Data sparsity (no matching
//! records, no history) is never an error anywhere in Tempo; it resolves to
//! empty collections or zero values. Crate-specific errors (`StoreError`,
//! `MetricsError`, `KpiError`) live in their own crates.

use thiserror::Error;

/// Errors that can be raised by any Tempo crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A month token was not of the form `YYYY-MM`.
    #[error("Invalid month token '{0}': expected YYYY-MM")]
    InvalidMonth(String),

    /// A month range whose start lies after its end.
    #[error("Invalid month range: start {start} is after end {end}")]
    InvalidRange { start: String, end: String },
}
