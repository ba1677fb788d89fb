//! # tempo-metrics
//!
//! Metric computers over immutable work-record collections.
//!
//! Every computer is a pure function of its inputs (records, resolved
//! months, a [`ProjectScope`], and policy). [`MetricsService`] wraps them
//! with data-store reads: each module adds its async entry points to
//! `MetricsService` via an `impl` block.
//!
//! Core computers: [`actual_hours`], [`utilization`], [`lab_tech`],
//! [`tech_affinity`], [`meeting_tax`].
//!
//! Composite analytics: [`focus`], [`bus_factor`], [`anomaly`],
//! [`capacity`], [`rollup`], [`skills`], [`milestones`].

pub mod actual_hours;
pub mod anomaly;
pub mod bus_factor;
pub mod capacity;
pub mod error;
pub mod focus;
pub mod lab_tech;
pub mod meeting_tax;
pub mod milestones;
pub mod rollup;
pub mod scope;
pub mod service;
pub mod skills;
pub mod tech_affinity;
pub mod utilization;

pub use error::MetricsError;
pub use scope::ProjectScope;
pub use service::MetricsService;

/// `part / whole * 100`, or 0 when `whole` is not positive.
#[must_use]
pub fn share_pct(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole * 100.0 } else { 0.0 }
}

#[cfg(test)]
pub(crate) mod test_support;
