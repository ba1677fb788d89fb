//! # tempo-kpi
//!
//! KPI orchestration for Tempo.
//!
//! - [`KpiEngine`] assembles one [`KpiResults`](tempo_core::kpi::KpiResults)
//!   per month and project filter, and manages KPI snapshots.
//! - [`registry`] is the static catalog every consumer reads KPI meaning
//!   from: selector, format, category, threshold, and applicability.
//! - [`narrative`] turns results and anomalies into a paragraph and a short
//!   list of highlights.

pub mod engine;
pub mod error;
pub mod format;
pub mod narrative;
pub mod registry;

pub use engine::{KpiEngine, TrendPoint};
pub use error::KpiError;
pub use format::{FormatKind, format_value};
pub use narrative::{Narrative, NarrativeGenerator};
pub use registry::{KPI_REGISTRY, KpiDefinition, KpiId, definitions_for};
