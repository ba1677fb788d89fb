//! KPI results object and its persisted snapshot envelope.
//!
//! `KpiResults` is the canonical output of the KPI engine for one
//! `(month, project_filter)` pair. Metrics that are undefined for a
//! single-project view are `None` when a project filter is set.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::month::Month;

/// Every KPI value computed for one month and project filter.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct KpiResults {
    pub month: Month,
    /// Project the results are scoped to. `None` = all projects.
    pub project_filter: Option<String>,

    pub total_actual_hours: f64,
    pub total_planned_hours: f64,
    /// `(actual - planned) / planned * 100`, 0 against an empty plan.
    pub plan_variance_pct: f64,

    pub npd_pct: f64,
    pub sustaining_pct: f64,
    pub sprint_pct: f64,
    pub firefighting_pct: f64,

    pub active_engineers: u32,
    pub tech_collaboration_hours: f64,
    pub lab_tech_hours: f64,

    pub avg_utilization_pct: Option<f64>,
    pub over_allocated_count: Option<u32>,
    pub meeting_tax_pct: Option<f64>,
    pub avg_focus_score: Option<f64>,
    pub at_risk_projects: Option<u32>,
    pub active_projects: Option<u32>,
}

impl KpiResults {
    /// Whether the results describe a single project rather than the team.
    #[must_use]
    pub const fn is_single_project(&self) -> bool {
        self.project_filter.is_some()
    }
}

/// Snapshot key for a project filter: the empty string means all projects.
#[must_use]
pub fn project_filter_key(project_filter: Option<&str>) -> String {
    project_filter.unwrap_or_default().to_string()
}

/// A persisted, point-in-time copy of the KPI results.
///
/// Unique per `(month, project_filter)`; always written whole.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct KpiSnapshot {
    pub month: Month,
    /// Empty string = all projects.
    pub project_filter: String,
    pub results: KpiResults,
}

impl KpiSnapshot {
    /// Wrap results in a snapshot keyed by their month and filter.
    #[must_use]
    pub fn from_results(results: KpiResults) -> Self {
        Self {
            month: results.month,
            project_filter: project_filter_key(results.project_filter.as_deref()),
            results,
        }
    }

    /// The `(month, project_filter)` uniqueness key.
    #[must_use]
    pub fn key(&self) -> (Month, String) {
        (self.month, self.project_filter.clone())
    }
}
