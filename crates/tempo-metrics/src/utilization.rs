//! Planned utilization per engineer and month.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tempo_core::entities::PlannedAllocation;
use tempo_core::month::{Month, MonthFilter};
use tempo_store::DataStore;

use crate::error::MetricsError;
use crate::scope::ProjectScope;
use crate::service::MetricsService;
use crate::share_pct;

/// Planned load of one engineer in one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedUtilization {
    pub engineer: String,
    pub month: Month,
    pub planned_hours: f64,
    /// `planned_hours / capacity * 100`.
    pub utilization_pct: f64,
}

impl PlannedUtilization {
    pub(crate) fn new(engineer: &str, month: Month, planned_hours: f64, capacity: f64) -> Self {
        Self {
            engineer: engineer.to_string(),
            month,
            planned_hours,
            utilization_pct: share_pct(planned_hours, capacity),
        }
    }

    #[must_use]
    pub fn is_over_allocated(&self) -> bool {
        self.utilization_pct > 100.0
    }
}

pub(crate) fn warn_on_capacity(capacity: f64) {
    if capacity <= 0.0 {
        tracing::warn!(
            capacity,
            "non-positive standard monthly capacity; utilization reported as 0%"
        );
    }
}

/// Sum in-scope planned hours per `(engineer, month)` and divide by capacity.
///
/// Only pairs present in the allocation set are reported. Ordered by
/// engineer, then month.
#[must_use]
pub fn compute_planned_utilization(
    allocations: &[PlannedAllocation],
    months: &[Month],
    scope: &ProjectScope,
    capacity: f64,
) -> Vec<PlannedUtilization> {
    warn_on_capacity(capacity);
    let mut planned: BTreeMap<(&str, Month), f64> = BTreeMap::new();
    for allocation in allocations
        .iter()
        .filter(|a| months.contains(&a.month) && scope.matches(&a.project_id))
    {
        *planned
            .entry((allocation.engineer.as_str(), allocation.month))
            .or_default() += allocation.planned_hours;
    }

    planned
        .into_iter()
        .map(|((engineer, month), hours)| PlannedUtilization::new(engineer, month, hours, capacity))
        .collect()
}

/// Mean utilization across rows, 0 when there are none.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_utilization(rows: &[PlannedUtilization]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    rows.iter().map(|r| r.utilization_pct).sum::<f64>() / rows.len() as f64
}

impl<S: DataStore> MetricsService<S> {
    /// Planned utilization per engineer and month.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::Core` for an invalid month range and
    /// `MetricsError::Store` if a store read fails.
    pub async fn planned_utilization(
        &self,
        filter: &MonthFilter,
        project_filter: Option<&str>,
    ) -> Result<Vec<PlannedUtilization>, MetricsError> {
        let months = filter.resolve()?;
        let (allocations, scope, team) = tokio::try_join!(
            self.allocations(&months),
            self.scope(project_filter),
            self.team()
        )?;
        Ok(compute_planned_utilization(
            &allocations,
            &months,
            &scope,
            team.standard_monthly_capacity_hours,
        ))
    }
}
