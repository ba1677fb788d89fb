//! Realized hours per engineer and project.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tempo_core::entities::WorkRecord;
use tempo_core::enums::ProjectType;
use tempo_core::month::{Month, MonthFilter};
use tempo_store::DataStore;

use crate::error::MetricsError;
use crate::scope::ProjectScope;
use crate::service::MetricsService;

/// Summed hours for one `(engineer, project)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualHours {
    pub engineer: String,
    pub project_id: String,
    pub project_type: ProjectType,
    pub hours: f64,
}

/// Group in-scope records from `months` by `(engineer, project_id)`.
///
/// Records outside `months` are ignored even if the store returned them, so
/// the months consumed are exactly the resolved filter. Output is ordered by
/// engineer, then project.
#[must_use]
pub fn compute_actual_hours(
    records: &[WorkRecord],
    months: &[Month],
    scope: &ProjectScope,
) -> Vec<ActualHours> {
    let mut totals: BTreeMap<(&str, &str), f64> = BTreeMap::new();
    for record in records
        .iter()
        .filter(|r| months.contains(&r.month) && scope.matches(&r.project_id))
    {
        *totals
            .entry((record.engineer.as_str(), record.project_id.as_str()))
            .or_default() += record.hours;
    }

    totals
        .into_iter()
        .map(|((engineer, project_id), hours)| ActualHours {
            engineer: engineer.to_string(),
            project_id: project_id.to_string(),
            project_type: scope.hierarchy().project_type(project_id),
            hours,
        })
        .collect()
}

/// Sum of all hours in an actual-hours result.
#[must_use]
pub fn total_hours(rows: &[ActualHours]) -> f64 {
    rows.iter().map(|r| r.hours).sum()
}

impl<S: DataStore> MetricsService<S> {
    /// Actual hours per engineer and project for a month filter.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::Core` for an invalid month range and
    /// `MetricsError::Store` if the store read fails.
    pub async fn actual_hours(
        &self,
        filter: &MonthFilter,
        project_filter: Option<&str>,
    ) -> Result<Vec<ActualHours>, MetricsError> {
        let months = filter.resolve()?;
        let (records, scope) =
            tokio::try_join!(self.work_records(&months), self.scope(project_filter))?;
        tracing::debug!(months = months.len(), records = records.len(), "computing actual hours");
        Ok(compute_actual_hours(&records, &months, &scope))
    }
}
