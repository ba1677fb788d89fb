//! Lab-tech support hours per engineer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tempo_core::entities::WorkRecord;
use tempo_core::enums::WorkCategory;
use tempo_core::month::{Month, MonthFilter};
use tempo_store::DataStore;

use crate::error::MetricsError;
use crate::scope::ProjectScope;
use crate::service::MetricsService;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabTechHours {
    pub engineer: String,
    pub hours: f64,
}

/// Sum `lab_tech` hours per engineer across all in-scope projects.
#[must_use]
pub fn compute_lab_tech_hours(
    records: &[WorkRecord],
    months: &[Month],
    scope: &ProjectScope,
) -> Vec<LabTechHours> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for record in records.iter().filter(|r| {
        r.category == WorkCategory::LabTech
            && months.contains(&r.month)
            && scope.matches(&r.project_id)
    }) {
        *totals.entry(record.engineer.as_str()).or_default() += record.hours;
    }

    totals
        .into_iter()
        .map(|(engineer, hours)| LabTechHours {
            engineer: engineer.to_string(),
            hours,
        })
        .collect()
}

impl<S: DataStore> MetricsService<S> {
    /// Lab-tech hours per engineer.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::Core` for an invalid month range and
    /// `MetricsError::Store` if a store read fails.
    pub async fn lab_tech_hours(
        &self,
        filter: &MonthFilter,
        project_filter: Option<&str>,
    ) -> Result<Vec<LabTechHours>, MetricsError> {
        let months = filter.resolve()?;
        let (records, scope) =
            tokio::try_join!(self.work_records(&months), self.scope(project_filter))?;
        Ok(compute_lab_tech_hours(&records, &months, &scope))
    }
}
