//! Engineer and lab-technician collaboration.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tempo_core::entities::WorkRecord;
use tempo_core::month::{Month, MonthFilter};
use tempo_store::DataStore;

use crate::error::MetricsError;
use crate::scope::ProjectScope;
use crate::service::MetricsService;

/// Hours an engineer shared with one lab technician, and where.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechAffinity {
    pub engineer: String,
    pub tech_code: String,
    pub hours: f64,
    /// Distinct projects the collaboration happened on, sorted.
    pub projects: Vec<String>,
}

#[derive(Default)]
struct Accumulator<'a> {
    hours: f64,
    projects: BTreeSet<&'a str>,
}

/// Aggregate shared hours per `(engineer, tech_code)`.
///
/// Records without a tech code are ignored, as are pairs whose hours sum to
/// zero. Ordered by hours descending, then engineer, then tech code.
#[must_use]
pub fn compute_tech_affinity(
    records: &[WorkRecord],
    months: &[Month],
    scope: &ProjectScope,
) -> Vec<TechAffinity> {
    let mut pairs: BTreeMap<(&str, &str), Accumulator<'_>> = BTreeMap::new();
    for record in records
        .iter()
        .filter(|r| months.contains(&r.month) && scope.matches(&r.project_id))
    {
        let Some(tech) = record.tech_code.as_deref().filter(|t| !t.is_empty()) else {
            continue;
        };
        let acc = pairs.entry((record.engineer.as_str(), tech)).or_default();
        acc.hours += record.hours;
        acc.projects.insert(record.project_id.as_str());
    }

    let mut rows: Vec<TechAffinity> = pairs
        .into_iter()
        .filter(|(_, acc)| acc.hours > 0.0)
        .map(|((engineer, tech), acc)| TechAffinity {
            engineer: engineer.to_string(),
            tech_code: tech.to_string(),
            hours: acc.hours,
            projects: acc.projects.into_iter().map(String::from).collect(),
        })
        .collect();
    rows.sort_by(|a, b| {
        b.hours
            .total_cmp(&a.hours)
            .then_with(|| a.engineer.cmp(&b.engineer))
            .then_with(|| a.tech_code.cmp(&b.tech_code))
    });
    rows
}

impl<S: DataStore> MetricsService<S> {
    /// Engineer and technician collaboration totals.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::Core` for an invalid month range and
    /// `MetricsError::Store` if a store read fails.
    pub async fn tech_affinity(
        &self,
        filter: &MonthFilter,
        project_filter: Option<&str>,
    ) -> Result<Vec<TechAffinity>, MetricsError> {
        let months = filter.resolve()?;
        let (records, scope) =
            tokio::try_join!(self.work_records(&months), self.scope(project_filter))?;
        Ok(compute_tech_affinity(&records, &months, &scope))
    }
}
