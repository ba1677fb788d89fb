//! Planned vs actual hours by work category, per month.

use serde::{Deserialize, Serialize};
use tempo_core::entities::{PlannedAllocation, WorkRecord};
use tempo_core::enums::WorkCategory;
use tempo_core::month::{Month, MonthFilter};
use tempo_store::DataStore;

use crate::error::MetricsError;
use crate::scope::ProjectScope;
use crate::service::MetricsService;
use crate::share_pct;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryHours {
    pub npd: f64,
    pub sustaining: f64,
    pub sprint: f64,
    pub firefighting: f64,
}

impl CategoryHours {
    /// Hours for a tracked category; 0 for untracked ones.
    #[must_use]
    pub fn get(&self, category: WorkCategory) -> f64 {
        match category {
            WorkCategory::Npd => self.npd,
            WorkCategory::Sustaining => self.sustaining,
            WorkCategory::Sprint => self.sprint,
            WorkCategory::Firefighting => self.firefighting,
            _ => 0.0,
        }
    }

    fn add(&mut self, category: WorkCategory, hours: f64) {
        match category {
            WorkCategory::Npd => self.npd += hours,
            WorkCategory::Sustaining => self.sustaining += hours,
            WorkCategory::Sprint => self.sprint += hours,
            WorkCategory::Firefighting => self.firefighting += hours,
            _ => {}
        }
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.npd + self.sustaining + self.sprint + self.firefighting
    }

    /// Each tracked category's share of the total, in percent.
    #[must_use]
    pub fn share(&self, category: WorkCategory) -> f64 {
        share_pct(self.get(category), self.total())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRollup {
    pub month: Month,
    pub planned: CategoryHours,
    pub actual: CategoryHours,
}

impl CategoryRollup {
    #[must_use]
    pub fn planned_total(&self) -> f64 {
        self.planned.total()
    }

    #[must_use]
    pub fn actual_total(&self) -> f64 {
        self.actual.total()
    }

    /// `(actual - planned) / planned * 100`, 0 against a zero plan.
    #[must_use]
    pub fn delta_pct(&self, category: WorkCategory) -> f64 {
        let planned = self.planned.get(category);
        share_pct(self.actual.get(category) - planned, planned)
    }
}

/// One rollup per month, in the order of `months`.
///
/// Planned hours land in the category of their project's type; projects
/// typed `other` are not planned against a category. Firefighting is never
/// planned.
#[must_use]
pub fn compute_category_rollup(
    records: &[WorkRecord],
    allocations: &[PlannedAllocation],
    months: &[Month],
    scope: &ProjectScope,
) -> Vec<CategoryRollup> {
    months
        .iter()
        .map(|&month| {
            let mut rollup = CategoryRollup {
                month,
                planned: CategoryHours::default(),
                actual: CategoryHours::default(),
            };
            for allocation in allocations
                .iter()
                .filter(|a| a.month == month && scope.matches(&a.project_id))
            {
                if let Some(category) = scope
                    .hierarchy()
                    .project_type(&allocation.project_id)
                    .planned_category()
                {
                    rollup.planned.add(category, allocation.planned_hours);
                }
            }
            for record in records
                .iter()
                .filter(|r| r.month == month && scope.matches(&r.project_id))
            {
                rollup.actual.add(record.category, record.hours);
            }
            rollup
        })
        .collect()
}

impl<S: DataStore> MetricsService<S> {
    /// Planned vs actual category hours per month.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::Core` for an invalid month range and
    /// `MetricsError::Store` if a store read fails.
    pub async fn category_rollup(
        &self,
        filter: &MonthFilter,
        project_filter: Option<&str>,
    ) -> Result<Vec<CategoryRollup>, MetricsError> {
        let months = filter.resolve()?;
        let (records, allocations, scope) = tokio::try_join!(
            self.work_records(&months),
            self.allocations(&months),
            self.scope(project_filter)
        )?;
        Ok(compute_category_rollup(&records, &allocations, &months, &scope))
    }
}
