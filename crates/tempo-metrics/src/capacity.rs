//! Capacity forecast over an explicit list of months.
//!
//! Which months are "forecast" months is the caller's concern; this module
//! only looks at planned allocations.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tempo_core::entities::PlannedAllocation;
use tempo_core::month::Month;
use tempo_store::DataStore;

use crate::error::MetricsError;
use crate::scope::ProjectScope;
use crate::service::MetricsService;
use crate::utilization::{PlannedUtilization, warn_on_capacity};

/// Team totals for one forecast month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthCapacity {
    pub month: Month,
    pub engineers: usize,
    pub total_capacity: f64,
    pub total_allocated: f64,
    pub avg_utilization: f64,
    /// Engineers above 100% utilization.
    pub over_allocated_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapacityForecast {
    /// One cell per `(engineer, month)`, ordered by month, then engineer.
    pub cells: Vec<PlannedUtilization>,
    pub months: Vec<MonthCapacity>,
}

impl CapacityForecast {
    #[must_use]
    pub fn month(&self, month: Month) -> Option<&MonthCapacity> {
        self.months.iter().find(|m| m.month == month)
    }
}

/// Forecast utilization for every engineer with an in-scope allocation in
/// any of `months`.
///
/// An engineer without an allocation in a given month gets a 0% cell for
/// it. Duplicate months are reported once, in first-seen order.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn forecast_capacity(
    allocations: &[PlannedAllocation],
    months: &[Month],
    scope: &ProjectScope,
    capacity: f64,
) -> CapacityForecast {
    warn_on_capacity(capacity);
    let mut seen = BTreeSet::new();
    let months: Vec<Month> = months.iter().copied().filter(|m| seen.insert(*m)).collect();

    let mut planned: BTreeMap<(Month, &str), f64> = BTreeMap::new();
    let mut engineers: BTreeSet<&str> = BTreeSet::new();
    for allocation in allocations
        .iter()
        .filter(|a| months.contains(&a.month) && scope.matches(&a.project_id))
    {
        engineers.insert(allocation.engineer.as_str());
        *planned
            .entry((allocation.month, allocation.engineer.as_str()))
            .or_default() += allocation.planned_hours;
    }

    let mut forecast = CapacityForecast::default();
    for month in months {
        let cells: Vec<PlannedUtilization> = engineers
            .iter()
            .map(|engineer| {
                let hours = planned.get(&(month, *engineer)).copied().unwrap_or(0.0);
                PlannedUtilization::new(engineer, month, hours, capacity)
            })
            .collect();

        let headcount = cells.len();
        let avg_utilization = if headcount == 0 {
            0.0
        } else {
            cells.iter().map(|c| c.utilization_pct).sum::<f64>() / headcount as f64
        };
        forecast.months.push(MonthCapacity {
            month,
            engineers: headcount,
            total_capacity: headcount as f64 * capacity.max(0.0),
            total_allocated: cells.iter().map(|c| c.planned_hours).sum(),
            avg_utilization,
            over_allocated_count: cells.iter().filter(|c| c.is_over_allocated()).count(),
        });
        forecast.cells.extend(cells);
    }
    forecast
}

impl<S: DataStore> MetricsService<S> {
    /// Capacity forecast for an explicit list of months.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::Store` if a store read fails.
    pub async fn capacity_forecast(
        &self,
        months: &[Month],
        project_filter: Option<&str>,
    ) -> Result<CapacityForecast, MetricsError> {
        let (allocations, scope, team) = tokio::try_join!(
            self.allocations(months),
            self.scope(project_filter),
            self.team()
        )?;
        Ok(forecast_capacity(
            &allocations,
            months,
            &scope,
            team.standard_monthly_capacity_hours,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{allocation, month};
    use pretty_assertions::assert_eq;

    #[test]
    fn fills_missing_months_with_zero() {
        let allocations = vec![
            allocation("avery", "P-1", "2025-04", 120.0),
            allocation("avery", "P-2", "2025-04", 80.0),
            allocation("blake", "P-1", "2025-04", 80.0),
            allocation("blake", "P-1", "2025-05", 160.0),
        ];
        let months = [month("2025-04"), month("2025-05"), month("2025-06")];
        let forecast = forecast_capacity(&allocations, &months, &ProjectScope::default(), 160.0);

        assert_eq!(forecast.cells.len(), 6);

        let april = forecast.month(month("2025-04")).unwrap();
        assert_eq!(april.engineers, 2);
        assert_eq!(april.total_capacity, 320.0);
        assert_eq!(april.total_allocated, 280.0);
        assert_eq!(april.over_allocated_count, 1);
        assert_eq!(april.avg_utilization, 87.5);

        let may = forecast.month(month("2025-05")).unwrap();
        assert_eq!(may.total_allocated, 160.0);
        assert_eq!(may.avg_utilization, 50.0);
        assert_eq!(may.over_allocated_count, 0);

        let june = forecast.month(month("2025-06")).unwrap();
        assert_eq!(june.total_allocated, 0.0);
        assert_eq!(june.avg_utilization, 0.0);
    }

    #[test]
    fn no_allocations_means_no_engineers() {
        let forecast = forecast_capacity(&[], &[month("2025-04")], &ProjectScope::default(), 160.0);
        assert!(forecast.cells.is_empty());
        assert_eq!(forecast.months[0].engineers, 0);
        assert_eq!(forecast.months[0].total_capacity, 0.0);
    }

    #[test]
    fn duplicate_months_are_reported_once() {
        let months = [month("2025-04"), month("2025-04")];
        let forecast = forecast_capacity(&[], &months, &ProjectScope::default(), 160.0);
        assert_eq!(forecast.months.len(), 1);
    }
}
