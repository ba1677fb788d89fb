//! KPI engine: one canonical results object per month and project filter.
//!
//! `compute_all` issues its store reads concurrently, then runs the metric
//! computers in sequence over the shared record set. Snapshot methods wrap
//! the results in a `KpiSnapshot` and upsert them through the store.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tempo_config::PolicyConfig;
use tempo_core::enums::WorkCategory;
use tempo_core::hierarchy::ProjectHierarchy;
use tempo_core::kpi::{KpiResults, KpiSnapshot, project_filter_key};
use tempo_core::month::{Month, MonthFilter};
use tempo_metrics::actual_hours::{compute_actual_hours, total_hours};
use tempo_metrics::anomaly::Anomaly;
use tempo_metrics::bus_factor::compute_bus_factors;
use tempo_metrics::focus::{average_focus, compute_focus_scores};
use tempo_metrics::lab_tech::compute_lab_tech_hours;
use tempo_metrics::meeting_tax::{compute_meeting_tax, team_meeting_pct};
use tempo_metrics::rollup::compute_category_rollup;
use tempo_metrics::tech_affinity::compute_tech_affinity;
use tempo_metrics::utilization::{average_utilization, compute_planned_utilization};
use tempo_metrics::{MetricsService, ProjectScope, share_pct};
use tempo_store::DataStore;

use crate::error::KpiError;
use crate::narrative::{Narrative, NarrativeGenerator};
use crate::registry::{KpiId, TrendDirection};

/// One month of a KPI trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub month: Month,
    pub value: Option<f64>,
    pub formatted: String,
    /// Change from the previous point, `None` for the first point.
    pub direction: Option<TrendDirection>,
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

pub struct KpiEngine<S> {
    metrics: MetricsService<S>,
}

impl<S: DataStore> KpiEngine<S> {
    #[must_use]
    pub const fn new(store: S, policy: PolicyConfig) -> Self {
        Self {
            metrics: MetricsService::new(store, policy),
        }
    }

    #[must_use]
    pub const fn from_service(metrics: MetricsService<S>) -> Self {
        Self { metrics }
    }

    /// The metric service the engine computes through.
    #[must_use]
    pub const fn metrics(&self) -> &MetricsService<S> {
        &self.metrics
    }

    /// Compute every KPI for `month`.
    ///
    /// KPIs that are undefined for a single project are `None` when a
    /// project filter is set.
    ///
    /// # Errors
    ///
    /// Returns `KpiError::Store` if a store read fails.
    pub async fn compute_all(
        &self,
        month: Month,
        project_filter: Option<&str>,
    ) -> Result<KpiResults, KpiError> {
        let months = [month];
        let store = self.metrics.store();
        let (records, allocations, projects, team) = tokio::try_join!(
            store.list_work_records(&months),
            store.list_allocations(&months),
            store.list_projects(),
            store.team_settings()
        )?;
        tracing::debug!(
            %month,
            project = project_filter.unwrap_or("*"),
            records = records.len(),
            allocations = allocations.len(),
            "computing KPIs"
        );

        let scope = ProjectScope::new(ProjectHierarchy::from_projects(&projects), project_filter);
        let capacity = team.standard_monthly_capacity_hours;
        let policy = self.metrics.policy();

        let actual = compute_actual_hours(&records, &months, &scope);
        let total_actual_hours = total_hours(&actual);
        let utilization = compute_planned_utilization(&allocations, &months, &scope, capacity);
        let total_planned_hours: f64 = utilization.iter().map(|u| u.planned_hours).sum();
        let mix = compute_category_rollup(&records, &allocations, &months, &scope)
            .first()
            .map(|r| r.actual)
            .unwrap_or_default();
        let share = |category: WorkCategory| share_pct(mix.get(category), total_actual_hours);
        let engineers: BTreeSet<&str> = actual.iter().map(|a| a.engineer.as_str()).collect();

        let mut results = KpiResults {
            month,
            project_filter: scope.filter().map(String::from),
            total_actual_hours,
            total_planned_hours,
            plan_variance_pct: share_pct(
                total_actual_hours - total_planned_hours,
                total_planned_hours,
            ),
            npd_pct: share(WorkCategory::Npd),
            sustaining_pct: share(WorkCategory::Sustaining),
            sprint_pct: share(WorkCategory::Sprint),
            firefighting_pct: share(WorkCategory::Firefighting),
            active_engineers: count_u32(engineers.len()),
            tech_collaboration_hours: compute_tech_affinity(&records, &months, &scope)
                .iter()
                .map(|t| t.hours)
                .sum(),
            lab_tech_hours: compute_lab_tech_hours(&records, &months, &scope)
                .iter()
                .map(|l| l.hours)
                .sum(),
            avg_utilization_pct: None,
            over_allocated_count: None,
            meeting_tax_pct: None,
            avg_focus_score: None,
            at_risk_projects: None,
            active_projects: None,
        };

        if !scope.is_single_project() {
            let risks = compute_bus_factors(&records, &months, &scope, &policy.bus_factor);
            let active: BTreeSet<&str> = actual.iter().map(|a| a.project_id.as_str()).collect();

            results.avg_utilization_pct = Some(average_utilization(&utilization));
            results.over_allocated_count =
                Some(count_u32(utilization.iter().filter(|u| u.is_over_allocated()).count()));
            results.meeting_tax_pct =
                Some(team_meeting_pct(&compute_meeting_tax(&records, &months, &scope)));
            results.avg_focus_score =
                average_focus(&compute_focus_scores(&records, &months, &scope, &policy.focus));
            results.at_risk_projects =
                Some(count_u32(risks.iter().filter(|r| r.risk.is_at_risk()).count()));
            results.active_projects = Some(count_u32(active.len()));
        }

        Ok(results)
    }

    /// Anomalies for `month` against its trailing baseline.
    ///
    /// # Errors
    ///
    /// Returns `KpiError::Metrics` if a store read fails.
    pub async fn anomalies(
        &self,
        month: Month,
        project_filter: Option<&str>,
    ) -> Result<Vec<Anomaly>, KpiError> {
        Ok(self.metrics.anomalies(month, project_filter).await?)
    }

    /// Narrative paragraph and highlights for `month`.
    ///
    /// # Errors
    ///
    /// Returns an error if any store read fails.
    pub async fn narrative(
        &self,
        month: Month,
        project_filter: Option<&str>,
    ) -> Result<Narrative, KpiError> {
        let (results, anomalies) = tokio::try_join!(
            self.compute_all(month, project_filter),
            self.anomalies(month, project_filter)
        )?;
        Ok(NarrativeGenerator::generate(&results, &anomalies))
    }

    /// Recompute and upsert the snapshot for `month`.
    ///
    /// # Errors
    ///
    /// Returns `KpiError::Store` if a read or the snapshot write fails.
    pub async fn refresh_snapshot(
        &self,
        month: Month,
        project_filter: Option<&str>,
    ) -> Result<KpiSnapshot, KpiError> {
        let snapshot = KpiSnapshot::from_results(self.compute_all(month, project_filter).await?);
        self.metrics.store().put_snapshot(snapshot.clone()).await?;
        tracing::info!(
            %month,
            project = %snapshot.project_filter,
            "stored KPI snapshot"
        );
        Ok(snapshot)
    }

    /// The stored snapshot for `month`, computing and storing it on a miss.
    ///
    /// # Errors
    ///
    /// Returns `KpiError::Store` if the store fails.
    pub async fn snapshot(
        &self,
        month: Month,
        project_filter: Option<&str>,
    ) -> Result<KpiSnapshot, KpiError> {
        let key = project_filter_key(project_filter);
        if let Some(snapshot) = self.metrics.store().get_snapshot(month, &key).await? {
            return Ok(snapshot);
        }
        self.refresh_snapshot(month, project_filter).await
    }

    /// Refresh the all-projects snapshot of every month in `filter`.
    ///
    /// Months are refreshed in order, one at a time.
    ///
    /// # Errors
    ///
    /// Returns `KpiError::Core` for an invalid range, or the first store
    /// failure.
    pub async fn refresh_range(&self, filter: &MonthFilter) -> Result<Vec<KpiSnapshot>, KpiError> {
        let months = filter.resolve()?;
        let mut snapshots = Vec::with_capacity(months.len());
        for month in months {
            snapshots.push(self.refresh_snapshot(month, None).await?);
        }
        Ok(snapshots)
    }

    /// One KPI across the months of `filter`, read from snapshots.
    ///
    /// # Errors
    ///
    /// Returns `KpiError::Core` for an invalid range, or the first store
    /// failure.
    pub async fn trend(
        &self,
        kpi: KpiId,
        filter: &MonthFilter,
        project_filter: Option<&str>,
    ) -> Result<Vec<TrendPoint>, KpiError> {
        let definition = kpi.definition();
        let mut points: Vec<TrendPoint> = Vec::new();
        for month in filter.resolve()? {
            let snapshot = self.snapshot(month, project_filter).await?;
            let value = definition.value(&snapshot.results);
            let direction = points
                .last()
                .and_then(|previous| definition.trend(value, previous.value));
            points.push(TrendPoint {
                month,
                value,
                formatted: definition.format_value(&snapshot.results),
                direction,
            });
        }
        Ok(points)
    }
}
