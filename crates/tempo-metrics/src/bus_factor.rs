//! Knowledge-concentration (bus-factor) risk per project.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tempo_config::BusFactorPolicy;
use tempo_core::entities::WorkRecord;
use tempo_core::enums::{ProjectType, RiskLevel};
use tempo_core::month::{Month, MonthFilter};
use tempo_store::DataStore;

use crate::error::MetricsError;
use crate::scope::ProjectScope;
use crate::service::MetricsService;
use crate::share_pct;

/// Relative slack when comparing a prefix sum against the coverage target.
const COVERAGE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    pub engineer: String,
    pub hours: f64,
    pub share_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusFactorRisk {
    pub project_id: String,
    pub project_type: ProjectType,
    pub total_hours: f64,
    pub bus_factor: usize,
    pub top_contributor: String,
    pub top_contributor_pct: f64,
    pub risk: RiskLevel,
    /// Hours descending, then engineer ascending.
    pub contributors: Vec<Contributor>,
}

/// Smallest `k` such that the first `k` entries of `hours_desc` reach
/// `coverage` of the total.
///
/// `hours_desc` must already be sorted descending. Returns 0 for an empty
/// or all-zero input.
#[must_use]
pub fn bus_factor(hours_desc: &[f64], coverage: f64) -> usize {
    let total: f64 = hours_desc.iter().sum();
    if total <= 0.0 {
        return 0;
    }
    let target = coverage * total - COVERAGE_EPSILON * total;
    let mut cumulative = 0.0;
    for (i, hours) in hours_desc.iter().enumerate() {
        cumulative += hours;
        if cumulative >= target {
            return i + 1;
        }
    }
    hours_desc.len()
}

/// Map a bus factor and top-contributor share onto a risk level.
///
/// Monotone: a smaller bus factor or a larger top share never lowers risk.
#[must_use]
pub fn classify_risk(
    bus_factor: usize,
    top_contributor_pct: f64,
    policy: &BusFactorPolicy,
) -> RiskLevel {
    if bus_factor <= 1 && top_contributor_pct >= policy.critical_top_share {
        RiskLevel::Critical
    } else if bus_factor <= 1 || top_contributor_pct >= policy.high_top_share {
        RiskLevel::High
    } else if bus_factor == 2 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Bus-factor risk for every in-scope project with productive hours.
///
/// Ordered by risk (critical first), then project id.
#[must_use]
pub fn compute_bus_factors(
    records: &[WorkRecord],
    months: &[Month],
    scope: &ProjectScope,
    policy: &BusFactorPolicy,
) -> Vec<BusFactorRisk> {
    let mut projects: BTreeMap<&str, BTreeMap<&str, f64>> = BTreeMap::new();
    for record in records.iter().filter(|r| {
        r.category.is_productive() && months.contains(&r.month) && scope.matches(&r.project_id)
    }) {
        *projects
            .entry(record.project_id.as_str())
            .or_default()
            .entry(record.engineer.as_str())
            .or_default() += record.hours;
    }

    let mut risks: Vec<BusFactorRisk> = projects
        .into_iter()
        .filter_map(|(project_id, people)| assess_project(project_id, &people, scope, policy))
        .collect();
    risks.sort_by(|a, b| a.risk.cmp(&b.risk).then_with(|| a.project_id.cmp(&b.project_id)));
    risks
}

fn assess_project(
    project_id: &str,
    people: &BTreeMap<&str, f64>,
    scope: &ProjectScope,
    policy: &BusFactorPolicy,
) -> Option<BusFactorRisk> {
    let total_hours: f64 = people.values().sum();
    if total_hours <= 0.0 {
        return None;
    }

    let mut ranked: Vec<(&str, f64)> = people.iter().map(|(e, h)| (*e, *h)).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let hours_desc: Vec<f64> = ranked.iter().map(|(_, h)| *h).collect();
    let k = bus_factor(&hours_desc, policy.coverage);
    let (top_contributor, top_hours) = ranked[0];
    let top_contributor_pct = share_pct(top_hours, total_hours);

    Some(BusFactorRisk {
        project_id: project_id.to_string(),
        project_type: scope.hierarchy().project_type(project_id),
        total_hours,
        bus_factor: k,
        top_contributor: top_contributor.to_string(),
        top_contributor_pct,
        risk: classify_risk(k, top_contributor_pct, policy),
        contributors: ranked
            .into_iter()
            .map(|(engineer, hours)| Contributor {
                engineer: engineer.to_string(),
                hours,
                share_pct: share_pct(hours, total_hours),
            })
            .collect(),
    })
}

impl<S: DataStore> MetricsService<S> {
    /// Bus-factor risk per project.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::Core` for an invalid month range and
    /// `MetricsError::Store` if a store read fails.
    pub async fn bus_factors(
        &self,
        filter: &MonthFilter,
        project_filter: Option<&str>,
    ) -> Result<Vec<BusFactorRisk>, MetricsError> {
        let months = filter.resolve()?;
        let (records, scope) =
            tokio::try_join!(self.work_records(&months), self.scope(project_filter))?;
        let risks = compute_bus_factors(&records, &months, &scope, &self.policy().bus_factor);
        tracing::debug!(
            projects = risks.len(),
            at_risk = risks.iter().filter(|r| r.risk.is_at_risk()).count(),
            "computed bus factors"
        );
        Ok(risks)
    }
}
