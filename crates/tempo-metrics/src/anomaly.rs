//! Trailing-baseline anomaly detection over team-level monthly metrics.
//!
//! Each tracked metric for the target month is compared with its mean over
//! the preceding `history_months` calendar months. Months in that window
//! without any work records are left out of the baseline; if none remain,
//! nothing is flagged.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tempo_config::AnomalyPolicy;
use tempo_core::entities::{PlannedAllocation, WorkRecord};
use tempo_core::enums::{Severity, WorkCategory};
use tempo_core::month::Month;
use tempo_store::DataStore;

use crate::error::MetricsError;
use crate::scope::ProjectScope;
use crate::service::MetricsService;
use crate::share_pct;
use crate::utilization::{average_utilization, compute_planned_utilization};

// ---------------------------------------------------------------------------
// Tracked metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyMetric {
    TotalHours,
    FirefightingShare,
    MeetingShare,
    Utilization,
    LabTechHours,
    ActiveEngineers,
}

impl AnomalyMetric {
    pub const ALL: [Self; 6] = [
        Self::TotalHours,
        Self::FirefightingShare,
        Self::MeetingShare,
        Self::Utilization,
        Self::LabTechHours,
        Self::ActiveEngineers,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TotalHours => "total_hours",
            Self::FirefightingShare => "firefighting_share",
            Self::MeetingShare => "meeting_share",
            Self::Utilization => "utilization",
            Self::LabTechHours => "lab_tech_hours",
            Self::ActiveEngineers => "active_engineers",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TotalHours => "Total hours",
            Self::FirefightingShare => "Firefighting share",
            Self::MeetingShare => "Meeting share",
            Self::Utilization => "Average utilization",
            Self::LabTechHours => "Lab-tech hours",
            Self::ActiveEngineers => "Active engineers",
        }
    }

    const fn unit(self) -> &'static str {
        match self {
            Self::TotalHours | Self::LabTechHours => " h",
            Self::FirefightingShare | Self::MeetingShare | Self::Utilization => "%",
            Self::ActiveEngineers => "",
        }
    }

    #[must_use]
    pub fn value(self, profile: &MonthProfile) -> f64 {
        match self {
            Self::TotalHours => profile.total_hours,
            Self::FirefightingShare => profile.firefighting_pct,
            Self::MeetingShare => profile.meeting_pct,
            Self::Utilization => profile.avg_utilization,
            Self::LabTechHours => profile.lab_tech_hours,
            Self::ActiveEngineers => profile.active_engineers,
        }
    }
}

impl fmt::Display for AnomalyMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// MonthProfile
// ---------------------------------------------------------------------------

/// Team-level values of every tracked metric for one month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthProfile {
    pub month: Option<Month>,
    pub record_count: usize,
    pub total_hours: f64,
    pub firefighting_pct: f64,
    pub meeting_pct: f64,
    pub avg_utilization: f64,
    pub lab_tech_hours: f64,
    pub active_engineers: f64,
}

impl MonthProfile {
    /// Profile `month` from the in-scope records and allocations.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(
        month: Month,
        records: &[WorkRecord],
        allocations: &[PlannedAllocation],
        scope: &ProjectScope,
        capacity: f64,
    ) -> Self {
        let mut profile = Self {
            month: Some(month),
            ..Self::default()
        };
        let mut firefighting = 0.0;
        let mut meeting = 0.0;
        let mut engineers = BTreeSet::new();
        for record in records
            .iter()
            .filter(|r| r.month == month && scope.matches(&r.project_id))
        {
            profile.record_count += 1;
            profile.total_hours += record.hours;
            engineers.insert(record.engineer.as_str());
            match record.category {
                WorkCategory::Firefighting => firefighting += record.hours,
                WorkCategory::Meeting => meeting += record.hours,
                WorkCategory::LabTech => profile.lab_tech_hours += record.hours,
                _ => {}
            }
        }
        profile.firefighting_pct = share_pct(firefighting, profile.total_hours);
        profile.meeting_pct = share_pct(meeting, profile.total_hours);
        profile.active_engineers = engineers.len() as f64;
        profile.avg_utilization = average_utilization(&compute_planned_utilization(
            allocations,
            &[month],
            scope,
            capacity,
        ));
        profile
    }

    #[must_use]
    pub const fn has_records(&self) -> bool {
        self.record_count > 0
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub metric: AnomalyMetric,
    pub title: String,
    pub detail: String,
    pub severity: Severity,
    /// Signed percent deviation from the baseline mean.
    pub deviation_pct: f64,
    pub current: f64,
    pub baseline: f64,
}

/// Severity for an absolute deviation, or `None` below the info threshold.
#[must_use]
pub fn classify_deviation(deviation_pct: f64, policy: &AnomalyPolicy) -> Option<Severity> {
    let magnitude = deviation_pct.abs();
    if magnitude >= policy.alert_pct {
        Some(Severity::Alert)
    } else if magnitude >= policy.warning_pct {
        Some(Severity::Warning)
    } else if magnitude >= policy.info_pct {
        Some(Severity::Info)
    } else {
        None
    }
}

/// Compare `current` against the mean of the `history` profiles that have
/// records.
///
/// Ordered by severity, then absolute deviation descending, then title.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn detect_anomalies(
    current: &MonthProfile,
    history: &[MonthProfile],
    policy: &AnomalyPolicy,
) -> Vec<Anomaly> {
    let baseline: Vec<&MonthProfile> = history.iter().filter(|p| p.has_records()).collect();
    if baseline.is_empty() || !current.has_records() {
        return Vec::new();
    }

    let mut anomalies: Vec<Anomaly> = AnomalyMetric::ALL
        .into_iter()
        .filter_map(|metric| {
            let mean =
                baseline.iter().map(|p| metric.value(p)).sum::<f64>() / baseline.len() as f64;
            let value = metric.value(current);
            let deviation_pct = share_pct(value - mean, mean);
            let severity = classify_deviation(deviation_pct, policy)?;
            Some(describe(metric, severity, deviation_pct, value, mean, baseline.len()))
        })
        .collect();

    anomalies.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then_with(|| b.deviation_pct.abs().total_cmp(&a.deviation_pct.abs()))
            .then_with(|| a.title.cmp(&b.title))
    });
    anomalies
}

fn describe(
    metric: AnomalyMetric,
    severity: Severity,
    deviation_pct: f64,
    current: f64,
    baseline: f64,
    window: usize,
) -> Anomaly {
    let direction = if deviation_pct >= 0.0 { "up" } else { "down" };
    let unit = metric.unit();
    Anomaly {
        metric,
        title: format!("{} {direction} {:.1}%", metric.label(), deviation_pct.abs()),
        detail: format!(
            "{current:.1}{unit} this month against a {window}-month average of {baseline:.1}{unit}"
        ),
        severity,
        deviation_pct,
        current,
        baseline,
    }
}

impl<S: DataStore> MetricsService<S> {
    /// Anomalies for `month` against the trailing baseline.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::Store` if a store read fails.
    pub async fn anomalies(
        &self,
        month: Month,
        project_filter: Option<&str>,
    ) -> Result<Vec<Anomaly>, MetricsError> {
        let policy = &self.policy().anomaly;
        let history_months = month.trailing(policy.history_months);
        let mut months = history_months.clone();
        months.push(month);

        let (records, allocations, scope, team) = tokio::try_join!(
            self.work_records(&months),
            self.allocations(&months),
            self.scope(project_filter),
            self.team()
        )?;
        let capacity = team.standard_monthly_capacity_hours;
        let profile =
            |m: Month| MonthProfile::compute(m, &records, &allocations, &scope, capacity);

        let current = profile(month);
        let history: Vec<MonthProfile> = history_months.into_iter().map(profile).collect();
        let anomalies = detect_anomalies(&current, &history, policy);
        tracing::debug!(%month, found = anomalies.len(), "anomaly detection finished");
        Ok(anomalies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{allocation, month, record};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn profile(total: f64, firefighting: f64) -> MonthProfile {
        MonthProfile {
            month: None,
            record_count: 10,
            total_hours: total,
            firefighting_pct: firefighting,
            meeting_pct: 10.0,
            avg_utilization: 90.0,
            lab_tech_hours: 20.0,
            active_engineers: 4.0,
        }
    }

    #[test]
    fn flat_series_raises_nothing() {
        let history = vec![profile(640.0, 12.0); 3];
        let anomalies =
            detect_anomalies(&profile(640.0, 12.0), &history, &AnomalyPolicy::default());
        assert!(anomalies.is_empty());
    }

    #[test]
    fn cold_start_raises_nothing() {
        let anomalies = detect_anomalies(&profile(9_999.0, 90.0), &[], &AnomalyPolicy::default());
        assert!(anomalies.is_empty());

        let empty_history = vec![MonthProfile::default(); 3];
        let anomalies =
            detect_anomalies(&profile(9_999.0, 90.0), &empty_history, &AnomalyPolicy::default());
        assert!(anomalies.is_empty());
    }

    #[test]
    fn flags_and_orders_by_severity_then_magnitude() {
        let history = vec![profile(600.0, 10.0), profile(600.0, 10.0), profile(600.0, 10.0)];
        // total +20% (info), firefighting +80% (alert)
        let anomalies =
            detect_anomalies(&profile(720.0, 18.0), &history, &AnomalyPolicy::default());

        let summary: Vec<(AnomalyMetric, Severity)> =
            anomalies.iter().map(|a| (a.metric, a.severity)).collect();
        assert_eq!(
            summary,
            vec![
                (AnomalyMetric::FirefightingShare, Severity::Alert),
                (AnomalyMetric::TotalHours, Severity::Info),
            ]
        );
        assert_eq!(anomalies[0].title, "Firefighting share up 80.0%");
        assert!((anomalies[1].baseline - 600.0).abs() < 1e-9);
    }

    #[test]
    fn empty_history_months_are_excluded_from_baseline() {
        let history = vec![MonthProfile::default(), profile(600.0, 10.0), profile(600.0, 10.0)];
        let anomalies =
            detect_anomalies(&profile(600.0, 10.0), &history, &AnomalyPolicy::default());
        assert!(anomalies.is_empty());
    }

    #[rstest]
    #[case(55.0, Some(Severity::Alert))]
    #[case(-50.0, Some(Severity::Alert))]
    #[case(30.0, Some(Severity::Warning))]
    #[case(-16.0, Some(Severity::Info))]
    #[case(14.9, None)]
    fn deviation_thresholds(#[case] deviation: f64, #[case] expected: Option<Severity>) {
        assert_eq!(classify_deviation(deviation, &AnomalyPolicy::default()), expected);
    }

    #[test]
    fn profile_computes_shares_and_headcount() {
        let records = vec![
            record("avery", "P-1", "2025-03", 80.0, WorkCategory::Npd),
            record("avery", "P-1", "2025-03", 20.0, WorkCategory::Firefighting),
            record("blake", "P-1", "2025-03", 50.0, WorkCategory::Meeting),
            record("blake", "P-1", "2025-03", 50.0, WorkCategory::LabTech),
            record("blake", "P-1", "2025-02", 999.0, WorkCategory::Npd),
        ];
        let allocations = vec![allocation("avery", "P-1", "2025-03", 160.0)];
        let p = MonthProfile::compute(
            month("2025-03"),
            &records,
            &allocations,
            &ProjectScope::default(),
            160.0,
        );

        assert_eq!(p.record_count, 4);
        assert!((p.total_hours - 200.0).abs() < 1e-9);
        assert!((p.firefighting_pct - 10.0).abs() < 1e-9);
        assert!((p.meeting_pct - 25.0).abs() < 1e-9);
        assert!((p.lab_tech_hours - 50.0).abs() < 1e-9);
        assert!((p.active_engineers - 2.0).abs() < 1e-9);
        assert!((p.avg_utilization - 100.0).abs() < 1e-9);
    }
}
