//! MetricsService over a MemoryStore
//!
//! End-to-end checks that each entry point resolves its months, reads the
//! store, and applies the hierarchy-aware project filter:
//! - Actual hours over a month range with child roll-up
//! - Utilization and capacity forecast against team capacity
//! - Anomalies with and without history
//! - Skill matches and milestone status
//! - Invalid month ranges surface as errors

use chrono::NaiveDate;
use tempo_config::{PolicyConfig, TeamSettings};
use tempo_core::entities::{
    Milestone, MilestoneGate, PlannedAllocation, Project, SkillRating, SkillRequirement, WorkRecord,
};
use tempo_core::enums::{ProjectType, RiskLevel, Severity, WorkCategory};
use tempo_core::kpi::KpiSnapshot;
use tempo_core::month::{Month, MonthFilter};
use tempo_metrics::milestones::GateState;
use tempo_metrics::{MetricsError, MetricsService};
use tempo_store::{DataStore, MemoryStore, StoreError};

fn m(token: &str) -> Month {
    token.parse().unwrap()
}

fn project(id: &str, project_type: ProjectType, parent: Option<&str>) -> Project {
    Project {
        project_id: id.into(),
        project_name: format!("Project {id}"),
        project_type,
        parent_id: parent.map(Into::into),
    }
}

fn work(
    engineer: &str,
    project_id: &str,
    month: &str,
    hours: f64,
    category: WorkCategory,
) -> WorkRecord {
    WorkRecord {
        engineer: engineer.into(),
        project_id: project_id.into(),
        tech_code: None,
        month: m(month),
        date: None,
        hours,
        category,
    }
}

fn plan(engineer: &str, project_id: &str, month: &str, hours: f64) -> PlannedAllocation {
    PlannedAllocation {
        engineer: engineer.into(),
        project_id: project_id.into(),
        month: m(month),
        planned_hours: hours,
    }
}

fn team() -> TeamSettings {
    TeamSettings {
        name: "Hardware".into(),
        standard_monthly_capacity_hours: 160.0,
    }
}

/// Three steady months followed by a firefighting spike in March.
fn store() -> MemoryStore {
    let mut records = Vec::new();
    for month in ["2024-12", "2025-01", "2025-02"] {
        records.push(work("avery", "P-100", month, 120.0, WorkCategory::Npd));
        records.push(work("avery", "P-100", month, 10.0, WorkCategory::Firefighting));
        records.push(work("blake", "P-101", month, 100.0, WorkCategory::Npd));
        records.push(work("blake", "S-1", month, 30.0, WorkCategory::Sustaining));
    }
    records.push(work("avery", "P-100", "2025-03", 90.0, WorkCategory::Npd));
    records.push(work("avery", "P-100", "2025-03", 40.0, WorkCategory::Firefighting));
    records.push(work("blake", "P-101", "2025-03", 100.0, WorkCategory::Npd));
    records.push(work("blake", "S-1", "2025-03", 30.0, WorkCategory::Sustaining));

    MemoryStore::new(team())
        .with_projects(vec![
            project("P-100", ProjectType::Npd, None),
            project("P-101", ProjectType::Npd, Some("P-100")),
            project("S-1", ProjectType::Sustaining, None),
        ])
        .with_work_records(records)
        .with_allocations(vec![
            plan("avery", "P-100", "2025-03", 200.0),
            plan("blake", "P-101", "2025-03", 80.0),
            plan("blake", "S-1", "2025-04", 40.0),
        ])
        .with_skill_ratings(vec![
            SkillRating {
                engineer: "avery".into(),
                skill: "rf".into(),
                rating: 4,
            },
            SkillRating {
                engineer: "blake".into(),
                skill: "rf".into(),
                rating: 2,
            },
        ])
        .with_skill_requirements(vec![SkillRequirement {
            project_id: "P-100".into(),
            skill: "rf".into(),
            min_rating: 3,
        }])
        .with_milestones(vec![Milestone {
            project_id: "P-100".into(),
            gates: vec![MilestoneGate {
                name: "EVT".into(),
                target_date: NaiveDate::from_ymd_opt(2025, 3, 20).unwrap(),
            }],
        }])
}

fn service() -> MetricsService<MemoryStore> {
    MetricsService::new(store(), PolicyConfig::default())
}

// ---------------------------------------------------------------------------
// Core computers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn actual_hours_over_range_with_roll_up() {
    let svc = service();
    let filter = MonthFilter::range("2025-01", "2025-02").unwrap();

    let all = svc.actual_hours(&filter, None).await.unwrap();
    let total: f64 = all.iter().map(|r| r.hours).sum();
    assert!((total - 520.0).abs() < 1e-9);

    let rolled = svc.actual_hours(&filter, Some("P-100")).await.unwrap();
    let projects: Vec<&str> = rolled.iter().map(|r| r.project_id.as_str()).collect();
    assert_eq!(projects, vec!["P-100", "P-101"]);
}

#[tokio::test]
async fn inverted_range_is_rejected() {
    let svc = service();
    let filter = MonthFilter::Range {
        start: m("2025-03"),
        end: m("2025-01"),
    };
    let err = svc.actual_hours(&filter, None).await.unwrap_err();
    assert!(matches!(err, MetricsError::Core(_)));
}

#[tokio::test]
async fn utilization_uses_team_capacity() {
    let svc = service();
    let rows = svc
        .planned_utilization(&MonthFilter::from(m("2025-03")), None)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert!((rows[0].utilization_pct - 125.0).abs() < 1e-9);
    assert!((rows[1].utilization_pct - 50.0).abs() < 1e-9);
}

#[tokio::test]
async fn capacity_forecast_covers_every_requested_month() {
    let svc = service();
    let forecast = svc
        .capacity_forecast(&[m("2025-03"), m("2025-04"), m("2025-05")], None)
        .await
        .unwrap();

    assert_eq!(forecast.months.len(), 3);
    assert_eq!(forecast.month(m("2025-03")).unwrap().over_allocated_count, 1);
    assert!((forecast.month(m("2025-04")).unwrap().total_allocated - 40.0).abs() < 1e-9);
    assert!(forecast.month(m("2025-05")).unwrap().total_allocated.abs() < 1e-9);
}

// ---------------------------------------------------------------------------
// Composite analytics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn firefighting_spike_is_flagged() {
    let svc = service();
    let anomalies = svc.anomalies(m("2025-03"), None).await.unwrap();

    let spike = anomalies
        .iter()
        .find(|a| a.title.starts_with("Firefighting share"))
        .unwrap();
    assert_eq!(spike.severity, Severity::Alert);
    assert!(spike.deviation_pct > 0.0);
}

#[tokio::test]
async fn first_month_has_no_anomalies() {
    let svc = service();
    let anomalies = svc.anomalies(m("2024-12"), None).await.unwrap();
    assert!(anomalies.is_empty());
}

#[tokio::test]
async fn bus_factor_flags_single_owner_projects() {
    let svc = service();
    let risks = svc
        .bus_factors(&MonthFilter::from(m("2025-03")), None)
        .await
        .unwrap();
    assert!(risks.iter().all(|r| r.bus_factor == 1));
    assert!(risks.iter().all(|r| r.risk == RiskLevel::Critical));

    let json = serde_json::to_value(&risks[0]).unwrap();
    assert_eq!(json["risk"], "critical");
    assert_eq!(json["contributors"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn skill_matches_rank_qualified_engineers_first() {
    let svc = service();
    let matches = svc.skill_matches("P-100").await.unwrap();
    assert_eq!(matches[0].engineer, "avery");
    assert!((matches[0].match_pct - 100.0).abs() < 1e-9);
    assert_eq!(matches[1].gaps.len(), 1);

    assert!(svc.skill_matches("S-1").await.unwrap().is_empty());
}

#[tokio::test]
async fn milestone_status_is_relative_to_as_of() {
    let svc = service();
    let before = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let after = NaiveDate::from_ymd_opt(2025, 3, 21).unwrap();

    let reports = svc.milestone_status(before, Some("P-100")).await.unwrap();
    assert_eq!(reports[0].gates[0].state, GateState::DueSoon);

    let reports = svc.milestone_status(after, Some("P-100")).await.unwrap();
    assert_eq!(reports[0].gates[0].state, GateState::Completed);
    assert!(reports[0].next_gate.is_none());

    assert!(svc.milestone_status(before, Some("S-1")).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Store failures
// ---------------------------------------------------------------------------

/// A backend whose project listing is down; every other read delegates.
struct ProjectsUnavailable(MemoryStore);

impl DataStore for ProjectsUnavailable {
    async fn list_work_records(&self, months: &[Month]) -> Result<Vec<WorkRecord>, StoreError> {
        self.0.list_work_records(months).await
    }

    async fn list_allocations(
        &self,
        months: &[Month],
    ) -> Result<Vec<PlannedAllocation>, StoreError> {
        self.0.list_allocations(months).await
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        Err(anyhow::anyhow!("project catalog unreachable").into())
    }

    async fn list_milestones(&self) -> Result<Vec<Milestone>, StoreError> {
        self.0.list_milestones().await
    }

    async fn list_skill_ratings(&self) -> Result<Vec<SkillRating>, StoreError> {
        self.0.list_skill_ratings().await
    }

    async fn list_skill_requirements(
        &self,
        project_id: &str,
    ) -> Result<Vec<SkillRequirement>, StoreError> {
        self.0.list_skill_requirements(project_id).await
    }

    async fn team_settings(&self) -> Result<TeamSettings, StoreError> {
        self.0.team_settings().await
    }

    async fn get_snapshot(
        &self,
        month: Month,
        project_filter: &str,
    ) -> Result<Option<KpiSnapshot>, StoreError> {
        self.0.get_snapshot(month, project_filter).await
    }

    async fn put_snapshot(&self, snapshot: KpiSnapshot) -> Result<(), StoreError> {
        self.0.put_snapshot(snapshot).await
    }
}

#[tokio::test]
async fn backend_failure_surfaces_as_store_error() {
    let svc = MetricsService::new(ProjectsUnavailable(store()), PolicyConfig::default());
    let err = svc
        .actual_hours(&MonthFilter::from(m("2025-03")), None)
        .await
        .unwrap_err();

    assert!(matches!(err, MetricsError::Store(StoreError::Other(_))));
    assert!(err.to_string().contains("project catalog unreachable"));
}
