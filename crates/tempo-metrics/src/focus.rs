//! Focus score: how concentrated a person's days are on a single project.
//!
//! Work is partitioned into days. A dated record lands on its calendar day;
//! undated records of a month share one bucket for that month. A day is
//! high-fragmentation when it touches more distinct projects than the
//! policy threshold.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tempo_config::FocusPolicy;
use tempo_core::entities::WorkRecord;
use tempo_core::month::{Month, MonthFilter};
use tempo_store::DataStore;

use crate::error::MetricsError;
use crate::scope::ProjectScope;
use crate::service::MetricsService;
use crate::share_pct;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusScore {
    pub engineer: String,
    /// Normalized to `[0, 100]`, higher is more focused.
    pub score: f64,
    pub days: usize,
    pub high_fragmentation_days: usize,
    pub avg_daily_projects: f64,
    pub top_project: String,
    pub top_project_pct: f64,
}

#[derive(Default)]
struct PersonDays<'a> {
    days: BTreeMap<(Month, Option<NaiveDate>), BTreeSet<&'a str>>,
    project_hours: BTreeMap<&'a str, f64>,
    total_hours: f64,
}

/// Score from the two fragmentation signals, clamped to `[0, 100]`.
#[must_use]
pub fn focus_formula(
    fragmented_fraction: f64,
    avg_daily_projects: f64,
    policy: &FocusPolicy,
) -> f64 {
    let switching = if avg_daily_projects > 0.0 {
        1.0 / avg_daily_projects
    } else {
        0.0
    };
    let raw = 100.0
        * policy
            .fragmentation_weight
            .mul_add(1.0 - fragmented_fraction, policy.switching_weight * switching);
    raw.clamp(0.0, 100.0)
}

/// Focus score per engineer over productive work in `months`.
///
/// The project filter selects which engineers are reported; each selected
/// engineer is scored over all of their productive work, since switching
/// cost is a property of the person's whole day.
#[must_use]
pub fn compute_focus_scores(
    records: &[WorkRecord],
    months: &[Month],
    scope: &ProjectScope,
    policy: &FocusPolicy,
) -> Vec<FocusScore> {
    let in_months: Vec<&WorkRecord> = records
        .iter()
        .filter(|r| months.contains(&r.month) && r.category.is_productive())
        .collect();
    let selected: BTreeSet<&str> = in_months
        .iter()
        .filter(|r| scope.matches(&r.project_id))
        .map(|r| r.engineer.as_str())
        .collect();

    let mut people: BTreeMap<&str, PersonDays<'_>> = BTreeMap::new();
    for record in in_months
        .iter()
        .filter(|r| selected.contains(r.engineer.as_str()))
    {
        let person = people.entry(record.engineer.as_str()).or_default();
        person
            .days
            .entry((record.month, record.date))
            .or_default()
            .insert(record.project_id.as_str());
        *person.project_hours.entry(record.project_id.as_str()).or_default() += record.hours;
        person.total_hours += record.hours;
    }

    people
        .into_iter()
        .filter(|(_, person)| !person.days.is_empty())
        .map(|(engineer, person)| score_person(engineer, &person, policy))
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn score_person(engineer: &str, person: &PersonDays<'_>, policy: &FocusPolicy) -> FocusScore {
    let days = person.days.len();
    let high_fragmentation_days = person
        .days
        .values()
        .filter(|projects| projects.len() > policy.high_fragmentation_projects)
        .count();
    let project_days: usize = person.days.values().map(BTreeSet::len).sum();
    let avg_daily_projects = project_days as f64 / days as f64;
    let fragmented_fraction = high_fragmentation_days as f64 / days as f64;

    // Highest hours wins; ties go to the smallest project id.
    let (top_project, top_hours) = person
        .project_hours
        .iter()
        .fold(("", f64::NEG_INFINITY), |best, (project, hours)| {
            if *hours > best.1 { (*project, *hours) } else { best }
        });

    FocusScore {
        engineer: engineer.to_string(),
        score: focus_formula(fragmented_fraction, avg_daily_projects, policy),
        days,
        high_fragmentation_days,
        avg_daily_projects,
        top_project: top_project.to_string(),
        top_project_pct: share_pct(top_hours.max(0.0), person.total_hours),
    }
}

/// Mean focus score, `None` when nobody was scored.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_focus(scores: &[FocusScore]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    Some(scores.iter().map(|s| s.score).sum::<f64>() / scores.len() as f64)
}

impl<S: DataStore> MetricsService<S> {
    /// Focus scores per engineer.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::Core` for an invalid month range and
    /// `MetricsError::Store` if a store read fails.
    pub async fn focus_scores(
        &self,
        filter: &MonthFilter,
        project_filter: Option<&str>,
    ) -> Result<Vec<FocusScore>, MetricsError> {
        let months = filter.resolve()?;
        let (records, scope) =
            tokio::try_join!(self.work_records(&months), self.scope(project_filter))?;
        Ok(compute_focus_scores(&records, &months, &scope, &self.policy().focus))
    }
}
