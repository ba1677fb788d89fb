//! Milestone gate status relative to an explicit as-of date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tempo_config::MilestonePolicy;
use tempo_core::entities::Milestone;
use tempo_store::DataStore;

use crate::error::MetricsError;
use crate::scope::ProjectScope;
use crate::service::MetricsService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    Completed,
    DueSoon,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateStatus {
    pub name: String,
    pub target_date: NaiveDate,
    /// Negative once the target date has passed.
    pub days_until: i64,
    pub state: GateState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneReport {
    pub project_id: String,
    /// Ordered by target date.
    pub gates: Vec<GateStatus>,
    /// First gate not yet completed.
    pub next_gate: Option<GateStatus>,
}

#[must_use]
pub const fn gate_state(days_until: i64, policy: &MilestonePolicy) -> GateState {
    if days_until < 0 {
        GateState::Completed
    } else if days_until <= policy.due_soon_days {
        GateState::DueSoon
    } else {
        GateState::Upcoming
    }
}

/// Status of every in-scope milestone as of `as_of`, ordered by project.
#[must_use]
pub fn milestone_status(
    milestones: &[Milestone],
    as_of: NaiveDate,
    scope: &ProjectScope,
    policy: &MilestonePolicy,
) -> Vec<MilestoneReport> {
    let mut reports: Vec<MilestoneReport> = milestones
        .iter()
        .filter(|m| scope.matches(&m.project_id))
        .map(|milestone| {
            let mut gates: Vec<GateStatus> = milestone
                .gates
                .iter()
                .map(|gate| {
                    let days_until = (gate.target_date - as_of).num_days();
                    GateStatus {
                        name: gate.name.clone(),
                        target_date: gate.target_date,
                        days_until,
                        state: gate_state(days_until, policy),
                    }
                })
                .collect();
            gates.sort_by(|a, b| {
                a.target_date
                    .cmp(&b.target_date)
                    .then_with(|| a.name.cmp(&b.name))
            });
            let next_gate = gates.iter().find(|g| g.state != GateState::Completed).cloned();
            MilestoneReport {
                project_id: milestone.project_id.clone(),
                gates,
                next_gate,
            }
        })
        .collect();
    reports.sort_by(|a, b| a.project_id.cmp(&b.project_id));
    reports
}

impl<S: DataStore> MetricsService<S> {
    /// Milestone status as of a given date.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::Store` if a store read fails.
    pub async fn milestone_status(
        &self,
        as_of: NaiveDate,
        project_filter: Option<&str>,
    ) -> Result<Vec<MilestoneReport>, MetricsError> {
        let (milestones, scope) =
            tokio::try_join!(self.milestones(), self.scope(project_filter))?;
        Ok(milestone_status(&milestones, as_of, &scope, &self.policy().milestones))
    }
}
