use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A named target date on a project's schedule (e.g. a phase gate).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MilestoneGate {
    pub name: String,
    pub target_date: NaiveDate,
}

/// The gate schedule of one project, in schedule order.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Milestone {
    pub project_id: String,
    pub gates: Vec<MilestoneGate>,
}
