use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::month::Month;

/// Hours planned for an engineer on a project in a month.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct PlannedAllocation {
    pub engineer: String,
    pub project_id: String,
    pub month: Month,
    pub planned_hours: f64,
}
