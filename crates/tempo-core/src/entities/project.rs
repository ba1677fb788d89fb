use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ProjectType;

/// A project in the portfolio forest.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Project {
    pub project_id: String,
    pub project_name: String,
    pub project_type: ProjectType,
    /// Roll-up project this one reports into. `None` for roots.
    #[serde(default)]
    pub parent_id: Option<String>,
}
