use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Self or manager assessed proficiency, `0..=5`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SkillRating {
    pub engineer: String,
    pub skill: String,
    pub rating: u8,
}

/// Minimum proficiency a project needs in one skill.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SkillRequirement {
    pub project_id: String,
    pub skill: String,
    pub min_rating: u8,
}
