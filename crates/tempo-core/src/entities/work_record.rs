use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::WorkCategory;
use crate::month::Month;

/// Hours one engineer booked against one project in one month.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct WorkRecord {
    pub engineer: String,
    pub project_id: String,
    /// Lab technician who collaborated on the work, if any.
    #[serde(default)]
    pub tech_code: Option<String>,
    pub month: Month,
    /// Calendar day of the booking. Monthly imports leave this empty.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub hours: f64,
    pub category: WorkCategory,
}
