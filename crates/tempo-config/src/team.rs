//! Team-level settings served to the metric computers.

use serde::{Deserialize, Serialize};

/// Standard available hours per engineer per month.
const fn default_capacity() -> f64 {
    160.0
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TeamSettings {
    /// Display name used in narrative headlines.
    #[serde(default)]
    pub name: String,

    /// Standard monthly capacity per engineer, in hours.
    #[serde(default = "default_capacity")]
    pub standard_monthly_capacity_hours: f64,
}

impl Default for TeamSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            standard_monthly_capacity_hours: default_capacity(),
        }
    }
}
