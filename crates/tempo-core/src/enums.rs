//! Work categories, project types, and classification enums for Tempo.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! Ordered enums (`Severity`, `RiskLevel`) sort most significant first.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// WorkCategory
// ---------------------------------------------------------------------------

/// Category of work a single work record was booked against.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum WorkCategory {
    Npd,
    Sustaining,
    Sprint,
    Firefighting,
    Admin,
    Meeting,
    Ooo,
    LabTech,
}

impl WorkCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Npd => "npd",
            Self::Sustaining => "sustaining",
            Self::Sprint => "sprint",
            Self::Firefighting => "firefighting",
            Self::Admin => "admin",
            Self::Meeting => "meeting",
            Self::Ooo => "ooo",
            Self::LabTech => "lab_tech",
        }
    }

    /// Whether hours in this category count as productive project work.
    ///
    /// Meetings, admin, and out-of-office time are overhead; everything else
    /// (including firefighting and lab-tech support) is productive.
    #[must_use]
    pub const fn is_productive(self) -> bool {
        !matches!(self, Self::Admin | Self::Meeting | Self::Ooo)
    }
}

impl fmt::Display for WorkCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ProjectType
// ---------------------------------------------------------------------------

/// Portfolio type of a project.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Npd,
    Sustaining,
    Sprint,
    Other,
}

impl ProjectType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Npd => "npd",
            Self::Sustaining => "sustaining",
            Self::Sprint => "sprint",
            Self::Other => "other",
        }
    }

    /// The work category that planned hours on this project type roll into.
    #[must_use]
    pub const fn planned_category(self) -> Option<WorkCategory> {
        match self {
            Self::Npd => Some(WorkCategory::Npd),
            Self::Sustaining => Some(WorkCategory::Sustaining),
            Self::Sprint => Some(WorkCategory::Sprint),
            Self::Other => None,
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Severity of an anomaly or highlight. Sorts `Alert` first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Alert,
    Warning,
    Info,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RiskLevel
// ---------------------------------------------------------------------------

/// Knowledge-concentration risk of a project. Sorts `Critical` first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl RiskLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Whether the level should be surfaced as an at-risk project.
    #[must_use]
    pub const fn is_at_risk(self) -> bool {
        matches!(self, Self::Critical | Self::High)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
