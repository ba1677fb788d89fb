//! Declarative KPI catalog.
//!
//! [`KPI_REGISTRY`] holds one [`KpiDefinition`] per [`KpiId`], in
//! `KpiId::ALL` order. Trend views, exports, and the narrative generator all
//! read KPI values, labels, formatting, and thresholds from here.

use serde::{Deserialize, Serialize};
use std::fmt;
use tempo_core::kpi::KpiResults;

use crate::format::{FormatKind, format_value};

// ---------------------------------------------------------------------------
// KpiId
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiId {
    TotalActualHours,
    TotalPlannedHours,
    PlanVariance,
    NpdShare,
    SustainingShare,
    SprintShare,
    FirefightingShare,
    ActiveEngineers,
    TechCollaborationHours,
    LabTechHours,
    AvgUtilization,
    OverAllocated,
    MeetingTax,
    FocusScore,
    AtRiskProjects,
    ActiveProjects,
}

impl KpiId {
    pub const ALL: [Self; 16] = [
        Self::TotalActualHours,
        Self::TotalPlannedHours,
        Self::PlanVariance,
        Self::NpdShare,
        Self::SustainingShare,
        Self::SprintShare,
        Self::FirefightingShare,
        Self::ActiveEngineers,
        Self::TechCollaborationHours,
        Self::LabTechHours,
        Self::AvgUtilization,
        Self::OverAllocated,
        Self::MeetingTax,
        Self::FocusScore,
        Self::AtRiskProjects,
        Self::ActiveProjects,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TotalActualHours => "total_actual_hours",
            Self::TotalPlannedHours => "total_planned_hours",
            Self::PlanVariance => "plan_variance",
            Self::NpdShare => "npd_share",
            Self::SustainingShare => "sustaining_share",
            Self::SprintShare => "sprint_share",
            Self::FirefightingShare => "firefighting_share",
            Self::ActiveEngineers => "active_engineers",
            Self::TechCollaborationHours => "tech_collaboration_hours",
            Self::LabTechHours => "lab_tech_hours",
            Self::AvgUtilization => "avg_utilization",
            Self::OverAllocated => "over_allocated",
            Self::MeetingTax => "meeting_tax",
            Self::FocusScore => "focus_score",
            Self::AtRiskProjects => "at_risk_projects",
            Self::ActiveProjects => "active_projects",
        }
    }

    /// Read this KPI's value out of a results object.
    ///
    /// `None` when the KPI was not computed for that view.
    #[must_use]
    pub fn value(self, results: &KpiResults) -> Option<f64> {
        match self {
            Self::TotalActualHours => Some(results.total_actual_hours),
            Self::TotalPlannedHours => Some(results.total_planned_hours),
            Self::PlanVariance => Some(results.plan_variance_pct),
            Self::NpdShare => Some(results.npd_pct),
            Self::SustainingShare => Some(results.sustaining_pct),
            Self::SprintShare => Some(results.sprint_pct),
            Self::FirefightingShare => Some(results.firefighting_pct),
            Self::ActiveEngineers => Some(f64::from(results.active_engineers)),
            Self::TechCollaborationHours => Some(results.tech_collaboration_hours),
            Self::LabTechHours => Some(results.lab_tech_hours),
            Self::AvgUtilization => results.avg_utilization_pct,
            Self::OverAllocated => results.over_allocated_count.map(f64::from),
            Self::MeetingTax => results.meeting_tax_pct,
            Self::FocusScore => results.avg_focus_score,
            Self::AtRiskProjects => results.at_risk_projects.map(f64::from),
            Self::ActiveProjects => results.active_projects.map(f64::from),
        }
    }

    /// This KPI's registry entry.
    #[must_use]
    pub fn definition(self) -> &'static KpiDefinition {
        &KPI_REGISTRY[self as usize]
    }
}

impl fmt::Display for KpiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiCategory {
    Utilization,
    WorkMix,
    TeamHealth,
    Throughput,
}

/// Where a value sits against its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiStatus {
    Critical,
    Warning,
    Good,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Flat,
    Worsening,
}

/// Coloring rule for a KPI.
///
/// Higher is better unless `invert` is set, in which case lower is better
/// and `good <= warn`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub good: f64,
    pub warn: f64,
    pub invert: bool,
}

impl Threshold {
    #[must_use]
    pub fn status(&self, value: f64) -> KpiStatus {
        let (at_good, at_warn) = if self.invert {
            (value <= self.good, value <= self.warn)
        } else {
            (value >= self.good, value >= self.warn)
        };
        if at_good {
            KpiStatus::Good
        } else if at_warn {
            KpiStatus::Warning
        } else {
            KpiStatus::Critical
        }
    }

    /// How far `value` falls on the wrong side of `good`, in units of the
    /// KPI. 0 when the value is good.
    #[must_use]
    pub fn shortfall(&self, value: f64) -> f64 {
        let gap = if self.invert {
            value - self.good
        } else {
            self.good - value
        };
        gap.max(0.0)
    }

    /// [`shortfall`](Self::shortfall) as a percent of `good`, or of the
    /// `good`..`warn` span when `good` is zero. Comparable with anomaly
    /// deviations, which are also percentages.
    #[must_use]
    pub fn shortfall_pct(&self, value: f64) -> f64 {
        let scale = if self.good.abs() > f64::EPSILON {
            self.good.abs()
        } else {
            (self.warn - self.good).abs()
        };
        let shortfall = self.shortfall(value);
        if scale > 0.0 {
            shortfall / scale * 100.0
        } else {
            shortfall
        }
    }
}

// ---------------------------------------------------------------------------
// KpiDefinition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KpiDefinition {
    pub id: KpiId,
    pub label: &'static str,
    pub format: FormatKind,
    pub category: KpiCategory,
    pub threshold: Option<Threshold>,
    /// Whether the KPI means anything when one project is selected.
    pub applicable_to_single_project: bool,
}

/// Changes smaller than this are flat.
const TREND_EPSILON: f64 = 1e-9;

impl KpiDefinition {
    #[must_use]
    pub fn value(&self, results: &KpiResults) -> Option<f64> {
        self.id.value(results)
    }

    /// Threshold status, `None` without a threshold or value.
    #[must_use]
    pub fn status(&self, results: &KpiResults) -> Option<KpiStatus> {
        let threshold = self.threshold?;
        self.value(results).map(|v| threshold.status(v))
    }

    /// Direction of change from `previous` to `current`.
    ///
    /// A rise is an improvement unless the threshold is inverted.
    #[must_use]
    pub fn trend(&self, current: Option<f64>, previous: Option<f64>) -> Option<TrendDirection> {
        let delta = current? - previous?;
        if delta.abs() < TREND_EPSILON {
            return Some(TrendDirection::Flat);
        }
        let lower_is_better = self.threshold.is_some_and(|t| t.invert);
        Some(if (delta > 0.0) == lower_is_better {
            TrendDirection::Worsening
        } else {
            TrendDirection::Improving
        })
    }

    #[must_use]
    pub fn format_value(&self, results: &KpiResults) -> String {
        format_value(self.format, self.value(results))
    }
}

const fn kpi(
    id: KpiId,
    label: &'static str,
    format: FormatKind,
    category: KpiCategory,
    threshold: Option<Threshold>,
    applicable_to_single_project: bool,
) -> KpiDefinition {
    KpiDefinition {
        id,
        label,
        format,
        category,
        threshold,
        applicable_to_single_project,
    }
}

const fn higher_is_better(good: f64, warn: f64) -> Option<Threshold> {
    Some(Threshold {
        good,
        warn,
        invert: false,
    })
}

const fn lower_is_better(good: f64, warn: f64) -> Option<Threshold> {
    Some(Threshold {
        good,
        warn,
        invert: true,
    })
}

pub const KPI_REGISTRY: &[KpiDefinition] = &[
    kpi(
        KpiId::TotalActualHours,
        "Actual hours",
        FormatKind::Hours,
        KpiCategory::Throughput,
        None,
        true,
    ),
    kpi(
        KpiId::TotalPlannedHours,
        "Planned hours",
        FormatKind::Hours,
        KpiCategory::Throughput,
        None,
        true,
    ),
    kpi(
        KpiId::PlanVariance,
        "Plan variance",
        FormatKind::Percent,
        KpiCategory::Throughput,
        None,
        true,
    ),
    kpi(
        KpiId::NpdShare,
        "NPD share",
        FormatKind::Percent,
        KpiCategory::WorkMix,
        higher_is_better(50.0, 35.0),
        true,
    ),
    kpi(
        KpiId::SustainingShare,
        "Sustaining share",
        FormatKind::Percent,
        KpiCategory::WorkMix,
        None,
        true,
    ),
    kpi(
        KpiId::SprintShare,
        "Sprint share",
        FormatKind::Percent,
        KpiCategory::WorkMix,
        None,
        true,
    ),
    kpi(
        KpiId::FirefightingShare,
        "Firefighting share",
        FormatKind::Percent,
        KpiCategory::WorkMix,
        lower_is_better(10.0, 20.0),
        true,
    ),
    kpi(
        KpiId::ActiveEngineers,
        "Active engineers",
        FormatKind::Count,
        KpiCategory::Throughput,
        None,
        true,
    ),
    kpi(
        KpiId::TechCollaborationHours,
        "Lab-tech collaboration",
        FormatKind::Hours,
        KpiCategory::Throughput,
        None,
        true,
    ),
    kpi(
        KpiId::LabTechHours,
        "Lab-tech hours",
        FormatKind::Hours,
        KpiCategory::Throughput,
        None,
        true,
    ),
    kpi(
        KpiId::AvgUtilization,
        "Average utilization",
        FormatKind::Percent,
        KpiCategory::Utilization,
        higher_is_better(80.0, 60.0),
        false,
    ),
    kpi(
        KpiId::OverAllocated,
        "Over-allocated engineers",
        FormatKind::Count,
        KpiCategory::Utilization,
        lower_is_better(0.0, 1.0),
        false,
    ),
    kpi(
        KpiId::MeetingTax,
        "Meeting tax",
        FormatKind::Percent,
        KpiCategory::TeamHealth,
        lower_is_better(10.0, 20.0),
        false,
    ),
    kpi(
        KpiId::FocusScore,
        "Focus score",
        FormatKind::Decimal,
        KpiCategory::TeamHealth,
        higher_is_better(70.0, 50.0),
        false,
    ),
    kpi(
        KpiId::AtRiskProjects,
        "Projects at bus-factor risk",
        FormatKind::Count,
        KpiCategory::TeamHealth,
        lower_is_better(0.0, 2.0),
        false,
    ),
    kpi(
        KpiId::ActiveProjects,
        "Active projects",
        FormatKind::Count,
        KpiCategory::Throughput,
        None,
        false,
    ),
];

/// Definitions that apply to a view. A non-empty project filter drops KPIs
/// that are undefined for a single project.
#[must_use]
pub fn definitions_for(project_filter: Option<&str>) -> Vec<&'static KpiDefinition> {
    let single_project = project_filter.is_some_and(|f| !f.is_empty());
    KPI_REGISTRY
        .iter()
        .filter(|d| !single_project || d.applicable_to_single_project)
        .collect()
}
