//! Business policy constants for the composite analytics.
//!
//! These are tunable policy, not mechanism: each algorithm keeps its shape
//! (monotonicity, stopping rule, degenerate-input handling) regardless of
//! the values chosen here.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const fn default_high_fragmentation_projects() -> usize {
    3
}

const fn default_fragmentation_weight() -> f64 {
    0.6
}

const fn default_switching_weight() -> f64 {
    0.4
}

const fn default_coverage() -> f64 {
    0.8
}

const fn default_critical_top_share() -> f64 {
    60.0
}

const fn default_high_top_share() -> f64 {
    50.0
}

const fn default_history_months() -> usize {
    3
}

const fn default_alert_pct() -> f64 {
    50.0
}

const fn default_warning_pct() -> f64 {
    25.0
}

const fn default_info_pct() -> f64 {
    15.0
}

const fn default_due_soon_days() -> i64 {
    14
}

/// Focus score weighting.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FocusPolicy {
    /// A day touching more distinct projects than this is high-fragmentation.
    #[serde(default = "default_high_fragmentation_projects")]
    pub high_fragmentation_projects: usize,

    /// Weight of the share of non-fragmented days.
    #[serde(default = "default_fragmentation_weight")]
    pub fragmentation_weight: f64,

    /// Weight of the inverse average daily project count.
    #[serde(default = "default_switching_weight")]
    pub switching_weight: f64,
}

impl Default for FocusPolicy {
    fn default() -> Self {
        Self {
            high_fragmentation_projects: default_high_fragmentation_projects(),
            fragmentation_weight: default_fragmentation_weight(),
            switching_weight: default_switching_weight(),
        }
    }
}

/// Bus-factor coverage and risk breakpoints.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BusFactorPolicy {
    /// Share of total project hours the top contributors must cover, `(0, 1]`.
    #[serde(default = "default_coverage")]
    pub coverage: f64,

    /// Top-contributor share (percent) that makes a bus factor of one critical.
    #[serde(default = "default_critical_top_share")]
    pub critical_top_share: f64,

    /// Top-contributor share (percent) that makes any project high risk.
    #[serde(default = "default_high_top_share")]
    pub high_top_share: f64,
}

impl Default for BusFactorPolicy {
    fn default() -> Self {
        Self {
            coverage: default_coverage(),
            critical_top_share: default_critical_top_share(),
            high_top_share: default_high_top_share(),
        }
    }
}

/// Trailing-baseline anomaly thresholds, in absolute percent deviation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnomalyPolicy {
    /// Months before the target month used as the baseline.
    #[serde(default = "default_history_months")]
    pub history_months: usize,

    #[serde(default = "default_alert_pct")]
    pub alert_pct: f64,

    #[serde(default = "default_warning_pct")]
    pub warning_pct: f64,

    #[serde(default = "default_info_pct")]
    pub info_pct: f64,
}

impl Default for AnomalyPolicy {
    fn default() -> Self {
        Self {
            history_months: default_history_months(),
            alert_pct: default_alert_pct(),
            warning_pct: default_warning_pct(),
            info_pct: default_info_pct(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MilestonePolicy {
    /// Gates within this many days of the as-of date are due soon.
    #[serde(default = "default_due_soon_days")]
    pub due_soon_days: i64,
}

impl Default for MilestonePolicy {
    fn default() -> Self {
        Self {
            due_soon_days: default_due_soon_days(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub focus: FocusPolicy,
    #[serde(default)]
    pub bus_factor: BusFactorPolicy,
    #[serde(default)]
    pub anomaly: AnomalyPolicy,
    #[serde(default)]
    pub milestones: MilestonePolicy,
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

impl PolicyConfig {
    /// Reject values that would break an algorithm's invariants.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let focus = &self.focus;
        if focus.fragmentation_weight < 0.0 || focus.switching_weight < 0.0 {
            return Err(invalid("policy.focus", "weights must be non-negative"));
        }
        if (focus.fragmentation_weight + focus.switching_weight - 1.0).abs() > 1e-6 {
            return Err(invalid("policy.focus", "weights must sum to 1.0"));
        }

        let bus = &self.bus_factor;
        if !(bus.coverage > 0.0 && bus.coverage <= 1.0) {
            return Err(invalid("policy.bus_factor.coverage", "must be in (0, 1]"));
        }
        if bus.critical_top_share < bus.high_top_share {
            return Err(invalid(
                "policy.bus_factor.critical_top_share",
                "must be at least high_top_share",
            ));
        }

        let anomaly = &self.anomaly;
        if !(anomaly.alert_pct >= anomaly.warning_pct
            && anomaly.warning_pct >= anomaly.info_pct
            && anomaly.info_pct > 0.0)
        {
            return Err(invalid(
                "policy.anomaly",
                "thresholds must satisfy alert >= warning >= info > 0",
            ));
        }

        if self.milestones.due_soon_days < 0 {
            return Err(invalid("policy.milestones.due_soon_days", "must be non-negative"));
        }
        Ok(())
    }
}
