//! Template-driven narrative over KPI results and anomalies.
//!
//! [`NARRATIVE_RULES`] is an ordered table; each rule either renders one
//! sentence or stays silent. The paragraph is the rendered sentences in
//! table order. Highlights come from threshold breaches and anomalies,
//! ranked and capped at [`MAX_HIGHLIGHTS`]. Output depends only on the
//! inputs, and every number is rendered through the registry formatter.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tempo_core::enums::Severity;
use tempo_core::kpi::KpiResults;
use tempo_metrics::anomaly::Anomaly;

use crate::format::{FormatKind, format_value};
use crate::registry::{KpiId, KpiStatus, definitions_for};

pub const MAX_HIGHLIGHTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narrative {
    pub paragraph: String,
    pub highlights: Vec<String>,
}

/// One sentence template.
pub struct NarrativeRule {
    pub id: &'static str,
    pub render: fn(&KpiResults, &[Anomaly]) -> Option<String>,
}

pub const NARRATIVE_RULES: &[NarrativeRule] = &[
    NarrativeRule {
        id: "headline",
        render: headline,
    },
    NarrativeRule {
        id: "work_mix",
        render: work_mix,
    },
    NarrativeRule {
        id: "utilization",
        render: utilization,
    },
    NarrativeRule {
        id: "team_health",
        render: team_health,
    },
    NarrativeRule {
        id: "bus_factor",
        render: bus_factor,
    },
    NarrativeRule {
        id: "anomalies",
        render: anomaly_summary,
    },
];

fn kpi_text(id: KpiId, results: &KpiResults) -> String {
    id.definition().format_value(results)
}

fn count(value: u32) -> String {
    format_value(FormatKind::Count, Some(f64::from(value)))
}

fn plural(n: u32, one: &'static str, many: &'static str) -> &'static str {
    if n == 1 { one } else { many }
}

fn headline(results: &KpiResults, _: &[Anomaly]) -> Option<String> {
    let subject = results
        .project_filter
        .as_deref()
        .map_or_else(|| "The team".to_string(), |p| format!("Project {p}"));
    if results.total_actual_hours <= 0.0 && results.total_planned_hours <= 0.0 {
        return Some(format!("{subject} has no hours recorded or planned for {}.", results.month));
    }
    Some(format!(
        "{subject} logged {} against {} planned in {}, a plan variance of {}.",
        kpi_text(KpiId::TotalActualHours, results),
        kpi_text(KpiId::TotalPlannedHours, results),
        results.month,
        kpi_text(KpiId::PlanVariance, results),
    ))
}

fn work_mix(results: &KpiResults, _: &[Anomaly]) -> Option<String> {
    (results.total_actual_hours > 0.0).then(|| {
        format!(
            "Work split {} NPD, {} sustaining, {} sprint and {} firefighting across {} {}.",
            kpi_text(KpiId::NpdShare, results),
            kpi_text(KpiId::SustainingShare, results),
            kpi_text(KpiId::SprintShare, results),
            kpi_text(KpiId::FirefightingShare, results),
            count(results.active_engineers),
            plural(results.active_engineers, "engineer", "engineers"),
        )
    })
}

fn utilization(results: &KpiResults, _: &[Anomaly]) -> Option<String> {
    let over = results.avg_utilization_pct.and(results.over_allocated_count)?;
    Some(format!(
        "Average planned utilization was {} with {} {} over capacity.",
        kpi_text(KpiId::AvgUtilization, results),
        count(over),
        plural(over, "engineer", "engineers"),
    ))
}

fn team_health(results: &KpiResults, _: &[Anomaly]) -> Option<String> {
    match (results.meeting_tax_pct, results.avg_focus_score) {
        (None, None) => None,
        (Some(_), None) => Some(format!(
            "Meetings took {} of logged time.",
            kpi_text(KpiId::MeetingTax, results)
        )),
        (None, Some(_)) => Some(format!(
            "The average focus score was {}.",
            kpi_text(KpiId::FocusScore, results)
        )),
        (Some(_), Some(_)) => Some(format!(
            "Meetings took {} of logged time and the average focus score was {}.",
            kpi_text(KpiId::MeetingTax, results),
            kpi_text(KpiId::FocusScore, results)
        )),
    }
}

fn bus_factor(results: &KpiResults, _: &[Anomaly]) -> Option<String> {
    let at_risk = results.at_risk_projects.filter(|n| *n > 0)?;
    let active = results.active_projects.unwrap_or(at_risk);
    Some(format!(
        "{} of {} active {} {} concentrated in one or two people.",
        count(at_risk),
        count(active),
        plural(active, "project", "projects"),
        plural(at_risk, "is", "are"),
    ))
}

fn anomaly_summary(_: &KpiResults, anomalies: &[Anomaly]) -> Option<String> {
    let lead = anomalies
        .iter()
        .map(Highlight::from_anomaly)
        .min_by(Highlight::rank)?;
    let n = u32::try_from(anomalies.len()).unwrap_or(u32::MAX);
    Some(format!(
        "{} {} flagged against the trailing baseline, led by {}.",
        count(n),
        plural(n, "anomaly was", "anomalies were"),
        lead.text.to_lowercase(),
    ))
}

// ---------------------------------------------------------------------------
// Highlights
// ---------------------------------------------------------------------------

/// A highlight candidate. `magnitude` is always a percentage: anomaly
/// deviation, or threshold shortfall relative to the threshold.
struct Highlight {
    severity: Severity,
    magnitude: f64,
    text: String,
}

impl Highlight {
    fn from_anomaly(anomaly: &Anomaly) -> Self {
        Self {
            severity: anomaly.severity,
            magnitude: anomaly.deviation_pct.abs(),
            text: anomaly.title.clone(),
        }
    }

    /// Most severe first, then largest magnitude, then text.
    fn rank(a: &Self, b: &Self) -> Ordering {
        a.severity
            .cmp(&b.severity)
            .then_with(|| b.magnitude.total_cmp(&a.magnitude))
            .then_with(|| a.text.cmp(&b.text))
    }
}

fn threshold_highlights(results: &KpiResults) -> impl Iterator<Item = Highlight> + '_ {
    definitions_for(results.project_filter.as_deref())
        .into_iter()
        .filter_map(move |definition| {
            let threshold = definition.threshold?;
            let value = definition.value(results)?;
            let severity = match threshold.status(value) {
                KpiStatus::Good => return None,
                KpiStatus::Warning => Severity::Warning,
                KpiStatus::Critical => Severity::Alert,
            };
            Some(Highlight {
                severity,
                magnitude: threshold.shortfall_pct(value),
                text: format!("{} at {}", definition.label, definition.format_value(results)),
            })
        })
}

fn rank_highlights(mut highlights: Vec<Highlight>) -> Vec<String> {
    highlights.sort_by(Highlight::rank);
    let mut texts: Vec<String> = Vec::with_capacity(MAX_HIGHLIGHTS);
    for highlight in highlights {
        if texts.len() == MAX_HIGHLIGHTS {
            break;
        }
        if !texts.contains(&highlight.text) {
            texts.push(highlight.text);
        }
    }
    texts
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct NarrativeGenerator;

impl NarrativeGenerator {
    #[must_use]
    pub fn generate(results: &KpiResults, anomalies: &[Anomaly]) -> Narrative {
        let paragraph = NARRATIVE_RULES
            .iter()
            .filter_map(|rule| (rule.render)(results, anomalies))
            .collect::<Vec<_>>()
            .join(" ");

        let highlights = threshold_highlights(results)
            .chain(anomalies.iter().map(Highlight::from_anomaly))
            .collect();

        Narrative {
            paragraph,
            highlights: rank_highlights(highlights),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempo_metrics::anomaly::AnomalyMetric;

    fn results(project_filter: Option<&str>) -> KpiResults {
        let team = project_filter.is_none();
        KpiResults {
            month: "2025-03".parse().unwrap(),
            project_filter: project_filter.map(String::from),
            total_actual_hours: 1_280.0,
            total_planned_hours: 1_200.0,
            plan_variance_pct: 6.666_666_666_666_667,
            npd_pct: 55.0,
            sustaining_pct: 20.0,
            sprint_pct: 10.0,
            firefighting_pct: 15.0,
            active_engineers: 8,
            tech_collaboration_hours: 64.0,
            lab_tech_hours: 40.0,
            avg_utilization_pct: team.then_some(92.5),
            over_allocated_count: team.then_some(2),
            meeting_tax_pct: team.then_some(12.0),
            avg_focus_score: team.then_some(64.2),
            at_risk_projects: team.then_some(1),
            active_projects: team.then_some(9),
        }
    }

    fn anomaly(title: &str, severity: Severity, deviation_pct: f64) -> Anomaly {
        Anomaly {
            metric: AnomalyMetric::TotalHours,
            title: title.into(),
            detail: String::new(),
            severity,
            deviation_pct,
            current: 0.0,
            baseline: 0.0,
        }
    }

    #[test]
    fn team_paragraph_follows_rule_order() {
        let narrative = NarrativeGenerator::generate(&results(None), &[]);
        assert_eq!(
            narrative.paragraph,
            "The team logged 1,280.0 h against 1,200.0 h planned in 2025-03, a plan variance of 6.7%. \
             Work split 55.0% NPD, 20.0% sustaining, 10.0% sprint and 15.0% firefighting across 8 engineers. \
             Average planned utilization was 92.5% with 2 engineers over capacity. \
             Meetings took 12.0% of logged time and the average focus score was 64.2. \
             1 of 9 active projects is concentrated in one or two people."
        );
    }

    #[test]
    fn single_project_omits_team_sentences() {
        let narrative = NarrativeGenerator::generate(&results(Some("P-7")), &[]);
        assert!(narrative.paragraph.starts_with("Project P-7 logged"));
        assert!(!narrative.paragraph.contains("utilization"));
        assert!(!narrative.paragraph.contains("focus"));
        assert_eq!(narrative.highlights, vec!["Firefighting share at 15.0%".to_string()]);
    }

    #[test]
    fn highlights_rank_by_severity_then_magnitude_and_cap() {
        let anomalies = vec![
            anomaly("Total hours up 30.0%", Severity::Warning, 30.0),
            anomaly("Meeting share up 90.0%", Severity::Alert, 90.0),
            anomaly("Lab-tech hours down 16.0%", Severity::Info, -16.0),
            anomaly("Active engineers down 55.0%", Severity::Alert, -55.0),
        ];
        let narrative = NarrativeGenerator::generate(&results(None), &anomalies);

        assert_eq!(narrative.highlights.len(), MAX_HIGHLIGHTS);
        assert_eq!(
            narrative.highlights,
            vec![
                "Over-allocated engineers at 2".to_string(),
                "Meeting share up 90.0%".to_string(),
                "Active engineers down 55.0%".to_string(),
                "Firefighting share at 15.0%".to_string(),
                "Projects at bus-factor risk at 1".to_string(),
            ]
        );
        assert!(narrative.paragraph.ends_with(
            "4 anomalies were flagged against the trailing baseline, led by meeting share up 90.0%."
        ));
    }

    #[test]
    fn lead_anomaly_ignores_input_order() {
        let mut anomalies = vec![
            anomaly("Lab-tech hours down 16.0%", Severity::Info, -16.0),
            anomaly("Total hours up 30.0%", Severity::Warning, 30.0),
            anomaly("Active engineers down 55.0%", Severity::Alert, -55.0),
            anomaly("Meeting share up 90.0%", Severity::Alert, 90.0),
        ];
        let forward = NarrativeGenerator::generate(&results(Some("P-7")), &anomalies);
        anomalies.reverse();
        let backward = NarrativeGenerator::generate(&results(Some("P-7")), &anomalies);

        assert_eq!(forward, backward);
        assert!(forward.paragraph.ends_with("led by meeting share up 90.0%."));
        assert_eq!(forward.highlights[0], "Meeting share up 90.0%");
    }

    #[test]
    fn generation_is_deterministic() {
        let anomalies = vec![anomaly("Total hours up 30.0%", Severity::Warning, 30.0)];
        let first = NarrativeGenerator::generate(&results(None), &anomalies);
        let second = NarrativeGenerator::generate(&results(None), &anomalies);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_month_still_has_a_headline() {
        let mut r = results(Some("P-7"));
        r.total_actual_hours = 0.0;
        r.total_planned_hours = 0.0;
        let narrative = NarrativeGenerator::generate(&r, &[]);
        assert!(
            narrative
                .paragraph
                .starts_with("Project P-7 has no hours recorded or planned for 2025-03.")
        );
    }
}
