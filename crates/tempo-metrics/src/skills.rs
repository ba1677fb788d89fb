//! Skill compatibility of engineers against a project's requirements.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tempo_core::entities::{SkillRating, SkillRequirement};
use tempo_store::DataStore;

use crate::error::MetricsError;
use crate::service::MetricsService;
use crate::share_pct;

/// A requirement the engineer falls short of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillGap {
    pub skill: String,
    pub required: u8,
    /// 0 when the engineer has no rating for the skill.
    pub actual: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMatch {
    pub engineer: String,
    pub met: usize,
    pub required: usize,
    pub match_pct: f64,
    /// Mean of `rating - min_rating` over all requirements; negative when
    /// the engineer is short on average.
    pub avg_surplus: f64,
    pub gaps: Vec<SkillGap>,
}

/// Rank every rated engineer against `requirements`.
///
/// Duplicate requirements for one skill keep the highest minimum. Ranked by
/// match descending, then average surplus descending, then engineer.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn score_skill_compatibility(
    requirements: &[SkillRequirement],
    ratings: &[SkillRating],
) -> Vec<SkillMatch> {
    let mut required: BTreeMap<&str, u8> = BTreeMap::new();
    for requirement in requirements {
        let min = required.entry(requirement.skill.as_str()).or_default();
        *min = (*min).max(requirement.min_rating);
    }
    if required.is_empty() {
        return Vec::new();
    }

    let mut by_engineer: BTreeMap<&str, BTreeMap<&str, u8>> = BTreeMap::new();
    for rating in ratings {
        by_engineer
            .entry(rating.engineer.as_str())
            .or_default()
            .insert(rating.skill.as_str(), rating.rating);
    }
    let engineers: BTreeSet<&str> = by_engineer.keys().copied().collect();

    let mut matches: Vec<SkillMatch> = engineers
        .into_iter()
        .map(|engineer| {
            let skills = by_engineer.get(engineer);
            let mut gaps = Vec::new();
            let mut surplus = 0.0;
            for (skill, min) in &required {
                let actual = skills.and_then(|s| s.get(skill)).copied().unwrap_or(0);
                surplus += f64::from(actual) - f64::from(*min);
                if actual < *min {
                    gaps.push(SkillGap {
                        skill: (*skill).to_string(),
                        required: *min,
                        actual,
                    });
                }
            }
            let met = required.len() - gaps.len();
            SkillMatch {
                engineer: engineer.to_string(),
                met,
                required: required.len(),
                match_pct: share_pct(met as f64, required.len() as f64),
                avg_surplus: surplus / required.len() as f64,
                gaps,
            }
        })
        .collect();

    matches.sort_by(|a, b| {
        b.match_pct
            .total_cmp(&a.match_pct)
            .then_with(|| b.avg_surplus.total_cmp(&a.avg_surplus))
            .then_with(|| a.engineer.cmp(&b.engineer))
    });
    matches
}

impl<S: DataStore> MetricsService<S> {
    /// Ranked skill matches for one project.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::Store` if a store read fails.
    pub async fn skill_matches(&self, project_id: &str) -> Result<Vec<SkillMatch>, MetricsError> {
        let (requirements, ratings) = tokio::try_join!(
            self.store().list_skill_requirements(project_id),
            self.store().list_skill_ratings()
        )?;
        Ok(score_skill_compatibility(&requirements, &ratings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rating(engineer: &str, skill: &str, rating: u8) -> SkillRating {
        SkillRating {
            engineer: engineer.into(),
            skill: skill.into(),
            rating,
        }
    }

    fn requirement(skill: &str, min_rating: u8) -> SkillRequirement {
        SkillRequirement {
            project_id: "P-1".into(),
            skill: skill.into(),
            min_rating,
        }
    }

    #[test]
    fn ranks_by_match_then_surplus_then_name() {
        let requirements = vec![requirement("rf", 3), requirement("firmware", 2)];
        let ratings = vec![
            rating("avery", "rf", 3),
            rating("avery", "firmware", 2),
            rating("blake", "rf", 5),
            rating("blake", "firmware", 4),
            rating("casey", "rf", 4),
            rating("dana", "rf", 3),
            rating("dana", "firmware", 2),
        ];
        let matches = score_skill_compatibility(&requirements, &ratings);

        let order: Vec<(&str, f64)> = matches
            .iter()
            .map(|m| (m.engineer.as_str(), m.match_pct))
            .collect();
        assert_eq!(
            order,
            vec![("blake", 100.0), ("avery", 100.0), ("dana", 100.0), ("casey", 50.0)]
        );
        assert_eq!(
            matches[3].gaps,
            vec![SkillGap {
                skill: "firmware".into(),
                required: 2,
                actual: 0
            }]
        );
    }

    #[test]
    fn duplicate_requirements_keep_the_highest_minimum() {
        let requirements = vec![requirement("rf", 2), requirement("rf", 4)];
        let matches = score_skill_compatibility(&requirements, &[rating("avery", "rf", 3)]);
        assert_eq!(matches[0].required, 1);
        assert_eq!(matches[0].met, 0);
        assert_eq!(matches[0].match_pct, 0.0);
    }

    #[test]
    fn no_requirements_give_no_matches() {
        assert!(score_skill_compatibility(&[], &[rating("avery", "rf", 5)]).is_empty());
    }
}
