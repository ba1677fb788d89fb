//! Meeting and overhead share of each engineer's hours.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tempo_core::entities::WorkRecord;
use tempo_core::enums::WorkCategory;
use tempo_core::month::{Month, MonthFilter};
use tempo_store::DataStore;

use crate::error::MetricsError;
use crate::scope::ProjectScope;
use crate::service::MetricsService;
use crate::share_pct;

/// An engineer's hours split into overhead buckets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeetingTax {
    pub engineer: String,
    pub meeting_hours: f64,
    pub admin_hours: f64,
    pub ooo_hours: f64,
    pub productive_hours: f64,
    pub total_hours: f64,
    /// `meeting_hours / total_hours * 100`, 0 for an empty total.
    pub meeting_pct: f64,
}

/// Partition each engineer's in-scope hours into meeting, admin, OOO, and
/// productive buckets.
#[must_use]
pub fn compute_meeting_tax(
    records: &[WorkRecord],
    months: &[Month],
    scope: &ProjectScope,
) -> Vec<MeetingTax> {
    let mut people: BTreeMap<&str, MeetingTax> = BTreeMap::new();
    for record in records
        .iter()
        .filter(|r| months.contains(&r.month) && scope.matches(&r.project_id))
    {
        let row = people.entry(record.engineer.as_str()).or_default();
        match record.category {
            WorkCategory::Meeting => row.meeting_hours += record.hours,
            WorkCategory::Admin => row.admin_hours += record.hours,
            WorkCategory::Ooo => row.ooo_hours += record.hours,
            _ => row.productive_hours += record.hours,
        }
        row.total_hours += record.hours;
    }

    people
        .into_iter()
        .map(|(engineer, mut row)| {
            row.engineer = engineer.to_string();
            row.meeting_pct = share_pct(row.meeting_hours, row.total_hours);
            row
        })
        .collect()
}

/// Team-wide meeting share: total meeting hours over total hours.
#[must_use]
pub fn team_meeting_pct(rows: &[MeetingTax]) -> f64 {
    let meeting: f64 = rows.iter().map(|r| r.meeting_hours).sum();
    let total: f64 = rows.iter().map(|r| r.total_hours).sum();
    share_pct(meeting, total)
}

impl<S: DataStore> MetricsService<S> {
    /// Meeting tax per engineer.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::Core` for an invalid month range and
    /// `MetricsError::Store` if a store read fails.
    pub async fn meeting_tax(
        &self,
        filter: &MonthFilter,
        project_filter: Option<&str>,
    ) -> Result<Vec<MeetingTax>, MetricsError> {
        let months = filter.resolve()?;
        let (records, scope) =
            tokio::try_join!(self.work_records(&months), self.scope(project_filter))?;
        Ok(compute_meeting_tax(&records, &months, &scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{month, record};
    use pretty_assertions::assert_eq;

    #[test]
    fn partitions_buckets_and_computes_share() {
        let records = vec![
            record("avery", "P-1", "2025-01", 20.0, WorkCategory::Meeting),
            record("avery", "ADMIN", "2025-01", 10.0, WorkCategory::Admin),
            record("avery", "ADMIN", "2025-01", 8.0, WorkCategory::Ooo),
            record("avery", "P-1", "2025-01", 100.0, WorkCategory::Npd),
            record("avery", "P-1", "2025-01", 22.0, WorkCategory::Firefighting),
        ];
        let rows = compute_meeting_tax(&records, &[month("2025-01")], &ProjectScope::default());

        assert_eq!(
            rows,
            vec![MeetingTax {
                engineer: "avery".into(),
                meeting_hours: 20.0,
                admin_hours: 10.0,
                ooo_hours: 8.0,
                productive_hours: 122.0,
                total_hours: 160.0,
                meeting_pct: 12.5,
            }]
        );
        assert_eq!(team_meeting_pct(&rows), 12.5);
    }

    #[test]
    fn zero_hours_give_zero_share() {
        let records = vec![record("avery", "P-1", "2025-01", 0.0, WorkCategory::Meeting)];
        let rows = compute_meeting_tax(&records, &[month("2025-01")], &ProjectScope::default());
        assert_eq!(rows[0].meeting_pct, 0.0);
        assert_eq!(team_meeting_pct(&[]), 0.0);
    }
}
