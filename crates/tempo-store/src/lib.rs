//! # tempo-store
//!
//! The read-only data store boundary Tempo computes over.
//!
//! [`DataStore`] abstracts the external store: record listings filtered by
//! month, project metadata, team settings, and KPI snapshot get/put. Metric
//! code is generic over it and never touches persistence mechanics.
//! [`MemoryStore`] is the in-memory implementation used by tests and by
//! callers that already hold their records; [`SnapshotJournal`] persists
//! snapshots as JSONL.

pub mod error;
pub mod journal;
pub mod memory;

use std::future::Future;
use std::sync::Arc;

use tempo_config::TeamSettings;
use tempo_core::entities::{
    Milestone, PlannedAllocation, Project, SkillRating, SkillRequirement, WorkRecord,
};
use tempo_core::kpi::KpiSnapshot;
use tempo_core::month::Month;

pub use error::StoreError;
pub use journal::SnapshotJournal;
pub use memory::MemoryStore;

/// Read access to imported records plus keyed KPI snapshot storage.
///
/// Reads never mutate shared state, so callers may issue them concurrently.
/// `put_snapshot` replaces any snapshot with the same `(month,
/// project_filter)` key whole; concurrent puts resolve last-write-wins.
pub trait DataStore: Send + Sync {
    /// Work records whose month is in `months`.
    fn list_work_records(
        &self,
        months: &[Month],
    ) -> impl Future<Output = Result<Vec<WorkRecord>, StoreError>> + Send;

    /// Planned allocations whose month is in `months`.
    fn list_allocations(
        &self,
        months: &[Month],
    ) -> impl Future<Output = Result<Vec<PlannedAllocation>, StoreError>> + Send;

    fn list_projects(&self) -> impl Future<Output = Result<Vec<Project>, StoreError>> + Send;

    fn list_milestones(&self) -> impl Future<Output = Result<Vec<Milestone>, StoreError>> + Send;

    fn list_skill_ratings(
        &self,
    ) -> impl Future<Output = Result<Vec<SkillRating>, StoreError>> + Send;

    /// Skill requirements of one project. Unknown projects have none.
    fn list_skill_requirements(
        &self,
        project_id: &str,
    ) -> impl Future<Output = Result<Vec<SkillRequirement>, StoreError>> + Send;

    /// Team name and standard monthly capacity.
    fn team_settings(&self) -> impl Future<Output = Result<TeamSettings, StoreError>> + Send;

    /// Snapshot for a month and project filter (`""` = all projects).
    fn get_snapshot(
        &self,
        month: Month,
        project_filter: &str,
    ) -> impl Future<Output = Result<Option<KpiSnapshot>, StoreError>> + Send;

    /// Upsert a fully formed snapshot.
    fn put_snapshot(
        &self,
        snapshot: KpiSnapshot,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

impl<T: DataStore> DataStore for Arc<T> {
    fn list_work_records(
        &self,
        months: &[Month],
    ) -> impl Future<Output = Result<Vec<WorkRecord>, StoreError>> + Send {
        (**self).list_work_records(months)
    }

    fn list_allocations(
        &self,
        months: &[Month],
    ) -> impl Future<Output = Result<Vec<PlannedAllocation>, StoreError>> + Send {
        (**self).list_allocations(months)
    }

    fn list_projects(&self) -> impl Future<Output = Result<Vec<Project>, StoreError>> + Send {
        (**self).list_projects()
    }

    fn list_milestones(&self) -> impl Future<Output = Result<Vec<Milestone>, StoreError>> + Send {
        (**self).list_milestones()
    }

    fn list_skill_ratings(
        &self,
    ) -> impl Future<Output = Result<Vec<SkillRating>, StoreError>> + Send {
        (**self).list_skill_ratings()
    }

    fn list_skill_requirements(
        &self,
        project_id: &str,
    ) -> impl Future<Output = Result<Vec<SkillRequirement>, StoreError>> + Send {
        (**self).list_skill_requirements(project_id)
    }

    fn team_settings(&self) -> impl Future<Output = Result<TeamSettings, StoreError>> + Send {
        (**self).team_settings()
    }

    fn get_snapshot(
        &self,
        month: Month,
        project_filter: &str,
    ) -> impl Future<Output = Result<Option<KpiSnapshot>, StoreError>> + Send {
        (**self).get_snapshot(month, project_filter)
    }

    fn put_snapshot(
        &self,
        snapshot: KpiSnapshot,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        (**self).put_snapshot(snapshot)
    }
}
