//! In-memory `DataStore` implementation.
//!
//! Records are held immutably after construction. Snapshots live behind a
//! `tokio::sync::RwLock` and can optionally be written through to a
//! [`SnapshotJournal`].

use std::collections::BTreeMap;

use tokio::sync::RwLock;

use tempo_config::TeamSettings;
use tempo_core::entities::{
    Milestone, PlannedAllocation, Project, SkillRating, SkillRequirement, WorkRecord,
};
use tempo_core::kpi::KpiSnapshot;
use tempo_core::month::Month;

use crate::DataStore;
use crate::error::StoreError;
use crate::journal::SnapshotJournal;

/// A `DataStore` over records already loaded into memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    work_records: Vec<WorkRecord>,
    allocations: Vec<PlannedAllocation>,
    projects: Vec<Project>,
    milestones: Vec<Milestone>,
    skill_ratings: Vec<SkillRating>,
    skill_requirements: Vec<SkillRequirement>,
    team: TeamSettings,
    snapshots: RwLock<BTreeMap<(Month, String), KpiSnapshot>>,
    journal: Option<SnapshotJournal>,
}

impl MemoryStore {
    /// Create an empty store with the given team settings.
    #[must_use]
    pub fn new(team: TeamSettings) -> Self {
        Self {
            team,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_work_records(mut self, records: Vec<WorkRecord>) -> Self {
        self.work_records = records;
        self
    }

    #[must_use]
    pub fn with_allocations(mut self, allocations: Vec<PlannedAllocation>) -> Self {
        self.allocations = allocations;
        self
    }

    #[must_use]
    pub fn with_projects(mut self, projects: Vec<Project>) -> Self {
        self.projects = projects;
        self
    }

    #[must_use]
    pub fn with_milestones(mut self, milestones: Vec<Milestone>) -> Self {
        self.milestones = milestones;
        self
    }

    #[must_use]
    pub fn with_skill_ratings(mut self, ratings: Vec<SkillRating>) -> Self {
        self.skill_ratings = ratings;
        self
    }

    #[must_use]
    pub fn with_skill_requirements(mut self, requirements: Vec<SkillRequirement>) -> Self {
        self.skill_requirements = requirements;
        self
    }

    /// Attach a snapshot journal, restoring any snapshots it already holds.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the journal cannot be replayed.
    pub fn with_journal(mut self, journal: SnapshotJournal) -> Result<Self, StoreError> {
        let restored = journal.replay()?;
        tracing::debug!(
            path = %journal.path().display(),
            snapshots = restored.len(),
            "restored KPI snapshots from journal"
        );
        self.snapshots = RwLock::new(restored);
        self.journal = Some(journal);
        Ok(self)
    }

    /// Number of stored snapshots.
    pub async fn snapshot_count(&self) -> usize {
        self.snapshots.read().await.len()
    }
}

impl DataStore for MemoryStore {
    async fn list_work_records(&self, months: &[Month]) -> Result<Vec<WorkRecord>, StoreError> {
        Ok(self
            .work_records
            .iter()
            .filter(|r| months.contains(&r.month))
            .cloned()
            .collect())
    }

    async fn list_allocations(
        &self,
        months: &[Month],
    ) -> Result<Vec<PlannedAllocation>, StoreError> {
        Ok(self
            .allocations
            .iter()
            .filter(|a| months.contains(&a.month))
            .cloned()
            .collect())
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self.projects.clone())
    }

    async fn list_milestones(&self) -> Result<Vec<Milestone>, StoreError> {
        Ok(self.milestones.clone())
    }

    async fn list_skill_ratings(&self) -> Result<Vec<SkillRating>, StoreError> {
        Ok(self.skill_ratings.clone())
    }

    async fn list_skill_requirements(
        &self,
        project_id: &str,
    ) -> Result<Vec<SkillRequirement>, StoreError> {
        Ok(self
            .skill_requirements
            .iter()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn team_settings(&self) -> Result<TeamSettings, StoreError> {
        Ok(self.team.clone())
    }

    async fn get_snapshot(
        &self,
        month: Month,
        project_filter: &str,
    ) -> Result<Option<KpiSnapshot>, StoreError> {
        Ok(self
            .snapshots
            .read()
            .await
            .get(&(month, project_filter.to_string()))
            .cloned())
    }

    async fn put_snapshot(&self, snapshot: KpiSnapshot) -> Result<(), StoreError> {
        let mut snapshots = self.snapshots.write().await;
        if let Some(journal) = &self.journal {
            journal.append(&snapshot)?;
        }
        snapshots.insert(snapshot.key(), snapshot);
        Ok(())
    }
}
