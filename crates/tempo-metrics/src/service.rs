//! Service layer binding the pure metric computers to a data store.
//!
//! `MetricsService` owns a `DataStore` and the analytics policy. The async
//! entry points are implemented per module as `impl MetricsService` blocks;
//! each one resolves its month filter, fans out the store reads it needs
//! with `tokio::try_join!`, and hands the records to the pure computer.

use tempo_config::{PolicyConfig, TeamSettings};
use tempo_core::entities::{Milestone, PlannedAllocation, WorkRecord};
use tempo_core::hierarchy::ProjectHierarchy;
use tempo_core::month::Month;
use tempo_store::DataStore;

use crate::error::MetricsError;
use crate::scope::ProjectScope;

/// Metric entry points over a data store.
pub struct MetricsService<S> {
    store: S,
    policy: PolicyConfig,
}

impl<S: DataStore> MetricsService<S> {
    #[must_use]
    pub const fn new(store: S, policy: PolicyConfig) -> Self {
        Self { store, policy }
    }

    /// Access the underlying data store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Access the analytics policy.
    #[must_use]
    pub const fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Load the project hierarchy and wrap it in a scope for `project_filter`.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::Store` if projects cannot be listed.
    pub async fn scope(&self, project_filter: Option<&str>) -> Result<ProjectScope, MetricsError> {
        let projects = self.store.list_projects().await?;
        Ok(ProjectScope::new(
            ProjectHierarchy::from_projects(&projects),
            project_filter,
        ))
    }

    pub(crate) async fn work_records(
        &self,
        months: &[Month],
    ) -> Result<Vec<WorkRecord>, MetricsError> {
        Ok(self.store.list_work_records(months).await?)
    }

    pub(crate) async fn allocations(
        &self,
        months: &[Month],
    ) -> Result<Vec<PlannedAllocation>, MetricsError> {
        Ok(self.store.list_allocations(months).await?)
    }

    pub(crate) async fn milestones(&self) -> Result<Vec<Milestone>, MetricsError> {
        Ok(self.store.list_milestones().await?)
    }

    pub(crate) async fn team(&self) -> Result<TeamSettings, MetricsError> {
        Ok(self.store.team_settings().await?)
    }
}
