//! Hierarchy-aware project filtering.

use tempo_core::hierarchy::ProjectHierarchy;

/// The project filter of a computation, with the hierarchy it resolves
/// against.
///
/// A record is in scope when no filter is set, when its project is the
/// filter, or when its project rolls up to the filter at any depth.
#[derive(Debug, Clone, Default)]
pub struct ProjectScope {
    hierarchy: ProjectHierarchy,
    filter: Option<String>,
}

impl ProjectScope {
    /// Build a scope. An empty filter string means all projects.
    #[must_use]
    pub fn new(hierarchy: ProjectHierarchy, filter: Option<&str>) -> Self {
        Self {
            hierarchy,
            filter: filter.filter(|f| !f.is_empty()).map(String::from),
        }
    }

    /// Scope over all projects.
    #[must_use]
    pub const fn all(hierarchy: ProjectHierarchy) -> Self {
        Self {
            hierarchy,
            filter: None,
        }
    }

    /// Whether a project's records belong to this scope.
    #[must_use]
    pub fn matches(&self, project_id: &str) -> bool {
        self.filter
            .as_deref()
            .is_none_or(|filter| self.hierarchy.rolls_up_to(project_id, filter))
    }

    #[must_use]
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    #[must_use]
    pub const fn is_single_project(&self) -> bool {
        self.filter.is_some()
    }

    #[must_use]
    pub const fn hierarchy(&self) -> &ProjectHierarchy {
        &self.hierarchy
    }
}
