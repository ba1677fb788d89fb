//! Project hierarchy resolution.
//!
//! [`ProjectHierarchy::parent`] is a single-step lookup. Callers that need a
//! root or an ancestor test use [`ProjectHierarchy::root`] and
//! [`ProjectHierarchy::rolls_up_to`], which walk iteratively with a visited
//! set and a depth cap so malformed (cyclic) data always terminates.

use std::collections::{HashMap, HashSet};

use crate::entities::Project;
use crate::enums::ProjectType;

/// Upper bound on parent hops followed by any hierarchy walk.
pub const MAX_HIERARCHY_DEPTH: usize = 16;

/// Parent and type lookup over the project forest.
#[derive(Debug, Clone, Default)]
pub struct ProjectHierarchy {
    parents: HashMap<String, String>,
    types: HashMap<String, ProjectType>,
}

impl ProjectHierarchy {
    /// Index a project list. Self-parented projects are stored as roots.
    #[must_use]
    pub fn from_projects(projects: &[Project]) -> Self {
        let mut parents = HashMap::new();
        let mut types = HashMap::new();
        for project in projects {
            types.insert(project.project_id.clone(), project.project_type);
            match &project.parent_id {
                Some(parent) if parent != &project.project_id && !parent.is_empty() => {
                    parents.insert(project.project_id.clone(), parent.clone());
                }
                Some(parent) if parent == &project.project_id => {
                    tracing::warn!(
                        project = %project.project_id,
                        "project lists itself as parent; treating as root"
                    );
                }
                _ => {}
            }
        }
        Self { parents, types }
    }

    /// Direct parent of a project. Unknown ids resolve to `None`.
    #[must_use]
    pub fn parent(&self, project_id: &str) -> Option<&str> {
        self.parents.get(project_id).map(String::as_str)
    }

    /// Project type, `Other` for unknown ids.
    #[must_use]
    pub fn project_type(&self, project_id: &str) -> ProjectType {
        self.types
            .get(project_id)
            .copied()
            .unwrap_or(ProjectType::Other)
    }

    /// Whether the id names a known project.
    #[must_use]
    pub fn contains(&self, project_id: &str) -> bool {
        self.types.contains_key(project_id)
    }

    /// Ancestors of a project, nearest first.
    ///
    /// Stops at a root, at the first repeated id (cycle), or after
    /// [`MAX_HIERARCHY_DEPTH`] hops.
    #[must_use]
    pub fn ancestors<'a>(&'a self, project_id: &'a str) -> Vec<&'a str> {
        let mut visited: HashSet<&str> = HashSet::from([project_id]);
        let mut chain = Vec::new();
        let mut current = project_id;
        while let Some(parent) = self.parent(current) {
            if !visited.insert(parent) {
                tracing::warn!(
                    project = %project_id,
                    at = %parent,
                    "cycle in project hierarchy; stopping walk"
                );
                break;
            }
            if chain.len() == MAX_HIERARCHY_DEPTH {
                tracing::warn!(
                    project = %project_id,
                    depth = MAX_HIERARCHY_DEPTH,
                    "project hierarchy depth cap reached"
                );
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// Top-level roll-up project. A project in a cycle resolves to the last
    /// id reached before the walk repeats.
    #[must_use]
    pub fn root<'a>(&'a self, project_id: &'a str) -> &'a str {
        self.ancestors(project_id)
            .last()
            .copied()
            .unwrap_or(project_id)
    }

    /// Whether `project_id` is `target` or reports into it at any depth.
    #[must_use]
    pub fn rolls_up_to(&self, project_id: &str, target: &str) -> bool {
        project_id == target || self.ancestors(project_id).contains(&target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn project(id: &str, parent: Option<&str>) -> Project {
        Project {
            project_id: id.into(),
            project_name: format!("Project {id}"),
            project_type: ProjectType::Npd,
            parent_id: parent.map(Into::into),
        }
    }

    #[test]
    fn parent_is_single_step() {
        let h = ProjectHierarchy::from_projects(&[
            project("root", None),
            project("mid", Some("root")),
            project("leaf", Some("mid")),
        ]);
        assert_eq!(h.parent("leaf"), Some("mid"));
        assert_eq!(h.parent("mid"), Some("root"));
        assert_eq!(h.parent("root"), None);
    }

    #[test]
    fn unknown_project_has_no_parent() {
        let h = ProjectHierarchy::default();
        assert_eq!(h.parent("ghost"), None);
        assert_eq!(h.root("ghost"), "ghost");
        assert_eq!(h.project_type("ghost"), ProjectType::Other);
    }

    #[test]
    fn root_walks_to_top() {
        let h = ProjectHierarchy::from_projects(&[
            project("root", None),
            project("mid", Some("root")),
            project("leaf", Some("mid")),
        ]);
        assert_eq!(h.root("leaf"), "root");
        assert!(h.rolls_up_to("leaf", "root"));
        assert!(h.rolls_up_to("leaf", "mid"));
        assert!(h.rolls_up_to("leaf", "leaf"));
        assert!(!h.rolls_up_to("root", "leaf"));
    }

    #[test]
    fn cycle_terminates() {
        let h = ProjectHierarchy::from_projects(&[
            project("a", Some("b")),
            project("b", Some("c")),
            project("c", Some("a")),
        ]);
        assert_eq!(h.ancestors("a"), vec!["b", "c"]);
        assert_eq!(h.root("a"), "c");
        assert!(!h.rolls_up_to("a", "zzz"));
    }

    #[test]
    fn self_parent_is_root() {
        let h = ProjectHierarchy::from_projects(&[project("solo", Some("solo"))]);
        assert_eq!(h.parent("solo"), None);
        assert_eq!(h.root("solo"), "solo");
    }

    #[test]
    fn depth_is_capped() {
        let mut projects = vec![project("p0", None)];
        for i in 1..=(MAX_HIERARCHY_DEPTH + 5) {
            projects.push(project(&format!("p{i}"), Some(&format!("p{}", i - 1))));
        }
        let h = ProjectHierarchy::from_projects(&projects);
        let leaf = format!("p{}", MAX_HIERARCHY_DEPTH + 5);
        assert_eq!(h.ancestors(&leaf).len(), MAX_HIERARCHY_DEPTH);
    }
}
