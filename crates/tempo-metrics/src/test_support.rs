//! Shared record builders for tempo-metrics unit tests.

use chrono::NaiveDate;
use tempo_core::entities::{PlannedAllocation, Project, WorkRecord};
use tempo_core::enums::{ProjectType, WorkCategory};
use tempo_core::hierarchy::ProjectHierarchy;
use tempo_core::month::Month;

pub fn month(token: &str) -> Month {
    token.parse().unwrap()
}

pub fn project(id: &str, parent: Option<&str>) -> Project {
    typed_project(id, ProjectType::Npd, parent)
}

pub fn typed_project(id: &str, project_type: ProjectType, parent: Option<&str>) -> Project {
    Project {
        project_id: id.into(),
        project_name: format!("Project {id}"),
        project_type,
        parent_id: parent.map(Into::into),
    }
}

pub fn hierarchy(projects: &[Project]) -> ProjectHierarchy {
    ProjectHierarchy::from_projects(projects)
}

pub fn record(
    engineer: &str,
    project_id: &str,
    month_token: &str,
    hours: f64,
    category: WorkCategory,
) -> WorkRecord {
    WorkRecord {
        engineer: engineer.into(),
        project_id: project_id.into(),
        tech_code: None,
        month: month(month_token),
        date: None,
        hours,
        category,
    }
}

/// An NPD record on a specific day (`YYYY-MM-DD`).
pub fn dated(engineer: &str, project_id: &str, day: &str, hours: f64) -> WorkRecord {
    let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap();
    WorkRecord {
        engineer: engineer.into(),
        project_id: project_id.into(),
        tech_code: None,
        month: Month::from_date(date),
        date: Some(date),
        hours,
        category: WorkCategory::Npd,
    }
}

pub fn with_tech(mut record: WorkRecord, tech_code: &str) -> WorkRecord {
    record.tech_code = Some(tech_code.into());
    record
}

pub fn allocation(
    engineer: &str,
    project_id: &str,
    month_token: &str,
    hours: f64,
) -> PlannedAllocation {
    PlannedAllocation {
        engineer: engineer.into(),
        project_id: project_id.into(),
        month: month(month_token),
        planned_hours: hours,
    }
}
