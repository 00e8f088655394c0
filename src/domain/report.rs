//! Flat prerequisite report, one row per course

use serde::Serialize;

use super::registry::CourseRegistry;

/// One report row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    /// Course code
    pub course: String,
    pub title: String,
    pub level: u32,
    /// Comma-joined prerequisite codes, or `None`
    pub prerequisites: String,
    /// Comma-joined dependent codes, or `None`
    pub dependents: String,
    pub credits: u32,
}

fn join_or_none(codes: Vec<String>) -> String {
    if codes.is_empty() {
        "None".to_string()
    } else {
        codes.join(", ")
    }
}

/// Builds the report in registry order
pub fn build_report(registry: &CourseRegistry) -> Vec<ReportRow> {
    registry
        .courses()
        .iter()
        .map(|course| {
            let prerequisites = registry
                .prerequisites(&course.id)
                .iter()
                .map(|id| registry.code_of(id))
                .collect();
            let dependents = registry
                .dependents(&course.id)
                .into_iter()
                .map(|c| c.code.clone())
                .collect();

            ReportRow {
                course: course.code.clone(),
                title: course.title.clone(),
                level: course.level,
                prerequisites: join_or_none(prerequisites),
                dependents: join_or_none(dependents),
                credits: course.credits,
            }
        })
        .collect()
}
