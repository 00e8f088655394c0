//! Query commands (check, report, order, chain)
//!
//! Read-only views computed from the loaded registry.

use std::collections::BTreeMap;

use anyhow::{Context, Result};

use super::output::Output;
use super::resolve_course;
use super::student::find_student;
use crate::domain::{build_report, evaluate, CourseId, CourseRegistry, Grade, RegistryError, StudentId};
use crate::storage::Project;

/// Parses a `COURSE=GRADE` pair against the registry
fn parse_grade_arg(registry: &CourseRegistry, arg: &str) -> Result<(CourseId, Grade)> {
    let (course, grade) = arg
        .split_once('=')
        .ok_or_else(|| RegistryError::InvalidInput(format!("expected COURSE=GRADE, got '{}'", arg)))?;

    let course = resolve_course(registry, course)?;
    let grade: Grade = grade.parse()?;
    Ok((course.id.clone(), grade))
}

/// Evaluate enrollment eligibility
pub fn check(
    output: &Output,
    course_query: &str,
    student: Option<&str>,
    grade_args: &[String],
) -> Result<()> {
    let project = Project::open_current()?;
    let registry = project.load_registry()?;

    let mut grades: BTreeMap<CourseId, Grade> = BTreeMap::new();
    if let Some(student) = student {
        let id: StudentId = student.parse()?;
        let students = project.load_students()?;
        grades = find_student(&students, &id)?.grades.clone();
        output.verbose_ctx("check", &format!("Loaded {} grades for {}", grades.len(), id));
    }
    for arg in grade_args {
        let (course_id, grade) =
            parse_grade_arg(&registry, arg).with_context(|| format!("Invalid --grade '{}'", arg))?;
        grades.insert(course_id, grade);
    }

    // An unknown code has no ID to evaluate; an unknown ID still gets the
    // evaluator's "Course not found" answer.
    let course_id = match registry.find(course_query) {
        Some(course) => course.id.clone(),
        None => course_query
            .parse::<CourseId>()
            .map_err(|_| RegistryError::InvalidReference(course_query.trim().to_string()))?,
    };

    let result = evaluate(&registry, &grades, &course_id);
    output.verbose_ctx(
        "check",
        &format!(
            "Evaluated {} rules for {}",
            registry.rules_for_course(&course_id).len(),
            course_id
        ),
    );

    if output.is_json() {
        output.data(&serde_json::json!({
            "course": registry.code_of(&course_id),
            "student": student,
            "can_enroll": result.can_enroll,
            "reasons": result.reasons,
        }));
    } else {
        let code = registry.code_of(&course_id);
        if result.can_enroll {
            println!("ELIGIBLE: may enroll in {}", code);
        } else {
            println!("NOT ELIGIBLE: may not enroll in {}", code);
        }
        for reason in &result.reasons {
            println!("  - {}", reason);
        }
    }

    Ok(())
}

/// Print the prerequisite report
pub fn report(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let registry = project.load_registry()?;

    let rows = build_report(&registry);
    output.verbose_ctx("report", &format!("Built {} rows", rows.len()));

    if output.is_json() {
        output.data(&rows);
    } else if rows.is_empty() {
        println!("No courses");
    } else {
        println!(
            "{:<10} {:<24} {:<6} {:<8} {:<24} DEPENDENTS",
            "COURSE", "TITLE", "LEVEL", "CREDITS", "PREREQUISITES"
        );
        println!("{}", "-".repeat(90));
        for row in rows {
            println!(
                "{:<10} {:<24} {:<6} {:<8} {:<24} {}",
                row.course, row.title, row.level, row.credits, row.prerequisites, row.dependents
            );
        }
    }

    Ok(())
}

/// List courses so that prerequisites come first
pub fn order(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let registry = project.load_registry()?;

    let courses = registry.study_order()?;

    if output.is_json() {
        let items: Vec<_> = courses
            .iter()
            .map(|c| {
                serde_json::json!({
                    "id": c.id.to_string(),
                    "code": c.code,
                    "title": c.title,
                })
            })
            .collect();
        output.data(&items);
    } else if courses.is_empty() {
        println!("No courses");
    } else {
        for (n, course) in courses.iter().enumerate() {
            println!("{:>3}. {:<10} {}", n + 1, course.code, course.title);
        }
    }

    Ok(())
}

/// Show the transitive prerequisites of a course
pub fn chain(output: &Output, course_query: &str) -> Result<()> {
    let project = Project::open_current()?;
    let registry = project.load_registry()?;

    let course = resolve_course(&registry, course_query)?;
    let chain = registry.prerequisite_chain(&course.id);

    if output.is_json() {
        output.data(&serde_json::json!({
            "course": course.code,
            "requires": chain.iter().map(|c| c.code.as_str()).collect::<Vec<_>>(),
        }));
    } else if chain.is_empty() {
        println!("{} has no prerequisites", course.code);
    } else {
        println!("{} requires ({}):", course.code, chain.len());
        for c in chain {
            println!("  {:<10} {}", c.code, c.title);
        }
    }

    Ok(())
}
