//! Course CLI commands

use anyhow::{Context, Result};
use clap::Subcommand;

use super::output::Output;
use super::resolve_course;
use crate::domain::Course;
use crate::storage::Project;

#[derive(Subcommand)]
pub enum CourseCommands {
    /// Add a course to the catalog
    ///
    /// Examples:
    ///   prereq course add PHYS101 "Mechanics I" --department Physics
    ///   prereq course add PHYS201L "Lab" --coreq PHYS201
    Add {
        /// Catalog code (unique, no spaces)
        code: String,

        /// Course title
        title: String,

        #[arg(long)]
        department: Option<String>,

        /// Credit count (defaults to config `default_credits`)
        #[arg(long)]
        credits: Option<u32>,

        /// Numeric level (defaults to config `default_level`)
        #[arg(long)]
        level: Option<u32>,

        #[arg(long)]
        description: Option<String>,

        /// Corequisite course ID or code (repeatable)
        #[arg(long = "coreq", value_name = "COURSE")]
        corequisites: Vec<String>,
    },

    /// List courses
    List,

    /// Show a course with its rules and dependents
    Show {
        /// Course ID or code
        course: String,
    },

    /// Remove a course and every rule that mentions it
    Remove {
        /// Course ID or code
        course: String,
    },
}

pub fn run(cmd: CourseCommands, output: &Output) -> Result<()> {
    match cmd {
        CourseCommands::Add {
            code,
            title,
            department,
            credits,
            level,
            description,
            corequisites,
        } => {
            let fields = NewCourse {
                department,
                credits,
                level,
                description,
                corequisites,
            };
            add_course(output, &code, &title, fields)
        }
        CourseCommands::List => list_courses(output),
        CourseCommands::Show { course } => show_course(output, &course),
        CourseCommands::Remove { course } => remove_course(output, &course),
    }
}

struct NewCourse {
    department: Option<String>,
    credits: Option<u32>,
    level: Option<u32>,
    description: Option<String>,
    corequisites: Vec<String>,
}

fn add_course(output: &Output, code: &str, title: &str, fields: NewCourse) -> Result<()> {
    let project = Project::open_current()?;
    let defaults = &project.config().project;
    let mut registry = project.load_registry()?;
    output.verbose_ctx("course", &format!("Loaded {} courses", registry.len()));

    let mut course = Course::new(code.trim(), title.trim())
        .with_credits(fields.credits.unwrap_or(defaults.default_credits))
        .with_level(fields.level.unwrap_or(defaults.default_level));
    if let Some(department) = fields.department {
        course = course.with_department(department);
    }
    if let Some(description) = fields.description {
        course = course.with_description(description);
    }
    for query in &fields.corequisites {
        let coreq = resolve_course(&registry, query)?;
        course = course.with_corequisite(coreq.id.clone());
    }

    let course = registry
        .add_course(course)
        .with_context(|| format!("Failed to add course {}", code))?
        .clone();
    project.save_registry(&registry)?;

    if output.is_json() {
        output.data(&course);
    } else {
        output.success(&format!("Created course: {} {} - {}", course.id, course.code, course.title));
    }

    Ok(())
}

fn list_courses(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let registry = project.load_registry()?;

    if output.is_json() {
        let items: Vec<_> = registry
            .courses()
            .iter()
            .filter_map(|c| registry.detail(&c.id))
            .collect();
        output.data(&items);
    } else if registry.is_empty() {
        println!("No courses");
    } else {
        println!("{:<10} {:<10} {:<6} {:<8} TITLE", "ID", "CODE", "LEVEL", "CREDITS");
        println!("{}", "-".repeat(60));
        for course in registry.courses() {
            println!(
                "{:<10} {:<10} {:<6} {:<8} {}",
                course.id.to_string(),
                course.code,
                course.level,
                course.credits,
                course.title
            );
        }
    }

    Ok(())
}

fn show_course(output: &Output, query: &str) -> Result<()> {
    let project = Project::open_current()?;
    let registry = project.load_registry()?;

    let course = resolve_course(&registry, query)?;
    let Some(detail) = registry.detail(&course.id) else {
        anyhow::bail!("Course not found: {}", query);
    };

    if output.is_json() {
        output.data(&detail);
        return Ok(());
    }

    println!("Course: {} ({})", course.code, course.id);
    println!("Title: {}", course.title);
    if let Some(department) = &course.department {
        println!("Department: {}", department);
    }
    println!("Level: {}", course.level);
    println!("Credits: {}", course.credits);

    if !course.corequisites.is_empty() {
        let coreqs: Vec<_> = course
            .corequisites
            .iter()
            .map(|id| registry.code_of(id))
            .collect();
        println!("Corequisites: {}", coreqs.join(", "));
    }

    if detail.rules.is_empty() {
        println!("\nPrerequisites: none");
    } else {
        println!("\nPrerequisites:");
        for rule in &detail.rules {
            let min = rule
                .min_grade
                .map(|g| format!(" (min {})", g))
                .unwrap_or_default();
            println!(
                "  {} {} [{}]{}",
                rule.id,
                registry.code_of(&rule.prerequisite_id),
                rule.rule_type,
                min
            );
        }
    }

    if !detail.dependents.is_empty() {
        let codes: Vec<_> = detail.dependents.iter().map(|id| registry.code_of(id)).collect();
        println!("\nRequired for: {}", codes.join(", "));
    }

    if let Some(description) = &course.description {
        println!("\nDescription:");
        println!("{}", description);
    }

    Ok(())
}

fn remove_course(output: &Output, query: &str) -> Result<()> {
    let project = Project::open_current()?;
    let mut registry = project.load_registry()?;

    let course_id = resolve_course(&registry, query)?.id.clone();
    let (course, rules) = registry.remove_course(&course_id)?;
    project.save_registry(&registry)?;

    // Grades for a course that no longer exists would dangle
    let mut students = project.load_students()?;
    let touched = students
        .iter_mut()
        .map(|s| s.forget_course(&course_id))
        .filter(|removed| *removed)
        .count();
    if touched > 0 {
        project.save_students(&students)?;
    }
    output.verbose_ctx(
        "course",
        &format!("Removed {} rules, cleared grades for {} students", rules.len(), touched),
    );

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": course.id.to_string(),
            "code": course.code,
            "removed_rules": rules.iter().map(|r| r.id.to_string()).collect::<Vec<_>>(),
        }));
    } else {
        output.success(&format!(
            "Removed course: {} ({} rule{} removed)",
            course.code,
            rules.len(),
            if rules.len() == 1 { "" } else { "s" }
        ));
    }

    Ok(())
}
