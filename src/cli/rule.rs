//! Prerequisite rule CLI commands

use anyhow::{Context, Result};
use clap::Subcommand;

use super::output::Output;
use super::resolve_course;
use crate::domain::{CourseRegistry, Grade, PrerequisiteRule, RuleId, RuleType};
use crate::storage::Project;

#[derive(Subcommand)]
pub enum RuleCommands {
    /// Require one course before another
    ///
    /// Examples:
    ///   prereq prereq add PHYS201 PHYS101 --min-grade B
    ///   prereq prereq add PHYS201 MATH150 --type recommended
    Add {
        /// Course that gets the requirement
        course: String,

        /// Course that must come first
        prerequisite: String,

        /// Rule type: hard, soft or recommended (defaults to config `default_rule_type`)
        #[arg(long = "type")]
        rule_type: Option<RuleType>,

        /// Lowest acceptable grade in the prerequisite (A-D)
        #[arg(long)]
        min_grade: Option<Grade>,
    },

    /// Remove a rule by ID
    Remove {
        /// Rule ID (r-xxxxxxx)
        id: String,
    },

    /// List rules, optionally for one course
    List {
        /// Course ID or code
        course: Option<String>,
    },
}

pub fn run(cmd: RuleCommands, output: &Output) -> Result<()> {
    match cmd {
        RuleCommands::Add {
            course,
            prerequisite,
            rule_type,
            min_grade,
        } => add_rule(output, &course, &prerequisite, rule_type, min_grade),
        RuleCommands::Remove { id } => remove_rule(output, &id),
        RuleCommands::List { course } => list_rules(output, course.as_deref()),
    }
}

fn rule_json(registry: &CourseRegistry, rule: &PrerequisiteRule) -> serde_json::Value {
    serde_json::json!({
        "id": rule.id.to_string(),
        "course_id": rule.course_id.to_string(),
        "course": registry.code_of(&rule.course_id),
        "prerequisite_id": rule.prerequisite_id.to_string(),
        "prerequisite": registry.code_of(&rule.prerequisite_id),
        "type": rule.rule_type,
        "min_grade": rule.min_grade,
    })
}

fn add_rule(
    output: &Output,
    course_query: &str,
    prerequisite_query: &str,
    rule_type: Option<RuleType>,
    min_grade: Option<Grade>,
) -> Result<()> {
    let project = Project::open_current()?;
    let mut registry = project.load_registry()?;

    let course_id = resolve_course(&registry, course_query)?.id.clone();
    let prerequisite_id = resolve_course(&registry, prerequisite_query)?.id.clone();
    let rule_type = rule_type.unwrap_or(project.config().project.default_rule_type);
    output.verbose_ctx(
        "prereq",
        &format!(
            "Checking {} -> {} ({}) against {} existing rules",
            prerequisite_id,
            course_id,
            rule_type,
            registry.rules().len()
        ),
    );

    let rule = registry
        .add_prerequisite(&course_id, &prerequisite_id, rule_type, min_grade)
        .with_context(|| {
            format!(
                "Failed to add {} as a prerequisite of {}",
                prerequisite_query, course_query
            )
        })?;
    project.save_registry(&registry)?;

    if output.is_json() {
        output.data(&rule_json(&registry, &rule));
    } else {
        output.success(&format!(
            "Added rule {}: {} requires {} [{}]",
            rule.id,
            registry.code_of(&rule.course_id),
            registry.code_of(&rule.prerequisite_id),
            rule.rule_type
        ));
    }

    Ok(())
}

fn remove_rule(output: &Output, id_str: &str) -> Result<()> {
    let project = Project::open_current()?;
    let mut registry = project.load_registry()?;

    let id: RuleId = id_str.parse()?;
    let rule = registry.remove_prerequisite(&id)?;
    project.save_registry(&registry)?;

    if output.is_json() {
        output.data(&rule_json(&registry, &rule));
    } else {
        output.success(&format!(
            "Removed rule {}: {} no longer requires {}",
            rule.id,
            registry.code_of(&rule.course_id),
            registry.code_of(&rule.prerequisite_id)
        ));
    }

    Ok(())
}

fn list_rules(output: &Output, course_query: Option<&str>) -> Result<()> {
    let project = Project::open_current()?;
    let registry = project.load_registry()?;

    let rules: Vec<&PrerequisiteRule> = match course_query {
        Some(query) => {
            let course = resolve_course(&registry, query)?;
            registry.rules_for_course(&course.id)
        }
        None => registry.rules().iter().collect(),
    };

    if output.is_json() {
        let items: Vec<_> = rules.iter().map(|r| rule_json(&registry, r)).collect();
        output.data(&items);
    } else if rules.is_empty() {
        println!("No prerequisite rules");
    } else {
        println!(
            "{:<10} {:<10} {:<10} {:<12} MIN",
            "ID", "COURSE", "REQUIRES", "TYPE"
        );
        println!("{}", "-".repeat(50));
        for rule in rules {
            println!(
                "{:<10} {:<10} {:<10} {:<12} {}",
                rule.id.to_string(),
                registry.code_of(&rule.course_id),
                registry.code_of(&rule.prerequisite_id),
                rule.rule_type.label(),
                rule.min_grade.map(|g| g.as_str()).unwrap_or("-")
            );
        }
    }

    Ok(())
}
