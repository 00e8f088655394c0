//! Main CLI application structure

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{course, query, rule, student};
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "prereq")]
#[command(author, version, about = "Course prerequisite graph and enrollment eligibility")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new prereq project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Manage courses
    #[command(subcommand)]
    Course(course::CourseCommands),

    /// Manage prerequisite rules
    #[command(subcommand)]
    Prereq(rule::RuleCommands),

    /// Manage students and their grades
    #[command(subcommand)]
    Student(student::StudentCommands),

    /// Check whether a student may enroll in a course
    ///
    /// Examples:
    ///   prereq check PHYS201 --student s1024
    ///   prereq check PHYS201 --grade PHYS101=C
    Check {
        /// Course ID or code
        course: String,

        /// Use this student's recorded grades
        #[arg(long)]
        student: Option<String>,

        /// Extra or overriding grade, as COURSE=GRADE (repeatable)
        #[arg(long = "grade", value_name = "COURSE=GRADE")]
        grades: Vec<String>,
    },

    /// Print the prerequisite report (one row per course)
    Report,

    /// List all courses in an order that respects prerequisites
    Order,

    /// Show every course that must come before a course
    Chain {
        /// Course ID or code
        course: String,
    },
}

/// Main entry point for the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let format = cli.format.unwrap_or_else(|| {
        Config::load()
            .map(|config| config.global.default_format.into())
            .unwrap_or_default()
    });
    let output = Output::new(format, cli.verbose);

    output.verbose("Prereq starting");

    match dispatch(cli.command, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.failure(&err);
            ExitCode::FAILURE
        }
    }
}

fn dispatch(command: Commands, output: &Output) -> Result<()> {
    match command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));
            let project = Project::init(&path)?;
            output.verbose_ctx(
                "init",
                &format!("Created .prereq directory at: {}", project.prereq_dir().display()),
            );
            output.success(&format!(
                "Initialized prereq project at {}",
                project.root().display()
            ));
        }

        Commands::Course(cmd) => course::run(cmd, output)?,
        Commands::Prereq(cmd) => rule::run(cmd, output)?,
        Commands::Student(cmd) => student::run(cmd, output)?,

        Commands::Check {
            course,
            student,
            grades,
        } => {
            output.verbose_ctx(
                "check",
                &format!("course={}, student={:?}, grades={:?}", course, student, grades),
            );
            query::check(output, &course, student.as_deref(), &grades)?
        }
        Commands::Report => query::report(output)?,
        Commands::Order => query::order(output)?,
        Commands::Chain { course } => query::chain(output, &course)?,
    }

    Ok(())
}
