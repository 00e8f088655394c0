//! Project management
//!
//! Handles project initialization and loads/saves the catalog files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::{Config, JsonlStore};
use crate::domain::{Course, CourseRegistry, PrerequisiteRule, Student};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a prereq project. Run 'prereq init' first.")]
    NotInProject,

    #[error("Stored catalog is inconsistent: {0}")]
    Corrupt(String),
}

/// A Prereq project rooted at a directory containing `.prereq/`
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(".prereq").is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path (idempotent)
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let prereq_dir = root.join(".prereq");

        fs::create_dir_all(&prereq_dir).with_context(|| {
            format!("Failed to create .prereq directory: {}", prereq_dir.display())
        })?;

        let config_path = prereq_dir.join("config.toml");
        if !config_path.exists() {
            let default_config = r#"# Prereq configuration

# Rule type for 'prereq add' when --type is omitted (hard, soft, recommended)
default_rule_type = "hard"

# Defaults for 'course add'
default_credits = 3
default_level = 100
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .prereq directory path
    pub fn prereq_dir(&self) -> PathBuf {
        self.root.join(".prereq")
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn course_store(&self) -> JsonlStore<Course> {
        JsonlStore::new(self.prereq_dir().join("courses.jsonl"))
    }

    pub fn rule_store(&self) -> JsonlStore<PrerequisiteRule> {
        JsonlStore::new(self.prereq_dir().join("rules.jsonl"))
    }

    pub fn student_store(&self) -> JsonlStore<Student> {
        JsonlStore::new(self.prereq_dir().join("students.jsonl"))
    }

    /// Loads courses and rules into a registry, re-validating the graph
    pub fn load_registry(&self) -> Result<CourseRegistry> {
        let courses = self.course_store().read_all()?;
        let rules = self.rule_store().read_all()?;

        CourseRegistry::from_parts(courses, rules)
            .map_err(|e| ProjectError::Corrupt(e.to_string()))
            .with_context(|| format!("Failed to load catalog from {}", self.prereq_dir().display()))
    }

    /// Writes the registry's rules and courses back to disk
    ///
    /// Rules go first: a mutation never both adds courses and adds rules, so
    /// if the second write fails the files on disk still load.
    pub fn save_registry(&self, registry: &CourseRegistry) -> Result<()> {
        self.rule_store().write_all(registry.rules())?;
        self.course_store().write_all(registry.courses())?;
        Ok(())
    }

    pub fn load_students(&self) -> Result<Vec<Student>> {
        self.student_store().read_all()
    }

    pub fn save_students(&self, students: &[Student]) -> Result<()> {
        self.student_store().write_all(students)
    }
}
