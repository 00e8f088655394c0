//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project management | `init` |
//! | Course | Catalog entries | `course add`, `course list`, `course show` |
//! | Prereq | Rule edits | `prereq add`, `prereq remove`, `prereq list` |
//! | Student | Transcripts | `student add`, `student grade` |
//! | Query | Derived views | `check`, `report`, `order`, `chain` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON; failures print
//!   `{"success": false, "kind": ..., "error": ...}` to stderr
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! prereq --verbose check PHYS201 --student s1024
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod course;
mod rule;
mod student;
mod query;

pub use app::{Cli, Commands, run};
pub use output::{error_kind, Output, OutputFormat};

use crate::domain::{Course, CourseRegistry, RegistryError};

/// Finds a course by ID or code, as an `InvalidReference` error when absent
pub(crate) fn resolve_course<'a>(
    registry: &'a CourseRegistry,
    query: &str,
) -> Result<&'a Course, RegistryError> {
    registry
        .find(query)
        .ok_or_else(|| RegistryError::InvalidReference(query.trim().to_string()))
}
