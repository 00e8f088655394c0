//! # Storage Layer
//!
//! Persistence layer for Prereq with git-friendly file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Courses | JSONL (registry order) | `.prereq/courses.jsonl` |
//! | Rules | JSONL (insertion order) | `.prereq/rules.jsonl` |
//! | Students | JSONL | `.prereq/students.jsonl` |
//! | Config | TOML | `.prereq/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`JsonlStore`] takes a shared `fs2` lock to read and an exclusive lock to write
//! - All full rewrites are atomic (temp file + rename)
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point; loads and saves the [`CourseRegistry`](crate::domain::CourseRegistry)
//! - [`JsonlStore`] - Read/write one record type as JSONL
//! - [`Config`] - Project and global configuration

mod jsonl;
mod config;
mod project;

pub use jsonl::JsonlStore;
pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig};
pub use project::{Project, ProjectError};
