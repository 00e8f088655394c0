//! Domain models for Prereq
//!
//! Contains the catalog, graph and eligibility logic without any I/O concerns.

mod id;
mod course;
mod student;
mod graph;
mod registry;
mod eligibility;
mod report;

pub use id::{CourseId, IdError, RuleId, StudentId};
pub use course::{Course, Grade, PrerequisiteRule, RuleType, ValueError};
pub use student::Student;
pub use graph::{DependencyGraph, GraphError};
pub use registry::{CourseDetail, CourseRegistry, RegistryError};
pub use eligibility::{evaluate, Eligibility};
pub use report::{build_report, ReportRow};
