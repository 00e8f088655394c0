//! Prereq - course prerequisite graph and enrollment eligibility
//!
//! Keeps a catalog of courses and directed prerequisite rules, refuses any
//! rule that would make the requirements circular, and decides whether a
//! student's grades allow enrollment in a course.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{
    build_report, evaluate, Course, CourseId, CourseRegistry, Eligibility, Grade,
    PrerequisiteRule, RegistryError, RuleId, RuleType,
};
