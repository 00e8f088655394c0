//! Identifiers for courses, prerequisite rules and students
//!
//! ID Format:
//! - Course IDs: `c-{7-char-hash}` (e.g., `c-7f2b4c1`)
//! - Rule IDs: `r-{7-char-hash}` (e.g., `r-9d3e5f2`)
//! - Student IDs: host-assigned, any non-empty token without whitespace
//!
//! Hashes are derived from a seed (course code, rule endpoints) plus the
//! creation timestamp, so re-creating a deleted course yields a new ID.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid course ID format: expected 'c-{{7-char-hash}}', got '{0}'")]
    InvalidCourseId(String),

    #[error("Invalid rule ID format: expected 'r-{{7-char-hash}}', got '{0}'")]
    InvalidRuleId(String),

    #[error("Invalid student ID: '{0}' (must be non-empty, without whitespace)")]
    InvalidStudentId(String),
}

/// Generates a 7-character hash from a seed and timestamp
fn generate_hash(seed: &str, timestamp: DateTime<Utc>) -> String {
    let input = format!("{}{}", seed, timestamp.timestamp_nanos_opt().unwrap_or(0));
    let hash = blake3::hash(input.as_bytes());
    let hex = hash.to_hex();
    hex[..7].to_string()
}

/// Parses `{prefix}-{7 hex chars}` and returns the hash part
fn parse_hash<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let hash = s.strip_prefix(prefix)?.strip_prefix('-')?;
    if hash.len() == 7 && hash.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(hash)
    } else {
        None
    }
}

/// Course ID in the format `c-{7-char-hash}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseId {
    hash: String,
}

impl CourseId {
    /// Creates a new course ID from the course code and creation time
    pub fn new(code: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            hash: generate_hash(code, timestamp),
        }
    }

    /// Returns the hash portion of the ID
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c-{}", self.hash)
    }
}

impl FromStr for CourseId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        parse_hash(s, "c")
            .map(|hash| Self {
                hash: hash.to_ascii_lowercase(),
            })
            .ok_or_else(|| IdError::InvalidCourseId(s.to_string()))
    }
}

impl TryFrom<String> for CourseId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CourseId> for String {
    fn from(id: CourseId) -> Self {
        id.to_string()
    }
}

/// Prerequisite rule ID in the format `r-{7-char-hash}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RuleId {
    hash: String,
}

impl RuleId {
    /// Creates a new rule ID from a seed (usually the rule's endpoints) and time
    pub fn new(seed: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            hash: generate_hash(seed, timestamp),
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r-{}", self.hash)
    }
}

impl FromStr for RuleId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        parse_hash(s, "r")
            .map(|hash| Self {
                hash: hash.to_ascii_lowercase(),
            })
            .ok_or_else(|| IdError::InvalidRuleId(s.to_string()))
    }
}

impl TryFrom<String> for RuleId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RuleId> for String {
    fn from(id: RuleId) -> Self {
        id.to_string()
    }
}

/// Student ID as assigned by the institution (e.g. a student number)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StudentId(String);

impl StudentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for StudentId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.chars().any(char::is_whitespace) {
            return Err(IdError::InvalidStudentId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for StudentId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StudentId> for String {
    fn from(id: StudentId) -> Self {
        id.0
    }
}
