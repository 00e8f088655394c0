//! Course and prerequisite rule models
//!
//! A [`PrerequisiteRule`] is a directed edge: `course_id` depends on
//! `prerequisite_id`. Rules are the only record of the relationship; a
//! course's prerequisite list is always derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::id::{CourseId, RuleId};

#[derive(Debug, Error, PartialEq)]
pub enum ValueError {
    #[error("Invalid grade '{0}': expected one of A, B, C, D, F")]
    InvalidGrade(String),

    #[error("Invalid rule type '{0}': expected hard, soft or recommended")]
    InvalidRuleType(String),
}

/// Letter grade, ordered A (best) down to F
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Grade points: A=4, B=3, C=2, D=1, F=0
    pub fn points(&self) -> u8 {
        match self {
            Grade::A => 4,
            Grade::B => 3,
            Grade::C => 2,
            Grade::D => 1,
            Grade::F => 0,
        }
    }

    /// Returns true if this grade is at least `minimum`
    pub fn meets(&self, minimum: Grade) -> bool {
        self.points() >= minimum.points()
    }

    /// Returns true if the grade may be used as a rule's minimum
    pub fn is_valid_minimum(&self) -> bool {
        !matches!(self, Grade::F)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl PartialOrd for Grade {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Grade {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.points().cmp(&other.points())
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Grade::A),
            "B" => Ok(Grade::B),
            "C" => Ok(Grade::C),
            "D" => Ok(Grade::D),
            "F" => Ok(Grade::F),
            _ => Err(ValueError::InvalidGrade(s.to_string())),
        }
    }
}

/// How strictly a prerequisite is enforced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    /// Unmet rule blocks enrollment
    #[default]
    Hard,
    /// Recorded but never consulted during evaluation
    Soft,
    /// Unmet rule produces an advisory reason only
    Recommended,
}

impl RuleType {
    /// Returns true if an unmet rule of this type blocks enrollment
    pub fn blocks_enrollment(&self) -> bool {
        matches!(self, RuleType::Hard)
    }

    pub fn label(&self) -> &'static str {
        match self {
            RuleType::Hard => "hard",
            RuleType::Soft => "soft",
            RuleType::Recommended => "recommended",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RuleType {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hard" => Ok(RuleType::Hard),
            "soft" => Ok(RuleType::Soft),
            "recommended" => Ok(RuleType::Recommended),
            _ => Err(ValueError::InvalidRuleType(s.to_string())),
        }
    }
}

/// A course in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Unique identifier
    pub id: CourseId,

    /// Catalog code, e.g. `PHYS101`
    pub code: String,

    /// Human-readable title
    pub title: String,

    /// Owning department
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    /// Credit count
    pub credits: u32,

    /// Numeric level (100, 200, ...)
    pub level: u32,

    /// Courses that should be taken alongside this one (informational)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub corequisites: Vec<CourseId>,

    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// When the course was added to the catalog
    pub created_at: DateTime<Utc>,
}

impl Course {
    /// Creates a new course with a fresh ID
    pub fn new(code: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        let code = code.into();
        Self {
            id: CourseId::new(&code, now),
            code,
            title: title.into(),
            department: None,
            credits: 3,
            level: 100,
            corequisites: Vec::new(),
            description: None,
            created_at: now,
        }
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_credits(mut self, credits: u32) -> Self {
        self.credits = credits;
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_corequisite(mut self, course: CourseId) -> Self {
        if !self.corequisites.contains(&course) {
            self.corequisites.push(course);
        }
        self
    }

    /// Returns true if `query` is (case-insensitively) this course's ID or code
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        self.code.eq_ignore_ascii_case(query) || self.id.to_string().eq_ignore_ascii_case(query)
    }
}

/// A directed prerequisite edge: `course_id` requires `prerequisite_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrerequisiteRule {
    /// Unique identifier
    pub id: RuleId,

    /// The course being constrained
    pub course_id: CourseId,

    /// The course that must come first
    pub prerequisite_id: CourseId,

    /// Enforcement level
    #[serde(rename = "type", default)]
    pub rule_type: RuleType,

    /// Lowest acceptable grade in the prerequisite
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_grade: Option<Grade>,

    /// When the rule was created
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_order() {
        assert!(Grade::A > Grade::B);
        assert!(Grade::B > Grade::C);
        assert!(Grade::C > Grade::D);
        assert!(Grade::D > Grade::F);
        assert_eq!(Grade::A.points(), 4);
        assert_eq!(Grade::F.points(), 0);
    }

    #[test]
    fn grade_meets_minimum() {
        assert!(Grade::B.meets(Grade::B));
        assert!(Grade::A.meets(Grade::C));
        assert!(!Grade::C.meets(Grade::B));
    }

    #[test]
    fn grade_parse() {
        assert_eq!("b".parse::<Grade>().unwrap(), Grade::B);
        assert_eq!(" A ".parse::<Grade>().unwrap(), Grade::A);
        assert!("E".parse::<Grade>().is_err());
        assert!("A+".parse::<Grade>().is_err());
    }

    #[test]
    fn f_is_not_a_valid_minimum() {
        assert!(Grade::D.is_valid_minimum());
        assert!(!Grade::F.is_valid_minimum());
    }

    #[test]
    fn rule_type_parse_and_label() {
        assert_eq!("Recommended".parse::<RuleType>().unwrap(), RuleType::Recommended);
        assert_eq!(RuleType::Soft.label(), "soft");
        assert!("optional".parse::<RuleType>().is_err());
        assert!(RuleType::Hard.blocks_enrollment());
        assert!(!RuleType::Recommended.blocks_enrollment());
    }

    #[test]
    fn course_builder() {
        let course = Course::new("PHYS201", "Mechanics II")
            .with_department("Physics")
            .with_credits(4)
            .with_level(200);

        assert_eq!(course.code, "PHYS201");
        assert_eq!(course.credits, 4);
        assert_eq!(course.level, 200);
        assert_eq!(course.department.as_deref(), Some("Physics"));
        assert!(course.matches("phys201"));
        assert!(course.matches(&course.id.to_string()));
        assert!(!course.matches("PHYS101"));
    }

    #[test]
    fn course_matches_id_in_any_case() {
        let course = Course::new("PHYS101", "Mechanics I");
        let upper = course.id.to_string().to_ascii_uppercase();

        assert!(course.matches(&upper));
        assert_eq!(upper.parse::<CourseId>().unwrap(), course.id);
    }

    #[test]
    fn rule_serialization_uses_type_key() {
        let a = Course::new("A", "A");
        let b = Course::new("B", "B");
        let rule = PrerequisiteRule {
            id: RuleId::new("ab", Utc::now()),
            course_id: b.id.clone(),
            prerequisite_id: a.id.clone(),
            rule_type: RuleType::Recommended,
            min_grade: Some(Grade::C),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["type"], "recommended");
        assert_eq!(json["min_grade"], "C");

        let back: PrerequisiteRule = serde_json::from_value(json).unwrap();
        assert_eq!(back, rule);
    }
}
