//! Student transcript records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::course::Grade;
use super::id::{CourseId, StudentId};

/// A student and the grades they have earned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,

    pub name: String,

    /// Completed course -> final grade
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub grades: BTreeMap<CourseId, Grade>,

    pub created_at: DateTime<Utc>,
}

impl Student {
    pub fn new(id: StudentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            grades: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Records a final grade, replacing any earlier one. Returns the old grade.
    pub fn record_grade(&mut self, course: CourseId, grade: Grade) -> Option<Grade> {
        self.grades.insert(course, grade)
    }

    pub fn grade_for(&self, course: &CourseId) -> Option<Grade> {
        self.grades.get(course).copied()
    }

    /// Drops the grade for a course that no longer exists
    pub fn forget_course(&mut self, course: &CourseId) -> bool {
        self.grades.remove(course).is_some()
    }
}
