//! Enrollment eligibility
//!
//! Walks the target course's rules in stored order. Hard rules block when the
//! prerequisite is missing or its grade is below the minimum; recommended
//! rules only add an advisory reason when the prerequisite is missing; soft
//! rules are never consulted.

use serde::Serialize;
use std::collections::BTreeMap;

use super::course::{Grade, RuleType};
use super::id::CourseId;
use super::registry::CourseRegistry;

/// Outcome of an eligibility check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Eligibility {
    pub can_enroll: bool,
    /// Human-readable reasons, in rule order
    pub reasons: Vec<String>,
}

impl Eligibility {
    fn allowed() -> Self {
        Self {
            can_enroll: true,
            reasons: Vec::new(),
        }
    }

    fn block(&mut self, reason: String) {
        self.can_enroll = false;
        self.reasons.push(reason);
    }

    fn advise(&mut self, reason: String) {
        self.reasons.push(reason);
    }
}

/// Decides whether a student with `grades` may enroll in `course_id`
pub fn evaluate(
    registry: &CourseRegistry,
    grades: &BTreeMap<CourseId, Grade>,
    course_id: &CourseId,
) -> Eligibility {
    if registry.course(course_id).is_none() {
        return Eligibility {
            can_enroll: false,
            reasons: vec!["Course not found".to_string()],
        };
    }

    let mut result = Eligibility::allowed();

    for rule in registry.rules_for_course(course_id) {
        let code = registry.code_of(&rule.prerequisite_id);

        match grades.get(&rule.prerequisite_id) {
            None => match rule.rule_type {
                RuleType::Hard => result.block(format!("Must complete {} first", code)),
                RuleType::Recommended => {
                    result.advise(format!("Recommended to complete {} first", code))
                }
                RuleType::Soft => {}
            },
            Some(&grade) => {
                let Some(minimum) = rule.min_grade else {
                    continue;
                };
                if !grade.meets(minimum) && rule.rule_type.blocks_enrollment() {
                    result.block(format!(
                        "Need minimum grade {} in {} (current: {})",
                        minimum, code, grade
                    ));
                }
            }
        }
    }

    result
}
