//! Course registry
//!
//! Owns the catalog: courses in insertion order, prerequisite rules in
//! insertion order, and the petgraph mirror of the rules used for cycle
//! checks. Every mutation validates fully before touching any of the three,
//! so a rejected call leaves the registry exactly as it was.
//!
//! A course's prerequisite list is never stored; [`CourseRegistry::prerequisites`]
//! projects it from the rules on each read.

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use super::course::{Course, Grade, PrerequisiteRule, RuleType};
use super::graph::{DependencyGraph, GraphError};
use super::id::{CourseId, RuleId};

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown course: {0}")]
    InvalidReference(String),

    #[error("Adding {prerequisite} as a prerequisite of {course} would create a cycle")]
    CycleDetected { course: String, prerequisite: String },

    #[error("Prerequisite rule not found: {0}")]
    NotFound(RuleId),
}

impl RegistryError {
    /// Stable error kind name, used in structured (JSON) error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            RegistryError::InvalidInput(_) => "InvalidInput",
            RegistryError::InvalidReference(_) => "InvalidReference",
            RegistryError::CycleDetected { .. } => "CycleDetected",
            RegistryError::NotFound(_) => "NotFound",
        }
    }
}

/// A course together with its derived relationships, for display
#[derive(Debug, Clone, Serialize)]
pub struct CourseDetail<'a> {
    #[serde(flatten)]
    pub course: &'a Course,
    pub prerequisites: Vec<CourseId>,
    pub rules: Vec<&'a PrerequisiteRule>,
    pub dependents: Vec<CourseId>,
}

/// The in-memory catalog of courses and prerequisite rules
#[derive(Debug, Default)]
pub struct CourseRegistry {
    courses: Vec<Course>,
    rules: Vec<PrerequisiteRule>,
    graph: DependencyGraph,
}

impl CourseRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a registry from stored records, re-checking every invariant
    pub fn from_parts(
        courses: impl IntoIterator<Item = Course>,
        rules: impl IntoIterator<Item = PrerequisiteRule>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();

        let courses: Vec<_> = courses.into_iter().collect();
        // Corequisites may point forward in the file, so check them once all
        // courses are known.
        for course in &courses {
            let mut bare = course.clone();
            bare.corequisites.clear();
            registry.add_course(bare)?;
        }
        for course in &courses {
            registry.check_corequisites(course)?;
            if let Some(stored) = registry.courses.iter_mut().find(|c| c.id == course.id) {
                stored.corequisites = course.corequisites.clone();
            }
        }

        for rule in rules {
            registry.validate_rule(
                &rule.course_id,
                &rule.prerequisite_id,
                rule.min_grade,
            )?;
            if registry.rules.iter().any(|r| r.id == rule.id) {
                return Err(RegistryError::InvalidInput(format!(
                    "duplicate rule id {}",
                    rule.id
                )));
            }
            registry.insert_rule(rule)?;
        }

        Ok(registry)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Looks up a course by ID
    pub fn course(&self, id: &CourseId) -> Option<&Course> {
        self.courses.iter().find(|c| &c.id == id)
    }

    /// Looks up a course by ID or (case-insensitive) code
    pub fn find(&self, query: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.matches(query))
    }

    /// All courses in registry order
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// All rules in insertion order
    pub fn rules(&self) -> &[PrerequisiteRule] {
        &self.rules
    }

    pub fn rule(&self, id: &RuleId) -> Option<&PrerequisiteRule> {
        self.rules.iter().find(|r| &r.id == id)
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Rules constraining a course, in insertion order
    pub fn rules_for_course(&self, course_id: &CourseId) -> Vec<&PrerequisiteRule> {
        self.rules
            .iter()
            .filter(|r| &r.course_id == course_id)
            .collect()
    }

    /// The course's prerequisite IDs, projected from its rules
    pub fn prerequisites(&self, course_id: &CourseId) -> Vec<CourseId> {
        self.rules_for_course(course_id)
            .into_iter()
            .map(|r| r.prerequisite_id.clone())
            .collect()
    }

    /// Courses that name `course_id` as a prerequisite, in registry order
    pub fn dependents(&self, course_id: &CourseId) -> Vec<&Course> {
        let direct = self.graph.dependents(course_id);
        self.courses
            .iter()
            .filter(|c| direct.contains(&c.id))
            .collect()
    }

    /// Course plus its derived prerequisites, rules and dependents
    pub fn detail(&self, course_id: &CourseId) -> Option<CourseDetail<'_>> {
        let course = self.course(course_id)?;
        Some(CourseDetail {
            course,
            prerequisites: self.prerequisites(course_id),
            rules: self.rules_for_course(course_id),
            dependents: self
                .dependents(course_id)
                .into_iter()
                .map(|c| c.id.clone())
                .collect(),
        })
    }

    /// Every course that must (transitively) precede this one, in registry order
    pub fn prerequisite_chain(&self, course_id: &CourseId) -> Vec<&Course> {
        let chain = self.graph.prerequisite_chain(course_id);
        self.courses
            .iter()
            .filter(|c| chain.contains(&c.id))
            .collect()
    }

    /// All courses ordered so that each follows its prerequisites
    pub fn study_order(&self) -> Result<Vec<&Course>, RegistryError> {
        let order = self
            .graph
            .topological_order()
            .map_err(|e| self.graph_error(e))?;
        Ok(order.iter().filter_map(|id| self.course(id)).collect())
    }

    /// Returns true if the rule graph has no cycle
    pub fn is_acyclic(&self) -> bool {
        self.graph.is_acyclic()
    }

    /// Display label for a course: its code, or the raw ID if unknown
    pub fn code_of(&self, course_id: &CourseId) -> String {
        self.course(course_id)
            .map(|c| c.code.clone())
            .unwrap_or_else(|| course_id.to_string())
    }

    // ------------------------------------------------------------------
    // Course mutation
    // ------------------------------------------------------------------

    /// Adds a course to the catalog
    pub fn add_course(&mut self, course: Course) -> Result<&Course, RegistryError> {
        if course.code.trim().is_empty() {
            return Err(RegistryError::InvalidInput("course code is required".into()));
        }
        if course.code.chars().any(char::is_whitespace) {
            return Err(RegistryError::InvalidInput(format!(
                "course code '{}' must not contain whitespace",
                course.code
            )));
        }
        if course.title.trim().is_empty() {
            return Err(RegistryError::InvalidInput("course title is required".into()));
        }
        if course.credits == 0 {
            return Err(RegistryError::InvalidInput(format!(
                "course {} must carry at least one credit",
                course.code
            )));
        }
        if self.course(&course.id).is_some() {
            return Err(RegistryError::InvalidInput(format!(
                "duplicate course id {}",
                course.id
            )));
        }
        if self
            .courses
            .iter()
            .any(|c| c.code.eq_ignore_ascii_case(&course.code))
        {
            return Err(RegistryError::InvalidInput(format!(
                "course code {} already exists",
                course.code
            )));
        }
        self.check_corequisites(&course)?;

        self.graph.add_course(course.id.clone());
        self.courses.push(course);
        let last = self.courses.len() - 1;
        Ok(&self.courses[last])
    }

    fn check_corequisites(&self, course: &Course) -> Result<(), RegistryError> {
        for coreq in &course.corequisites {
            if coreq == &course.id {
                return Err(RegistryError::InvalidInput(format!(
                    "{} cannot be its own corequisite",
                    course.code
                )));
            }
            if self.course(coreq).is_none() {
                return Err(RegistryError::InvalidReference(coreq.to_string()));
            }
        }
        Ok(())
    }

    /// Deletes a course together with every rule that mentions it
    ///
    /// Returns the removed course and rules.
    pub fn remove_course(
        &mut self,
        course_id: &CourseId,
    ) -> Result<(Course, Vec<PrerequisiteRule>), RegistryError> {
        let pos = self
            .courses
            .iter()
            .position(|c| &c.id == course_id)
            .ok_or_else(|| RegistryError::InvalidReference(course_id.to_string()))?;

        let (removed_rules, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.rules)
            .into_iter()
            .partition(|r| &r.course_id == course_id || &r.prerequisite_id == course_id);
        self.rules = kept;

        for course in &mut self.courses {
            course.corequisites.retain(|c| c != course_id);
        }

        self.graph.remove_course(course_id);
        let course = self.courses.remove(pos);
        Ok((course, removed_rules))
    }

    // ------------------------------------------------------------------
    // Rule mutation
    // ------------------------------------------------------------------

    /// Adds a rule: `course_id` requires `prerequisite_id`
    ///
    /// Rejected without any state change when either course is unknown, the
    /// pair already has a rule, `min_grade` is F, or the edge would close a
    /// cycle (a self-reference being the one-course case).
    pub fn add_prerequisite(
        &mut self,
        course_id: &CourseId,
        prerequisite_id: &CourseId,
        rule_type: RuleType,
        min_grade: Option<Grade>,
    ) -> Result<PrerequisiteRule, RegistryError> {
        self.validate_rule(course_id, prerequisite_id, min_grade)?;

        let now = Utc::now();
        let mut attempt = 0u32;
        let id = loop {
            let seed = format!("{}:{}:{}", course_id, prerequisite_id, attempt);
            let candidate = RuleId::new(&seed, now);
            if self.rule(&candidate).is_none() {
                break candidate;
            }
            attempt += 1;
        };

        let rule = PrerequisiteRule {
            id,
            course_id: course_id.clone(),
            prerequisite_id: prerequisite_id.clone(),
            rule_type,
            min_grade,
            created_at: now,
        };
        self.insert_rule(rule.clone())?;
        Ok(rule)
    }

    /// Checks everything that could reject a new rule
    fn validate_rule(
        &self,
        course_id: &CourseId,
        prerequisite_id: &CourseId,
        min_grade: Option<Grade>,
    ) -> Result<(), RegistryError> {
        let course = self
            .course(course_id)
            .ok_or_else(|| RegistryError::InvalidReference(course_id.to_string()))?;
        let prerequisite = self
            .course(prerequisite_id)
            .ok_or_else(|| RegistryError::InvalidReference(prerequisite_id.to_string()))?;

        if let Some(grade) = min_grade {
            if !grade.is_valid_minimum() {
                return Err(RegistryError::InvalidInput(format!(
                    "minimum grade must be A, B, C or D (got {})",
                    grade
                )));
            }
        }

        if self
            .rules
            .iter()
            .any(|r| &r.course_id == course_id && &r.prerequisite_id == prerequisite_id)
        {
            return Err(RegistryError::InvalidInput(format!(
                "{} is already a prerequisite of {}",
                prerequisite.code, course.code
            )));
        }

        let cycle = self
            .graph
            .would_create_cycle(course_id, prerequisite_id)
            .map_err(|e| self.graph_error(e))?;
        if cycle {
            return Err(RegistryError::CycleDetected {
                course: course.code.clone(),
                prerequisite: prerequisite.code.clone(),
            });
        }

        Ok(())
    }

    /// Appends an already validated rule and mirrors it into the graph
    fn insert_rule(&mut self, rule: PrerequisiteRule) -> Result<(), RegistryError> {
        if let Err(e) = self
            .graph
            .add_prerequisite(&rule.course_id, &rule.prerequisite_id)
        {
            return Err(self.graph_error(e));
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Deletes a rule by ID
    pub fn remove_prerequisite(&mut self, rule_id: &RuleId) -> Result<PrerequisiteRule, RegistryError> {
        let pos = self
            .rules
            .iter()
            .position(|r| &r.id == rule_id)
            .ok_or_else(|| RegistryError::NotFound(rule_id.clone()))?;

        let rule = self.rules.remove(pos);
        self.graph
            .remove_prerequisite(&rule.course_id, &rule.prerequisite_id);
        Ok(rule)
    }

    fn graph_error(&self, err: GraphError) -> RegistryError {
        match err {
            GraphError::CourseNotFound(id) => RegistryError::InvalidReference(id.to_string()),
            GraphError::SelfDependency(id) => RegistryError::CycleDetected {
                course: self.code_of(&id),
                prerequisite: self.code_of(&id),
            },
            GraphError::CycleDetected(course, prerequisite) => RegistryError::CycleDetected {
                course: self.code_of(&course),
                prerequisite: self.code_of(&prerequisite),
            },
        }
    }
}
