//! Property tests for the course registry
//!
//! Random sequences of rule additions and removals must keep the rule graph
//! acyclic, keep every course's derived prerequisite list in step with the
//! rules, and leave the registry untouched whenever a mutation is rejected.

use std::collections::{BTreeMap, HashMap};

use proptest::prelude::*;

use prereq::domain::{build_report, evaluate, Course, CourseId, CourseRegistry, Grade, RuleType};

#[derive(Debug, Clone)]
enum Op {
    Add {
        course: usize,
        prerequisite: usize,
        rule_type: RuleType,
        min_grade: Option<Grade>,
    },
    Remove(usize),
}

fn rule_type() -> impl Strategy<Value = RuleType> {
    prop_oneof![
        Just(RuleType::Hard),
        Just(RuleType::Soft),
        Just(RuleType::Recommended),
    ]
}

fn grade() -> impl Strategy<Value = Grade> {
    prop_oneof![
        Just(Grade::A),
        Just(Grade::B),
        Just(Grade::C),
        Just(Grade::D),
        Just(Grade::F),
    ]
}

fn op(courses: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..courses, 0..courses, rule_type(), proptest::option::of(grade())).prop_map(
            |(course, prerequisite, rule_type, min_grade)| Op::Add {
                course,
                prerequisite,
                rule_type,
                min_grade,
            }
        ),
        1 => (0..32usize).prop_map(Op::Remove),
    ]
}

fn registry_with(n: usize) -> (CourseRegistry, Vec<CourseId>) {
    let mut registry = CourseRegistry::new();
    let ids = (0..n)
        .map(|i| {
            registry
                .add_course(Course::new(format!("C{}", i), format!("Course {}", i)))
                .unwrap()
                .id
                .clone()
        })
        .collect();
    (registry, ids)
}

/// Independent three-colour DFS over the stored rules
fn has_cycle(registry: &CourseRegistry) -> bool {
    let mut edges: HashMap<&CourseId, Vec<&CourseId>> = HashMap::new();
    for rule in registry.rules() {
        edges.entry(&rule.prerequisite_id).or_default().push(&rule.course_id);
    }

    #[derive(Clone, Copy, PartialEq)]
    enum Colour {
        White,
        Grey,
        Black,
    }

    fn visit<'a>(
        node: &'a CourseId,
        edges: &HashMap<&'a CourseId, Vec<&'a CourseId>>,
        colour: &mut HashMap<&'a CourseId, Colour>,
    ) -> bool {
        colour.insert(node, Colour::Grey);
        for next in edges.get(node).into_iter().flatten() {
            match colour.get(next).copied().unwrap_or(Colour::White) {
                Colour::Grey => return true,
                Colour::White => {
                    if visit(next, edges, colour) {
                        return true;
                    }
                }
                Colour::Black => {}
            }
        }
        colour.insert(node, Colour::Black);
        false
    }

    let mut colour = HashMap::new();
    registry.courses().iter().any(|c| {
        colour.get(&c.id).copied().unwrap_or(Colour::White) == Colour::White
            && visit(&c.id, &edges, &mut colour)
    })
}

fn assert_projection_consistent(registry: &CourseRegistry) {
    for course in registry.courses() {
        let from_rules: Vec<CourseId> = registry
            .rules()
            .iter()
            .filter(|r| r.course_id == course.id)
            .map(|r| r.prerequisite_id.clone())
            .collect();
        assert_eq!(registry.prerequisites(&course.id), from_rules);
        assert_eq!(
            registry.detail(&course.id).unwrap().prerequisites,
            from_rules
        );
    }
}

proptest! {
    #[test]
    fn accepted_rules_never_form_a_cycle(ops in proptest::collection::vec(op(6), 0..40)) {
        let (mut registry, ids) = registry_with(6);

        for op in ops {
            let before = registry.rules().to_vec();
            let result = match op {
                Op::Add { course, prerequisite, rule_type, min_grade } => registry
                    .add_prerequisite(&ids[course], &ids[prerequisite], rule_type, min_grade)
                    .map(|_| ()),
                Op::Remove(n) => {
                    let id = registry.rules().get(n).map(|r| r.id.clone());
                    match id {
                        Some(id) => registry.remove_prerequisite(&id).map(|_| ()),
                        None => Ok(()),
                    }
                }
            };

            if result.is_err() {
                prop_assert_eq!(registry.rules(), &before[..]);
            }
            prop_assert!(!has_cycle(&registry));
            prop_assert!(registry.is_acyclic());
            assert_projection_consistent(&registry);
        }
    }

    #[test]
    fn self_loops_always_rejected(n in 0..5usize, rule_type in rule_type()) {
        let (mut registry, ids) = registry_with(5);

        let result = registry.add_prerequisite(&ids[n], &ids[n], rule_type, None);
        prop_assert!(result.is_err());
        prop_assert!(registry.rules().is_empty());
    }

    #[test]
    fn report_has_one_row_per_course(
        n in 0..8usize,
        edges in proptest::collection::vec((0..8usize, 0..8usize), 0..20),
    ) {
        let (mut registry, ids) = registry_with(n);
        for (a, b) in edges {
            if a < n && b < n {
                let _ = registry.add_prerequisite(&ids[a], &ids[b], RuleType::Hard, None);
            }
        }

        let report = build_report(&registry);
        prop_assert_eq!(report.len(), registry.len());
        for (row, course) in report.iter().zip(registry.courses()) {
            let has_rules = !registry.rules_for_course(&course.id).is_empty();
            prop_assert_eq!(row.prerequisites == "None", !has_rules);
        }
    }

    #[test]
    fn evaluate_is_repeatable(
        edges in proptest::collection::vec((0..5usize, 0..5usize, rule_type(), proptest::option::of(grade())), 0..10),
        transcript in proptest::collection::vec((0..5usize, grade()), 0..5),
        target in 0..5usize,
    ) {
        let (mut registry, ids) = registry_with(5);
        for (a, b, rule_type, min_grade) in edges {
            let _ = registry.add_prerequisite(&ids[a], &ids[b], rule_type, min_grade);
        }
        let grades: BTreeMap<CourseId, Grade> =
            transcript.into_iter().map(|(i, g)| (ids[i].clone(), g)).collect();

        let rules_before = registry.rules().to_vec();
        let first = evaluate(&registry, &grades, &ids[target]);
        let second = evaluate(&registry, &grades, &ids[target]);

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(registry.rules(), &rules_before[..]);
        // only hard rules can block
        let hard_rules = registry
            .rules_for_course(&ids[target])
            .iter()
            .any(|r| r.rule_type == RuleType::Hard);
        if !hard_rules {
            prop_assert!(first.can_enroll);
        }
    }
}
