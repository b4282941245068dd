//! Instance and schedule validation.
//!
//! Two independent checks:
//! - [`validate_instance`]: structural integrity of a loaded instance
//!   (dimensions, index ranges, durations, precedence cycles).
//! - [`check_schedule`] / [`is_valid`]: feasibility oracle for a schedule,
//!   independent of how the schedule was produced.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use std::collections::HashSet;
use std::fmt;

use crate::models::{Assignment, Instance, Schedule, Violation, ViolationType};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A per-activity, per-resource or per-skill table has the wrong length.
    DimensionMismatch,
    /// A precedence edge or eligibility entry names an unknown index.
    IndexOutOfRange,
    /// An activity has a negative duration.
    NegativeDuration,
    /// Precedence graph contains a cycle (including self-loops).
    CyclicDependency,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Validates the structure of an instance.
///
/// Checks:
/// 1. Per-activity tables (`skill_requirements`, `useful_resources`) have
///    one entry per activity; per-resource tables have one per resource
/// 2. Requirement and mastery rows have one entry per skill
/// 3. Durations are non-negative
/// 4. Precedence and eligibility indices are in range
/// 5. No circular precedence dependencies
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_instance(instance: &Instance) -> ValidationResult {
    let mut errors = Vec::new();
    let n_acts = instance.n_activities();
    let n_res = instance.n_resources();
    let n_skills = instance.n_skills;

    let mut expect_len = |what: &str, actual: usize, expected: usize| {
        if actual != expected {
            errors.push(ValidationError::new(
                ValidationErrorKind::DimensionMismatch,
                format!("{what} has {actual} entries, expected {expected}"),
            ));
        }
    };
    expect_len("skill_requirements", instance.skill_requirements.len(), n_acts);
    expect_len("useful_resources", instance.useful_resources.len(), n_acts);
    expect_len(
        "potential_activities",
        instance.potential_activities.len(),
        n_res,
    );
    expect_len("successors", instance.successors.len(), instance.n_precedences());
    for (act, reqs) in instance.skill_requirements.iter().enumerate() {
        expect_len(&format!("skill_requirements[{act}]"), reqs.len(), n_skills);
    }
    for (res, row) in instance.mastery.iter().enumerate() {
        expect_len(&format!("mastery[{res}]"), row.len(), n_skills);
    }

    for (act, &d) in instance.durations.iter().enumerate() {
        if d < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeDuration,
                format!("Activity {act} has negative duration {d}"),
            ));
        }
    }

    for (pred, succ) in instance.precedences() {
        if pred >= n_acts || succ >= n_acts {
            errors.push(ValidationError::new(
                ValidationErrorKind::IndexOutOfRange,
                format!("Precedence edge {pred} -> {succ} references unknown activity"),
            ));
        }
    }

    for (act, list) in instance.useful_resources.iter().enumerate() {
        for &res in list {
            if res >= n_res {
                errors.push(ValidationError::new(
                    ValidationErrorKind::IndexOutOfRange,
                    format!("Activity {act} lists unknown resource {res}"),
                ));
            }
        }
    }
    for (res, list) in instance.potential_activities.iter().enumerate() {
        for &act in list {
            if act >= n_acts {
                errors.push(ValidationError::new(
                    ValidationErrorKind::IndexOutOfRange,
                    format!("Resource {res} lists unknown activity {act}"),
                ));
            }
        }
    }

    if let Some(cycle_err) = detect_cycles(instance) {
        errors.push(cycle_err);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Detects cycles in the precedence graph using iterative DFS.
fn detect_cycles(instance: &Instance) -> Option<ValidationError> {
    let n = instance.n_activities();
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (pred, succ) in instance.precedences() {
        if pred < n && succ < n {
            adj[pred].push(succ);
        }
    }

    // 0 = unvisited, 1 = on stack, 2 = done
    let mut state = vec![0u8; n];
    for root in 0..n {
        if state[root] != 0 {
            continue;
        }
        let mut stack = vec![(root, 0usize)];
        state[root] = 1;
        while let Some(top) = stack.last_mut() {
            let (node, next) = *top;
            if next < adj[node].len() {
                top.1 += 1;
                let child = adj[node][next];
                match state[child] {
                    0 => {
                        state[child] = 1;
                        stack.push((child, 0));
                    }
                    1 => {
                        return Some(ValidationError::new(
                            ValidationErrorKind::CyclicDependency,
                            format!("Circular dependency detected involving activity {child}"),
                        ));
                    }
                    _ => {}
                }
            } else {
                state[node] = 2;
                stack.pop();
            }
        }
    }

    None
}

/// Checks a schedule against an instance and returns every violation.
///
/// Finish times are recomputed as `start + duration` from the instance, so a
/// schedule cannot hide conflicts behind its own `end` values.
///
/// Checks:
/// 1. Every activity appears exactly once, starts at or after zero, and its
///    `end - start` equals its duration
/// 2. No resource staffs two activities whose time intervals overlap, and no
///    resource is listed twice on one activity
/// 3. Every precedence edge `p → s` has `start[p] + duration[p] <= start[s]`
/// 4. Every staffing resource is eligible for the activity and masters the
///    skill it is credited with
/// 5. Every per-skill requirement is fully covered
pub fn check_schedule(schedule: &Schedule, instance: &Instance) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut by_activity = vec![None; instance.n_activities()];
    for a in &schedule.assignments {
        let Some(slot) = by_activity.get_mut(a.activity) else {
            continue;
        };
        if slot.is_some() {
            violations.push(Violation::new(
                ViolationType::DuplicateActivity,
                a.activity,
                format!("Activity {} is scheduled more than once", a.activity),
            ));
        } else {
            *slot = Some(a);
        }
    }

    let finish = |a: &Assignment| a.start + instance.duration(a.activity);
    for a in by_activity.iter().flatten() {
        if a.start < 0 || a.end != finish(a) {
            violations.push(Violation::new(
                ViolationType::DurationMismatch,
                a.activity,
                format!(
                    "Activity {} runs [{}, {}) but has duration {}",
                    a.activity,
                    a.start,
                    a.end,
                    instance.duration(a.activity)
                ),
            ));
        }
    }

    for (act, assignment) in by_activity.iter().enumerate() {
        if assignment.is_none() {
            violations.push(Violation::new(
                ViolationType::UncoveredRequirement,
                act,
                format!("Activity {act} is not scheduled"),
            ));
        }
    }

    let placed: Vec<_> = by_activity.iter().flatten().copied().collect();
    for (i, a) in placed.iter().enumerate() {
        let mut seen = HashSet::new();
        for r in &a.resources {
            if !seen.insert(r.resource) {
                violations.push(Violation::new(
                    ViolationType::ResourceOverlap,
                    a.activity,
                    format!(
                        "Resource {} is listed twice on activity {}",
                        r.resource, a.activity
                    ),
                ));
            }
        }
        for b in &placed[..i] {
            let overlap = finish(a).min(finish(b)) - a.start.max(b.start);
            if overlap <= 0 {
                continue;
            }
            if let Some(shared) = a.resources.iter().find(|r| b.uses(r.resource)) {
                violations.push(Violation::new(
                    ViolationType::ResourceOverlap,
                    a.activity,
                    format!(
                        "Resource {} works on activities {} and {} simultaneously",
                        shared.resource, b.activity, a.activity
                    ),
                ));
            }
        }
    }

    for (pred, succ) in instance.precedences() {
        let (Some(Some(p)), Some(Some(s))) = (by_activity.get(pred), by_activity.get(succ))
        else {
            continue;
        };
        if finish(p) > s.start {
            violations.push(Violation::new(
                ViolationType::PrecedenceViolation,
                succ,
                format!(
                    "Activity {succ} starts at {} before predecessor {pred} ends at {}",
                    s.start,
                    finish(p)
                ),
            ));
        }
    }

    for a in &placed {
        for r in &a.resources {
            if !instance.is_eligible(a.activity, r.resource) {
                violations.push(Violation::new(
                    ViolationType::IneligibleResource,
                    a.activity,
                    format!(
                        "Resource {} is not eligible for activity {}",
                        r.resource, a.activity
                    ),
                ));
            }
            if !instance.masters(r.resource, r.skill) {
                violations.push(Violation::new(
                    ViolationType::SkillMismatch,
                    a.activity,
                    format!(
                        "Resource {} does not master skill {}",
                        r.resource, r.skill
                    ),
                ));
            }
        }
        if let Some(reqs) = instance.skill_requirements.get(a.activity) {
            for (skill, &units) in reqs.iter().enumerate() {
                let staffed = a.units_of(skill);
                if staffed < units as usize {
                    violations.push(Violation::new(
                        ViolationType::UncoveredRequirement,
                        a.activity,
                        format!(
                            "Activity {} has {staffed} of {units} units of skill {skill}",
                            a.activity
                        ),
                    ));
                }
            }
        }
    }

    violations
}

/// Whether a schedule satisfies every constraint of the instance.
pub fn is_valid(schedule: &Schedule, instance: &Instance) -> bool {
    check_schedule(schedule, instance).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_instance() -> Instance {
        Instance::new(2)
            .with_activity(3, vec![1, 0])
            .with_activity(2, vec![0, 1])
            .with_activity(4, vec![1, 1])
            .with_resource(vec![true, false])
            .with_resource(vec![false, true])
            .with_resource(vec![true, true])
            .with_precedence(0, 2)
            .with_default_eligibility()
    }

    fn feasible_schedule() -> Schedule {
        let mut s = Schedule::new();
        s.add_assignment(Assignment::new(0, 0, 3).with_resource(0, 0));
        s.add_assignment(Assignment::new(1, 0, 2).with_resource(1, 1));
        s.add_assignment(
            Assignment::new(2, 3, 7)
                .with_resource(2, 0)
                .with_resource(1, 1),
        );
        s
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_instance(&sample_instance()).is_ok());
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut inst = sample_instance();
        inst.skill_requirements[1] = vec![1];
        let errors = validate_instance(&inst).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DimensionMismatch
                && e.message.contains("skill_requirements[1]")));
    }

    #[test]
    fn test_negative_duration() {
        let inst = sample_instance().with_activity(-1, vec![0, 0]);
        let errors = validate_instance(&inst).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::NegativeDuration));
    }

    #[test]
    fn test_invalid_precedence_index() {
        let inst = sample_instance().with_precedence(0, 42);
        let errors = validate_instance(&inst).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::IndexOutOfRange));
    }

    #[test]
    fn test_invalid_resource_reference() {
        let mut inst = sample_instance();
        inst.useful_resources[0].push(9);
        let errors = validate_instance(&inst).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::IndexOutOfRange
                && e.message.contains("resource 9")));
    }

    #[test]
    fn test_cyclic_dependency() {
        // 0 → 2 → 1 → 0
        let inst = sample_instance()
            .with_precedence(2, 1)
            .with_precedence(1, 0);
        let errors = validate_instance(&inst).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::CyclicDependency));
    }

    #[test]
    fn test_self_loop_is_cycle() {
        let inst = sample_instance().with_precedence(1, 1);
        let errors = validate_instance(&inst).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::CyclicDependency));
    }

    #[test]
    fn test_no_cycle_in_diamond() {
        // 0 → 1, 0 → 2, 1 → 2: shares a descendant but has no cycle
        let inst = sample_instance().with_precedence(0, 1).with_precedence(1, 2);
        assert!(validate_instance(&inst).is_ok());
    }

    #[test]
    fn test_multiple_errors() {
        let mut inst = sample_instance().with_precedence(5, 0);
        inst.durations[0] = -3;
        let errors = validate_instance(&inst).unwrap_err();
        assert!(errors.len() >= 2);
    }

    #[test]
    fn test_feasible_schedule() {
        let inst = sample_instance();
        let s = feasible_schedule();
        assert!(check_schedule(&s, &inst).is_empty());
        assert!(is_valid(&s, &inst));
    }

    #[test]
    fn test_resource_overlap() {
        let inst = sample_instance();
        let mut s = feasible_schedule();
        // activity 2 now overlaps activity 1 on resource 1
        s.assignments[2].start = 1;
        s.assignments[2].end = 5;
        s.assignments[0].end = 1;
        let v = check_schedule(&s, &inst);
        assert!(v
            .iter()
            .any(|v| v.violation_type == ViolationType::ResourceOverlap));
    }

    #[test]
    fn test_shortened_end_cannot_hide_overlap() {
        let inst = Instance::new(1)
            .with_activity(3, vec![1])
            .with_activity(3, vec![1])
            .with_resource(vec![true])
            .with_default_eligibility();
        let mut s = Schedule::new();
        s.add_assignment(Assignment::new(0, 0, 0).with_resource(0, 0));
        s.add_assignment(Assignment::new(1, 0, 0).with_resource(0, 0));
        let v = check_schedule(&s, &inst);
        assert!(!is_valid(&s, &inst));
        assert!(v
            .iter()
            .any(|v| v.violation_type == ViolationType::ResourceOverlap));
        assert_eq!(
            v.iter()
                .filter(|v| v.violation_type == ViolationType::DurationMismatch)
                .count(),
            2
        );
    }

    #[test]
    fn test_shortened_end_cannot_hide_precedence() {
        let inst = sample_instance();
        let mut s = feasible_schedule();
        // activity 0 really ends at 3, activity 2 now starts at 1
        s.assignments[0].end = 1;
        s.assignments[2].start = 1;
        s.assignments[2].end = 5;
        let v = check_schedule(&s, &inst);
        assert!(v
            .iter()
            .any(|v| v.violation_type == ViolationType::PrecedenceViolation && v.activity == 2));
        assert!(v
            .iter()
            .any(|v| v.violation_type == ViolationType::DurationMismatch && v.activity == 0));
    }

    #[test]
    fn test_negative_start() {
        let inst = sample_instance();
        let mut s = feasible_schedule();
        s.assignments[1].start = -2;
        s.assignments[1].end = 0;
        let v = check_schedule(&s, &inst);
        assert!(v
            .iter()
            .any(|v| v.violation_type == ViolationType::DurationMismatch && v.activity == 1));
    }

    #[test]
    fn test_duplicate_activity() {
        let inst = sample_instance();
        let mut s = feasible_schedule();
        // second copy of activity 1 collides with activity 0 on resource 0
        s.add_assignment(Assignment::new(1, 0, 2).with_resource(0, 0));
        let v = check_schedule(&s, &inst);
        assert!(!is_valid(&s, &inst));
        assert!(v
            .iter()
            .any(|v| v.violation_type == ViolationType::DuplicateActivity && v.activity == 1));
    }

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        let inst = Instance::new(1)
            .with_activity(2, vec![1])
            .with_activity(3, vec![1])
            .with_resource(vec![true])
            .with_default_eligibility();
        let mut s = Schedule::new();
        s.add_assignment(Assignment::new(0, 0, 2).with_resource(0, 0));
        s.add_assignment(Assignment::new(1, 2, 5).with_resource(0, 0));
        assert!(is_valid(&s, &inst));
    }

    #[test]
    fn test_duplicate_resource_on_activity() {
        let inst = sample_instance();
        let mut s = feasible_schedule();
        s.assignments[2].resources[1].resource = 2;
        s.assignments[2].resources[1].skill = 1;
        let v = check_schedule(&s, &inst);
        assert!(v
            .iter()
            .any(|v| v.violation_type == ViolationType::ResourceOverlap && v.activity == 2));
    }

    #[test]
    fn test_precedence_violation() {
        let inst = sample_instance();
        let mut s = feasible_schedule();
        s.assignments[2].start = 2;
        s.assignments[2].end = 6;
        let v = check_schedule(&s, &inst);
        assert!(v
            .iter()
            .any(|v| v.violation_type == ViolationType::PrecedenceViolation && v.activity == 2));
    }

    #[test]
    fn test_skill_mismatch_and_uncovered() {
        let inst = sample_instance();
        let mut s = feasible_schedule();
        // resource 0 does not master skill 1
        s.assignments[1].resources[0] = crate::models::SkillAssignment {
            resource: 0,
            skill: 1,
        };
        let v = check_schedule(&s, &inst);
        assert!(v
            .iter()
            .any(|v| v.violation_type == ViolationType::SkillMismatch));
        assert!(v
            .iter()
            .any(|v| v.violation_type == ViolationType::IneligibleResource));
    }

    #[test]
    fn test_uncovered_requirement() {
        let inst = sample_instance();
        let mut s = feasible_schedule();
        s.assignments[2].resources.pop();
        let v = check_schedule(&s, &inst);
        assert!(v
            .iter()
            .any(|v| v.violation_type == ViolationType::UncoveredRequirement && v.activity == 2));
    }

    #[test]
    fn test_missing_activity() {
        let inst = sample_instance();
        let mut s = feasible_schedule();
        s.assignments.remove(1);
        assert!(!is_valid(&s, &inst));
    }
}
