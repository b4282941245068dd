//! Schedule (solution) model.
//!
//! A schedule gives every activity a start time and the set of resources
//! staffing it, each resource attributed to the skill it contributes.
//! Schedules are derived from chromosomes by decoding; they are never
//! stored inside the population.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A complete schedule: one assignment per activity, indexed by activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Activity assignments.
    pub assignments: Vec<Assignment>,
}

/// Start/end time and staffing of one activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Activity index.
    pub activity: usize,
    /// Start time.
    pub start: i64,
    /// End time (start + duration).
    pub end: i64,
    /// Staffing resources with the skill each one contributes.
    pub resources: Vec<SkillAssignment>,
}

/// A resource contributing one unit of one skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkillAssignment {
    pub resource: usize,
    pub skill: usize,
}

/// A feasibility violation found by [`check_schedule`](crate::validation::check_schedule).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Activity the violation is reported against.
    pub activity: usize,
    /// Human-readable description.
    pub message: String,
}

/// Classification of schedule violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// A resource works on two activities at the same time.
    ResourceOverlap,
    /// An activity started before a predecessor finished.
    PrecedenceViolation,
    /// A resource is credited with a skill it does not master.
    SkillMismatch,
    /// Fewer units of a skill were staffed than required.
    UncoveredRequirement,
    /// A resource outside the activity's eligible set was used.
    IneligibleResource,
    /// Start is negative or `end - start` differs from the activity's duration.
    DurationMismatch,
    /// The same activity appears in more than one assignment.
    DuplicateActivity,
}

impl Assignment {
    /// Creates an assignment without staffing.
    pub fn new(activity: usize, start: i64, end: i64) -> Self {
        Self {
            activity,
            start,
            end,
            resources: Vec::new(),
        }
    }

    /// Adds a staffing resource.
    pub fn with_resource(mut self, resource: usize, skill: usize) -> Self {
        self.resources.push(SkillAssignment { resource, skill });
        self
    }

    /// Duration (end - start).
    #[inline]
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }

    /// Whether `resource` staffs this activity.
    pub fn uses(&self, resource: usize) -> bool {
        self.resources.iter().any(|r| r.resource == resource)
    }

    /// Units of `skill` contributed by the staffing resources.
    pub fn units_of(&self, skill: usize) -> usize {
        self.resources.iter().filter(|r| r.skill == skill).count()
    }
}

impl Violation {
    pub fn new(
        violation_type: ViolationType,
        activity: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            activity,
            message: message.into(),
        }
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assignment.
    pub fn add_assignment(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    /// Makespan: latest end time across all assignments.
    pub fn makespan(&self) -> i64 {
        self.assignments.iter().map(|a| a.end).max().unwrap_or(0)
    }

    /// Finds the assignment for a given activity.
    pub fn assignment_for_activity(&self, activity: usize) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.activity == activity)
    }

    /// Returns all assignments staffed by a given resource.
    pub fn assignments_for_resource(&self, resource: usize) -> Vec<&Assignment> {
        self.assignments.iter().filter(|a| a.uses(resource)).collect()
    }

    /// Computes resource utilization: busy_time / horizon.
    ///
    /// Returns `None` if `horizon` is not positive.
    pub fn resource_utilization(&self, resource: usize, horizon: i64) -> Option<f64> {
        if horizon <= 0 {
            return None;
        }
        let busy: i64 = self
            .assignments_for_resource(resource)
            .iter()
            .map(|a| a.duration())
            .sum();
        Some(busy as f64 / horizon as f64)
    }

    /// Computes utilization for all resources that have assignments.
    ///
    /// Uses makespan as the horizon.
    pub fn all_utilizations(&self) -> HashMap<usize, f64> {
        let horizon = self.makespan();
        if horizon <= 0 {
            return HashMap::new();
        }

        let mut busy: HashMap<usize, i64> = HashMap::new();
        for a in &self.assignments {
            for r in &a.resources {
                *busy.entry(r.resource).or_insert(0) += a.duration();
            }
        }

        busy.into_iter()
            .map(|(id, t)| (id, t as f64 / horizon as f64))
            .collect()
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }
}

/// One line per activity, resources and skills shown 1-based.
impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for a in &self.assignments {
            let staff: Vec<String> = a
                .resources
                .iter()
                .map(|r| format!("{}/{}", r.resource + 1, r.skill + 1))
                .collect();
            writeln!(
                f,
                "Activity {}:\tstart = {}\tresources/contributed skills = [{}]",
                a.activity,
                a.start,
                staff.join(", ")
            )?;
        }
        Ok(())
    }
}
