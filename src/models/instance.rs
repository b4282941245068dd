//! MSPSP instance descriptor.
//!
//! An instance lists activities (duration + per-skill unit requirements),
//! resources (per-skill mastery), precedence edges, and the eligibility
//! relation between activities and resources. It is produced once by an
//! external loader and never modified during search.
//!
//! All identifiers are dense 0-based indices.
//!
//! # Reference
//! Bellenguez-Morineau & Néron (2005), "A Branch-and-Bound method for solving
//! Multi-Skill Project Scheduling Problem"

use serde::{Deserialize, Serialize};

/// Static problem data for one MSPSP instance.
///
/// # Example
/// ```
/// use u_mspsp::models::Instance;
///
/// let instance = Instance::new(1)
///     .with_activity(4, vec![1])
///     .with_activity(2, vec![1])
///     .with_resource(vec![true])
///     .with_precedence(0, 1)
///     .with_default_eligibility();
///
/// assert_eq!(instance.n_activities(), 2);
/// assert_eq!(instance.useful_resources[1], vec![0]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Number of distinct skills.
    pub n_skills: usize,
    /// Upper bound on any finish time.
    pub horizon: i64,
    /// Processing time per activity.
    pub durations: Vec<i64>,
    /// Predecessor side of each precedence edge (parallel to `successors`).
    pub predecessors: Vec<usize>,
    /// Successor side of each precedence edge.
    pub successors: Vec<usize>,
    /// Required units per activity per skill.
    pub skill_requirements: Vec<Vec<u32>>,
    /// Whether each resource masters each skill.
    pub mastery: Vec<Vec<bool>>,
    /// Resources allowed to work on each activity.
    pub useful_resources: Vec<Vec<usize>>,
    /// Activities each resource may work on.
    pub potential_activities: Vec<Vec<usize>>,
}

impl Instance {
    /// Creates an empty instance over `n_skills` skills.
    pub fn new(n_skills: usize) -> Self {
        Self {
            n_skills,
            horizon: 0,
            durations: Vec::new(),
            predecessors: Vec::new(),
            successors: Vec::new(),
            skill_requirements: Vec::new(),
            mastery: Vec::new(),
            useful_resources: Vec::new(),
            potential_activities: Vec::new(),
        }
    }

    /// Adds an activity with its per-skill unit requirements.
    ///
    /// The horizon grows to cover the sum of all durations unless it was
    /// set explicitly to something larger.
    pub fn with_activity(mut self, duration: i64, requirements: Vec<u32>) -> Self {
        self.durations.push(duration);
        self.skill_requirements.push(requirements);
        self.useful_resources.push(Vec::new());
        self.horizon = self.horizon.max(self.durations.iter().sum());
        self
    }

    /// Adds a resource with its per-skill mastery flags.
    pub fn with_resource(mut self, mastery: Vec<bool>) -> Self {
        self.mastery.push(mastery);
        self.potential_activities.push(Vec::new());
        self
    }

    /// Adds a precedence edge `pred → succ`.
    pub fn with_precedence(mut self, pred: usize, succ: usize) -> Self {
        self.predecessors.push(pred);
        self.successors.push(succ);
        self
    }

    /// Sets the time horizon.
    pub fn with_horizon(mut self, horizon: i64) -> Self {
        self.horizon = horizon;
        self
    }

    /// Sets the eligible resources of one activity and mirrors the relation
    /// into `potential_activities`.
    pub fn with_useful_resources(mut self, activity: usize, resources: Vec<usize>) -> Self {
        if activity >= self.useful_resources.len() {
            return self;
        }
        for list in self.potential_activities.iter_mut() {
            list.retain(|&a| a != activity);
        }
        for &r in &resources {
            if let Some(list) = self.potential_activities.get_mut(r) {
                list.push(activity);
                list.sort_unstable();
            }
        }
        self.useful_resources[activity] = resources;
        self
    }

    /// Derives eligibility from skills: a resource is useful to an activity
    /// when it masters at least one skill the activity requires.
    pub fn with_default_eligibility(mut self) -> Self {
        let n_res = self.mastery.len();
        let mut useful = vec![Vec::new(); self.durations.len()];
        let mut potential = vec![Vec::new(); n_res];
        for (act, reqs) in self.skill_requirements.iter().enumerate() {
            for (res, skills) in self.mastery.iter().enumerate() {
                let helps = reqs
                    .iter()
                    .zip(skills)
                    .any(|(&units, &masters)| units > 0 && masters);
                if helps {
                    useful[act].push(res);
                    potential[res].push(act);
                }
            }
        }
        self.useful_resources = useful;
        self.potential_activities = potential;
        self
    }

    /// Number of activities.
    #[inline]
    pub fn n_activities(&self) -> usize {
        self.durations.len()
    }

    /// Number of resources.
    #[inline]
    pub fn n_resources(&self) -> usize {
        self.mastery.len()
    }

    /// Number of precedence edges.
    #[inline]
    pub fn n_precedences(&self) -> usize {
        self.predecessors.len()
    }

    /// Duration of an activity.
    #[inline]
    pub fn duration(&self, activity: usize) -> i64 {
        self.durations[activity]
    }

    /// Total skill units an activity needs (= number of resources it uses).
    pub fn required_units(&self, activity: usize) -> usize {
        self.skill_requirements[activity]
            .iter()
            .map(|&u| u as usize)
            .sum()
    }

    /// Whether `resource` masters `skill`.
    pub fn masters(&self, resource: usize, skill: usize) -> bool {
        self.mastery
            .get(resource)
            .and_then(|row| row.get(skill))
            .copied()
            .unwrap_or(false)
    }

    /// Whether `resource` is in the eligible set of `activity`.
    pub fn is_eligible(&self, activity: usize, resource: usize) -> bool {
        self.useful_resources
            .get(activity)
            .is_some_and(|list| list.contains(&resource))
    }

    /// Precedence edges as `(pred, succ)` pairs.
    pub fn precedences(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.predecessors
            .iter()
            .copied()
            .zip(self.successors.iter().copied())
    }
}
