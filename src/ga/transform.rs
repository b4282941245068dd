//! Instance → search graphs.
//!
//! Builds, once per solve:
//! - a [`PrecedenceGraph`] with predecessor and successor lists, and
//! - one [`RequirementGraph`] per activity: a bipartite graph between the
//!   activity's skill-unit slots and the eligible resources mastering each
//!   slot's skill.
//!
//! Topology is immutable afterwards; operators only choose edge weights when
//! they ask for a matching. Infeasible instances are rejected here so the
//! search never discovers infeasibility halfway through.

use std::sync::Arc;

use super::matching::min_weight_full_matching;
use crate::error::MspspError;
use crate::models::Instance;
use crate::validation::validate_instance;

/// Directed precedence graph over activities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecedenceGraph {
    predecessors: Vec<Vec<usize>>,
    successors: Vec<Vec<usize>>,
}

impl PrecedenceGraph {
    /// Builds adjacency lists from the instance's edge arrays.
    pub fn from_instance(instance: &Instance) -> Self {
        let n = instance.n_activities();
        let mut predecessors = vec![Vec::new(); n];
        let mut successors = vec![Vec::new(); n];
        for (pred, succ) in instance.precedences() {
            if !successors[pred].contains(&succ) {
                successors[pred].push(succ);
                predecessors[succ].push(pred);
            }
        }
        Self {
            predecessors,
            successors,
        }
    }

    /// Number of activities.
    pub fn len(&self) -> usize {
        self.predecessors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predecessors.is_empty()
    }

    /// Direct predecessors of an activity.
    pub fn predecessors(&self, activity: usize) -> &[usize] {
        &self.predecessors[activity]
    }

    /// Direct successors of an activity.
    pub fn successors(&self, activity: usize) -> &[usize] {
        &self.successors[activity]
    }

    /// Direct predecessors followed by direct successors.
    pub fn neighbors(&self, activity: usize) -> impl Iterator<Item = usize> + '_ {
        self.predecessors[activity]
            .iter()
            .chain(&self.successors[activity])
            .copied()
    }

    /// Whether `order` lists every activity once, each after its predecessors.
    pub fn is_topological(&self, order: &[usize]) -> bool {
        if order.len() != self.len() {
            return false;
        }
        let mut position = vec![usize::MAX; self.len()];
        for (pos, &act) in order.iter().enumerate() {
            if act >= self.len() || position[act] != usize::MAX {
                return false;
            }
            position[act] = pos;
        }
        (0..self.len()).all(|act| {
            self.successors[act]
                .iter()
                .all(|&succ| position[act] < position[succ])
        })
    }
}

/// Bipartite slot/resource graph of one activity.
///
/// Slots are laid out skill by skill in ascending skill order, one slot per
/// required unit; skills with a zero requirement contribute no slot. Edges
/// are enumerated slot-major, which gives every edge a stable index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementGraph {
    slot_skills: Vec<usize>,
    slot_candidates: Vec<Vec<usize>>,
    resources: Vec<usize>,
}

impl RequirementGraph {
    /// Builds the graph of `activity`.
    ///
    /// Slot counts are checked against the qualified resources before any
    /// slot is materialized, so oversized requirements fail fast.
    ///
    /// # Errors
    /// [`MspspError::InstanceInfeasible`] with `skill: Some(s)` if a required
    /// skill has no qualified eligible resource, or `skill: None` if a skill
    /// (or the activity as a whole) needs more units than there are
    /// qualified resources.
    pub fn for_activity(instance: &Instance, activity: usize) -> Result<Self, MspspError> {
        let mut eligible = instance.useful_resources[activity].clone();
        eligible.sort_unstable();
        eligible.dedup();

        let mut per_skill = Vec::new();
        let mut qualified = vec![false; instance.n_resources()];
        let mut total_units = 0usize;
        for (skill, &units) in instance.skill_requirements[activity].iter().enumerate() {
            if units == 0 {
                continue;
            }
            let candidates: Vec<usize> = eligible
                .iter()
                .copied()
                .filter(|&r| instance.masters(r, skill))
                .collect();
            if candidates.is_empty() {
                return Err(MspspError::InstanceInfeasible {
                    activity,
                    skill: Some(skill),
                });
            }
            let units = units as usize;
            if units > candidates.len() {
                return Err(MspspError::InstanceInfeasible {
                    activity,
                    skill: None,
                });
            }
            for &r in &candidates {
                qualified[r] = true;
            }
            total_units += units;
            per_skill.push((skill, units, candidates));
        }
        if total_units > qualified.iter().filter(|&&q| q).count() {
            return Err(MspspError::InstanceInfeasible {
                activity,
                skill: None,
            });
        }

        let mut slot_skills = Vec::with_capacity(total_units);
        let mut slot_candidates = Vec::with_capacity(total_units);
        for (skill, units, candidates) in per_skill {
            for _ in 0..units {
                slot_skills.push(skill);
                slot_candidates.push(candidates.clone());
            }
        }

        let mut resources: Vec<usize> = slot_candidates.iter().flatten().copied().collect();
        resources.sort_unstable();
        resources.dedup();

        Ok(Self {
            slot_skills,
            slot_candidates,
            resources,
        })
    }

    /// Number of skill-unit slots.
    pub fn slot_count(&self) -> usize {
        self.slot_skills.len()
    }

    /// Skill filled by a slot.
    pub fn skill_of(&self, slot: usize) -> usize {
        self.slot_skills[slot]
    }

    /// Resources that may fill a slot, ascending.
    pub fn candidates(&self, slot: usize) -> &[usize] {
        &self.slot_candidates[slot]
    }

    /// Every resource adjacent to at least one slot, ascending.
    pub fn resources(&self) -> &[usize] {
        &self.resources
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.slot_candidates.iter().map(Vec::len).sum()
    }

    /// Whether `resource` may fill `slot`.
    pub fn is_edge(&self, slot: usize, resource: usize) -> bool {
        self.slot_candidates
            .get(slot)
            .is_some_and(|c| c.binary_search(&resource).is_ok())
    }

    /// Computes a minimum-weight slot-saturating matching.
    ///
    /// `weight(edge, resource)` gives the weight of the `edge`-th edge
    /// (slot-major order). Returns the resource chosen for every slot.
    pub fn min_weight_matching<F>(&self, mut weight: F) -> Option<Vec<usize>>
    where
        F: FnMut(usize, usize) -> i64,
    {
        let mut edge = 0;
        let rows: Vec<Vec<(usize, i64)>> = self
            .slot_candidates
            .iter()
            .map(|cands| {
                cands
                    .iter()
                    .map(|&res| {
                        let w = weight(edge, res);
                        edge += 1;
                        // columns are positions in `resources`
                        let col = self.resources.binary_search(&res).unwrap_or_default();
                        (col, w)
                    })
                    .collect()
            })
            .collect();

        min_weight_full_matching(&rows, self.resources.len())
            .map(|cols| cols.into_iter().map(|c| self.resources[c]).collect())
    }

    /// Whether `assignment` fills every slot with a distinct adjacent resource.
    pub fn is_valid_matching(&self, assignment: &[usize]) -> bool {
        if assignment.len() != self.slot_count() {
            return false;
        }
        let mut seen = Vec::with_capacity(assignment.len());
        for (slot, &res) in assignment.iter().enumerate() {
            if !self.is_edge(slot, res) || seen.contains(&res) {
                return false;
            }
            seen.push(res);
        }
        true
    }
}

/// The instance together with its derived graphs, shared by every
/// chromosome of a solve run.
#[derive(Debug)]
pub struct TransformedInstance {
    pub instance: Instance,
    pub precedence: PrecedenceGraph,
    pub requirements: Vec<RequirementGraph>,
}

impl TransformedInstance {
    /// Number of activities.
    pub fn n_activities(&self) -> usize {
        self.instance.n_activities()
    }

    /// Number of resources.
    pub fn n_resources(&self) -> usize {
        self.instance.n_resources()
    }
}

/// Validates an instance and builds its search graphs.
///
/// # Errors
/// - [`MspspError::InvalidInstance`] if the descriptor is malformed.
/// - [`MspspError::InstanceInfeasible`] if some slot has no qualified
///   eligible resource, or an activity's slots cannot all be filled at once.
pub fn transform(instance: Instance) -> Result<Arc<TransformedInstance>, MspspError> {
    validate_instance(&instance).map_err(MspspError::InvalidInstance)?;

    let precedence = PrecedenceGraph::from_instance(&instance);
    let mut requirements = Vec::with_capacity(instance.n_activities());
    for activity in 0..instance.n_activities() {
        let graph = RequirementGraph::for_activity(&instance, activity)?;
        if graph.min_weight_matching(|_, _| 1).is_none() {
            return Err(MspspError::InstanceInfeasible {
                activity,
                skill: None,
            });
        }
        requirements.push(graph);
    }

    tracing::debug!(
        activities = instance.n_activities(),
        resources = instance.n_resources(),
        precedences = instance.n_precedences(),
        "instance transformed"
    );

    Ok(Arc::new(TransformedInstance {
        instance,
        precedence,
        requirements,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_instance() -> Instance {
        // skills: 0 = design, 1 = build
        Instance::new(2)
            .with_activity(3, vec![1, 0])
            .with_activity(2, vec![0, 2])
            .with_activity(4, vec![1, 1])
            .with_resource(vec![true, false])
            .with_resource(vec![false, true])
            .with_resource(vec![true, true])
            .with_precedence(0, 2)
            .with_precedence(1, 2)
            .with_default_eligibility()
    }

    #[test]
    fn test_precedence_graph() {
        let g = PrecedenceGraph::from_instance(&sample_instance());
        assert_eq!(g.len(), 3);
        assert_eq!(g.successors(0), &[2]);
        assert_eq!(g.predecessors(2), &[0, 1]);
        assert_eq!(g.neighbors(2).collect::<Vec<_>>(), vec![0, 1]);
        assert!(g.is_topological(&[1, 0, 2]));
        assert!(!g.is_topological(&[2, 0, 1]));
        assert!(!g.is_topological(&[0, 0, 2]));
        assert!(!g.is_topological(&[0, 1]));
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let inst = sample_instance().with_precedence(0, 2);
        let g = PrecedenceGraph::from_instance(&inst);
        assert_eq!(g.predecessors(2), &[0, 1]);
    }

    #[test]
    fn test_requirement_graph_slots() {
        let inst = sample_instance();
        let g = RequirementGraph::for_activity(&inst, 2).unwrap();
        assert_eq!(g.slot_count(), 2);
        assert_eq!(g.skill_of(0), 0);
        assert_eq!(g.skill_of(1), 1);
        assert_eq!(g.candidates(0), &[0, 2]);
        assert_eq!(g.candidates(1), &[1, 2]);
        assert_eq!(g.resources(), &[0, 1, 2]);
        assert_eq!(g.edge_count(), 4);
    }

    #[test]
    fn test_zero_requirement_skills_have_no_slots() {
        let inst = sample_instance();
        let g = RequirementGraph::for_activity(&inst, 1).unwrap();
        assert_eq!(g.slot_count(), 2);
        assert!((0..2).all(|s| g.skill_of(s) == 1));
    }

    #[test]
    fn test_min_weight_matching_follows_weights() {
        let inst = sample_instance();
        let g = RequirementGraph::for_activity(&inst, 2).unwrap();
        // Make resource 2 expensive: slot 0 → 0, slot 1 → 1.
        let m = g
            .min_weight_matching(|_, res| if res == 2 { 10 } else { 1 })
            .unwrap();
        assert_eq!(m, vec![0, 1]);
        assert!(g.is_valid_matching(&m));

        // Make resources 0 and 1 expensive: resource 2 takes one slot.
        let m = g
            .min_weight_matching(|_, res| if res == 2 { 1 } else { 10 })
            .unwrap();
        assert!(m.contains(&2));
        assert!(g.is_valid_matching(&m));
    }

    #[test]
    fn test_is_valid_matching_rejects() {
        let inst = sample_instance();
        let g = RequirementGraph::for_activity(&inst, 2).unwrap();
        assert!(!g.is_valid_matching(&[2, 2]));
        assert!(!g.is_valid_matching(&[1, 0]));
        assert!(!g.is_valid_matching(&[0]));
    }

    #[test]
    fn test_transform_ok() {
        let t = transform(sample_instance()).unwrap();
        assert_eq!(t.n_activities(), 3);
        assert_eq!(t.n_resources(), 3);
        assert_eq!(t.requirements.len(), 3);
    }

    #[test]
    fn test_transform_unfillable_slot() {
        // Activity 1 needs skill 1; only resource 0 is eligible and it lacks it.
        let inst = sample_instance().with_useful_resources(1, vec![0]);
        match transform(inst) {
            Err(MspspError::InstanceInfeasible { activity, skill }) => {
                assert_eq!(activity, 1);
                assert_eq!(skill, Some(1));
            }
            other => panic!("expected InstanceInfeasible, got {other:?}"),
        }
    }

    #[test]
    fn test_transform_hall_violation() {
        // Two units of skill 1 but only resource 2 is eligible.
        let inst = sample_instance().with_useful_resources(1, vec![2]);
        match transform(inst) {
            Err(MspspError::InstanceInfeasible { activity, skill }) => {
                assert_eq!(activity, 1);
                assert_eq!(skill, None);
            }
            other => panic!("expected InstanceInfeasible, got {other:?}"),
        }
    }

    #[test]
    fn test_transform_huge_requirement_fails_fast() {
        let inst = Instance::new(1)
            .with_activity(1, vec![u32::MAX])
            .with_resource(vec![true])
            .with_resource(vec![true])
            .with_default_eligibility();
        assert!(matches!(
            transform(inst),
            Err(MspspError::InstanceInfeasible {
                activity: 0,
                skill: None
            })
        ));
    }

    #[test]
    fn test_transform_total_units_exceed_resources() {
        // Each skill alone fits, but both need the single two-skill resource.
        let inst = Instance::new(2)
            .with_activity(1, vec![1, 1])
            .with_resource(vec![true, true])
            .with_default_eligibility();
        assert!(matches!(
            RequirementGraph::for_activity(&inst, 0),
            Err(MspspError::InstanceInfeasible {
                activity: 0,
                skill: None
            })
        ));
    }

    #[test]
    fn test_transform_invalid_instance() {
        let inst = sample_instance().with_precedence(2, 0);
        assert!(matches!(
            transform(inst),
            Err(MspspError::InvalidInstance(_))
        ));
    }
}
