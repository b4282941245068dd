//! Graph-based chromosome for MSPSP.
//!
//! # Encoding
//!
//! The chromosome consists of two parts:
//! - **Order**: a permutation of activities that is a topological order of
//!   the precedence graph.
//! - **Matching**: per activity, the resource filling each skill-unit slot of
//!   its [`RequirementGraph`](super::RequirementGraph), one distinct resource
//!   per slot.
//!
//! Decoding is deterministic list scheduling: activities are placed in
//! order, each as early as its predecessors and its matched resources allow.
//!
//! # Reference
//! Kolisch (1996), "Serial and parallel resource-constrained project
//! scheduling methods revisited"

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use super::operators;
use super::transform::TransformedInstance;
use super::types::{Encoding, MutationRates};
use crate::error::MspspError;
use crate::models::{Assignment, Schedule};

/// Score of an individual that has not been decoded yet.
pub const UNSCORED: i64 = i64::MIN;

/// Order + matching chromosome over a shared transformed instance.
///
/// Higher score = better schedule (score is the negated makespan).
#[derive(Debug, Clone)]
pub struct GraphChromosome {
    /// Shared instance and graphs.
    pub context: Arc<TransformedInstance>,
    /// Activities in scheduling order (topological).
    pub order: Vec<usize>,
    /// Resource per slot, per activity.
    pub matching: Vec<Vec<usize>>,
    /// Generations survived.
    pub age: u32,
    /// Cached score, [`UNSCORED`] until decoded.
    pub score: i64,
}

impl GraphChromosome {
    /// Assembles an unscored chromosome.
    pub fn new(
        context: Arc<TransformedInstance>,
        order: Vec<usize>,
        matching: Vec<Vec<usize>>,
    ) -> Self {
        Self {
            context,
            order,
            matching,
            age: 0,
            score: UNSCORED,
        }
    }

    /// Creates a random feasible chromosome and scores it.
    ///
    /// The order is a uniformly drawn linear extension step by step (each
    /// step picks uniformly among ready activities); every matching is a
    /// minimum-weight matching under a random permutation of edge weights.
    pub fn random<R: Rng>(
        context: &Arc<TransformedInstance>,
        rng: &mut R,
    ) -> Result<Self, MspspError> {
        let order = random_order(context, rng);
        let matching = (0..context.n_activities())
            .map(|act| random_matching(context, act, rng))
            .collect::<Result<Vec<_>, _>>()?;

        let mut chromosome = Self::new(Arc::clone(context), order, matching);
        chromosome.update_score();
        Ok(chromosome)
    }

    /// List-schedules the chromosome.
    ///
    /// Returns the start time of every activity and the makespan.
    pub fn decode(&self) -> (Vec<i64>, i64) {
        let instance = &self.context.instance;
        let precedence = &self.context.precedence;
        debug_assert!(precedence.is_topological(&self.order));

        let mut start = vec![0i64; instance.n_activities()];
        let mut finish = vec![0i64; instance.n_activities()];
        let mut available = vec![0i64; instance.n_resources()];
        let mut makespan = 0i64;

        for &act in &self.order {
            let ready = precedence
                .predecessors(act)
                .iter()
                .map(|&p| finish[p])
                .chain(self.matching[act].iter().map(|&r| available[r]))
                .fold(0, i64::max);

            start[act] = ready;
            finish[act] = ready + instance.duration(act);
            for &r in &self.matching[act] {
                available[r] = finish[act];
            }
            makespan = makespan.max(finish[act]);
        }

        (start, makespan)
    }

    /// Makespan of the decoded schedule.
    pub fn makespan(&self) -> i64 {
        self.decode().1
    }

    /// Decodes into a schedule with per-resource skill attribution.
    ///
    /// Each matched resource is credited with the skill of the slot it
    /// fills; skills an activity does not need have no slot and are never
    /// credited.
    pub fn to_schedule(&self) -> Schedule {
        let (start, _) = self.decode();
        let instance = &self.context.instance;
        let mut schedule = Schedule::new();

        for act in 0..instance.n_activities() {
            let graph = &self.context.requirements[act];
            let assignment = self.matching[act].iter().enumerate().fold(
                Assignment::new(act, start[act], start[act] + instance.duration(act)),
                |a, (slot, &res)| a.with_resource(res, graph.skill_of(slot)),
            );
            schedule.add_assignment(assignment);
        }

        schedule
    }

    /// Checks both encoding invariants: topological order and saturating,
    /// skill-valid matchings.
    pub fn is_valid(&self) -> bool {
        self.context.precedence.is_topological(&self.order)
            && self.matching.len() == self.context.n_activities()
            && self
                .matching
                .iter()
                .zip(&self.context.requirements)
                .all(|(m, graph)| graph.is_valid_matching(m))
    }
}

impl Encoding for GraphChromosome {
    type Context = TransformedInstance;

    fn random<R: Rng>(context: &Arc<Self::Context>, rng: &mut R) -> Result<Self, MspspError> {
        GraphChromosome::random(context, rng)
    }

    fn recombine<R: Rng>(parents: &[&Self], rng: &mut R) -> Self {
        operators::recombine(parents, rng)
    }

    fn mutate<R: Rng>(&mut self, rates: MutationRates, rng: &mut R) -> Result<(), MspspError> {
        operators::mutate(self, rates, rng)?;
        self.update_score();
        Ok(())
    }

    /// Score is the negated makespan, i.e. the latest finish time over all
    /// activities. With a sink activity placed last (the usual dummy end
    /// node) it coincides with the finish time of the last-placed activity;
    /// otherwise an earlier, longer activity can finish later and is the
    /// one that counts.
    fn update_score(&mut self) -> i64 {
        self.score = -self.makespan();
        self.score
    }

    fn score(&self) -> i64 {
        self.score
    }

    fn age(&self) -> u32 {
        self.age
    }

    fn grow_older(&mut self) {
        self.age += 1;
    }

    fn to_schedule(&self) -> Schedule {
        GraphChromosome::to_schedule(self)
    }
}

/// Random linear extension of the precedence graph.
fn random_order<R: Rng>(context: &TransformedInstance, rng: &mut R) -> Vec<usize> {
    let precedence = &context.precedence;
    let n = context.n_activities();
    let mut blocking: Vec<usize> = (0..n).map(|a| precedence.predecessors(a).len()).collect();
    let mut ready: Vec<usize> = (0..n).filter(|&a| blocking[a] == 0).collect();
    let mut order = Vec::with_capacity(n);

    while !ready.is_empty() {
        let next = ready.swap_remove(rng.random_range(0..ready.len()));
        order.push(next);
        for &succ in precedence.successors(next) {
            blocking[succ] -= 1;
            if blocking[succ] == 0 {
                ready.push(succ);
            }
        }
    }

    order
}

/// Minimum-weight matching of one activity under shuffled edge weights.
fn random_matching<R: Rng>(
    context: &TransformedInstance,
    activity: usize,
    rng: &mut R,
) -> Result<Vec<usize>, MspspError> {
    let graph = &context.requirements[activity];
    let mut weights: Vec<i64> = (1..=graph.edge_count() as i64).collect();
    weights.shuffle(rng);
    graph
        .min_weight_matching(|edge, _| weights[edge])
        .ok_or_else(|| {
            MspspError::Internal(format!(
                "random matching left activity {activity} unsaturated"
            ))
        })
}
