//! Candidate-encoding contract between the population and an encoding.
//!
//! The population only ever talks to individuals through [`Encoding`]:
//! random initialization, recombination, mutation, scoring and decoding.
//! [`GraphChromosome`](super::GraphChromosome) is the production encoding.

use std::sync::Arc;

use rand::Rng;

use crate::error::MspspError;
use crate::models::Schedule;

/// Per-offspring mutation probabilities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MutationRates {
    /// Probability of permuting a precedence-free window of the order.
    pub activity: f64,
    /// Probability of re-matching resources over a window of activities.
    pub resource: f64,
}

/// A candidate solution that can be evolved by [`Population`](super::Population).
///
/// Higher scores are better. Implementations must keep every individual
/// feasible through all operations.
pub trait Encoding: Clone + Send + Sync {
    /// Shared read-only problem data, owned for the whole solve run.
    type Context: Send + Sync;

    /// Creates a feasible individual from scratch, already scored.
    fn random<R: Rng>(context: &Arc<Self::Context>, rng: &mut R) -> Result<Self, MspspError>;

    /// Merges one or more parents into an unscored child of age zero.
    ///
    /// All parents must come from the same context.
    fn recombine<R: Rng>(parents: &[&Self], rng: &mut R) -> Self;

    /// Perturbs the individual in place and rescores it.
    fn mutate<R: Rng>(&mut self, rates: MutationRates, rng: &mut R) -> Result<(), MspspError>;

    /// Recomputes and caches the score.
    fn update_score(&mut self) -> i64;

    /// Cached score.
    fn score(&self) -> i64;

    /// Generations survived.
    fn age(&self) -> u32;

    /// Adds one generation to the age.
    fn grow_older(&mut self);

    /// Decodes into a concrete schedule.
    fn to_schedule(&self) -> Schedule;
}
