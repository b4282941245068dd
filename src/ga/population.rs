//! Age-biased elitist population.
//!
//! # Generation step
//!
//! 1. Every individual ages by one generation.
//! 2. Parents are drawn with replacement, weighted by
//!    `max((score - median) · parental_bias, 1)`.
//! 3. `N` offspring are produced by recombination and mutation, each from
//!    its own RNG seeded by the master RNG. With `parallel` set the offspring
//!    are built on the rayon pool; the result is identical either way.
//! 4. Parents and offspring are ranked by `score - age · age_bias` and the
//!    best `N` survive. Ties favor offspring.
//! 5. Statistics and elite bookkeeping are refreshed.

use std::sync::Arc;

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::GaConfig;
use super::types::Encoding;
use crate::error::MspspError;

/// Minimum rise of the elite mean that counts as progress.
const ELITE_MEAN_THRESHOLD: f64 = 0.1;

/// Snapshot of population statistics after a generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generations completed (0 = initial population).
    pub generation: usize,
    /// Best-ever score.
    pub best: i64,
    /// Best score in the current population.
    pub max: i64,
    /// Median score of the current population.
    pub median: f64,
    /// Mean score of individuals at or above the median.
    pub elite_mean: f64,
    /// Generations since the last improvement.
    pub stagnation: usize,
}

/// Fixed-size population of candidate encodings.
#[derive(Clone)]
pub struct Population<E: Encoding> {
    context: Arc<E::Context>,
    config: GaConfig,
    individuals: Vec<E>,
    generation: usize,
    median: f64,
    max: i64,
    elite_mean: f64,
    best: E,
    best_mean: f64,
    stagnation: usize,
}

impl<E: Encoding> Population<E> {
    /// Draws `config.population_size` random individuals.
    ///
    /// # Errors
    /// [`MspspError::InvalidConfig`] when the configuration fails validation,
    /// or any error from [`Encoding::random`].
    pub fn new<R: Rng>(
        context: Arc<E::Context>,
        config: &GaConfig,
        rng: &mut R,
    ) -> Result<Self, MspspError> {
        config.validate()?;
        let individuals = (0..config.population_size)
            .map(|_| E::random(&context, rng))
            .collect::<Result<Vec<_>, _>>()?;

        let (median, max, elite_mean) = summarize(&individuals);
        let best = fittest(&individuals)?.clone();

        Ok(Self {
            context,
            config: config.clone(),
            individuals,
            generation: 0,
            median,
            max,
            elite_mean,
            best,
            best_mean: elite_mean,
            stagnation: 0,
        })
    }

    /// Advances the population by one generation.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> Result<GenerationStats, MspspError> {
        let n = self.config.population_size;

        for individual in &mut self.individuals {
            individual.grow_older();
        }

        let offspring = self.breed(rng)?;

        let mut pool = std::mem::take(&mut self.individuals);
        pool.extend(offspring);
        let age_bias = self.config.age_bias_factor;
        let rank = |e: &E| e.score() as f64 - f64::from(e.age()) * age_bias;
        pool.sort_by(|a, b| rank(a).total_cmp(&rank(b)));
        self.individuals = pool.split_off(pool.len() - n);

        let (median, max, elite_mean) = summarize(&self.individuals);
        self.median = median;
        self.max = max;
        self.elite_mean = elite_mean;

        let mut improved = false;
        if self.max > self.best.score() {
            self.best = fittest(&self.individuals)?.clone();
            improved = true;
        }
        if self.elite_mean > self.best_mean + ELITE_MEAN_THRESHOLD {
            self.best_mean = self.elite_mean;
            improved = true;
        }
        self.stagnation = if improved { 0 } else { self.stagnation + 1 };
        self.generation += 1;

        let stats = self.stats();
        debug!(
            generation = stats.generation,
            best = stats.best,
            median = stats.median,
            elite_mean = stats.elite_mean,
            stagnation = stats.stagnation,
            "generation complete"
        );
        Ok(stats)
    }

    /// Produces `N` mutated offspring of weighted-random parents.
    fn breed<R: Rng>(&self, rng: &mut R) -> Result<Vec<E>, MspspError> {
        let bias = self.config.parental_bias_factor;
        let weights: Vec<f64> = self
            .individuals
            .iter()
            .map(|e| ((e.score() as f64 - self.median) * bias).max(1.0))
            .collect();
        let selector = WeightedIndex::new(&weights)
            .map_err(|e| MspspError::Internal(format!("parent selection: {e}")))?;

        let seeds: Vec<u64> = (0..self.config.population_size)
            .map(|_| rng.random())
            .collect();

        let individuals = &self.individuals;
        let parent_count = self.config.parent_count;
        let rates = self.config.mutation_rates();
        let offspring = |seed: u64| -> Result<E, MspspError> {
            let mut rng = SmallRng::seed_from_u64(seed);
            let parents: Vec<&E> = (0..parent_count)
                .map(|_| &individuals[selector.sample(&mut rng)])
                .collect();
            let mut child = E::recombine(&parents, &mut rng);
            child.mutate(rates, &mut rng)?;
            Ok(child)
        };

        if self.config.parallel {
            seeds.into_par_iter().map(offspring).collect()
        } else {
            seeds.into_iter().map(offspring).collect()
        }
    }

    pub fn context(&self) -> &Arc<E::Context> {
        &self.context
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn median(&self) -> f64 {
        self.median
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn elite_mean(&self) -> f64 {
        self.elite_mean
    }

    /// Best individual seen so far.
    pub fn best(&self) -> &E {
        &self.best
    }

    pub fn best_score(&self) -> i64 {
        self.best.score()
    }

    pub fn stagnation(&self) -> usize {
        self.stagnation
    }

    pub fn individuals(&self) -> &[E] {
        &self.individuals
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn stats(&self) -> GenerationStats {
        GenerationStats {
            generation: self.generation,
            best: self.best_score(),
            max: self.max,
            median: self.median,
            elite_mean: self.elite_mean,
            stagnation: self.stagnation,
        }
    }
}

/// Median, maximum and mean-at-or-above-median of the scores.
fn summarize<E: Encoding>(individuals: &[E]) -> (f64, i64, f64) {
    let mut scores: Vec<i64> = individuals.iter().map(|e| e.score()).collect();
    if scores.is_empty() {
        return (0.0, 0, 0.0);
    }
    scores.sort_unstable();

    let mid = scores.len() / 2;
    let median = if scores.len() % 2 == 0 {
        (scores[mid - 1] as f64 + scores[mid] as f64) / 2.0
    } else {
        scores[mid] as f64
    };
    let max = scores[scores.len() - 1];

    let upper: Vec<f64> = scores
        .iter()
        .map(|&s| s as f64)
        .filter(|&s| s >= median)
        .collect();
    let elite_mean = upper.iter().sum::<f64>() / upper.len() as f64;

    (median, max, elite_mean)
}

fn fittest<E: Encoding>(individuals: &[E]) -> Result<&E, MspspError> {
    individuals
        .iter()
        .max_by_key(|e| e.score())
        .ok_or_else(|| MspspError::Internal("empty population".into()))
}
