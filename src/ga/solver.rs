//! Solve loop driving a [`Population`] of [`GraphChromosome`]s.

use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use super::chromosome::GraphChromosome;
use super::config::GaConfig;
use super::population::{GenerationStats, Population};
use super::transform::transform;
use crate::error::MspspError;
use crate::models::{Instance, Schedule};

/// Outcome of a solve run.
#[derive(Debug, Clone)]
pub struct SolveResult {
    /// Best chromosome found.
    pub best: GraphChromosome,
    /// `best` decoded with skill attribution.
    pub schedule: Schedule,
    /// Makespan of `schedule`.
    pub makespan: i64,
    /// Generation steps performed.
    pub generations: usize,
    /// Wall-clock time spent, including the transform.
    pub elapsed: Duration,
    /// Statistics of the initial population followed by one entry per
    /// generation.
    pub history: Vec<GenerationStats>,
}

/// Genetic MSPSP solver.
///
/// # Example
///
/// ```
/// use u_mspsp::ga::{GaConfig, MspspSolver};
/// use u_mspsp::models::Instance;
///
/// // 0 → 1, each staffed by its own resource
/// let instance = Instance::new(2)
///     .with_activity(4, vec![1, 0])
///     .with_activity(2, vec![0, 1])
///     .with_resource(vec![true, false])
///     .with_resource(vec![false, true])
///     .with_precedence(0, 1)
///     .with_default_eligibility();
///
/// let solver = MspspSolver::new(GaConfig::default().with_max_generations(10).with_seed(1));
/// let result = solver.solve(instance).unwrap();
/// assert_eq!(result.makespan, 6);
/// assert_eq!(result.best.score, -6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MspspSolver {
    config: GaConfig,
}

impl MspspSolver {
    pub fn new(config: GaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Solves with an RNG seeded from `config.seed`, or from the OS when
    /// no seed is set.
    pub fn solve(&self, instance: Instance) -> Result<SolveResult, MspspError> {
        let mut rng = match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        self.solve_with_rng(instance, &mut rng)
    }

    /// Solves drawing all randomness from `rng`.
    ///
    /// Runs until stagnation exceeds `max_stagnation`, `max_generations`
    /// steps were taken, or `time_limit` has elapsed. Limits are checked
    /// between generations only.
    ///
    /// # Errors
    /// - [`MspspError::InvalidConfig`] for a rejected configuration.
    /// - [`MspspError::InvalidInstance`] / [`MspspError::InstanceInfeasible`]
    ///   from [`transform`].
    pub fn solve_with_rng<R: Rng>(
        &self,
        instance: Instance,
        rng: &mut R,
    ) -> Result<SolveResult, MspspError> {
        if let Err(e) = self.config.validate() {
            warn!(error = %e, "configuration rejected");
            return Err(e);
        }

        let started = Instant::now();
        let context = transform(instance)?;
        info!(
            activities = context.n_activities(),
            resources = context.n_resources(),
            population_size = self.config.population_size,
            parallel = self.config.parallel,
            "solve started"
        );

        let mut population = Population::<GraphChromosome>::new(context, &self.config, rng)?;
        let mut history = vec![population.stats()];
        while !self.should_stop(&population, started.elapsed()) {
            history.push(population.step(rng)?);
        }

        let best = population.best().clone();
        let schedule = best.to_schedule();
        let makespan = best.makespan();
        let elapsed = started.elapsed();
        info!(
            makespan,
            generations = population.generation(),
            elapsed_ms = elapsed.as_millis() as u64,
            "solve finished"
        );

        Ok(SolveResult {
            best,
            schedule,
            makespan,
            generations: population.generation(),
            elapsed,
            history,
        })
    }

    fn should_stop(&self, population: &Population<GraphChromosome>, elapsed: Duration) -> bool {
        population.stagnation() > self.config.max_stagnation
            || self
                .config
                .max_generations
                .is_some_and(|max| population.generation() >= max)
            || self.config.time_limit.is_some_and(|limit| elapsed >= limit)
    }
}
