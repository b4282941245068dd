//! Solver configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::types::MutationRates;
use crate::error::MspspError;

/// Configuration for the MSPSP genetic search.
///
/// # Parameters
///
/// Selection pressure comes from two knobs:
/// - `parental_bias_factor` scales how much above-median individuals are
///   favored as parents (below-median ones keep a floor weight of 1).
/// - `age_bias_factor` is subtracted per generation survived when ranking
///   survivors, so long-lived individuals are gradually displaced.
///
/// The search stops on the first of: stagnation above `max_stagnation`,
/// `max_generations` reached, or `time_limit` elapsed.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_mspsp::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(64)
///     .with_parent_count(3)
///     .with_age_bias_factor(0.5)
///     .with_time_limit(Duration::from_secs(10))
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Number of individuals kept after each generation.
    pub population_size: usize,

    /// Generations without improvement tolerated before stopping.
    pub max_stagnation: usize,

    /// Probability of an order mutation per offspring.
    pub activity_mutation_probability: f64,

    /// Probability of a resource mutation per offspring.
    pub resource_mutation_probability: f64,

    /// Score penalty per generation of age during survivor ranking.
    pub age_bias_factor: f64,

    /// Multiplier on (score - median) for parent selection weights.
    pub parental_bias_factor: f64,

    /// Parents merged into each offspring.
    pub parent_count: usize,

    /// Hard cap on generations (`None` = unbounded).
    pub max_generations: Option<usize>,

    /// Wall-clock budget (`None` = unbounded).
    pub time_limit: Option<Duration>,

    /// Whether to produce offspring in parallel using rayon.
    pub parallel: bool,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_stagnation: 20,
            activity_mutation_probability: 0.1,
            resource_mutation_probability: 0.1,
            age_bias_factor: 1.0,
            parental_bias_factor: 1.0,
            parent_count: 2,
            max_generations: None,
            time_limit: None,
            parallel: true,
            seed: None,
        }
    }
}

impl GaConfig {
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_max_stagnation(mut self, n: usize) -> Self {
        self.max_stagnation = n;
        self
    }

    pub fn with_activity_mutation_probability(mut self, p: f64) -> Self {
        self.activity_mutation_probability = p.clamp(0.0, 1.0);
        self
    }

    pub fn with_resource_mutation_probability(mut self, p: f64) -> Self {
        self.resource_mutation_probability = p.clamp(0.0, 1.0);
        self
    }

    pub fn with_age_bias_factor(mut self, f: f64) -> Self {
        self.age_bias_factor = f;
        self
    }

    pub fn with_parental_bias_factor(mut self, f: f64) -> Self {
        self.parental_bias_factor = f;
        self
    }

    pub fn with_parent_count(mut self, n: usize) -> Self {
        self.parent_count = n;
        self
    }

    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = Some(n);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Mutation probabilities handed to each offspring.
    pub fn mutation_rates(&self) -> MutationRates {
        MutationRates {
            activity: self.activity_mutation_probability,
            resource: self.resource_mutation_probability,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), MspspError> {
        if self.population_size < 2 {
            return Err(MspspError::InvalidConfig(
                "population_size must be at least 2".into(),
            ));
        }
        if self.parent_count == 0 {
            return Err(MspspError::InvalidConfig(
                "parent_count must be at least 1".into(),
            ));
        }
        for (name, p) in [
            ("activity_mutation_probability", self.activity_mutation_probability),
            ("resource_mutation_probability", self.resource_mutation_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(MspspError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {p}"
                )));
            }
        }
        for (name, f) in [
            ("age_bias_factor", self.age_bias_factor),
            ("parental_bias_factor", self.parental_bias_factor),
        ] {
            if !f.is_finite() || f < 0.0 {
                return Err(MspspError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {f}"
                )));
            }
        }
        if self.max_generations == Some(0) {
            return Err(MspspError::InvalidConfig(
                "max_generations must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
