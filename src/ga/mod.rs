//! Genetic search for MSPSP.
//!
//! # Encoding
//!
//! - **Order**: a topological order of the precedence graph; decoding places
//!   activities in this order.
//! - **Matching**: per activity, one distinct resource for every skill-unit
//!   slot of its requirement graph.
//!
//! Every operator preserves both invariants, so each individual decodes to a
//! feasible schedule and fitness is simply the negated makespan.
//!
//! # Submodules
//!
//! - [`transform`]: Precedence and requirement graphs, infeasibility checks
//! - [`matching`]: Sparse minimum-weight bipartite matching
//! - [`operators`]: Rank-sum crossover, matching reconciliation, window mutations
//! - [`population`]: Age-biased elitist selection
//! - [`solver`]: Stopping criteria and results
//!
//! # Reference
//! - Bellenguez-Morineau & Néron (2005), "A Branch-and-Bound method for
//!   solving Multi-Skill Project Scheduling Problem"
//! - Kuhn (1955), "The Hungarian method for the assignment problem"

mod chromosome;
mod config;
pub mod matching;
pub mod operators;
pub mod population;
pub mod solver;
pub mod transform;
mod types;

pub use chromosome::{GraphChromosome, UNSCORED};
pub use config::GaConfig;
pub use matching::min_weight_full_matching;
pub use population::{GenerationStats, Population};
pub use solver::{MspspSolver, SolveResult};
pub use transform::{transform, PrecedenceGraph, RequirementGraph, TransformedInstance};
pub use types::{Encoding, MutationRates};
