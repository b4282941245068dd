//! Evolutionary solver for the Multi-Skill Project Scheduling Problem (MSPSP).
//!
//! Activities with durations and precedence constraints need a number of
//! units of each skill; resources master subsets of skills. The solver looks
//! for start times and skill-attributed staffing that never double-book a
//! resource and minimize the makespan.
//!
//! # Modules
//!
//! - **`models`**: `Instance` (problem data), `Schedule`, `Assignment`, `Violation`
//! - **`validation`**: Instance integrity checks and the schedule feasibility oracle
//! - **`ga`**: Graph-based encoding (topological activity order + per-activity
//!   minimum-weight skill matching), operators, population and solver loop
//!
//! # Example
//!
//! ```
//! use u_mspsp::ga::{GaConfig, MspspSolver};
//! use u_mspsp::models::Instance;
//! use u_mspsp::validation::is_valid;
//!
//! let instance = Instance::new(1)
//!     .with_activity(2, vec![1])
//!     .with_activity(3, vec![1])
//!     .with_resource(vec![true])
//!     .with_default_eligibility();
//!
//! let config = GaConfig::default()
//!     .with_population_size(8)
//!     .with_max_generations(5)
//!     .with_seed(7);
//! let result = MspspSolver::new(config).solve(instance.clone()).unwrap();
//! assert_eq!(result.makespan, 5);
//! assert!(is_valid(&result.schedule, &instance));
//! ```
//!
//! # References
//!
//! - Bellenguez-Morineau & Néron (2005), "A Branch-and-Bound method for solving
//!   Multi-Skill Project Scheduling Problem"
//! - Kuhn (1955), "The Hungarian method for the assignment problem"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"

mod error;
pub mod ga;
pub mod models;
pub mod validation;

pub use error::MspspError;
