//! Error types for instance preparation and search.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors reported by the MSPSP solver.
#[derive(Error, Debug)]
pub enum MspspError {
    /// The instance descriptor is structurally broken (bad indices, cycles, ...).
    #[error("invalid instance: {}", join_errors(.0))]
    InvalidInstance(Vec<ValidationError>),

    /// Some activity can never be staffed.
    ///
    /// `skill` is set when a single skill-unit slot has no qualified
    /// resource; `None` means the slots are individually coverable but
    /// cannot all be filled at once.
    #[error("instance infeasible: activity {activity} {}", describe_skill(.skill))]
    InstanceInfeasible {
        activity: usize,
        skill: Option<usize>,
    },

    /// Solver configuration rejected by [`GaConfig::validate`](crate::ga::GaConfig::validate).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An invariant that transform-time checks should guarantee was broken.
    #[error("internal fault: {0}")]
    Internal(String),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn describe_skill(skill: &Option<usize>) -> String {
    match skill {
        Some(s) => format!("requires skill {s} but no eligible resource masters it"),
        None => "cannot have all of its skill requirements staffed simultaneously".to_string(),
    }
}
