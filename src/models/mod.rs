//! MSPSP domain models.
//!
//! - [`Instance`]: static problem data produced by an external loader.
//! - [`Schedule`]: decoded solution (start time + skill-attributed staffing
//!   per activity) and the [`Violation`]s a feasibility check can report.
//!
//! | MSPSP term | Type |
//! |------------|------|
//! | Activity | index into `Instance::durations` |
//! | Resource | index into `Instance::mastery` |
//! | Skill-unit slot | one required unit of one skill |
//! | Staffing | [`SkillAssignment`] |

mod instance;
mod schedule;

pub use instance::Instance;
pub use schedule::{Assignment, Schedule, SkillAssignment, Violation, ViolationType};
