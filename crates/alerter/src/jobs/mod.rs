//! Job implementations.

mod pending_grades;

pub use pending_grades::{AlertOutcome, PendingGradesJob, RunSummary};
