//! Allocation domain module: team↔initiative assignments and the resource
//! conflicts recorded against them.

pub mod assignment;
pub mod conflict;

pub use assignment::{Allocation, AssignmentId, AssignmentRole, TeamAssignment};
pub use conflict::{
    ConflictId, ConflictType, Overallocation, ResourceConflict, Severity, SeverityThresholds,
};
