//! Store traits and in-memory implementations.

mod assignments;
mod conflicts;
mod members;
mod roadmap;
mod teams;

use std::sync::Arc;

pub use assignments::{AssignmentStore, InMemoryAssignmentStore};
pub use conflicts::{ConflictStore, InMemoryConflictStore};
pub use members::{InMemoryMemberStore, MemberStore};
pub use roadmap::{InMemoryRoadmapStore, RoadmapStore};
pub use teams::{ExecutedCommand, InMemoryTeamStore, TeamStore};

/// The set of stores the planning core reads and writes.
#[derive(Clone)]
pub struct PlanningStores {
    pub teams: Arc<dyn TeamStore>,
    pub members: Arc<dyn MemberStore>,
    pub assignments: Arc<dyn AssignmentStore>,
    pub conflicts: Arc<dyn ConflictStore>,
    pub roadmap: Arc<dyn RoadmapStore>,
}

impl PlanningStores {
    /// Fresh, empty in-memory stores (tests/dev).
    pub fn in_memory() -> Self {
        Self {
            teams: Arc::new(InMemoryTeamStore::new()),
            members: Arc::new(InMemoryMemberStore::new()),
            assignments: Arc::new(InMemoryAssignmentStore::new()),
            conflicts: Arc::new(InMemoryConflictStore::new()),
            roadmap: Arc::new(InMemoryRoadmapStore::new()),
        }
    }

    pub fn with_conflicts(mut self, conflicts: Arc<dyn ConflictStore>) -> Self {
        self.conflicts = conflicts;
        self
    }
}

impl core::fmt::Debug for PlanningStores {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PlanningStores").finish_non_exhaustive()
    }
}
