//! Infrastructure layer: storage seams for the planning core.
//!
//! Every store is a trait with an in-memory implementation for tests/dev.
//! Writes that touch shared counters are atomic at this layer: team commands
//! run under the team map's write lock, the assignment pair uniqueness check
//! and insert happen in one critical section, and member capacity changes
//! swap and return the previous value.

pub mod error;
pub mod stores;

pub use error::{StoreError, StoreResult};
pub use stores::{
    AssignmentStore, ConflictStore, ExecutedCommand, InMemoryAssignmentStore,
    InMemoryConflictStore, InMemoryMemberStore, InMemoryRoadmapStore, InMemoryTeamStore,
    MemberStore, PlanningStores, RoadmapStore, TeamStore,
};
