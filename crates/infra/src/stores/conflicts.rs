//! Resource conflict audit log.

use std::sync::RwLock;

use crewplan_allocation::{ConflictType, ResourceConflict};
use crewplan_teams::TeamId;

use crate::error::{StoreResult, lock_poisoned};

/// Append-only conflict log. Records are never updated or removed.
pub trait ConflictStore: Send + Sync {
    fn append(&self, conflict: ResourceConflict) -> StoreResult<()>;

    /// All conflicts in insertion order.
    fn list(&self) -> StoreResult<Vec<ResourceConflict>>;

    /// Most recently appended conflict of `conflict_type` affecting the team.
    fn latest_for_team(
        &self,
        team_id: TeamId,
        conflict_type: ConflictType,
    ) -> StoreResult<Option<ResourceConflict>>;
}

/// In-memory conflict log for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryConflictStore {
    log: RwLock<Vec<ResourceConflict>>,
}

impl InMemoryConflictStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConflictStore for InMemoryConflictStore {
    fn append(&self, conflict: ResourceConflict) -> StoreResult<()> {
        self.log.write().map_err(lock_poisoned)?.push(conflict);
        Ok(())
    }

    fn list(&self) -> StoreResult<Vec<ResourceConflict>> {
        Ok(self.log.read().map_err(lock_poisoned)?.clone())
    }

    fn latest_for_team(
        &self,
        team_id: TeamId,
        conflict_type: ConflictType,
    ) -> StoreResult<Option<ResourceConflict>> {
        let log = self.log.read().map_err(lock_poisoned)?;
        Ok(log
            .iter()
            .rev()
            .find(|c| c.conflict_type == conflict_type && c.affects_team(team_id))
            .cloned())
    }
}
