//! Team assignment storage.

use std::sync::RwLock;

use crewplan_allocation::TeamAssignment;
use crewplan_roadmap::InitiativeId;
use crewplan_teams::TeamId;

use crate::error::{StoreError, StoreResult, lock_poisoned};

/// Assignment store. Insertion order is preserved by every listing.
pub trait AssignmentStore: Send + Sync {
    /// Insert unless an assignment already exists for the same
    /// `(initiative_id, team_id)` pair, in which case `Duplicate` is returned.
    fn insert(&self, assignment: TeamAssignment) -> StoreResult<()>;

    fn find(
        &self,
        initiative_id: InitiativeId,
        team_id: TeamId,
    ) -> StoreResult<Option<TeamAssignment>>;

    /// Remove and return the assignment for the pair, if present.
    fn take(
        &self,
        initiative_id: InitiativeId,
        team_id: TeamId,
    ) -> StoreResult<Option<TeamAssignment>>;

    fn list_for_team(&self, team_id: TeamId) -> StoreResult<Vec<TeamAssignment>>;

    fn list_for_initiative(&self, initiative_id: InitiativeId) -> StoreResult<Vec<TeamAssignment>>;

    fn list(&self) -> StoreResult<Vec<TeamAssignment>>;
}

/// In-memory assignment store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAssignmentStore {
    assignments: RwLock<Vec<TeamAssignment>>,
}

impl InMemoryAssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn filtered(&self, keep: impl Fn(&TeamAssignment) -> bool) -> StoreResult<Vec<TeamAssignment>> {
        let assignments = self.assignments.read().map_err(lock_poisoned)?;
        Ok(assignments.iter().filter(|a| keep(a)).cloned().collect())
    }
}

impl AssignmentStore for InMemoryAssignmentStore {
    fn insert(&self, assignment: TeamAssignment) -> StoreResult<()> {
        let mut assignments = self.assignments.write().map_err(lock_poisoned)?;
        if assignments.iter().any(|a| a.key() == assignment.key()) {
            return Err(StoreError::duplicate(format!(
                "assignment of initiative {} to team {}",
                assignment.initiative_id, assignment.team_id
            )));
        }
        assignments.push(assignment);
        Ok(())
    }

    fn find(
        &self,
        initiative_id: InitiativeId,
        team_id: TeamId,
    ) -> StoreResult<Option<TeamAssignment>> {
        let assignments = self.assignments.read().map_err(lock_poisoned)?;
        Ok(assignments
            .iter()
            .find(|a| a.key() == (initiative_id, team_id))
            .cloned())
    }

    fn take(
        &self,
        initiative_id: InitiativeId,
        team_id: TeamId,
    ) -> StoreResult<Option<TeamAssignment>> {
        let mut assignments = self.assignments.write().map_err(lock_poisoned)?;
        let position = assignments
            .iter()
            .position(|a| a.key() == (initiative_id, team_id));
        Ok(position.map(|idx| assignments.remove(idx)))
    }

    fn list_for_team(&self, team_id: TeamId) -> StoreResult<Vec<TeamAssignment>> {
        self.filtered(|a| a.team_id == team_id)
    }

    fn list_for_initiative(&self, initiative_id: InitiativeId) -> StoreResult<Vec<TeamAssignment>> {
        self.filtered(|a| a.initiative_id == initiative_id)
    }

    fn list(&self) -> StoreResult<Vec<TeamAssignment>> {
        self.filtered(|_| true)
    }
}
