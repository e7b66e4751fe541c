//! Team member storage.

use std::collections::HashMap;
use std::sync::RwLock;

use crewplan_teams::{MemberId, TeamId, TeamMember};

use crate::error::{StoreError, StoreResult, lock_poisoned};

pub trait MemberStore: Send + Sync {
    fn insert(&self, member: TeamMember) -> StoreResult<()>;

    fn get(&self, member_id: MemberId) -> StoreResult<Option<TeamMember>>;

    /// Replace the member's capacity, returning the member as it was before.
    fn set_capacity(&self, member_id: MemberId, capacity: u32) -> StoreResult<TeamMember>;

    /// Remove and return the member, if present.
    fn remove(&self, member_id: MemberId) -> StoreResult<Option<TeamMember>>;

    fn list_for_team(&self, team_id: TeamId) -> StoreResult<Vec<TeamMember>>;
}

/// In-memory member store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryMemberStore {
    members: RwLock<HashMap<MemberId, TeamMember>>,
}

impl InMemoryMemberStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemberStore for InMemoryMemberStore {
    fn insert(&self, member: TeamMember) -> StoreResult<()> {
        let mut members = self.members.write().map_err(lock_poisoned)?;
        if members.contains_key(&member.id) {
            return Err(StoreError::duplicate(format!("member {}", member.id)));
        }
        members.insert(member.id, member);
        Ok(())
    }

    fn get(&self, member_id: MemberId) -> StoreResult<Option<TeamMember>> {
        let members = self.members.read().map_err(lock_poisoned)?;
        Ok(members.get(&member_id).cloned())
    }

    fn set_capacity(&self, member_id: MemberId, capacity: u32) -> StoreResult<TeamMember> {
        let mut members = self.members.write().map_err(lock_poisoned)?;
        let member = members
            .get_mut(&member_id)
            .ok_or_else(|| StoreError::not_found(format!("member {member_id}")))?;
        let previous = member.clone();
        member.capacity = capacity;
        Ok(previous)
    }

    fn remove(&self, member_id: MemberId) -> StoreResult<Option<TeamMember>> {
        let mut members = self.members.write().map_err(lock_poisoned)?;
        Ok(members.remove(&member_id))
    }

    fn list_for_team(&self, team_id: TeamId) -> StoreResult<Vec<TeamMember>> {
        let members = self.members.read().map_err(lock_poisoned)?;
        let mut out: Vec<TeamMember> = members
            .values()
            .filter(|m| m.team_id == team_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }
}
