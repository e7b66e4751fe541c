//! Team registration and membership writes.
//!
//! Member rows and team counters live in different stores. Each operation
//! writes the member row first, then executes the matching team command; if
//! the team command fails the member row is put back the way it was.

use std::collections::BTreeSet;

use chrono::Utc;
use tracing::{error, info};

use crewplan_infra::PlanningStores;
use crewplan_teams::{
    AddMember, ChangeMemberCapacity, MemberId, RegisterTeam, RemoveMember, Team, TeamCommand,
    TeamId, TeamMember,
};

use crate::error::{PlanningError, PlanningResult};

/// Input for registering a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTeam {
    pub name: String,
    /// Capacity the team starts with before members are added.
    pub capacity: u32,
    pub skills: BTreeSet<String>,
}

impl NewTeam {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capacity: 0,
            skills: BTreeSet::new(),
        }
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }
}

/// Input for adding a member to a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub team_id: TeamId,
    pub name: String,
    pub capacity: u32,
    pub skills: BTreeSet<String>,
}

impl NewMember {
    pub fn new(team_id: TeamId, name: impl Into<String>, capacity: u32) -> Self {
        Self {
            team_id,
            name: name.into(),
            capacity,
            skills: BTreeSet::new(),
        }
    }
}

/// Writer for team capacity and membership counters.
#[derive(Debug, Clone)]
pub struct CapacityLedger {
    stores: PlanningStores,
}

impl CapacityLedger {
    pub fn new(stores: PlanningStores) -> Self {
        Self { stores }
    }

    /// Register a team with zero workload and no members.
    pub fn register_team(&self, new_team: &NewTeam) -> PlanningResult<Team> {
        let team_id = TeamId::generate();
        let executed = self
            .stores
            .teams
            .execute(&TeamCommand::RegisterTeam(RegisterTeam {
                team_id,
                name: new_team.name.clone(),
                capacity: new_team.capacity,
                skills: new_team.skills.clone(),
                occurred_at: Utc::now(),
            }))?;
        info!(team_id = %team_id, name = executed.team.name(), "team registered");
        Ok(executed.team)
    }

    /// Add a member; the team's capacity grows by the member's capacity and
    /// its member count by one.
    pub fn add_member(&self, new_member: &NewMember) -> PlanningResult<TeamMember> {
        let team_id = new_member.team_id;
        if self.stores.teams.get(team_id)?.is_none() {
            return Err(PlanningError::not_found(format!("team {team_id}")));
        }

        let member = TeamMember::new(team_id, new_member.name.clone(), new_member.capacity)?
            .with_skills(new_member.skills.iter().cloned());
        self.stores.members.insert(member.clone())?;

        let command = TeamCommand::AddMember(AddMember {
            team_id,
            member_id: member.id,
            capacity: member.capacity,
            occurred_at: Utc::now(),
        });
        if let Err(err) = self.stores.teams.execute(&command) {
            if let Err(undo) = self.stores.members.remove(member.id) {
                error!(member_id = %member.id, error = %undo, "failed to roll back member insert");
            }
            return Err(err.into());
        }

        info!(
            team_id = %team_id,
            member_id = %member.id,
            capacity = member.capacity,
            "member added"
        );
        Ok(member)
    }

    /// Remove a member; the team's capacity shrinks by the member's capacity
    /// and its member count by one (both floored at zero).
    pub fn remove_member(&self, member_id: MemberId) -> PlanningResult<TeamMember> {
        let member = self
            .stores
            .members
            .remove(member_id)?
            .ok_or_else(|| PlanningError::not_found(format!("member {member_id}")))?;

        let command = TeamCommand::RemoveMember(RemoveMember {
            team_id: member.team_id,
            member_id,
            capacity: member.capacity,
            occurred_at: Utc::now(),
        });
        if let Err(err) = self.stores.teams.execute(&command) {
            if let Err(undo) = self.stores.members.insert(member.clone()) {
                error!(member_id = %member_id, error = %undo, "failed to restore removed member");
            }
            return Err(err.into());
        }

        info!(team_id = %member.team_id, member_id = %member_id, "member removed");
        Ok(member)
    }

    /// Change a member's capacity; the team's capacity moves by the difference.
    pub fn update_member_capacity(
        &self,
        member_id: MemberId,
        new_capacity: u32,
    ) -> PlanningResult<TeamMember> {
        let previous = self.stores.members.set_capacity(member_id, new_capacity)?;

        let command = TeamCommand::ChangeMemberCapacity(ChangeMemberCapacity {
            team_id: previous.team_id,
            member_id,
            old_capacity: previous.capacity,
            new_capacity,
            occurred_at: Utc::now(),
        });
        if let Err(err) = self.stores.teams.execute(&command) {
            if let Err(undo) = self.stores.members.set_capacity(member_id, previous.capacity) {
                error!(member_id = %member_id, error = %undo, "failed to restore member capacity");
            }
            return Err(err.into());
        }

        info!(
            team_id = %previous.team_id,
            member_id = %member_id,
            old_capacity = previous.capacity,
            new_capacity,
            "member capacity changed"
        );
        Ok(TeamMember {
            capacity: new_capacity,
            ..previous
        })
    }
}
