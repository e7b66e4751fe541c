use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crewplan_core::{Aggregate, AggregateId, AggregateRoot, DomainError, EntityId, typed_id};
use crewplan_events::Event;

use crate::member::MemberId;

typed_id!(
    /// Team identifier.
    TeamId,
    AggregateId
);

/// Aggregate root: Team (the capacity ledger for one team).
///
/// `current_workload` is the running sum of allocations committed through
/// assignments. It is never recomputed from the assignment set; every change
/// arrives as a `WorkloadCommitted`/`WorkloadReleased` delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    id: TeamId,
    name: String,
    capacity: u32,
    current_workload: u32,
    member_count: u32,
    skills: BTreeSet<String>,
    version: u64,
    #[serde(skip)]
    registered: bool,
}

impl Team {
    /// Create an empty, not-yet-registered aggregate instance for rehydration.
    pub fn empty(id: TeamId) -> Self {
        Self {
            id,
            name: String::new(),
            capacity: 0,
            current_workload: 0,
            member_count: 0,
            skills: BTreeSet::new(),
            version: 0,
            registered: false,
        }
    }

    pub fn id_typed(&self) -> TeamId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn current_workload(&self) -> u32 {
        self.current_workload
    }

    pub fn member_count(&self) -> u32 {
        self.member_count
    }

    pub fn skills(&self) -> &BTreeSet<String> {
        &self.skills
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Capacity minus workload; negative when the team is overallocated.
    pub fn available_capacity(&self) -> i64 {
        i64::from(self.capacity) - i64::from(self.current_workload)
    }

    pub fn is_overallocated(&self) -> bool {
        self.current_workload > self.capacity
    }
}

impl AggregateRoot for Team {
    type Id = TeamId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterTeam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterTeam {
    pub team_id: TeamId,
    pub name: String,
    /// Opening capacity before any member is added.
    pub capacity: u32,
    pub skills: BTreeSet<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddMember (member capacity joins the team's capacity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddMember {
    pub team_id: TeamId,
    pub member_id: MemberId,
    pub capacity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveMember.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveMember {
    pub team_id: TeamId,
    pub member_id: MemberId,
    pub capacity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ChangeMemberCapacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeMemberCapacity {
    pub team_id: TeamId,
    pub member_id: MemberId,
    pub old_capacity: u32,
    pub new_capacity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CommitWorkload (an assignment was created).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitWorkload {
    pub team_id: TeamId,
    pub assignment_id: EntityId,
    pub amount: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReleaseWorkload (an assignment was removed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseWorkload {
    pub team_id: TeamId,
    pub assignment_id: EntityId,
    pub amount: u32,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamCommand {
    RegisterTeam(RegisterTeam),
    AddMember(AddMember),
    RemoveMember(RemoveMember),
    ChangeMemberCapacity(ChangeMemberCapacity),
    CommitWorkload(CommitWorkload),
    ReleaseWorkload(ReleaseWorkload),
}

impl TeamCommand {
    pub fn team_id(&self) -> TeamId {
        match self {
            TeamCommand::RegisterTeam(c) => c.team_id,
            TeamCommand::AddMember(c) => c.team_id,
            TeamCommand::RemoveMember(c) => c.team_id,
            TeamCommand::ChangeMemberCapacity(c) => c.team_id,
            TeamCommand::CommitWorkload(c) => c.team_id,
            TeamCommand::ReleaseWorkload(c) => c.team_id,
        }
    }

    pub fn is_registration(&self) -> bool {
        matches!(self, TeamCommand::RegisterTeam(_))
    }
}

/// Event: TeamRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRegistered {
    pub team_id: TeamId,
    pub name: String,
    pub capacity: u32,
    pub skills: BTreeSet<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: MemberJoined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberJoined {
    pub team_id: TeamId,
    pub member_id: MemberId,
    pub capacity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: MemberLeft.
///
/// `capacity` is what actually left the ledger (never more than the team had).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberLeft {
    pub team_id: TeamId,
    pub member_id: MemberId,
    pub capacity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: MemberCapacityChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberCapacityChanged {
    pub team_id: TeamId,
    pub member_id: MemberId,
    pub old_capacity: u32,
    pub new_capacity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: WorkloadCommitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadCommitted {
    pub team_id: TeamId,
    pub assignment_id: EntityId,
    pub amount: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: WorkloadReleased.
///
/// `released` can be lower than `requested` when the workload would otherwise
/// go below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadReleased {
    pub team_id: TeamId,
    pub assignment_id: EntityId,
    pub requested: u32,
    pub released: u32,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamEvent {
    TeamRegistered(TeamRegistered),
    MemberJoined(MemberJoined),
    MemberLeft(MemberLeft),
    MemberCapacityChanged(MemberCapacityChanged),
    WorkloadCommitted(WorkloadCommitted),
    WorkloadReleased(WorkloadReleased),
}

impl Event for TeamEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TeamEvent::TeamRegistered(_) => "teams.team.registered",
            TeamEvent::MemberJoined(_) => "teams.team.member_joined",
            TeamEvent::MemberLeft(_) => "teams.team.member_left",
            TeamEvent::MemberCapacityChanged(_) => "teams.team.member_capacity_changed",
            TeamEvent::WorkloadCommitted(_) => "teams.team.workload_committed",
            TeamEvent::WorkloadReleased(_) => "teams.team.workload_released",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            TeamEvent::TeamRegistered(e) => e.occurred_at,
            TeamEvent::MemberJoined(e) => e.occurred_at,
            TeamEvent::MemberLeft(e) => e.occurred_at,
            TeamEvent::MemberCapacityChanged(e) => e.occurred_at,
            TeamEvent::WorkloadCommitted(e) => e.occurred_at,
            TeamEvent::WorkloadReleased(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Team {
    type Command = TeamCommand;
    type Event = TeamEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            TeamEvent::TeamRegistered(e) => {
                self.id = e.team_id;
                self.name = e.name.clone();
                self.capacity = e.capacity;
                self.current_workload = 0;
                self.member_count = 0;
                self.skills = e.skills.clone();
                self.registered = true;
            }
            TeamEvent::MemberJoined(e) => {
                self.capacity = self.capacity.saturating_add(e.capacity);
                self.member_count = self.member_count.saturating_add(1);
            }
            TeamEvent::MemberLeft(e) => {
                self.capacity = self.capacity.saturating_sub(e.capacity);
                self.member_count = self.member_count.saturating_sub(1);
            }
            TeamEvent::MemberCapacityChanged(e) => {
                self.capacity = self
                    .capacity
                    .saturating_add(e.new_capacity)
                    .saturating_sub(e.old_capacity);
            }
            TeamEvent::WorkloadCommitted(e) => {
                self.current_workload = self.current_workload.saturating_add(e.amount);
            }
            TeamEvent::WorkloadReleased(e) => {
                self.current_workload = self.current_workload.saturating_sub(e.released);
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            TeamCommand::RegisterTeam(cmd) => self.handle_register(cmd),
            TeamCommand::AddMember(cmd) => self.handle_add_member(cmd),
            TeamCommand::RemoveMember(cmd) => self.handle_remove_member(cmd),
            TeamCommand::ChangeMemberCapacity(cmd) => self.handle_change_capacity(cmd),
            TeamCommand::CommitWorkload(cmd) => self.handle_commit(cmd),
            TeamCommand::ReleaseWorkload(cmd) => self.handle_release(cmd),
        }
    }
}

impl Team {
    fn ensure_registered(&self, team_id: TeamId) -> Result<(), DomainError> {
        if !self.registered {
            return Err(DomainError::not_found(format!("team {team_id}")));
        }
        if self.id != team_id {
            return Err(DomainError::invariant("team_id mismatch"));
        }
        Ok(())
    }

    fn handle_register(&self, cmd: &RegisterTeam) -> Result<Vec<TeamEvent>, DomainError> {
        if self.registered {
            return Err(DomainError::conflict("team already registered"));
        }
        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("team name cannot be empty"));
        }
        Ok(vec![TeamEvent::TeamRegistered(TeamRegistered {
            team_id: cmd.team_id,
            name: cmd.name.trim().to_string(),
            capacity: cmd.capacity,
            skills: cmd.skills.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_member(&self, cmd: &AddMember) -> Result<Vec<TeamEvent>, DomainError> {
        self.ensure_registered(cmd.team_id)?;
        Ok(vec![TeamEvent::MemberJoined(MemberJoined {
            team_id: cmd.team_id,
            member_id: cmd.member_id,
            capacity: cmd.capacity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove_member(&self, cmd: &RemoveMember) -> Result<Vec<TeamEvent>, DomainError> {
        self.ensure_registered(cmd.team_id)?;
        Ok(vec![TeamEvent::MemberLeft(MemberLeft {
            team_id: cmd.team_id,
            member_id: cmd.member_id,
            capacity: cmd.capacity.min(self.capacity),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_change_capacity(
        &self,
        cmd: &ChangeMemberCapacity,
    ) -> Result<Vec<TeamEvent>, DomainError> {
        self.ensure_registered(cmd.team_id)?;
        if cmd.old_capacity == cmd.new_capacity {
            return Ok(vec![]);
        }
        Ok(vec![TeamEvent::MemberCapacityChanged(MemberCapacityChanged {
            team_id: cmd.team_id,
            member_id: cmd.member_id,
            old_capacity: cmd.old_capacity,
            new_capacity: cmd.new_capacity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_commit(&self, cmd: &CommitWorkload) -> Result<Vec<TeamEvent>, DomainError> {
        self.ensure_registered(cmd.team_id)?;
        Ok(vec![TeamEvent::WorkloadCommitted(WorkloadCommitted {
            team_id: cmd.team_id,
            assignment_id: cmd.assignment_id,
            amount: cmd.amount,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_release(&self, cmd: &ReleaseWorkload) -> Result<Vec<TeamEvent>, DomainError> {
        self.ensure_registered(cmd.team_id)?;
        // Floor at zero.
        let released = cmd.amount.min(self.current_workload);
        Ok(vec![TeamEvent::WorkloadReleased(WorkloadReleased {
            team_id: cmd.team_id,
            assignment_id: cmd.assignment_id,
            requested: cmd.amount,
            released,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_team_id() -> TeamId {
        TeamId::new(AggregateId::new())
    }

    fn test_member_id() -> MemberId {
        MemberId::new(EntityId::new())
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn registered_team(capacity: u32) -> Team {
        let team_id = test_team_id();
        let mut team = Team::empty(team_id);
        team.execute(&TeamCommand::RegisterTeam(RegisterTeam {
            team_id,
            name: "Platform".to_string(),
            capacity,
            skills: BTreeSet::from(["rust".to_string()]),
            occurred_at: test_time(),
        }))
        .unwrap();
        team
    }

    fn commit(team: &mut Team, amount: u32) {
        let cmd = TeamCommand::CommitWorkload(CommitWorkload {
            team_id: team.id_typed(),
            assignment_id: EntityId::new(),
            amount,
            occurred_at: test_time(),
        });
        team.execute(&cmd).unwrap();
    }

    fn release(team: &mut Team, amount: u32) -> Vec<TeamEvent> {
        let cmd = TeamCommand::ReleaseWorkload(ReleaseWorkload {
            team_id: team.id_typed(),
            assignment_id: EntityId::new(),
            amount,
            occurred_at: test_time(),
        });
        team.execute(&cmd).unwrap()
    }

    #[test]
    fn registration_starts_with_zero_workload_and_members() {
        let team = registered_team(40);
        assert!(team.is_registered());
        assert_eq!(team.name(), "Platform");
        assert_eq!(team.capacity(), 40);
        assert_eq!(team.current_workload(), 0);
        assert_eq!(team.member_count(), 0);
        assert_eq!(team.version(), 1);
    }

    #[test]
    fn registering_twice_is_a_conflict() {
        let team = registered_team(0);
        let err = team
            .handle(&TeamCommand::RegisterTeam(RegisterTeam {
                team_id: team.id_typed(),
                name: "Again".to_string(),
                capacity: 0,
                skills: BTreeSet::new(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn blank_name_is_rejected() {
        let team_id = test_team_id();
        let err = Team::empty(team_id)
            .handle(&TeamCommand::RegisterTeam(RegisterTeam {
                team_id,
                name: "   ".to_string(),
                capacity: 0,
                skills: BTreeSet::new(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn commands_on_unregistered_team_are_not_found() {
        let team_id = test_team_id();
        let err = Team::empty(team_id)
            .handle(&TeamCommand::CommitWorkload(CommitWorkload {
                team_id,
                assignment_id: EntityId::new(),
                amount: 10,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn release_is_floored_at_zero() {
        let mut team = registered_team(100);
        commit(&mut team, 20);
        let events = release(&mut team, 50);
        match &events[0] {
            TeamEvent::WorkloadReleased(e) => {
                assert_eq!(e.requested, 50);
                assert_eq!(e.released, 20);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(team.current_workload(), 0);
    }

    #[test]
    fn member_capacity_change_applies_the_delta() {
        let mut team = registered_team(0);
        let member_id = test_member_id();
        let team_id = team.id_typed();
        team.execute(&TeamCommand::AddMember(AddMember {
            team_id,
            member_id,
            capacity: 40,
            occurred_at: test_time(),
        }))
        .unwrap();
        team.execute(&TeamCommand::ChangeMemberCapacity(ChangeMemberCapacity {
            team_id,
            member_id,
            old_capacity: 40,
            new_capacity: 25,
            occurred_at: test_time(),
        }))
        .unwrap();
        assert_eq!(team.capacity(), 25);
        assert_eq!(team.member_count(), 1);
    }

    #[test]
    fn unchanged_member_capacity_emits_nothing() {
        let team = registered_team(10);
        let events = team
            .handle(&TeamCommand::ChangeMemberCapacity(ChangeMemberCapacity {
                team_id: team.id_typed(),
                member_id: test_member_id(),
                old_capacity: 10,
                new_capacity: 10,
                occurred_at: test_time(),
            }))
            .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let team = registered_team(30);
        let before = team.clone();
        let cmd = TeamCommand::CommitWorkload(CommitWorkload {
            team_id: team.id_typed(),
            assignment_id: EntityId::new(),
            amount: 15,
            occurred_at: test_time(),
        });
        let events1 = team.handle(&cmd).unwrap();
        let events2 = team.handle(&cmd).unwrap();
        assert_eq!(team, before);
        assert_eq!(events1, events2);
    }

    #[test]
    fn event_types_are_namespaced() {
        let mut team = registered_team(10);
        commit(&mut team, 5);
        let events = release(&mut team, 5);
        assert_eq!(events[0].event_type(), "teams.team.workload_released");
        assert_eq!(Event::version(&events[0]), 1);
        match &events[0] {
            TeamEvent::WorkloadReleased(e) => assert_eq!(events[0].occurred_at(), e.occurred_at),
            other => panic!("unexpected event {other:?}"),
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: adding N members then removing all of them restores capacity.
        #[test]
        fn members_added_then_removed_restore_capacity(
            opening in 0u32..500,
            capacities in prop::collection::vec(0u32..200, 0..20)
        ) {
            let mut team = registered_team(opening);
            let team_id = team.id_typed();
            let mut joined = Vec::new();

            for capacity in &capacities {
                let member_id = test_member_id();
                team.execute(&TeamCommand::AddMember(AddMember {
                    team_id,
                    member_id,
                    capacity: *capacity,
                    occurred_at: test_time(),
                })).unwrap();
                joined.push((member_id, *capacity));
            }
            prop_assert_eq!(team.member_count() as usize, capacities.len());

            for (member_id, capacity) in joined {
                team.execute(&TeamCommand::RemoveMember(RemoveMember {
                    team_id,
                    member_id,
                    capacity,
                    occurred_at: test_time(),
                })).unwrap();
            }

            prop_assert_eq!(team.capacity(), opening);
            prop_assert_eq!(team.member_count(), 0);
        }

        /// Property: workload never underflows, whatever the release sequence.
        #[test]
        fn workload_never_goes_negative(
            ops in prop::collection::vec((any::<bool>(), 0u32..=100), 0..40)
        ) {
            let mut team = registered_team(100);
            let mut expected: u32 = 0;
            for (is_commit, amount) in ops {
                if is_commit {
                    commit(&mut team, amount);
                    expected += amount;
                } else {
                    release(&mut team, amount);
                    expected = expected.saturating_sub(amount);
                }
                prop_assert_eq!(team.current_workload(), expected);
            }
        }
    }
}
