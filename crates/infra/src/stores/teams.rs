//! Team ledger storage.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use crewplan_core::{Aggregate, AggregateRoot};
use crewplan_events::EventEnvelope;
use crewplan_teams::{Team, TeamCommand, TeamEvent, TeamId};

use crate::error::{StoreError, StoreResult, lock_poisoned};

const AGGREGATE_TYPE: &str = "teams.team";

/// Result of a command executed against a stored team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedCommand {
    /// Team state after the events were applied.
    pub team: Team,
    pub events: Vec<TeamEvent>,
}

/// Team ledger store.
///
/// Counters are never written directly: callers hand over a `TeamCommand` and
/// the store loads, decides, applies and saves it as one atomic step, so two
/// concurrent mutations of the same team cannot lose each other's update.
pub trait TeamStore: Send + Sync {
    /// Execute a command. `RegisterTeam` creates the team; every other command
    /// fails with `NotFound` for an unknown team.
    fn execute(&self, command: &TeamCommand) -> StoreResult<ExecutedCommand>;

    fn get(&self, team_id: TeamId) -> StoreResult<Option<Team>>;

    /// All teams, ordered by name then id.
    fn list(&self) -> StoreResult<Vec<Team>>;

    /// Recorded ledger events for a team, oldest first.
    fn history(&self, team_id: TeamId) -> StoreResult<Vec<EventEnvelope<TeamEvent>>>;
}

#[derive(Debug, Clone)]
struct TeamStream {
    team: Team,
    history: Vec<EventEnvelope<TeamEvent>>,
}

/// In-memory team store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryTeamStore {
    streams: RwLock<HashMap<TeamId, TeamStream>>,
}

impl InMemoryTeamStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TeamStore for InMemoryTeamStore {
    fn execute(&self, command: &TeamCommand) -> StoreResult<ExecutedCommand> {
        let team_id = command.team_id();
        let mut streams = self.streams.write().map_err(lock_poisoned)?;

        let mut stream = match streams.get(&team_id) {
            Some(stream) => stream.clone(),
            None if command.is_registration() => TeamStream {
                team: Team::empty(team_id),
                history: Vec::new(),
            },
            None => return Err(StoreError::not_found(format!("team {team_id}"))),
        };

        let events = stream.team.execute(command)?;
        let base = stream.history.len() as u64;
        for (offset, event) in events.iter().enumerate() {
            stream.history.push(EventEnvelope::record(
                team_id.0,
                AGGREGATE_TYPE,
                base + offset as u64 + 1,
                event.clone(),
            ));
        }

        debug!(
            team_id = %team_id,
            events = events.len(),
            version = stream.team.version(),
            capacity = stream.team.capacity(),
            workload = stream.team.current_workload(),
            "team command applied"
        );

        let team = stream.team.clone();
        streams.insert(team_id, stream);
        Ok(ExecutedCommand { team, events })
    }

    fn get(&self, team_id: TeamId) -> StoreResult<Option<Team>> {
        let streams = self.streams.read().map_err(lock_poisoned)?;
        Ok(streams.get(&team_id).map(|s| s.team.clone()))
    }

    fn list(&self) -> StoreResult<Vec<Team>> {
        let streams = self.streams.read().map_err(lock_poisoned)?;
        let mut teams: Vec<Team> = streams.values().map(|s| s.team.clone()).collect();
        teams.sort_by(|a, b| {
            a.name()
                .cmp(b.name())
                .then_with(|| a.id_typed().cmp(&b.id_typed()))
        });
        Ok(teams)
    }

    fn history(&self, team_id: TeamId) -> StoreResult<Vec<EventEnvelope<TeamEvent>>> {
        let streams = self.streams.read().map_err(lock_poisoned)?;
        streams
            .get(&team_id)
            .map(|s| s.history.clone())
            .ok_or_else(|| StoreError::not_found(format!("team {team_id}")))
    }
}
