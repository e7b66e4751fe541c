//! Entry point used by transport layers.

use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use crewplan_allocation::{ResourceConflict, TeamAssignment};
use crewplan_events::EventEnvelope;
use crewplan_infra::PlanningStores;
use crewplan_roadmap::{Initiative, InitiativeId, RoadmapItem};
use crewplan_teams::{MemberId, Team, TeamEvent, TeamId, TeamMember};

use crate::assignment::{AssignRequest, AssignmentManager};
use crate::config::PlannerConfig;
use crate::conflicts::ConflictDetector;
use crate::error::{PlanningError, PlanningResult};
use crate::ledger::{CapacityLedger, NewMember, NewTeam};
use crate::projection::{CapacityProjection, CapacityProjector};
use crate::report::TeamAllocation;
use crate::timeline::{TimelineAnalysis, TimelineAnalyzer, TimelineFilter};

/// Capacity planning facade over a set of stores.
#[derive(Debug, Clone)]
pub struct CapacityPlanner {
    stores: PlanningStores,
    config: PlannerConfig,
    ledger: CapacityLedger,
    assignments: AssignmentManager,
    detector: ConflictDetector,
    timeline: TimelineAnalyzer,
    projector: CapacityProjector,
}

impl CapacityPlanner {
    pub fn new(stores: PlanningStores, config: PlannerConfig) -> Self {
        let detector = ConflictDetector::new(stores.clone(), &config);
        Self {
            ledger: CapacityLedger::new(stores.clone()),
            assignments: AssignmentManager::new(stores.clone(), detector.clone()),
            timeline: TimelineAnalyzer::new(stores.clone(), &config),
            projector: CapacityProjector::new(stores.clone(), detector.clone(), &config),
            detector,
            stores,
            config,
        }
    }

    /// Planner over fresh in-memory stores with default settings (tests/dev).
    pub fn in_memory() -> Self {
        Self::new(PlanningStores::in_memory(), PlannerConfig::default())
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn detector(&self) -> &ConflictDetector {
        &self.detector
    }

    // Teams and members

    #[instrument(skip(self, new_team), fields(name = %new_team.name))]
    pub fn register_team(&self, new_team: &NewTeam) -> PlanningResult<Team> {
        self.ledger.register_team(new_team)
    }

    #[instrument(skip(self, new_member), fields(team_id = %new_member.team_id))]
    pub fn add_member(&self, new_member: &NewMember) -> PlanningResult<TeamMember> {
        self.ledger.add_member(new_member)
    }

    #[instrument(skip(self))]
    pub fn remove_member(&self, member_id: MemberId) -> PlanningResult<TeamMember> {
        self.ledger.remove_member(member_id)
    }

    #[instrument(skip(self))]
    pub fn update_member_capacity(
        &self,
        member_id: MemberId,
        new_capacity: u32,
    ) -> PlanningResult<TeamMember> {
        self.ledger.update_member_capacity(member_id, new_capacity)
    }

    pub fn team(&self, team_id: TeamId) -> PlanningResult<Team> {
        self.stores
            .teams
            .get(team_id)?
            .ok_or_else(|| PlanningError::not_found(format!("team {team_id}")))
    }

    pub fn team_members(&self, team_id: TeamId) -> PlanningResult<Vec<TeamMember>> {
        self.team(team_id)?;
        Ok(self.stores.members.list_for_team(team_id)?)
    }

    /// Recorded capacity and workload changes for a team, oldest first.
    pub fn team_history(&self, team_id: TeamId) -> PlanningResult<Vec<EventEnvelope<TeamEvent>>> {
        Ok(self.stores.teams.history(team_id)?)
    }

    // Roadmap

    #[instrument(skip(self))]
    pub fn add_initiative(&self, title: &str) -> PlanningResult<Initiative> {
        let initiative = Initiative::new(title)?;
        self.stores.roadmap.insert_initiative(initiative.clone())?;
        info!(initiative_id = %initiative.id, title = %initiative.title, "initiative added");
        Ok(initiative)
    }

    /// Store the roadmap item of an existing initiative.
    #[instrument(skip(self, item), fields(item_id = %item.id, initiative_id = %item.initiative_id))]
    pub fn schedule_roadmap_item(&self, item: RoadmapItem) -> PlanningResult<RoadmapItem> {
        self.stores.roadmap.insert_item(item.clone())?;
        info!(status = ?item.status, "roadmap item scheduled");
        Ok(item)
    }

    #[instrument(skip(self, item), fields(item_id = %item.id))]
    pub fn update_roadmap_item(&self, item: RoadmapItem) -> PlanningResult<RoadmapItem> {
        self.stores.roadmap.update_item(item.clone())?;
        info!(status = ?item.status, "roadmap item updated");
        Ok(item)
    }

    // Assignments

    #[instrument(
        skip(self, request),
        fields(initiative_id = %request.initiative_id, team_id = %request.team_id)
    )]
    pub fn assign_initiative_to_team(
        &self,
        request: &AssignRequest,
    ) -> PlanningResult<TeamAssignment> {
        self.assignments.assign(request)
    }

    #[instrument(skip(self))]
    pub fn unassign_initiative_from_team(
        &self,
        initiative_id: InitiativeId,
        team_id: TeamId,
    ) -> PlanningResult<()> {
        self.assignments.unassign(initiative_id, team_id).map(|_| ())
    }

    // Reports

    /// Allocation summary for every team, ordered by team name.
    pub fn resource_allocation(&self) -> PlanningResult<Vec<TeamAllocation>> {
        let teams = self.stores.teams.list()?;
        let mut report = Vec::with_capacity(teams.len());
        for team in &teams {
            let assignments = self.stores.assignments.list_for_team(team.id_typed())?;
            report.push(TeamAllocation::new(team, assignments));
        }
        debug!(teams = report.len(), "resource allocation reported");
        Ok(report)
    }

    /// Every recorded conflict, newest first.
    pub fn resource_conflicts(&self) -> PlanningResult<Vec<ResourceConflict>> {
        let mut conflicts = self.stores.conflicts.list()?;
        newest_first(&mut conflicts);
        debug!(conflicts = conflicts.len(), "resource conflicts reported");
        Ok(conflicts)
    }

    /// Conflicts affecting one team, newest first.
    pub fn team_conflicts(&self, team_id: TeamId) -> PlanningResult<Vec<ResourceConflict>> {
        self.team(team_id)?;
        let mut conflicts = self.stores.conflicts.list()?;
        conflicts.retain(|c| c.affects_team(team_id));
        newest_first(&mut conflicts);
        Ok(conflicts)
    }

    #[instrument(skip(self))]
    pub fn timeline_analysis(&self, filter: &TimelineFilter) -> PlanningResult<TimelineAnalysis> {
        self.timeline.analyze(filter)
    }

    #[instrument(skip(self))]
    pub fn capacity_projection(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        team_ids: Option<&[TeamId]>,
    ) -> PlanningResult<CapacityProjection> {
        self.projector.project(start, end, team_ids)
    }
}

/// Insertion order is oldest first; reversing before the stable sort puts the
/// latest insertion first among equal timestamps.
fn newest_first(conflicts: &mut [ResourceConflict]) {
    conflicts.reverse();
    conflicts.sort_by(|a, b| b.detected_at.cmp(&a.detected_at));
}
