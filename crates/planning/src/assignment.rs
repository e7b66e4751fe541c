//! Team↔initiative assignments.

use chrono::{NaiveDate, Utc};
use tracing::{error, info, warn};

use crewplan_allocation::{Allocation, AssignmentRole, TeamAssignment};
use crewplan_infra::PlanningStores;
use crewplan_roadmap::{DateRange, InitiativeId};
use crewplan_teams::{CommitWorkload, ReleaseWorkload, TeamCommand, TeamId};

use crate::conflicts::ConflictDetector;
use crate::error::{PlanningError, PlanningResult};

/// Input for `AssignmentManager::assign`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignRequest {
    pub initiative_id: InitiativeId,
    pub team_id: TeamId,
    /// Percentage of the team's capacity, `0..=100`.
    pub allocated_capacity: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub role: AssignmentRole,
}

/// Creates and removes assignments, keeping `Team::current_workload` equal to
/// the sum of the team's active allocations.
#[derive(Debug, Clone)]
pub struct AssignmentManager {
    stores: PlanningStores,
    detector: ConflictDetector,
}

impl AssignmentManager {
    pub fn new(stores: PlanningStores, detector: ConflictDetector) -> Self {
        Self { stores, detector }
    }

    /// Assign a team to an initiative.
    ///
    /// Fails with `Validation` for an allocation outside `0..=100` or a
    /// reversed date range, `NotFound` for an unknown initiative or team, and
    /// `Duplicate` when the pair is already assigned. On success the team's
    /// workload grows by the allocation and the conflict detector runs for
    /// the team; detection problems never fail the assignment.
    pub fn assign(&self, request: &AssignRequest) -> PlanningResult<TeamAssignment> {
        let allocation = Allocation::new(request.allocated_capacity)?;
        let schedule = DateRange::new(request.start_date, request.end_date)?;

        let initiative_id = request.initiative_id;
        let team_id = request.team_id;

        if self.stores.roadmap.get_initiative(initiative_id)?.is_none() {
            return Err(PlanningError::not_found(format!("initiative {initiative_id}")));
        }
        if self.stores.teams.get(team_id)?.is_none() {
            return Err(PlanningError::not_found(format!("team {team_id}")));
        }

        let assignment = TeamAssignment::new(
            initiative_id,
            team_id,
            allocation,
            schedule,
            request.role,
            Utc::now(),
        );
        self.stores.assignments.insert(assignment.clone())?;

        let commit = TeamCommand::CommitWorkload(CommitWorkload {
            team_id,
            assignment_id: assignment.id.0,
            amount: allocation.value(),
            occurred_at: assignment.created_at,
        });
        let executed = match self.stores.teams.execute(&commit) {
            Ok(executed) => executed,
            Err(err) => {
                if let Err(undo) = self.stores.assignments.take(initiative_id, team_id) {
                    error!(
                        assignment_id = %assignment.id,
                        error = %undo,
                        "failed to roll back assignment insert"
                    );
                }
                return Err(err.into());
            }
        };

        info!(
            assignment_id = %assignment.id,
            initiative_id = %initiative_id,
            team_id = %team_id,
            allocated = allocation.value(),
            workload = executed.team.current_workload(),
            capacity = executed.team.capacity(),
            "initiative assigned to team"
        );

        let conflicts = self.detector.detect(team_id, &schedule);
        if !conflicts.is_empty() {
            warn!(team_id = %team_id, conflicts = conflicts.len(), "team is overallocated");
        }

        Ok(assignment)
    }

    /// Remove the assignment for the pair and release its allocation from
    /// the team's workload (never below zero).
    pub fn unassign(
        &self,
        initiative_id: InitiativeId,
        team_id: TeamId,
    ) -> PlanningResult<TeamAssignment> {
        let assignment = self
            .stores
            .assignments
            .take(initiative_id, team_id)?
            .ok_or_else(|| {
                PlanningError::not_found(format!(
                    "assignment of initiative {initiative_id} to team {team_id}"
                ))
            })?;

        let release = TeamCommand::ReleaseWorkload(ReleaseWorkload {
            team_id,
            assignment_id: assignment.id.0,
            amount: assignment.allocated_capacity.value(),
            occurred_at: Utc::now(),
        });
        let executed = match self.stores.teams.execute(&release) {
            Ok(executed) => executed,
            Err(err) => {
                if let Err(undo) = self.stores.assignments.insert(assignment.clone()) {
                    error!(
                        assignment_id = %assignment.id,
                        error = %undo,
                        "failed to restore assignment"
                    );
                }
                return Err(err.into());
            }
        };

        info!(
            assignment_id = %assignment.id,
            initiative_id = %initiative_id,
            team_id = %team_id,
            workload = executed.team.current_workload(),
            "initiative unassigned from team"
        );
        Ok(assignment)
    }
}
