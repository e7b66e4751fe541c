//! Read-side report shapes.

use serde::Serialize;

use crewplan_allocation::TeamAssignment;
use crewplan_teams::{Team, TeamId};

/// Per-team allocation summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamAllocation {
    pub team_id: TeamId,
    pub team_name: String,
    pub total_capacity: u32,
    /// The team's current workload.
    pub allocated_capacity: u32,
    /// Negative when the team is overallocated.
    pub available_capacity: i64,
    /// 0 when the team has no capacity.
    pub utilization_percentage: f64,
    pub assignments: Vec<TeamAssignment>,
}

impl TeamAllocation {
    pub fn new(team: &Team, assignments: Vec<TeamAssignment>) -> Self {
        let utilization_percentage = if team.capacity() == 0 {
            0.0
        } else {
            f64::from(team.current_workload()) / f64::from(team.capacity()) * 100.0
        };
        Self {
            team_id: team.id_typed(),
            team_name: team.name().to_string(),
            total_capacity: team.capacity(),
            allocated_capacity: team.current_workload(),
            available_capacity: team.available_capacity(),
            utilization_percentage,
            assignments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use chrono::Utc;
    use crewplan_core::{Aggregate, EntityId};
    use crewplan_teams::{CommitWorkload, RegisterTeam, TeamCommand};

    fn test_team(capacity: u32, workload: u32) -> Team {
        let team_id = TeamId::generate();
        let mut team = Team::empty(team_id);
        team.execute(&TeamCommand::RegisterTeam(RegisterTeam {
            team_id,
            name: "Growth".to_string(),
            capacity,
            skills: BTreeSet::new(),
            occurred_at: Utc::now(),
        }))
        .unwrap();
        if workload > 0 {
            team.execute(&TeamCommand::CommitWorkload(CommitWorkload {
                team_id,
                assignment_id: EntityId::new(),
                amount: workload,
                occurred_at: Utc::now(),
            }))
            .unwrap();
        }
        team
    }

    #[test]
    fn overallocated_team_has_negative_availability() {
        let report = TeamAllocation::new(&test_team(80, 100), Vec::new());
        assert_eq!(report.available_capacity, -20);
        assert_eq!(report.utilization_percentage, 125.0);
    }

    #[test]
    fn zero_capacity_reports_zero_utilization() {
        let report = TeamAllocation::new(&test_team(0, 30), Vec::new());
        assert_eq!(report.utilization_percentage, 0.0);
        assert_eq!(report.available_capacity, -30);
    }

    #[test]
    fn serializes_in_camel_case() {
        let report = TeamAllocation::new(&test_team(50, 10), Vec::new());
        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json["teamName"], "Growth");
        assert_eq!(json["availableCapacity"], 40);
        assert_eq!(json["utilizationPercentage"], 20.0);
    }
}
