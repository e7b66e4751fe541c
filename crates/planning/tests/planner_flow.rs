use chrono::NaiveDate;

use crewplan_allocation::{AssignmentRole, ConflictType, Severity};
use crewplan_planning::{
    AssignRequest, CapacityPlanner, NewMember, NewTeam, PlanningError, RecommendationKind,
    TimelineFilter,
};
use crewplan_roadmap::{DateRange, RoadmapItem, RoadmapItemId, RoadmapStatus};
use crewplan_teams::TeamId;

fn d(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).unwrap()
}

fn test_request(
    initiative_id: crewplan_roadmap::InitiativeId,
    team_id: TeamId,
    allocated: u32,
) -> AssignRequest {
    AssignRequest {
        initiative_id,
        team_id,
        allocated_capacity: allocated,
        start_date: d(4, 1),
        end_date: d(4, 30),
        role: AssignmentRole::Primary,
    }
}

#[test]
fn plan_a_quarter_end_to_end() {
    crewplan_observability::init();
    let planner = CapacityPlanner::in_memory();

    // Team capacity comes from its members.
    let team = planner
        .register_team(&NewTeam::named("Payments").with_skills(["rust", "postgres"]))
        .unwrap();
    let team_id = team.id_typed();
    let ada = planner
        .add_member(&NewMember::new(team_id, "Ada", 60))
        .unwrap();
    planner
        .add_member(&NewMember::new(team_id, "Grace", 40))
        .unwrap();
    assert_eq!(planner.team(team_id).unwrap().capacity(), 100);
    assert_eq!(planner.team_members(team_id).unwrap().len(), 2);

    // Roadmap.
    let checkout = planner.add_initiative("Checkout v2").unwrap();
    let refunds = planner.add_initiative("Refund automation").unwrap();
    let checkout_item = planner
        .schedule_roadmap_item(
            RoadmapItem::new(checkout.id, DateRange::new(d(4, 1), d(4, 10)).unwrap())
                .with_estimated_effort(80)
                .with_dependencies((0..4).map(|_| RoadmapItemId::generate()).collect()),
        )
        .unwrap();
    planner
        .schedule_roadmap_item(RoadmapItem::new(
            refunds.id,
            DateRange::new(d(4, 1), d(5, 31)).unwrap(),
        ))
        .unwrap();

    // Assignments push the team past its capacity.
    planner
        .assign_initiative_to_team(&test_request(checkout.id, team_id, 90))
        .unwrap();
    planner
        .assign_initiative_to_team(&test_request(refunds.id, team_id, 40))
        .unwrap();
    assert!(matches!(
        planner.assign_initiative_to_team(&test_request(refunds.id, team_id, 10)),
        Err(PlanningError::Duplicate(_))
    ));
    assert_eq!(planner.team(team_id).unwrap().current_workload(), 130);

    let conflicts = planner.resource_conflicts().unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].conflict_type, ConflictType::Overallocation);
    assert_eq!(conflicts[0].severity, Severity::High);
    assert_eq!(conflicts[0].affected_initiatives, vec![checkout.id, refunds.id]);
    assert_eq!(planner.team_conflicts(team_id).unwrap().len(), 1);

    let allocation = planner.resource_allocation().unwrap();
    assert_eq!(allocation[0].available_capacity, -30);
    assert_eq!(allocation[0].assignments.len(), 2);
    let json = serde_json::to_value(&allocation[0]).unwrap();
    assert_eq!(json["assignments"][0]["startDate"], "2025-04-01");
    assert_eq!(json["assignments"][0]["endDate"], "2025-04-30");
    assert!(json["assignments"][0].get("schedule").is_none());

    // Timeline over the team's items.
    let analysis = planner
        .timeline_analysis(&TimelineFilter::for_team(team_id))
        .unwrap();
    assert_eq!(analysis.total_initiatives, 2);
    assert_eq!(analysis.critical_path[0].item_id, checkout_item.id);
    assert_eq!(analysis.risky_items.len(), 1);

    // Projection sees the overload and recommends acting on it.
    let projection = planner
        .capacity_projection(d(4, 1), d(4, 14), Some(&[team_id]))
        .unwrap();
    assert_eq!(projection.weeks.len(), 2);
    assert_eq!(projection.weeks[0].allocated_capacity, 130);
    assert_eq!(
        projection.recommendations[0].kind,
        RecommendationKind::Rebalance
    );

    // Growing the team and dropping one assignment clears the overload.
    planner.update_member_capacity(ada.id, 80).unwrap();
    planner
        .unassign_initiative_from_team(refunds.id, team_id)
        .unwrap();
    let team = planner.team(team_id).unwrap();
    assert_eq!(team.capacity(), 120);
    assert_eq!(team.current_workload(), 90);
    assert!(!team.is_overallocated());

    planner
        .update_roadmap_item(checkout_item.with_status(RoadmapStatus::Completed))
        .unwrap();
    let analysis = planner.timeline_analysis(&TimelineFilter::default()).unwrap();
    assert_eq!(analysis.overall_progress, 50.0);

    // Every counter change is on the team's history.
    let history = planner.team_history(team_id).unwrap();
    let kinds: Vec<&str> = history.iter().map(|e| e.event_type()).collect();
    assert_eq!(
        kinds,
        vec![
            "teams.team.registered",
            "teams.team.member_joined",
            "teams.team.member_joined",
            "teams.team.workload_committed",
            "teams.team.workload_committed",
            "teams.team.member_capacity_changed",
            "teams.team.workload_released",
        ]
    );

    // Serialized report shapes.
    let json = serde_json::to_value(&conflicts[0]).unwrap();
    assert_eq!(json["type"], "overallocation");
    assert_eq!(json["severity"], "high");
    assert!(json["detectedAt"].is_string());
}

#[test]
fn unassign_of_unknown_pair_is_not_found() {
    let planner = CapacityPlanner::in_memory();
    let team_id = planner
        .register_team(&NewTeam::named("Data").with_capacity(10))
        .unwrap()
        .id_typed();
    let initiative = planner.add_initiative("Lakehouse").unwrap();
    assert!(matches!(
        planner.unassign_initiative_from_team(initiative.id, team_id),
        Err(PlanningError::NotFound(_))
    ));
}
