//! Overallocation detection.

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use crewplan_allocation::{ConflictType, Overallocation, ResourceConflict, SeverityThresholds};
use crewplan_infra::PlanningStores;
use crewplan_roadmap::DateRange;
use crewplan_teams::{Team, TeamId};

use crate::config::PlannerConfig;
use crate::error::{PlanningError, PlanningResult};

/// Inspects a team's ledger and appends overallocation findings to the
/// conflict log.
///
/// Skill-gap and timeline conflicts exist in the vocabulary but are not
/// detected.
#[derive(Debug, Clone)]
pub struct ConflictDetector {
    stores: PlanningStores,
    thresholds: SeverityThresholds,
    dedupe_window: Option<Duration>,
}

impl ConflictDetector {
    pub fn new(stores: PlanningStores, config: &PlannerConfig) -> Self {
        Self {
            stores,
            thresholds: config.severity_thresholds(),
            dedupe_window: config.dedupe_window,
        }
    }

    pub fn thresholds(&self) -> &SeverityThresholds {
        &self.thresholds
    }

    /// Classify the team's current ledger without recording anything.
    pub fn assess(&self, team: &Team) -> Option<Overallocation> {
        self.assess_load(team.capacity(), team.current_workload())
    }

    pub fn assess_load(&self, capacity: u32, load: u32) -> Option<Overallocation> {
        Overallocation::assess(capacity, load, &self.thresholds)
    }

    /// Best-effort detection: failures are logged and yield no findings.
    ///
    /// `window` is the period the caller was working on; the check itself
    /// looks at the team's whole current workload.
    pub fn detect(&self, team_id: TeamId, window: &DateRange) -> Vec<ResourceConflict> {
        match self.try_detect(team_id, window) {
            Ok(found) => found,
            Err(err) => {
                warn!(team_id = %team_id, error = %err, "conflict detection failed");
                Vec::new()
            }
        }
    }

    /// Detection with errors surfaced.
    pub fn try_detect(
        &self,
        team_id: TeamId,
        _window: &DateRange,
    ) -> PlanningResult<Vec<ResourceConflict>> {
        let team = self
            .stores
            .teams
            .get(team_id)?
            .ok_or_else(|| PlanningError::not_found(format!("team {team_id}")))?;

        let Some(finding) = self.assess(&team) else {
            return Ok(Vec::new());
        };

        let now = Utc::now();
        if let Some(window) = self.dedupe_window {
            let previous = self
                .stores
                .conflicts
                .latest_for_team(team_id, ConflictType::Overallocation)?;
            if let Some(previous) = previous {
                if previous.severity == finding.severity && now - previous.detected_at < window {
                    debug!(
                        team_id = %team_id,
                        "overallocation already recorded within dedupe window"
                    );
                    return Ok(Vec::new());
                }
            }
        }

        let affected_initiatives = self
            .stores
            .assignments
            .list_for_team(team_id)?
            .into_iter()
            .map(|a| a.initiative_id)
            .collect();

        let conflict = ResourceConflict::overallocation(
            team_id,
            team.name(),
            &finding,
            affected_initiatives,
            now,
        );
        self.stores.conflicts.append(conflict.clone())?;

        info!(
            team_id = %team_id,
            severity = ?finding.severity,
            overallocated = finding.amount,
            percentage = ?finding.percentage,
            "overallocation recorded"
        );
        Ok(vec![conflict])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use chrono::NaiveDate;
    use crewplan_allocation::{Severity, TeamAssignment};
    use crewplan_core::{AggregateId, EntityId};
    use crewplan_infra::{ConflictStore, StoreError, StoreResult};
    use crewplan_roadmap::InitiativeId;
    use crewplan_teams::{CommitWorkload, RegisterTeam, TeamCommand};

    fn window() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        )
        .unwrap()
    }

    fn team_with_load(stores: &PlanningStores, capacity: u32, workload: u32) -> TeamId {
        let team_id = TeamId::new(AggregateId::new());
        stores
            .teams
            .execute(&TeamCommand::RegisterTeam(RegisterTeam {
                team_id,
                name: "Payments".to_string(),
                capacity,
                skills: BTreeSet::new(),
                occurred_at: Utc::now(),
            }))
            .unwrap();
        if workload > 0 {
            stores
                .teams
                .execute(&TeamCommand::CommitWorkload(CommitWorkload {
                    team_id,
                    assignment_id: EntityId::new(),
                    amount: workload,
                    occurred_at: Utc::now(),
                }))
                .unwrap();
        }
        team_id
    }

    fn detector(stores: &PlanningStores) -> ConflictDetector {
        ConflictDetector::new(stores.clone(), &PlannerConfig::default())
    }

    #[test]
    fn thirty_units_over_a_hundred_is_one_high_conflict() {
        let stores = PlanningStores::in_memory();
        let team_id = team_with_load(&stores, 100, 130);

        let found = detector(&stores).detect(team_id, &window());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity, Severity::High);
        assert_eq!(found[0].conflict_type, ConflictType::Overallocation);
        assert_eq!(found[0].affected_teams, vec![team_id]);
        assert!(found[0].description.contains("30 units"));

        let team = stores.teams.get(team_id).unwrap().unwrap();
        assert_eq!(detector(&stores).assess(&team).unwrap().amount, 30);
        assert_eq!(stores.conflicts.list().unwrap().len(), 1);
    }

    #[test]
    fn low_and_medium_bands() {
        let stores = PlanningStores::in_memory();
        let low = team_with_load(&stores, 100, 108);
        let medium = team_with_load(&stores, 100, 115);
        let d = detector(&stores);
        assert_eq!(d.detect(low, &window())[0].severity, Severity::Low);
        assert_eq!(d.detect(medium, &window())[0].severity, Severity::Medium);
    }

    #[test]
    fn within_capacity_records_nothing() {
        let stores = PlanningStores::in_memory();
        let team_id = team_with_load(&stores, 100, 100);
        assert!(detector(&stores).detect(team_id, &window()).is_empty());
        assert!(stores.conflicts.list().unwrap().is_empty());
    }

    #[test]
    fn repeated_detection_appends_repeated_rows() {
        let stores = PlanningStores::in_memory();
        let team_id = team_with_load(&stores, 100, 130);
        let d = detector(&stores);
        d.detect(team_id, &window());
        d.detect(team_id, &window());
        assert_eq!(stores.conflicts.list().unwrap().len(), 2);
    }

    #[test]
    fn dedupe_window_suppresses_repeats_of_same_severity() {
        let stores = PlanningStores::in_memory();
        let team_id = team_with_load(&stores, 100, 130);
        let config = PlannerConfig::default().with_dedupe_window(Duration::minutes(10));
        let d = ConflictDetector::new(stores.clone(), &config);
        assert_eq!(d.detect(team_id, &window()).len(), 1);
        assert!(d.detect(team_id, &window()).is_empty());
        assert_eq!(stores.conflicts.list().unwrap().len(), 1);
    }

    #[test]
    fn affected_initiatives_are_all_team_assignments() {
        let stores = PlanningStores::in_memory();
        let team_id = team_with_load(&stores, 10, 40);
        let a = InitiativeId::generate();
        let b = InitiativeId::generate();
        for initiative_id in [a, b] {
            stores
                .assignments
                .insert(TeamAssignment::new(
                    initiative_id,
                    team_id,
                    crewplan_allocation::Allocation::new(20).unwrap(),
                    window(),
                    crewplan_allocation::AssignmentRole::Supporting,
                    Utc::now(),
                ))
                .unwrap();
        }
        let found = detector(&stores).detect(team_id, &window());
        assert_eq!(found[0].affected_initiatives, vec![a, b]);
    }

    #[test]
    fn unknown_team_yields_empty_result() {
        let stores = PlanningStores::in_memory();
        let d = detector(&stores);
        let missing = TeamId::new(AggregateId::new());
        assert!(d.detect(missing, &window()).is_empty());
        assert!(matches!(
            d.try_detect(missing, &window()),
            Err(PlanningError::NotFound(_))
        ));
    }

    struct BrokenConflictStore;

    impl ConflictStore for BrokenConflictStore {
        fn append(&self, _conflict: ResourceConflict) -> StoreResult<()> {
            Err(StoreError::Storage("disk full".to_string()))
        }

        fn list(&self) -> StoreResult<Vec<ResourceConflict>> {
            Ok(Vec::new())
        }

        fn latest_for_team(
            &self,
            _team_id: TeamId,
            _conflict_type: ConflictType,
        ) -> StoreResult<Option<ResourceConflict>> {
            Ok(None)
        }
    }

    #[test]
    fn storage_failure_is_swallowed() {
        let stores = PlanningStores::in_memory().with_conflicts(Arc::new(BrokenConflictStore));
        let team_id = team_with_load(&stores, 100, 150);
        let d = detector(&stores);
        assert!(d.detect(team_id, &window()).is_empty());
        assert!(matches!(
            d.try_detect(team_id, &window()),
            Err(PlanningError::Storage(_))
        ));
    }
}
