//! Weekly capacity projection and recommendations.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crewplan_allocation::{Overallocation, Severity, TeamAssignment};
use crewplan_infra::PlanningStores;
use crewplan_roadmap::DateRange;
use crewplan_teams::{Team, TeamId};

use crate::config::PlannerConfig;
use crate::conflicts::ConflictDetector;
use crate::error::{PlanningError, PlanningResult};

/// One team's share of a projected week.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamWeekCapacity {
    pub team_id: TeamId,
    pub team_name: String,
    pub total_capacity: u32,
    /// Sum of allocations whose schedule intersects the week.
    pub allocated_capacity: u32,
    pub available_capacity: i64,
    /// `allocated / total`; 0 when the team has no capacity.
    pub utilization_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyCapacity {
    pub week_start: NaiveDate,
    /// Last day of the week, clipped at the projection end.
    pub week_end: NaiveDate,
    pub total_capacity: u64,
    pub allocated_capacity: u64,
    pub available_capacity: i64,
    pub utilization_rate: f64,
    pub teams: Vec<TeamWeekCapacity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    /// The team is overallocated right now.
    Rebalance,
    /// Some projected week overallocates the team.
    ProjectedOverload,
    /// The team's busiest week stays under the underutilization threshold.
    SpareCapacity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub severity: Severity,
    pub team_id: TeamId,
    pub team_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_start: Option<NaiveDate>,
    pub message: String,
    pub suggested_action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityProjection {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub weeks: Vec<WeeklyCapacity>,
    pub recommendations: Vec<Recommendation>,
}

fn rate(allocated: f64, total: f64) -> f64 {
    if total == 0.0 { 0.0 } else { allocated / total }
}

/// Projects assignment load over a date range in fixed-width buckets.
#[derive(Debug, Clone)]
pub struct CapacityProjector {
    stores: PlanningStores,
    detector: ConflictDetector,
    step_days: u32,
    max_recommendations: usize,
    underutilization_pct: u32,
}

impl CapacityProjector {
    pub fn new(stores: PlanningStores, detector: ConflictDetector, config: &PlannerConfig) -> Self {
        Self {
            stores,
            detector,
            step_days: config.projection_step_days.max(1),
            max_recommendations: config.max_recommendations,
            underutilization_pct: config.underutilization_pct,
        }
    }

    /// Project `[start, end]` for the given teams (all teams when `None`).
    ///
    /// Unknown team ids fail with `NotFound`. A reversed range yields no
    /// weeks; current-ledger recommendations are still produced.
    pub fn project(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        team_ids: Option<&[TeamId]>,
    ) -> PlanningResult<CapacityProjection> {
        let teams = self.load_teams(team_ids)?;
        let mut loads: Vec<(Team, Vec<TeamAssignment>)> = Vec::with_capacity(teams.len());
        for team in teams {
            let assignments = self.stores.assignments.list_for_team(team.id_typed())?;
            loads.push((team, assignments));
        }

        let buckets = if start > end {
            Vec::new()
        } else {
            DateRange::new(start, end)?.buckets(self.step_days)
        };
        let weeks: Vec<WeeklyCapacity> = buckets
            .iter()
            .map(|bucket| project_week(bucket, &loads))
            .collect();

        let recommendations = self.recommend(&loads, &weeks);
        debug!(
            teams = loads.len(),
            weeks = weeks.len(),
            recommendations = recommendations.len(),
            "capacity projected"
        );

        Ok(CapacityProjection {
            start_date: start,
            end_date: end,
            weeks,
            recommendations,
        })
    }

    fn load_teams(&self, team_ids: Option<&[TeamId]>) -> PlanningResult<Vec<Team>> {
        let Some(ids) = team_ids else {
            return Ok(self.stores.teams.list()?);
        };
        ids.iter()
            .map(|team_id| {
                self.stores
                    .teams
                    .get(*team_id)?
                    .ok_or_else(|| PlanningError::not_found(format!("team {team_id}")))
            })
            .collect()
    }

    fn recommend(
        &self,
        loads: &[(Team, Vec<TeamAssignment>)],
        weeks: &[WeeklyCapacity],
    ) -> Vec<Recommendation> {
        let mut out = Vec::new();

        for (index, (team, _)) in loads.iter().enumerate() {
            if let Some(finding) = self.detector.assess(team) {
                out.push(Recommendation {
                    kind: RecommendationKind::Rebalance,
                    severity: finding.severity,
                    team_id: team.id_typed(),
                    team_name: team.name().to_string(),
                    week_start: None,
                    message: finding.describe(team.name()),
                    suggested_action: finding.suggested_resolution().to_string(),
                });
            }

            let team_weeks = weeks.iter().filter_map(|w| w.teams.get(index).map(|t| (w, t)));

            let mut worst: Option<(NaiveDate, Overallocation)> = None;
            let mut peak_rate = 0.0_f64;
            for (week, share) in team_weeks {
                peak_rate = peak_rate.max(share.utilization_rate);
                if let Some(finding) = self
                    .detector
                    .assess_load(share.total_capacity, share.allocated_capacity)
                {
                    if worst.is_none_or(|(_, w)| finding.amount > w.amount) {
                        worst = Some((week.week_start, finding));
                    }
                }
            }

            if let Some((week_start, finding)) = worst {
                out.push(Recommendation {
                    kind: RecommendationKind::ProjectedOverload,
                    severity: finding.severity,
                    team_id: team.id_typed(),
                    team_name: team.name().to_string(),
                    week_start: Some(week_start),
                    message: format!(
                        "Team {} is projected to carry {} units against a capacity of {} \
                         in the week of {week_start}",
                        team.name(),
                        finding.load,
                        finding.capacity
                    ),
                    suggested_action: finding.suggested_resolution().to_string(),
                });
            } else if !weeks.is_empty()
                && team.capacity() > 0
                && peak_rate * 100.0 < f64::from(self.underutilization_pct)
            {
                out.push(Recommendation {
                    kind: RecommendationKind::SpareCapacity,
                    severity: Severity::Low,
                    team_id: team.id_typed(),
                    team_name: team.name().to_string(),
                    week_start: None,
                    message: format!(
                        "Team {} peaks at {:.0}% utilization over the projected period",
                        team.name(),
                        peak_rate * 100.0
                    ),
                    suggested_action: "Consider assigning additional initiatives to this team"
                        .to_string(),
                });
            }
        }

        out.sort_by(|a, b| b.severity.cmp(&a.severity));
        out.truncate(self.max_recommendations);
        out
    }
}

fn project_week(bucket: &DateRange, loads: &[(Team, Vec<TeamAssignment>)]) -> WeeklyCapacity {
    let teams: Vec<TeamWeekCapacity> = loads
        .iter()
        .map(|(team, assignments)| {
            let allocated: u32 = assignments
                .iter()
                .filter(|a| a.is_active_during(bucket))
                .map(|a| a.allocated_capacity.value())
                .sum();
            TeamWeekCapacity {
                team_id: team.id_typed(),
                team_name: team.name().to_string(),
                total_capacity: team.capacity(),
                allocated_capacity: allocated,
                available_capacity: i64::from(team.capacity()) - i64::from(allocated),
                utilization_rate: rate(f64::from(allocated), f64::from(team.capacity())),
            }
        })
        .collect();

    let total: u64 = teams.iter().map(|t| u64::from(t.total_capacity)).sum();
    let allocated: u64 = teams.iter().map(|t| u64::from(t.allocated_capacity)).sum();

    WeeklyCapacity {
        week_start: bucket.start(),
        week_end: bucket.end(),
        total_capacity: total,
        allocated_capacity: allocated,
        available_capacity: total as i64 - allocated as i64,
        utilization_rate: rate(allocated as f64, total as f64),
        teams,
    }
}
