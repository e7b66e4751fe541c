//! Roadmap timeline analysis.
//!
//! The "critical path" here is a ranking by dependency count. Dependency ids
//! are never resolved into a graph.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crewplan_infra::PlanningStores;
use crewplan_roadmap::{InitiativeId, Priority, RoadmapItem, RoadmapItemId, RoadmapStatus};
use crewplan_teams::TeamId;

use crate::config::PlannerConfig;
use crate::error::PlanningResult;

/// Optional narrowing of the analyzed items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimelineFilter {
    /// Only items whose initiative has an assignment on this team.
    pub team_id: Option<TeamId>,
    /// Only items starting on or after this day.
    pub start_date: Option<NaiveDate>,
    /// Only items ending on or before this day.
    pub end_date: Option<NaiveDate>,
}

impl TimelineFilter {
    pub fn for_team(team_id: TeamId) -> Self {
        Self {
            team_id: Some(team_id),
            ..Self::default()
        }
    }

    pub fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    fn admits_dates(&self, item: &RoadmapItem) -> bool {
        self.start_date.is_none_or(|start| item.start_date() >= start)
            && self.end_date.is_none_or(|end| item.end_date() <= end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    TightTimeline,
    HighDependencies,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskImpact {
    Medium,
    High,
}

/// Thresholds for risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskRules {
    /// `tight_timeline` applies below this many days...
    pub tight_timeline_days: i64,
    /// ...when the estimated effort is above this.
    pub tight_timeline_effort: u32,
    /// `high_dependencies` applies above this many dependencies.
    pub high_dependency_count: usize,
}

impl Default for RiskRules {
    fn default() -> Self {
        PlannerConfig::default().risk_rules()
    }
}

impl RiskRules {
    pub fn factors(&self, item: &RoadmapItem) -> Vec<RiskFactor> {
        let mut factors = Vec::new();
        if item.duration_days() < self.tight_timeline_days
            && item.estimated_effort > self.tight_timeline_effort
        {
            factors.push(RiskFactor::TightTimeline);
        }
        if item.dependency_count() > self.high_dependency_count {
            factors.push(RiskFactor::HighDependencies);
        }
        factors
    }

    /// `None` when the item has no risk factor.
    pub fn assess(&self, item: &RoadmapItem) -> Option<RiskyItem> {
        let risk_factors = self.factors(item);
        let impact = match risk_factors.len() {
            0 => return None,
            1 => RiskImpact::Medium,
            _ => RiskImpact::High,
        };
        Some(RiskyItem {
            item_id: item.id,
            initiative_id: item.initiative_id,
            risk_factors,
            impact,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalPathEntry {
    pub item_id: RoadmapItemId,
    pub initiative_id: InitiativeId,
    pub dependency_count: usize,
    pub status: RoadmapStatus,
    pub priority: Priority,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl From<&RoadmapItem> for CriticalPathEntry {
    fn from(item: &RoadmapItem) -> Self {
        Self {
            item_id: item.id,
            initiative_id: item.initiative_id,
            dependency_count: item.dependency_count(),
            status: item.status,
            priority: item.priority,
            start_date: item.start_date(),
            end_date: item.end_date(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskyItem {
    pub item_id: RoadmapItemId,
    pub initiative_id: InitiativeId,
    pub risk_factors: Vec<RiskFactor>,
    pub impact: RiskImpact,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineAnalysis {
    pub total_initiatives: usize,
    pub completed_initiatives: usize,
    pub in_progress_initiatives: usize,
    pub planned_initiatives: usize,
    pub on_hold_initiatives: usize,
    /// Completed share in percent; 0 when there are no items.
    pub overall_progress: f64,
    pub critical_path: Vec<CriticalPathEntry>,
    pub risky_items: Vec<RiskyItem>,
}

/// Items ordered by dependency count, most first. Ties keep input order.
pub fn rank_by_dependency_count(items: &[RoadmapItem], len: usize) -> Vec<CriticalPathEntry> {
    let mut ranked: Vec<&RoadmapItem> = items.iter().collect();
    ranked.sort_by(|a, b| b.dependency_count().cmp(&a.dependency_count()));
    ranked
        .into_iter()
        .take(len)
        .map(CriticalPathEntry::from)
        .collect()
}

/// Pure analysis over an already filtered item list.
pub fn summarize(
    items: &[RoadmapItem],
    critical_path_len: usize,
    rules: &RiskRules,
) -> TimelineAnalysis {
    let count = |status: RoadmapStatus| items.iter().filter(|i| i.status == status).count();

    let total = items.len();
    let completed = count(RoadmapStatus::Completed);
    let overall_progress = if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    };

    TimelineAnalysis {
        total_initiatives: total,
        completed_initiatives: completed,
        in_progress_initiatives: count(RoadmapStatus::InProgress),
        planned_initiatives: count(RoadmapStatus::Planned),
        on_hold_initiatives: count(RoadmapStatus::OnHold),
        overall_progress,
        critical_path: rank_by_dependency_count(items, critical_path_len),
        risky_items: items.iter().filter_map(|i| rules.assess(i)).collect(),
    }
}

/// Reads roadmap items and assignments to produce a `TimelineAnalysis`.
#[derive(Debug, Clone)]
pub struct TimelineAnalyzer {
    stores: PlanningStores,
    critical_path_len: usize,
    rules: RiskRules,
}

impl TimelineAnalyzer {
    pub fn new(stores: PlanningStores, config: &PlannerConfig) -> Self {
        Self {
            stores,
            critical_path_len: config.critical_path_len,
            rules: config.risk_rules(),
        }
    }

    pub fn analyze(&self, filter: &TimelineFilter) -> PlanningResult<TimelineAnalysis> {
        let mut items = self.stores.roadmap.list_items()?;

        if let Some(team_id) = filter.team_id {
            let assigned: HashSet<InitiativeId> = self
                .stores
                .assignments
                .list_for_team(team_id)?
                .into_iter()
                .map(|a| a.initiative_id)
                .collect();
            items.retain(|item| assigned.contains(&item.initiative_id));
        }
        items.retain(|item| filter.admits_dates(item));

        let analysis = summarize(&items, self.critical_path_len, &self.rules);
        debug!(
            items = analysis.total_initiatives,
            risky = analysis.risky_items.len(),
            progress = analysis.overall_progress,
            "timeline analyzed"
        );
        Ok(analysis)
    }
}
