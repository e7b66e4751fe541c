use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crewplan_core::{Entity, EntityId, typed_id};
use crewplan_roadmap::InitiativeId;
use crewplan_teams::TeamId;

typed_id!(
    /// Resource conflict identifier.
    ConflictId,
    EntityId
);

/// Kind of resource problem.
///
/// Only `Overallocation` is produced today; the other kinds are part of the
/// persisted vocabulary but have no detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    Overallocation,
    SkillGap,
    TimelineConflict,
}

/// Ordered so that `High > Medium > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Percentage bounds separating severities (strictly greater than).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityThresholds {
    pub high_pct: u32,
    pub medium_pct: u32,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            high_pct: 20,
            medium_pct: 10,
        }
    }
}

impl SeverityThresholds {
    pub fn classify(&self, percentage: u32) -> Severity {
        if percentage > self.high_pct {
            Severity::High
        } else if percentage > self.medium_pct {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

/// Outcome of comparing a load against a capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overallocation {
    pub capacity: u32,
    pub load: u32,
    /// `load - capacity`.
    pub amount: u32,
    /// `round(amount / capacity * 100)`; `None` when capacity is zero.
    pub percentage: Option<u32>,
    pub severity: Severity,
}

impl Overallocation {
    /// Returns `None` unless `load > capacity`.
    ///
    /// A zero-capacity team carrying any load is always `High`.
    pub fn assess(capacity: u32, load: u32, thresholds: &SeverityThresholds) -> Option<Self> {
        if load <= capacity {
            return None;
        }
        let amount = load - capacity;
        let percentage = (capacity > 0)
            .then(|| (f64::from(amount) / f64::from(capacity) * 100.0).round() as u32);
        let severity = percentage.map_or(Severity::High, |pct| thresholds.classify(pct));
        Some(Self {
            capacity,
            load,
            amount,
            percentage,
            severity,
        })
    }

    pub fn describe(&self, team_name: &str) -> String {
        match self.percentage {
            Some(pct) => format!(
                "Team {team_name} is overallocated by {pct}% ({} units over a capacity of {})",
                self.amount, self.capacity
            ),
            None => format!(
                "Team {team_name} has {} units of workload but no capacity",
                self.amount
            ),
        }
    }

    pub fn suggested_resolution(&self) -> &'static str {
        match self.severity {
            Severity::High => {
                "Reassign or defer initiatives from this team, or add members, \
                 to bring workload back within capacity"
            }
            Severity::Medium => {
                "Reduce allocations on lower-priority initiatives or extend their timelines"
            }
            Severity::Low => {
                "Monitor the team's workload; a small allocation adjustment should resolve it"
            }
        }
    }
}

/// Append-only record of a detected resource problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceConflict {
    pub id: ConflictId,
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    pub severity: Severity,
    pub description: String,
    pub affected_teams: Vec<TeamId>,
    pub affected_initiatives: Vec<InitiativeId>,
    pub suggested_resolution: String,
    pub detected_at: DateTime<Utc>,
}

impl ResourceConflict {
    pub fn overallocation(
        team_id: TeamId,
        team_name: &str,
        finding: &Overallocation,
        affected_initiatives: Vec<InitiativeId>,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ConflictId::generate(),
            conflict_type: ConflictType::Overallocation,
            severity: finding.severity,
            description: finding.describe(team_name),
            affected_teams: vec![team_id],
            affected_initiatives,
            suggested_resolution: finding.suggested_resolution().to_string(),
            detected_at,
        }
    }

    pub fn affects_team(&self, team_id: TeamId) -> bool {
        self.affected_teams.contains(&team_id)
    }
}

impl Entity for ResourceConflict {
    type Id = ConflictId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
