use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crewplan_core::{DomainError, DomainResult, Entity, EntityId, ValueObject, typed_id};
use crewplan_roadmap::{DateRange, InitiativeId};
use crewplan_teams::TeamId;

typed_id!(
    /// Team assignment identifier.
    AssignmentId,
    EntityId
);

/// Share of a team's capacity committed to one initiative, in `0..=100`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Allocation(u8);

impl ValueObject for Allocation {}

impl Allocation {
    pub const MAX: u32 = 100;

    pub fn new(value: u32) -> DomainResult<Self> {
        if value > Self::MAX {
            return Err(DomainError::validation(format!(
                "allocated capacity must be within 0..={}, got {value}",
                Self::MAX
            )));
        }
        Ok(Self(value as u8))
    }

    pub fn value(self) -> u32 {
        u32::from(self.0)
    }
}

impl TryFrom<u32> for Allocation {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Allocation> for u32 {
    fn from(value: Allocation) -> Self {
        value.value()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentRole {
    Primary,
    Supporting,
}

/// A team committed to an initiative for a date range.
///
/// There is at most one assignment per `(initiative_id, team_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamAssignment {
    pub id: AssignmentId,
    pub initiative_id: InitiativeId,
    pub team_id: TeamId,
    pub allocated_capacity: Allocation,
    #[serde(flatten)]
    pub schedule: DateRange,
    pub role: AssignmentRole,
    pub created_at: DateTime<Utc>,
}

impl TeamAssignment {
    pub fn new(
        initiative_id: InitiativeId,
        team_id: TeamId,
        allocated_capacity: Allocation,
        schedule: DateRange,
        role: AssignmentRole,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AssignmentId::generate(),
            initiative_id,
            team_id,
            allocated_capacity,
            schedule,
            role,
            created_at,
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        self.schedule.start()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.schedule.end()
    }

    /// Whether the assignment is active at any point of `window`.
    pub fn is_active_during(&self, window: &DateRange) -> bool {
        self.schedule.overlaps(window)
    }

    pub fn key(&self) -> (InitiativeId, TeamId) {
        (self.initiative_id, self.team_id)
    }
}

impl Entity for TeamAssignment {
    type Id = AssignmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
