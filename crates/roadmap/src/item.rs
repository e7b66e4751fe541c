use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crewplan_core::{AggregateId, Entity, typed_id};

use crate::initiative::InitiativeId;
use crate::schedule::DateRange;

typed_id!(
    /// Roadmap item identifier.
    RoadmapItemId,
    AggregateId
);

/// Delivery status of a roadmap item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadmapStatus {
    Planned,
    InProgress,
    Completed,
    OnHold,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// Scheduling record for exactly one initiative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapItem {
    pub id: RoadmapItemId,
    pub initiative_id: InitiativeId,
    #[serde(flatten)]
    pub schedule: DateRange,
    pub status: RoadmapStatus,
    pub priority: Priority,
    /// Ids of roadmap items this one depends on.
    pub dependencies: Vec<RoadmapItemId>,
    pub estimated_effort: u32,
}

impl RoadmapItem {
    /// New `planned` item with medium priority, no dependencies and no effort estimate.
    pub fn new(initiative_id: InitiativeId, schedule: DateRange) -> Self {
        Self {
            id: RoadmapItemId::generate(),
            initiative_id,
            schedule,
            status: RoadmapStatus::Planned,
            priority: Priority::default(),
            dependencies: Vec::new(),
            estimated_effort: 0,
        }
    }

    pub fn with_status(mut self, status: RoadmapStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_dependencies(mut self, dependencies: Vec<RoadmapItemId>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn with_estimated_effort(mut self, effort: u32) -> Self {
        self.estimated_effort = effort;
        self
    }

    pub fn start_date(&self) -> NaiveDate {
        self.schedule.start()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.schedule.end()
    }

    pub fn duration_days(&self) -> i64 {
        self.schedule.duration_days()
    }

    pub fn dependency_count(&self) -> usize {
        self.dependencies.len()
    }
}

impl Entity for RoadmapItem {
    type Id = RoadmapItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_as_snake_case() {
        let json = serde_json::to_string(&RoadmapStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let parsed: RoadmapStatus = serde_json::from_str("\"on_hold\"").unwrap();
        assert_eq!(parsed, RoadmapStatus::OnHold);
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(serde_json::from_str::<RoadmapStatus>("\"paused\"").is_err());
    }

    #[test]
    fn new_item_defaults() {
        let start = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap();
        let item = RoadmapItem::new(InitiativeId::generate(), DateRange::new(start, end).unwrap());
        assert_eq!(item.status, RoadmapStatus::Planned);
        assert_eq!(item.priority, Priority::Medium);
        assert_eq!(item.duration_days(), 19);
        assert_eq!(item.dependency_count(), 0);
    }

    #[test]
    fn item_serializes_flat_dates() {
        let start = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap();
        let item = RoadmapItem::new(InitiativeId::generate(), DateRange::new(start, end).unwrap())
            .with_estimated_effort(30);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["startDate"], "2025-05-01");
        assert_eq!(json["endDate"], "2025-05-20");
        assert_eq!(json["estimatedEffort"], 30);
        assert!(json.get("schedule").is_none());
    }
}
