//! Initiative and roadmap item storage.

use std::sync::RwLock;

use crewplan_core::{DomainError, Entity};
use crewplan_roadmap::{Initiative, InitiativeId, RoadmapItem, RoadmapItemId};

use crate::error::{StoreError, StoreResult, lock_poisoned};

/// Initiative/roadmap store. Items keep insertion order.
pub trait RoadmapStore: Send + Sync {
    fn insert_initiative(&self, initiative: Initiative) -> StoreResult<()>;

    fn get_initiative(&self, initiative_id: InitiativeId) -> StoreResult<Option<Initiative>>;

    fn list_initiatives(&self) -> StoreResult<Vec<Initiative>>;

    /// Insert the scheduling record of an existing initiative. Each initiative
    /// has at most one roadmap item.
    fn insert_item(&self, item: RoadmapItem) -> StoreResult<()>;

    fn get_item(&self, item_id: RoadmapItemId) -> StoreResult<Option<RoadmapItem>>;

    fn item_for_initiative(&self, initiative_id: InitiativeId) -> StoreResult<Option<RoadmapItem>>;

    /// Replace a stored item. The item must exist and keep its initiative.
    fn update_item(&self, item: RoadmapItem) -> StoreResult<()>;

    fn list_items(&self) -> StoreResult<Vec<RoadmapItem>>;
}

#[derive(Debug, Default)]
struct RoadmapState {
    initiatives: Vec<Initiative>,
    items: Vec<RoadmapItem>,
}

/// In-memory roadmap store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryRoadmapStore {
    state: RwLock<RoadmapState>,
}

impl InMemoryRoadmapStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoadmapStore for InMemoryRoadmapStore {
    fn insert_initiative(&self, initiative: Initiative) -> StoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.initiatives.iter().any(|i| i.has_id(&initiative.id)) {
            return Err(StoreError::duplicate(format!("initiative {}", initiative.id)));
        }
        state.initiatives.push(initiative);
        Ok(())
    }

    fn get_initiative(&self, initiative_id: InitiativeId) -> StoreResult<Option<Initiative>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state
            .initiatives
            .iter()
            .find(|i| i.has_id(&initiative_id))
            .cloned())
    }

    fn list_initiatives(&self) -> StoreResult<Vec<Initiative>> {
        Ok(self.state.read().map_err(lock_poisoned)?.initiatives.clone())
    }

    fn insert_item(&self, item: RoadmapItem) -> StoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if !state.initiatives.iter().any(|i| i.has_id(&item.initiative_id)) {
            return Err(StoreError::not_found(format!(
                "initiative {}",
                item.initiative_id
            )));
        }
        if state
            .items
            .iter()
            .any(|i| i.has_id(&item.id) || i.initiative_id == item.initiative_id)
        {
            return Err(StoreError::duplicate(format!(
                "roadmap item for initiative {}",
                item.initiative_id
            )));
        }
        state.items.push(item);
        Ok(())
    }

    fn get_item(&self, item_id: RoadmapItemId) -> StoreResult<Option<RoadmapItem>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.items.iter().find(|i| i.has_id(&item_id)).cloned())
    }

    fn item_for_initiative(&self, initiative_id: InitiativeId) -> StoreResult<Option<RoadmapItem>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state
            .items
            .iter()
            .find(|i| i.initiative_id == initiative_id)
            .cloned())
    }

    fn update_item(&self, item: RoadmapItem) -> StoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let existing = state
            .items
            .iter_mut()
            .find(|i| i.has_id(&item.id))
            .ok_or_else(|| StoreError::not_found(format!("roadmap item {}", item.id)))?;
        if existing.initiative_id != item.initiative_id {
            return Err(StoreError::Rejected(DomainError::invariant(
                "roadmap item cannot move to another initiative",
            )));
        }
        *existing = item;
        Ok(())
    }

    fn list_items(&self) -> StoreResult<Vec<RoadmapItem>> {
        Ok(self.state.read().map_err(lock_poisoned)?.items.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crewplan_roadmap::{DateRange, RoadmapStatus};

    fn schedule() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn item_requires_existing_initiative() {
        let store = InMemoryRoadmapStore::new();
        let err = store
            .insert_item(RoadmapItem::new(InitiativeId::generate(), schedule()))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn one_item_per_initiative() {
        let store = InMemoryRoadmapStore::new();
        let initiative = Initiative::new("Billing revamp").unwrap();
        let initiative_id = initiative.id;
        store.insert_initiative(initiative).unwrap();
        store
            .insert_item(RoadmapItem::new(initiative_id, schedule()))
            .unwrap();
        let err = store
            .insert_item(RoadmapItem::new(initiative_id, schedule()))
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[test]
    fn update_replaces_item() {
        let store = InMemoryRoadmapStore::new();
        let initiative = Initiative::new("Search").unwrap();
        let initiative_id = initiative.id;
        store.insert_initiative(initiative).unwrap();
        let item = RoadmapItem::new(initiative_id, schedule());
        store.insert_item(item.clone()).unwrap();

        store
            .update_item(item.clone().with_status(RoadmapStatus::Completed))
            .unwrap();
        let stored = store.item_for_initiative(initiative_id).unwrap().unwrap();
        assert_eq!(stored.status, RoadmapStatus::Completed);
    }
}
