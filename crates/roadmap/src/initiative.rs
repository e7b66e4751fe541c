use serde::{Deserialize, Serialize};

use crewplan_core::{AggregateId, DomainError, DomainResult, Entity, typed_id};

typed_id!(
    /// Initiative identifier.
    InitiativeId,
    AggregateId
);

/// A unit of planned work that teams get assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Initiative {
    pub id: InitiativeId,
    pub title: String,
}

impl Initiative {
    pub fn new(title: impl Into<String>) -> DomainResult<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::validation("initiative title cannot be empty"));
        }
        Ok(Self {
            id: InitiativeId::generate(),
            title: title.trim().to_string(),
        })
    }
}

impl Entity for Initiative {
    type Id = InitiativeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
