use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crewplan_core::{DomainError, DomainResult, Entity, EntityId, typed_id};

use crate::team::TeamId;

typed_id!(
    /// Team member identifier.
    MemberId,
    EntityId
);

/// A person contributing capacity to exactly one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: MemberId,
    pub team_id: TeamId,
    pub name: String,
    pub capacity: u32,
    pub skills: BTreeSet<String>,
}

impl TeamMember {
    pub fn new(team_id: TeamId, name: impl Into<String>, capacity: u32) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("member name cannot be empty"));
        }
        Ok(Self {
            id: MemberId::generate(),
            team_id,
            name: name.trim().to_string(),
            capacity,
            skills: BTreeSet::new(),
        })
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }
}

impl Entity for TeamMember {
    type Id = MemberId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crewplan_core::AggregateId;

    #[test]
    fn new_member_trims_name_and_collects_skills() {
        let team_id = TeamId::new(AggregateId::new());
        let member = TeamMember::new(team_id, "  Ada ", 40)
            .unwrap()
            .with_skills(["rust", "sql", "rust"]);
        assert_eq!(member.name, "Ada");
        assert_eq!(member.team_id, team_id);
        assert_eq!(member.skills.len(), 2);
    }

    #[test]
    fn empty_name_is_rejected() {
        let team_id = TeamId::new(AggregateId::new());
        assert!(matches!(
            TeamMember::new(team_id, "", 10),
            Err(DomainError::Validation(_))
        ));
    }
}
