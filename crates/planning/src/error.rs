//! Errors surfaced to callers of the planning core.

use thiserror::Error;

use crewplan_core::DomainError;
use crewplan_infra::StoreError;

pub type PlanningResult<T> = Result<T, PlanningError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanningError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl PlanningError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

impl From<DomainError> for PlanningError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::Validation(msg),
            DomainError::InvalidId(msg) => Self::Validation(msg),
            DomainError::InvariantViolation(msg) => Self::Invariant(msg),
            DomainError::NotFound(what) => Self::NotFound(what),
            DomainError::Duplicate(what) => Self::Duplicate(what),
            DomainError::Conflict(msg) => Self::Conflict(msg),
        }
    }
}

impl From<StoreError> for PlanningError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => Self::NotFound(what),
            StoreError::Duplicate(what) => Self::Duplicate(what),
            StoreError::Rejected(domain) => domain.into(),
            StoreError::Storage(msg) => Self::Storage(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_commands_keep_their_domain_kind() {
        let err: PlanningError = StoreError::Rejected(DomainError::not_found("team x")).into();
        assert_eq!(err, PlanningError::NotFound("team x".to_string()));

        let err: PlanningError = StoreError::duplicate("pair").into();
        assert!(matches!(err, PlanningError::Duplicate(_)));
    }
}
