use std::sync::PoisonError;

use crewplan_core::DomainError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    Duplicate(String),
    /// The aggregate refused the command.
    #[error("command rejected: {0}")]
    Rejected(#[from] DomainError),
    #[error("storage error: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn duplicate(what: impl Into<String>) -> Self {
        Self::Duplicate(what.into())
    }
}

pub(crate) fn lock_poisoned<T>(_: PoisonError<T>) -> StoreError {
    StoreError::Storage("lock poisoned".to_string())
}
