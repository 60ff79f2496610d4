use std::result::Result as StdResult;

use thiserror::Error;

use crate::domain::CategoryId;

/// Bad input shape or value rejected at a write boundary.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("amount must be a positive number, got {0}")]
    InvalidAmount(f64),
    #[error("limit must be a positive number, got {0}")]
    InvalidLimit(f64),
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("unknown category `{0}`")]
    UnknownCategory(CategoryId),
}

/// Write rejected because it would break a uniqueness or referential rule.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConflictError {
    #[error("category `{0}` already exists")]
    DuplicateCategory(CategoryId),
    #[error("category `{id}` is referenced by {references} transaction(s)")]
    CategoryInUse { id: CategoryId, references: usize },
    #[error("category `{0}` is reserved")]
    ProtectedCategory(CategoryId),
    #[error("no transaction id is left to assign")]
    TransactionIdsExhausted,
}

/// Failure reported by a persistence adapter.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Unified error type returned by ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    #[error("Persistence error: {0}")]
    Storage(#[from] StorageError),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LedgerError {
    pub fn is_validation(&self) -> bool {
        matches!(self, LedgerError::Validation(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, LedgerError::Conflict(_))
    }
}

pub type Result<T> = StdResult<T, LedgerError>;
