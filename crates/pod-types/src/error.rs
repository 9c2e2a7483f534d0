use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid identifier {value:?}: {reason}")]
    InvalidIdentifier { value: String, reason: String },

    #[error("expected at most one value for {predicate}, found {count}")]
    MultipleValues { predicate: String, count: usize },

    #[error("invalid date: {0}")]
    InvalidDate(String),
}
