//! Storage error model.

use thiserror::Error;

/// Result type used across the persistence layer.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence-level error.
///
/// These are infrastructure failures (statement errors, missing rows) as
/// opposed to domain errors (validation, stock invariants). Nothing here is
/// retried; every failure propagates to the caller as-is.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying store unreachable or statement failure.
    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),

    /// No row matched the given identifier (zero rows affected).
    #[error("row not found")]
    RowNotFound,

    /// `update_fields` was called with nothing to update (usage error).
    #[error("no fields supplied for update")]
    EmptyUpdate,

    /// The store refused the call (used by in-memory doubles to inject
    /// failures).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
