//! Store error taxonomy.
//!
//! The four caller-observable outcomes are kept distinct all the way
//! to the HTTP layer, which maps them onto response statuses. Internal
//! failures (I/O, engine errors) are wrapped rather than flattened so
//! context is preserved in logs.

use thiserror::Error;

/// Errors surfaced by storage backend operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record with the same value already exists.
    #[error("a record for value {value:?} already exists")]
    Conflict { value: String },

    /// No record exists for the requested value.
    #[error("no record found for value {value:?}")]
    NotFound { value: String },

    /// The backend could not be initialized, e.g. an unusable store
    /// path.
    #[error("storage backend unavailable: {reason}")]
    Unavailable { reason: String },

    /// Any other backend failure (I/O, engine, serialization).
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl StoreError {
    pub fn conflict(value: impl Into<String>) -> Self {
        Self::Conflict {
            value: value.into(),
        }
    }

    pub fn not_found(value: impl Into<String>) -> Self {
        Self::NotFound {
            value: value.into(),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Internal(err.into())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.into())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.into())
    }
}

/// Convenience alias used throughout the store layer.
pub type StoreResult<T> = Result<T, StoreError>;
