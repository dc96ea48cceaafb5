//! Storage backends and related types.
//!
//! This module defines the pluggable backend abstraction used by the
//! CLI subcommands and the HTTP daemon: a SQLite backend that pushes
//! filter evaluation into the engine, and a flat JSON-file backend
//! that scans an in-memory snapshot. Both share the record model and
//! the filter semantics defined in `crate::query`, so they are
//! drop-in substitutable.

mod backend;
pub mod error;
mod flat;
mod sqlite;

pub use backend::{open_backend, StoreBackend};
pub use error::{StoreError, StoreResult};
pub use flat::FlatStore;
pub use sqlite::SqliteStore;

use std::time::{SystemTime, UNIX_EPOCH};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Current UTC time as an ISO-8601 string with second precision and a
/// `Z` suffix, the format persisted in `Record.created_at`.
pub(crate) fn current_timestamp() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0) as i64;

    // Whole seconds only, so Rfc3339 renders without a fractional
    // component and with the `Z` suffix.
    let dt = OffsetDateTime::from_unix_timestamp(secs)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH);
    dt.format(&Rfc3339)
        .unwrap_or_else(|_| dt.unix_timestamp().to_string())
}
