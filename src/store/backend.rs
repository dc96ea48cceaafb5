//! Store backend abstraction and helpers.
//!
//! The `StoreBackend` trait provides a common interface that the CLI
//! and HTTP handlers use without depending on concrete
//! implementations. Two backends ship: SQLite (filter pushdown) and a
//! flat JSON file (load-then-scan with file locking). Selecting one
//! over the other changes only the `list` evaluation strategy and
//! durability characteristics, never the logical result set.

use std::path::Path;

use tracing::debug;

use crate::models::{BackendSelection, Filter, Record, StoreBackendKind, StoreConfig};
use crate::store::error::StoreResult;
use crate::store::{FlatStore, SqliteStore};

/// Pluggable storage backend over the record collection.
pub trait StoreBackend {
    /// Kind of backend implementation.
    fn kind(&self) -> StoreBackendKind;

    /// Location of the on-disk store.
    fn store_path(&self) -> &Path;

    /// Analyze and persist a new value. Fails with `Conflict` when a
    /// record for the value already exists.
    fn create(&mut self, value: &str) -> StoreResult<Record>;

    /// Fetch a record by value. Fails with `NotFound` when absent.
    fn get(&self, value: &str) -> StoreResult<Record>;

    /// Remove a record by value, permanently. Fails with `NotFound`
    /// when absent.
    fn delete(&mut self, value: &str) -> StoreResult<()>;

    /// Return every record satisfying the filter, in store iteration
    /// order. An empty result is not an error.
    fn list(&self, filter: &Filter) -> StoreResult<Vec<Record>>;
}

/// Construct the configured backend from a store config.
///
/// `Auto` probes the SQLite engine at the configured path and falls
/// back to the flat store when it cannot be opened there.
pub fn open_backend(config: &StoreConfig) -> StoreResult<Box<dyn StoreBackend>> {
    match config.backend {
        BackendSelection::Sqlite => Ok(Box::new(SqliteStore::open(&config.path)?)),
        BackendSelection::Flat => Ok(Box::new(FlatStore::open(&config.path)?)),
        BackendSelection::Auto => match SqliteStore::open(&config.path) {
            Ok(store) => Ok(Box::new(store)),
            Err(err) => {
                debug!(
                    path = %config.path.display(),
                    error = %err,
                    "sqlite store unavailable, falling back to flat store"
                );
                Ok(Box::new(FlatStore::open(&config.path)?))
            }
        },
    }
}
