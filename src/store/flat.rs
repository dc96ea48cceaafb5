//! Flat-file store backend.
//!
//! The backend holds the entire collection as one pretty-printed JSON
//! array at a known path. Reads take a shared lock, load the full
//! collection into memory, release the lock, and evaluate the filter
//! in-process. Writes take an exclusive lock, load, mutate, write a
//! `.tmp` sibling, and atomically rename it over the original, so a
//! crash mid-write never leaves a half-written store behind.
//!
//! Locks are taken on a `.lock` sibling rather than the data file
//! itself: the data file's inode is replaced on every write, and a
//! lock on a replaced inode would let a second writer proceed against
//! stale data. Only one lock is ever held at a time and no operation
//! nests acquisitions, so no deadlock is possible.
//!
//! An unreadable or malformed store is treated as an empty collection
//! and logged; corruption is self-healing at the cost of the lost
//! data. Uniqueness on create is a linear scan under the exclusive
//! lock, which is fine for the fallback role this backend plays.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::warn;

use crate::analysis;
use crate::models::{Filter, Record, StoreBackendKind};
use crate::query;
use crate::store::backend::StoreBackend;
use crate::store::error::{StoreError, StoreResult};

/// Flat JSON-file implementation of `StoreBackend`.
#[derive(Debug)]
pub struct FlatStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FlatStore {
    /// Open (or create) a flat store at the given path.
    pub fn open(store_path: &Path) -> StoreResult<Self> {
        if store_path.is_dir() {
            return Err(StoreError::unavailable(format!(
                "flat store path {} is a directory",
                store_path.display()
            )));
        }

        if let Some(parent) = store_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| {
                    StoreError::unavailable(format!(
                        "cannot create store directory {}: {err}",
                        parent.display()
                    ))
                })?;
            }
        }

        let lock_path = store_path.with_extension("json.lock");

        Ok(Self {
            path: store_path.to_path_buf(),
            lock_path,
        })
    }

    fn acquire_shared(&self) -> StoreResult<File> {
        let lock = self.open_lock_file()?;
        lock.lock_shared()?;
        Ok(lock)
    }

    fn acquire_exclusive(&self) -> StoreResult<File> {
        let lock = self.open_lock_file()?;
        lock.lock_exclusive()?;
        Ok(lock)
    }

    fn open_lock_file(&self) -> StoreResult<File> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&self.lock_path)
            .map_err(|err| {
                StoreError::unavailable(format!(
                    "cannot open lock file {}: {err}",
                    self.lock_path.display()
                ))
            })
    }

    /// Load the full collection. The caller must hold a lock.
    ///
    /// Missing files are an empty collection; unreadable or malformed
    /// files are reset to empty and logged rather than failing the
    /// request.
    fn load_collection(&self) -> Vec<Record> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "flat store unreadable, treating collection as empty"
                );
                return Vec::new();
            }
        };

        if contents.trim().is_empty() {
            return Vec::new();
        }

        match serde_json::from_str::<Vec<Record>>(&contents) {
            Ok(records) => records,
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "flat store malformed, treating collection as empty"
                );
                Vec::new()
            }
        }
    }

    /// Persist the collection via a `.tmp` sibling and atomic rename.
    /// The caller must hold the exclusive lock.
    fn persist_collection(&self, records: &[Record]) -> StoreResult<()> {
        let tmp_path = self.path.with_extension("json.tmp");

        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Take an in-memory snapshot of the collection.
    ///
    /// The shared lock is held only while the bytes are read; filter
    /// evaluation always happens on the returned copy.
    fn snapshot(&self) -> StoreResult<Vec<Record>> {
        let lock = self.acquire_shared()?;
        let records = self.load_collection();
        drop(lock);
        Ok(records)
    }
}

impl StoreBackend for FlatStore {
    fn kind(&self) -> StoreBackendKind {
        StoreBackendKind::Flat
    }

    fn store_path(&self) -> &Path {
        &self.path
    }

    fn create(&mut self, value: &str) -> StoreResult<Record> {
        let lock = self.acquire_exclusive()?;
        let mut records = self.load_collection();

        if records.iter().any(|record| record.value == value) {
            drop(lock);
            return Err(StoreError::conflict(value));
        }

        let properties = analysis::analyze(value);
        let record = Record {
            id: properties.hash.clone(),
            value: value.to_string(),
            properties,
            created_at: crate::store::current_timestamp(),
        };

        records.push(record.clone());
        self.persist_collection(&records)?;
        drop(lock);

        Ok(record)
    }

    fn get(&self, value: &str) -> StoreResult<Record> {
        let records = self.snapshot()?;

        records
            .into_iter()
            .find(|record| record.value == value)
            .ok_or_else(|| StoreError::not_found(value))
    }

    fn delete(&mut self, value: &str) -> StoreResult<()> {
        let lock = self.acquire_exclusive()?;
        let mut records = self.load_collection();

        let Some(position) = records.iter().position(|record| record.value == value) else {
            drop(lock);
            return Err(StoreError::not_found(value));
        };

        records.remove(position);
        self.persist_collection(&records)?;
        drop(lock);

        Ok(())
    }

    fn list(&self, filter: &Filter) -> StoreResult<Vec<Record>> {
        let records = self.snapshot()?;
        Ok(query::filter_records(filter, records))
    }
}
