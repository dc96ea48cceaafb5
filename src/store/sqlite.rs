//! SQLite-based store backend.
//!
//! The backend stores the record collection in a single SQLite
//! database file with one table:
//!
//! - `records(value TEXT UNIQUE, id TEXT UNIQUE, properties TEXT, created_at TEXT)`
//!
//! `properties` holds the serialized analysis output; filter
//! constraints on boolean/numeric properties are pushed down into the
//! engine as `json_extract` expressions, and the substring constraint
//! becomes an `instr` condition on `value`. The connection is
//! configured with:
//!
//! - `journal_mode = WAL` for concurrent readers and a single writer.
//! - `synchronous = NORMAL` as a balance between safety and speed.
//! - `busy_timeout` to avoid transient `database is locked` errors.
//!
//! The `UNIQUE` constraint on `value` enforces create-uniqueness
//! atomically inside the engine, so concurrent creates for the same
//! value resolve to exactly one success and the rest `Conflict`.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, ErrorCode, OpenFlags, OptionalExtension};

use crate::analysis;
use crate::models::{Filter, Record, StoreBackendKind, StringProperties};
use crate::store::backend::StoreBackend;
use crate::store::error::{StoreError, StoreResult};

/// SQLite-backed implementation of `StoreBackend`.
#[derive(Debug)]
pub struct SqliteStore {
    path: PathBuf,
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a SQLite store at the given path.
    pub fn open(store_path: &Path) -> StoreResult<Self> {
        let open = || -> rusqlite::Result<Connection> {
            let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE;
            let conn = Connection::open_with_flags(store_path, flags)?;

            // Pragmas suitable for concurrent read-heavy workloads.
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.busy_timeout(std::time::Duration::from_millis(5000))?;

            Self::initialize_schema(&conn)?;
            Ok(conn)
        };

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

        let conn = open().map_err(|err| {
            StoreError::unavailable(format!(
                "cannot open sqlite store at {}: {err}",
                store_path.display()
            ))
        })?;

        Ok(Self {
            path: store_path.to_path_buf(),
            conn,
        })
    }

    fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                id         TEXT NOT NULL UNIQUE,
                value      TEXT NOT NULL UNIQUE,
                properties TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
        "#,
        )
    }

    fn record_from_row(
        id: String,
        value: String,
        properties_json: String,
        created_at: String,
    ) -> StoreResult<Record> {
        let properties: StringProperties = serde_json::from_str(&properties_json)?;
        Ok(Record {
            id,
            value,
            properties,
            created_at,
        })
    }
}

impl StoreBackend for SqliteStore {
    fn kind(&self) -> StoreBackendKind {
        StoreBackendKind::Sqlite
    }

    fn store_path(&self) -> &Path {
        &self.path
    }

    fn create(&mut self, value: &str) -> StoreResult<Record> {
        let properties = analysis::analyze(value);
        let properties_json = serde_json::to_string(&properties)?;
        let created_at = crate::store::current_timestamp();

        // No existence pre-check: the UNIQUE constraint on `value`
        // decides the race under concurrent creates.
        let insert = self.conn.execute(
            "INSERT INTO records (id, value, properties, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![properties.hash, value, properties_json, created_at],
        );

        match insert {
            Ok(_) => Ok(Record {
                id: properties.hash.clone(),
                value: value.to_string(),
                properties,
                created_at,
            }),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::conflict(value))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn get(&self, value: &str) -> StoreResult<Record> {
        let mut stmt = self.conn.prepare(
            "SELECT id, value, properties, created_at FROM records WHERE value = ?1",
        )?;

        let row = stmt
            .query_row(params![value], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .optional()?;

        match row {
            Some((id, value, properties_json, created_at)) => {
                Self::record_from_row(id, value, properties_json, created_at)
            }
            None => Err(StoreError::not_found(value)),
        }
    }

    fn delete(&mut self, value: &str) -> StoreResult<()> {
        let removed = self
            .conn
            .execute("DELETE FROM records WHERE value = ?1", params![value])?;

        if removed == 0 {
            return Err(StoreError::not_found(value));
        }

        Ok(())
    }

    fn list(&self, filter: &Filter) -> StoreResult<Vec<Record>> {
        // Each constraint is pushed down as a `?N IS NULL OR ...`
        // clause; constraints that failed lenient coercion bind NULL
        // and therefore do not restrict, matching the in-process scan
        // exactly.
        let sql = "SELECT id, value, properties, created_at
             FROM records
             WHERE (?1 IS NULL OR json_extract(properties, '$.is_palindrome') = ?1)
               AND (?2 IS NULL OR json_extract(properties, '$.length') >= ?2)
               AND (?3 IS NULL OR json_extract(properties, '$.length') <= ?3)
               AND (?4 IS NULL OR json_extract(properties, '$.word_count') = ?4)
               AND (?5 IS NULL OR instr(value, ?5) > 0)
             ORDER BY rowid ASC";

        // Saturate out-of-range numeric constraints instead of letting
        // the cast wrap negative, so the pushdown agrees with the
        // in-process comparison.
        let clamp = |n: u64| i64::try_from(n).unwrap_or(i64::MAX);

        let palindrome_param: Option<i64> = filter.palindrome().map(i64::from);
        let min_param: Option<i64> = filter.min_length().map(clamp);
        let max_param: Option<i64> = filter.max_length().map(clamp);
        let word_param: Option<i64> = filter.word_count().map(clamp);
        let contains_param: Option<&str> = filter.contains();

        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(
            params![
                palindrome_param,
                min_param,
                max_param,
                word_param,
                contains_param
            ],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )?;

        let mut records = Vec::new();
        for row in rows {
            let (id, value, properties_json, created_at) = row?;
            records.push(Self::record_from_row(id, value, properties_json, created_at)?);
        }

        Ok(records)
    }
}
