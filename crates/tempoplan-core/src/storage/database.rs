//! SQLite-backed learning store.
//!
//! Holds one row per mood in `learning_records`. Each `put` is a single
//! upsert statement, so readers never see a half-written record. `update`
//! runs inside a `BEGIN IMMEDIATE` transaction so concurrent processes
//! folding into the same file serialize on SQLite's write lock.

use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use crate::error::StorageError;
use crate::learning::{LearningRecord, LearningStore};
use crate::task::MoodType;

use super::{data_dir, migrations};

/// How long a connection waits on another writer before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite database for learning records.
pub struct Database {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

impl Database {
    /// Open the database at `<data_dir>/tempoplan.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()?.join("tempoplan.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        migrations::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Unavailable("database connection lock poisoned".to_string()))
    }
}

fn decode_row(
    mood: String,
    sample_count: u64,
    average_completion_ratio: f64,
    updated_at: Option<String>,
) -> Result<LearningRecord, StorageError> {
    let parsed_mood = MoodType::from_str(&mood).map_err(|e| StorageError::Corrupt {
        mood: mood.clone(),
        message: e.to_string(),
    })?;
    let updated_at = updated_at
        .map(|raw| {
            DateTime::parse_from_rfc3339(&raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| StorageError::Corrupt {
                    mood: mood.clone(),
                    message: format!("bad updated_at '{raw}': {e}"),
                })
        })
        .transpose()?;
    Ok(LearningRecord {
        mood: parsed_mood,
        sample_count,
        average_completion_ratio,
        updated_at,
    })
}

type RawRow = (String, u64, f64, Option<String>);

fn raw_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn read_record(conn: &Connection, mood: MoodType) -> Result<LearningRecord, StorageError> {
    let row = conn
        .query_row(
            "SELECT mood, sample_count, average_completion_ratio, updated_at
             FROM learning_records WHERE mood = ?1",
            params![mood.as_str()],
            raw_row,
        )
        .optional()?;
    match row {
        Some((m, n, avg, at)) => decode_row(m, n, avg, at),
        None => Ok(LearningRecord::empty(mood)),
    }
}

fn write_record(conn: &Connection, record: &LearningRecord) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO learning_records (mood, sample_count, average_completion_ratio, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(mood) DO UPDATE SET
            sample_count = excluded.sample_count,
            average_completion_ratio = excluded.average_completion_ratio,
            updated_at = excluded.updated_at",
        params![
            record.mood.as_str(),
            record.sample_count,
            record.average_completion_ratio,
            record.updated_at.map(|dt| dt.to_rfc3339()),
        ],
    )?;
    Ok(())
}

impl LearningStore for Database {
    fn get_or_default(&self, mood: MoodType) -> Result<LearningRecord, StorageError> {
        read_record(&*self.conn()?, mood)
    }

    fn put(&self, record: &LearningRecord) -> Result<(), StorageError> {
        write_record(&*self.conn()?, record)
    }

    fn all(&self) -> Result<Vec<LearningRecord>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT mood, sample_count, average_completion_ratio, updated_at FROM learning_records",
        )?;
        let rows = stmt.query_map([], raw_row)?;

        let mut records = Vec::new();
        for row in rows {
            let (m, n, avg, at) = row?;
            records.push(decode_row(m, n, avg, at)?);
        }
        records.sort_by_key(|r| r.mood);
        Ok(records)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.conn()?.execute("DELETE FROM learning_records", [])?;
        Ok(())
    }

    fn update(
        &self,
        mood: MoodType,
        apply: &dyn Fn(LearningRecord) -> LearningRecord,
    ) -> Result<LearningRecord, StorageError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let updated = apply(read_record(&tx, mood)?);
        write_record(&tx, &updated)?;
        tx.commit()?;
        Ok(updated)
    }
}
