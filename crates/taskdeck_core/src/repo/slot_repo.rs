//! Task slot repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist the full task list as one JSON payload under a stable slot key.
//! - Keep SQL and wire-format details inside the core persistence boundary.
//!
//! # Invariants
//! - `save` overwrites the whole slot; there are no partial updates.
//! - A missing slot row reads back as `None`, never as an error.
//! - `clear` removes the slot row entirely instead of storing an empty list.
//!
//! # See also
//! - docs/architecture.md

use crate::db::DbError;
use crate::db::migrations::latest_version;
use crate::model::task::Task;
use rusqlite::{params, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Slot key under which the task list payload is stored.
pub const TASKS_SLOT_KEY: &str = "tasks";

/// Result type used by task slot repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from task slot repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// In-memory tasks could not be encoded into a slot payload.
    Encode(serde_json::Error),
    /// Stored slot payload could not be decoded into tasks.
    Decode(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "task slot repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "task slot repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "task slot repository requires column `{column}` in table `{table}`"
            ),
            Self::Encode(err) => write!(f, "task payload could not be encoded: {err}"),
            Self::Decode(err) => write!(f, "stored task payload could not be decoded: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
            Self::Encode(err) => Some(err),
            Self::Decode(err) => Some(err),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the durable task slot.
pub trait TaskSlotRepository {
    /// Reads the stored task list, or `None` when the slot has never been written.
    fn load(&self) -> RepoResult<Option<Vec<Task>>>;
    /// Overwrites the slot with the full current task list.
    fn save(&self, tasks: &[Task]) -> RepoResult<()>;
    /// Deletes the slot row entirely.
    fn clear(&self) -> RepoResult<()>;
}

/// SQLite-backed task slot repository.
pub struct SqliteTaskSlotRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskSlotRepository<'conn> {
    /// Builds a repository after verifying the connection carries the migrated schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_slot_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TaskSlotRepository for SqliteTaskSlotRepository<'_> {
    fn load(&self) -> RepoResult<Option<Vec<Task>>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM slots WHERE key = ?1;")?;

        let mut rows = stmt.query([TASKS_SLOT_KEY])?;
        if let Some(row) = rows.next()? {
            let payload: String = row.get(0)?;
            let tasks = serde_json::from_str(&payload).map_err(RepoError::Decode)?;
            return Ok(Some(tasks));
        }

        Ok(None)
    }

    fn save(&self, tasks: &[Task]) -> RepoResult<()> {
        let payload = serde_json::to_string(tasks).map_err(RepoError::Encode)?;

        self.conn.execute(
            "INSERT INTO slots (key, value)
             VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
            params![TASKS_SLOT_KEY, payload],
        )?;

        Ok(())
    }

    fn clear(&self) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM slots WHERE key = ?1;", [TASKS_SLOT_KEY])?;
        Ok(())
    }
}

fn ensure_slot_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "slots")? {
        return Err(RepoError::MissingRequiredTable("slots"));
    }

    for column in ["key", "value"] {
        if !table_has_column(conn, "slots", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "slots",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
