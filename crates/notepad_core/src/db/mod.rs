//! SQLite home of the key-value slots.
//!
//! # Responsibility
//! - Name the `kv_store` table and the columns every slot row carries.
//! - Open connections and bring them to the latest schema version.
//! - Check that a connection actually holds the slot table before use.
//!
//! # Invariants
//! - A connection handed out by [`open_db`] has `kv_store` with all of
//!   [`KV_COLUMNS`].

use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

/// Table holding one row per storage key.
pub const KV_TABLE: &str = "kv_store";

/// Columns the repository reads and writes.
pub const KV_COLUMNS: [&str; 3] = ["key", "value", "updated_at"];

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build.
    SchemaTooNew {
        found: u32,
        supported: u32,
    },
    MissingTable(&'static str),
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "slot database is at schema {found}, this build reads up to {supported}"
            ),
            Self::MissingTable(table) => write!(f, "table `{table}` does not exist"),
            Self::MissingColumn { table, column } => {
                write!(f, "table `{table}` has no `{column}` column")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Returns whether `table` exists on `conn`.
pub fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Column names of `table` in declaration order; empty for a missing table.
pub fn table_columns(conn: &Connection, table: &str) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid;")?;
    let columns = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

/// Fails unless `conn` carries the slot table with every expected column.
pub fn ensure_kv_schema(conn: &Connection) -> DbResult<()> {
    if !table_exists(conn, KV_TABLE)? {
        return Err(DbError::MissingTable(KV_TABLE));
    }
    let present = table_columns(conn, KV_TABLE)?;
    for column in KV_COLUMNS {
        if !present.iter().any(|name| name == column) {
            return Err(DbError::MissingColumn {
                table: KV_TABLE,
                column,
            });
        }
    }
    Ok(())
}
