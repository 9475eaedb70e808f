//! Key-value repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide async-storage style slot access on top of `kv_store`.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `set_item` is a single upsert statement, so a slot is never observed
//!   half-written.
//! - Repositories refuse connections without a complete `kv_store` table.

use crate::db::{ensure_kv_schema, DbError};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type KvResult<T> = Result<T, KvError>;

/// Transport-level error for slot reads and writes.
#[derive(Debug)]
pub enum KvError {
    Db(DbError),
    /// Backend refused the call (used by non-SQLite backends).
    Unavailable(String),
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "key-value storage unavailable: {message}"),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for KvError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for string slots keyed by name.
pub trait KvRepository {
    /// Returns the stored value, or `None` when the key was never written.
    fn get_item(&self, key: &str) -> KvResult<Option<String>>;
    /// Writes `value` under `key`, replacing any prior value.
    fn set_item(&self, key: &str, value: &str) -> KvResult<()>;
    /// Removes the slot. Removing a missing key is a no-op.
    fn remove_item(&self, key: &str) -> KvResult<()>;
}

impl<R: KvRepository + ?Sized> KvRepository for &R {
    fn get_item(&self, key: &str) -> KvResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> KvResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> KvResult<()> {
        (**self).remove_item(key)
    }
}

/// SQLite-backed slot repository.
pub struct SqliteKvRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `Db(MissingTable)` / `Db(MissingColumn)` when the slot schema is
    ///   absent or incomplete.
    pub fn try_new(conn: &'conn Connection) -> KvResult<Self> {
        ensure_kv_schema(conn)?;
        Ok(Self { conn })
    }
}

impl KvRepository for SqliteKvRepository<'_> {
    fn get_item(&self, key: &str) -> KvResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> KvResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> KvResult<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1;", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KvError, KvRepository, SqliteKvRepository};
    use crate::db::{open_db_in_memory, DbError};
    use rusqlite::Connection;

    #[test]
    fn missing_key_reads_as_none() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteKvRepository::try_new(&conn).unwrap();
        assert_eq!(repo.get_item("@absent").unwrap(), None);
    }

    #[test]
    fn set_item_replaces_previous_value() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteKvRepository::try_new(&conn).unwrap();

        repo.set_item("@slot", "first").unwrap();
        repo.set_item("@slot", "second").unwrap();

        assert_eq!(repo.get_item("@slot").unwrap().as_deref(), Some("second"));
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM kv_store;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn remove_item_is_noop_for_missing_key() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteKvRepository::try_new(&conn).unwrap();

        repo.remove_item("@absent").unwrap();
        repo.set_item("@slot", "value").unwrap();
        repo.remove_item("@slot").unwrap();
        assert_eq!(repo.get_item("@slot").unwrap(), None);
    }

    #[test]
    fn try_new_rejects_unmigrated_connection() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SqliteKvRepository::try_new(&conn).err().unwrap();
        assert!(matches!(
            err,
            KvError::Db(DbError::MissingTable("kv_store"))
        ));
    }
}
