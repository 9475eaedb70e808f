//! Schema steps for the slot database.
//!
//! Each step runs in the same transaction as its `user_version` bump, so an
//! interrupted upgrade leaves the file at the previous version.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

/// One versioned schema change.
#[derive(Debug, Clone, Copy)]
pub struct SchemaStep {
    pub version: u32,
    pub label: &'static str,
    sql: &'static str,
}

const STEPS: [SchemaStep; 1] = [SchemaStep {
    version: 1,
    label: "create_kv_store",
    sql: include_str!("0001_init.sql"),
}];

/// Highest schema version this build can read and write.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Schema version recorded in the database file.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

/// Steps newer than `version`, oldest first.
pub fn pending_steps(version: u32) -> Vec<SchemaStep> {
    STEPS
        .iter()
        .copied()
        .filter(|step| step.version > version)
        .collect()
}

/// Brings `conn` to [`latest_version`] and returns how many steps ran.
///
/// # Errors
/// - `SchemaTooNew` when the file was written by a newer build; nothing is
///   touched in that case.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let found = schema_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }

    let steps = pending_steps(found);
    if steps.is_empty() {
        debug!("event=db_migrate module=db status=current version={found}");
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for step in &steps {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
    }
    tx.commit()?;

    for step in &steps {
        info!(
            "event=db_migrate module=db status=applied version={} step={}",
            step.version, step.label
        );
    }
    Ok(steps.len())
}
