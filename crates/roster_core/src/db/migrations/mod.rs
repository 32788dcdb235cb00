//! Versioned roster schema.
//!
//! # Responsibility
//! - Hold the ordered list of schema steps for `team`/`member`.
//! - Apply the pending steps in one transaction.
//!
//! # Invariants
//! - Step versions are strictly increasing.
//! - `PRAGMA user_version` always equals the last applied step.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    name: "init",
    sql: include_str!("0001_init.sql"),
}];

/// Returns the schema version this binary brings a database to.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Returns the version recorded in the database header.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Applies every step newer than the database's recorded version.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the database is newer than this binary.
/// - `Sqlite` when a step fails; no step of the batch is kept.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current = schema_version(conn)?;
    let latest = latest_version();

    if current > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }
    if current == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in SCHEMA_STEPS.iter().filter(|step| step.version > current) {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        info!(
            "event=schema_step module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;

    Ok(())
}
