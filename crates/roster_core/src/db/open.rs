//! Connection bootstrap for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory connections.
//! - Configure pragmas and bring the schema up to date before returning.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and a busy timeout.
//! - Returned connections are at `migrations::latest_version()`.

use super::migrations::apply_migrations;
use super::DbResult;
use crate::config::DatabaseConfig;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (or creates) a database file and bootstraps it.
///
/// # Side effects
/// - Emits `db_open` events with mode, duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    bootstrap("file", DEFAULT_BUSY_TIMEOUT, || Connection::open(path))
}

/// Opens a private in-memory database and bootstraps it.
pub fn open_db_in_memory() -> DbResult<Connection> {
    bootstrap("memory", DEFAULT_BUSY_TIMEOUT, Connection::open_in_memory)
}

/// Opens the database described by `config`.
///
/// A missing `path` selects an in-memory database.
pub fn open_db_with_config(config: &DatabaseConfig) -> DbResult<Connection> {
    let busy_timeout = Duration::from_millis(config.busy_timeout_ms);
    match config.path.as_deref() {
        Some(path) => bootstrap("file", busy_timeout, || Connection::open(path)),
        None => bootstrap("memory", busy_timeout, Connection::open_in_memory),
    }
}

fn bootstrap(
    mode: &str,
    busy_timeout: Duration,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match open() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={err}",
                started_at.elapsed().as_millis(),
            );
            return Err(err.into());
        }
    };

    match configure(&mut conn, busy_timeout) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={err}",
                started_at.elapsed().as_millis(),
            );
            Err(err)
        }
    }
}

fn configure(conn: &mut Connection, busy_timeout: Duration) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(busy_timeout)?;
    apply_migrations(conn)?;
    Ok(())
}
