//! SQLite storage bootstrap for the roster tables.
//!
//! # Responsibility
//! - Open and configure SQLite connections (one per unit of work).
//! - Bring the `team`/`member` schema to the version this binary expects.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - No roster query runs on a connection that skipped bootstrap.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;
mod scope;

pub use open::{open_db, open_db_in_memory, open_db_with_config};
pub use scope::with_write_scope;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "roster schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
