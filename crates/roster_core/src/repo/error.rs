//! Repository/query error type.

use crate::db::DbError;
use crate::model::member::{MemberId, TeamId, ValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Record addressed by a failed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Member(MemberId),
    Team(TeamId),
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Member(id) => write!(f, "member {id}"),
            Self::Team(id) => write!(f, "team {id}"),
        }
    }
}

/// Error for roster persistence, query and bulk operations.
///
/// Storage failures are carried unmodified in `Db`; nothing in this crate
/// retries them.
#[derive(Debug)]
pub enum RepoError {
    /// Caller input rejected before any SQL was issued.
    InvalidArgument(String),
    /// Single-result query matched more than one row.
    NonUniqueResult { found: usize },
    Validation(ValidationError),
    Db(DbError),
    NotFound(EntityRef),
    /// Connection was not bootstrapped through `db::open_*`.
    MissingRequiredTable(&'static str),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::NonUniqueResult { found } => {
                write!(f, "expected at most one result, found {found} or more")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(entity) => write!(f, "{entity} not found"),
            Self::MissingRequiredTable(table) => {
                write!(f, "roster repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted roster data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidArgument(_)
            | Self::NonUniqueResult { .. }
            | Self::NotFound(_)
            | Self::MissingRequiredTable(_)
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
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
