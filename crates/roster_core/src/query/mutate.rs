//! Predicate-scoped bulk update/delete.
//!
//! # Responsibility
//! - Render `Mutation` assignments and run them against every member row
//!   matched by a `Predicate`.
//!
//! # Invariants
//! - Scoping reuses the select-side predicate through
//!   `member.id IN (SELECT m.id FROM <left join> WHERE ...)`, so team-name
//!   filters behave exactly as in reads.
//! - Statements write straight to storage. Any copy of a member read before
//!   the mutation is stale; callers must reload before reading it again in
//!   the same unit of work.
//! - Constraint failures surface unchanged and leave no row modified.

use crate::model::member::{validate_age, validate_username};
use crate::query::predicate::Predicate;
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

const SCOPED_MEMBER_IDS: &str =
    "SELECT m.id FROM member m LEFT JOIN team t ON t.id = m.team_id WHERE";

/// Field assignment applied by a bulk update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// `username = value`; `None` clears the username.
    SetUsername(Option<String>),
    /// `age = value`
    SetAge(i32),
    /// `age = age + delta`
    AddAge(i32),
    /// `age = age * factor`
    MultiplyAge(i32),
}

impl Mutation {
    /// Rejects assignments that could never produce a valid member.
    pub fn validate(&self) -> RepoResult<()> {
        match self {
            Self::SetUsername(Some(username)) => validate_username(username)?,
            Self::SetAge(age) => validate_age(*age)?,
            Self::SetUsername(None) | Self::AddAge(_) | Self::MultiplyAge(_) => {}
        }
        Ok(())
    }

    fn column(&self) -> &'static str {
        match self {
            Self::SetUsername(_) => "username",
            Self::SetAge(_) | Self::AddAge(_) | Self::MultiplyAge(_) => "age",
        }
    }

    fn assignment_sql(&self) -> &'static str {
        match self {
            Self::SetUsername(_) => "username = ?",
            Self::SetAge(_) => "age = ?",
            Self::AddAge(_) => "age = age + ?",
            Self::MultiplyAge(_) => "age = age * ?",
        }
    }

    fn bind_value(&self) -> Value {
        match self {
            Self::SetUsername(Some(username)) => Value::Text(username.clone()),
            Self::SetUsername(None) => Value::Null,
            Self::SetAge(value) | Self::AddAge(value) | Self::MultiplyAge(value) => {
                Value::Integer(i64::from(*value))
            }
        }
    }
}

/// Applies `assignments` to every member matched by `predicate`.
///
/// Returns the number of affected rows.
///
/// # Errors
/// - `InvalidArgument` for an empty list or two assignments to one column.
/// - `Validation` for assignments rejected by `Mutation::validate`.
/// - `Db` for storage failures (e.g. the `age` range check, which also
///   catches `AddAge`/`MultiplyAge` results outside `i32`).
pub fn execute_update(
    conn: &Connection,
    predicate: &Predicate,
    assignments: &[Mutation],
) -> RepoResult<u64> {
    if assignments.is_empty() {
        return Err(RepoError::InvalidArgument(
            "bulk update needs at least one assignment".to_string(),
        ));
    }
    for (index, assignment) in assignments.iter().enumerate() {
        assignment.validate()?;
        if assignments[..index]
            .iter()
            .any(|earlier| earlier.column() == assignment.column())
        {
            return Err(RepoError::InvalidArgument(format!(
                "column `{}` is assigned more than once",
                assignment.column()
            )));
        }
    }

    let set_sql = assignments
        .iter()
        .map(Mutation::assignment_sql)
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE member SET {set_sql} WHERE id IN ({SCOPED_MEMBER_IDS} {})",
        predicate.where_sql()
    );

    let mut binds: Vec<Value> = assignments.iter().map(Mutation::bind_value).collect();
    binds.extend(predicate.bind_values());

    let changed = conn.execute(&sql, params_from_iter(binds))?;
    Ok(changed as u64)
}

/// Deletes every member matched by `predicate` and returns the count.
pub fn execute_delete(conn: &Connection, predicate: &Predicate) -> RepoResult<u64> {
    let sql = format!(
        "DELETE FROM member WHERE id IN ({SCOPED_MEMBER_IDS} {})",
        predicate.where_sql()
    );
    let changed = conn.execute(&sql, params_from_iter(predicate.bind_values()))?;
    Ok(changed as u64)
}
