//! Member and team domain model.
//!
//! # Responsibility
//! - Define the durable `Member`/`Team` records owned by storage.
//! - Validate write payloads before they reach SQL.
//!
//! # Invariants
//! - `Member.team_ref` is the owning side of the member/team relation.
//! - `TeamMemberIndex` is derived from `team_ref` and never persisted.
//! - `age` is never negative.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned member identifier.
pub type MemberId = i64;

/// Storage-assigned team identifier.
pub type TeamId = i64;

/// Persisted member record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    /// `None` for anonymous members.
    pub username: Option<String>,
    pub age: i32,
    /// Authoritative foreign key to `Team`.
    pub team_ref: Option<TeamId>,
}

/// Persisted team record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
}

/// Insert payload for a new member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub username: Option<String>,
    pub age: i32,
    pub team_ref: Option<TeamId>,
}

impl NewMember {
    /// Creates a member payload without a team.
    pub fn new(username: impl Into<String>, age: i32) -> Self {
        Self {
            username: Some(username.into()),
            age,
            team_ref: None,
        }
    }

    /// Creates a member payload without a username.
    pub fn anonymous(age: i32) -> Self {
        Self {
            username: None,
            age,
            team_ref: None,
        }
    }

    /// Returns a copy assigned to `team`.
    pub fn in_team(mut self, team: TeamId) -> Self {
        self.team_ref = Some(team);
        self
    }

    /// Checks payload invariants before persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(username) = self.username.as_deref() {
            validate_username(username)?;
        }
        validate_age(self.age)
    }
}

/// Read-only back-reference from a team to its members.
///
/// Built from `member.team_id` on every call; holding one across a
/// `change_team` or bulk mutation yields a stale snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamMemberIndex {
    pub team_id: TeamId,
    /// Sorted ascending.
    pub member_ids: Vec<MemberId>,
}

impl TeamMemberIndex {
    pub fn contains(&self, member_id: MemberId) -> bool {
        self.member_ids.binary_search(&member_id).is_ok()
    }

    pub fn len(&self) -> usize {
        self.member_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.member_ids.is_empty()
    }
}

/// Write-payload validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    BlankUsername,
    BlankTeamName,
    NegativeAge(i32),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankUsername => write!(f, "username must not be blank when present"),
            Self::BlankTeamName => write!(f, "team name must not be blank"),
            Self::NegativeAge(age) => write!(f, "age must not be negative, got {age}"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::BlankUsername);
    }
    Ok(())
}

pub(crate) fn validate_team_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::BlankTeamName);
    }
    Ok(())
}

pub(crate) fn validate_age(age: i32) -> Result<(), ValidationError> {
    if age < 0 {
        return Err(ValidationError::NegativeAge(age));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{NewMember, TeamMemberIndex, ValidationError};

    #[test]
    fn new_member_rejects_blank_username() {
        let err = NewMember::new("   ", 10).validate().unwrap_err();
        assert_eq!(err, ValidationError::BlankUsername);
    }

    #[test]
    fn new_member_rejects_negative_age() {
        let err = NewMember::new("member1", -1).validate().unwrap_err();
        assert_eq!(err, ValidationError::NegativeAge(-1));
    }

    #[test]
    fn anonymous_member_is_valid() {
        assert!(NewMember::anonymous(100).validate().is_ok());
    }

    #[test]
    fn index_lookup_uses_sorted_ids() {
        let index = TeamMemberIndex {
            team_id: 1,
            member_ids: vec![2, 5, 9],
        };
        assert!(index.contains(5));
        assert!(!index.contains(3));
        assert_eq!(index.len(), 3);
    }
}
