//! Member search criteria.

use serde::{Deserialize, Serialize};

/// Sparse set of optional member filters.
///
/// A `None` field means "no filter on this dimension". Blank strings are
/// treated the same as `None` when predicates are built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCondition {
    pub username: Option<String>,
    pub team_name: Option<String>,
    /// Inclusive lower age bound.
    pub age_min: Option<i32>,
    /// Inclusive upper age bound.
    pub age_max: Option<i32>,
}

impl SearchCondition {
    /// Condition that matches every member.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_username(self, username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..self
        }
    }

    pub fn with_team_name(self, team_name: impl Into<String>) -> Self {
        Self {
            team_name: Some(team_name.into()),
            ..self
        }
    }

    pub fn with_age_min(self, age_min: i32) -> Self {
        Self {
            age_min: Some(age_min),
            ..self
        }
    }

    pub fn with_age_max(self, age_max: i32) -> Self {
        Self {
            age_max: Some(age_max),
            ..self
        }
    }
}
