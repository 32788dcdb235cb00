//! Predicate builder for member searches.
//!
//! # Responsibility
//! - Turn a sparse `SearchCondition` into an AND-ed list of conditions.
//! - Render that list as a parameterized SQL `WHERE` body.
//!
//! # Invariants
//! - Each filter is a pure `&SearchCondition -> Option<Condition>` function;
//!   `None` contributes nothing to the conjunction.
//! - Blank strings never produce a condition.
//! - An empty conjunction matches every row.
//! - Reads, paged reads and bulk mutations all scope through `Predicate`.

use crate::model::condition::SearchCondition;
use crate::model::view::MemberTeamView;
use rusqlite::types::Value;

/// One filter term over the member -> team join.
///
/// Column references use the `m` (member) and `t` (team) aliases defined by
/// `JoinedSource`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    UsernameEq(String),
    TeamNameEq(String),
    /// `age >= value`
    AgeGoe(i32),
    /// `age <= value`
    AgeLoe(i32),
}

impl Condition {
    fn sql(&self) -> &'static str {
        match self {
            Self::UsernameEq(_) => "m.username = ?",
            Self::TeamNameEq(_) => "t.name = ?",
            Self::AgeGoe(_) => "m.age >= ?",
            Self::AgeLoe(_) => "m.age <= ?",
        }
    }

    fn bind_value(&self) -> Value {
        match self {
            Self::UsernameEq(value) | Self::TeamNameEq(value) => Value::Text(value.clone()),
            Self::AgeGoe(value) | Self::AgeLoe(value) => Value::Integer(i64::from(*value)),
        }
    }

    /// Whether evaluating this term needs the team side of the join.
    pub fn references_team(&self) -> bool {
        matches!(self, Self::TeamNameEq(_))
    }

    /// Evaluates the term against an already projected row.
    pub fn matches(&self, view: &MemberTeamView) -> bool {
        match self {
            Self::UsernameEq(value) => view.username.as_deref() == Some(value.as_str()),
            Self::TeamNameEq(value) => view.team_name.as_deref() == Some(value.as_str()),
            Self::AgeGoe(value) => view.age >= *value,
            Self::AgeLoe(value) => view.age <= *value,
        }
    }
}

type ConditionFilter = fn(&SearchCondition) -> Option<Condition>;

const FILTERS: [ConditionFilter; 4] = [username_eq, team_name_eq, age_goe, age_loe];

/// Builds the conditions for every present, non-blank filter field.
pub fn build_conditions(condition: &SearchCondition) -> Vec<Condition> {
    FILTERS
        .iter()
        .filter_map(|filter| filter(condition))
        .collect()
}

pub fn username_eq(condition: &SearchCondition) -> Option<Condition> {
    non_blank(condition.username.as_deref()).map(|value| Condition::UsernameEq(value.to_string()))
}

pub fn team_name_eq(condition: &SearchCondition) -> Option<Condition> {
    non_blank(condition.team_name.as_deref()).map(|value| Condition::TeamNameEq(value.to_string()))
}

pub fn age_goe(condition: &SearchCondition) -> Option<Condition> {
    condition.age_min.map(Condition::AgeGoe)
}

pub fn age_loe(condition: &SearchCondition) -> Option<Condition> {
    condition.age_max.map(Condition::AgeLoe)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

/// Conjunction of conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    /// AND-combines `conditions`. An empty list yields a match-all predicate.
    pub fn compose(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn from_search(condition: &SearchCondition) -> Self {
        Self::compose(build_conditions(condition))
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_match_all(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn references_team(&self) -> bool {
        self.conditions.iter().any(Condition::references_team)
    }

    pub fn matches(&self, view: &MemberTeamView) -> bool {
        self.conditions.iter().all(|condition| condition.matches(view))
    }

    /// `WHERE` body with one `?` per condition, in `bind_values()` order.
    pub(crate) fn where_sql(&self) -> String {
        if self.conditions.is_empty() {
            return "1 = 1".to_string();
        }
        self.conditions
            .iter()
            .map(Condition::sql)
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    pub(crate) fn bind_values(&self) -> Vec<Value> {
        self.conditions.iter().map(Condition::bind_value).collect()
    }
}
