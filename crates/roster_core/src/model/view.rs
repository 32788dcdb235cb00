//! Flattened read models produced by joined queries.
//!
//! # Invariants
//! - Views are built fresh per query row and never written back.
//! - `team_id`/`team_name` are both `None` when the member has no team.

use crate::model::member::{MemberId, TeamId};
use serde::Serialize;

/// One row of the member -> team left join.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MemberTeamView {
    pub member_id: MemberId,
    pub username: Option<String>,
    pub age: i32,
    pub team_id: Option<TeamId>,
    pub team_name: Option<String>,
}

/// Per-team age aggregate over the member -> team inner join.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamAgeStats {
    pub team_id: TeamId,
    pub team_name: String,
    pub member_count: u64,
    pub average_age: f64,
    pub min_age: i32,
    pub max_age: i32,
}
