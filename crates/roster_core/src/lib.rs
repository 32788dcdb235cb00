//! Member/team roster query core.
//!
//! Composes optional search filters into one predicate, runs it through a
//! member -> team join on SQLite, pages the results with an optional count
//! elision, and applies predicate-scoped bulk updates/deletes.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::condition::SearchCondition;
pub use model::member::{
    Member, MemberId, NewMember, Team, TeamId, TeamMemberIndex, ValidationError,
};
pub use model::page::{PageRequest, PageResult, PageStrategy};
pub use model::sort::{Direction, NullPlacement, OrderField, OrderSpec, Sort};
pub use model::view::{MemberTeamView, TeamAgeStats};
pub use query::mutate::Mutation;
pub use query::predicate::{Condition, Predicate};
pub use repo::member_repo::{MemberRepository, SqliteMemberRepository};
pub use repo::{EntityRef, RepoError, RepoResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
