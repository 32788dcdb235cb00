//! Roster domain model and query value objects.
//!
//! # Responsibility
//! - Define durable `Member`/`Team` records and their write payloads.
//! - Define per-call value objects (`SearchCondition`, `PageRequest`,
//!   `PageResult`, `Sort`) and the flattened `MemberTeamView` projection.
//!
//! # Invariants
//! - Value objects are immutable once built and discarded after a call.
//! - The member/team relation is owned by `Member.team_ref` only.

pub mod condition;
pub mod member;
pub mod page;
pub mod sort;
pub mod view;
