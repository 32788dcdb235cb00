//! Repository layer for the member/team roster.
//!
//! # Responsibility
//! - Expose use-case oriented read, search and bulk-write contracts.
//! - Keep SQLite details behind `SqliteMemberRepository`.
//!
//! # Invariants
//! - Write paths validate payloads before SQL runs.
//! - Lookups report absence as `Ok(None)`; `NotFound` is reserved for
//!   operations that address a record which must exist.

mod error;
pub mod member_repo;

pub use error::{EntityRef, RepoError, RepoResult};
