//! Query composition over the SQLite roster tables.
//!
//! # Responsibility
//! - Build predicates from search criteria (`predicate`).
//! - Run joined projection, count and aggregate statements (`select`).
//! - Assemble pages and decide when a count can be skipped (`paginate`).
//! - Run predicate-scoped bulk writes (`mutate`).
//!
//! # Invariants
//! - All SQL values are bound as parameters; only fixed fragments are
//!   formatted into statement text.
//! - Every operation borrows the caller's connection for the duration of
//!   the call and keeps no state between calls.

pub mod mutate;
pub mod paginate;
pub mod predicate;
pub mod select;
