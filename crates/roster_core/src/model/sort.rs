//! Ordering value objects for projection queries.
//!
//! # Invariants
//! - Every sort term names its null placement; storage defaults are never
//!   relied on.

use serde::{Deserialize, Serialize};

/// Projection column a query can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderField {
    MemberId,
    Username,
    Age,
    TeamId,
    TeamName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Asc,
    Desc,
}

/// Where rows with a `NULL` sort key are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullPlacement {
    First,
    Last,
}

/// One `ORDER BY` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSpec {
    pub field: OrderField,
    pub direction: Direction,
    pub nulls: NullPlacement,
}

impl OrderSpec {
    pub fn asc(field: OrderField, nulls: NullPlacement) -> Self {
        Self {
            field,
            direction: Direction::Asc,
            nulls,
        }
    }

    pub fn desc(field: OrderField, nulls: NullPlacement) -> Self {
        Self {
            field,
            direction: Direction::Desc,
            nulls,
        }
    }
}

/// Ordered list of sort terms, most significant first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    terms: Vec<OrderSpec>,
}

impl Sort {
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn by(spec: OrderSpec) -> Self {
        Self { terms: vec![spec] }
    }

    /// Appends a less significant term.
    pub fn then(mut self, spec: OrderSpec) -> Self {
        self.terms.push(spec);
        self
    }

    pub fn terms(&self) -> &[OrderSpec] {
        &self.terms
    }

    pub fn is_unsorted(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn orders_by(&self, field: OrderField) -> bool {
        self.terms.iter().any(|term| term.field == field)
    }

    /// Returns this sort with `member_id ASC` appended unless member id is
    /// already a sort key. Member ids are unique, so the result is total.
    pub fn with_tie_breaker(&self) -> Self {
        if self.orders_by(OrderField::MemberId) {
            return self.clone();
        }
        self.clone()
            .then(OrderSpec::asc(OrderField::MemberId, NullPlacement::Last))
    }
}
