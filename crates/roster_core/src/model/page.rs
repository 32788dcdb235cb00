//! Pagination request/response value objects.
//!
//! # Responsibility
//! - Validate paging input before any query is issued.
//! - Carry page content together with an optional total.
//!
//! # Invariants
//! - `page_size > 0` and `offset = page_index * page_size` fits in `i64`.
//! - `PageResult.total_count` is `None` only when the count query was
//!   elided; `total_elements()` then returns the inferred total.

use crate::config::QueryConfig;
use crate::model::sort::Sort;
use crate::repo::{RepoError, RepoResult};
use serde::{Deserialize, Serialize};

/// How the total row count of a paged search is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStrategy {
    /// Content and total in one statement.
    Embedded,
    /// Content statement plus an independent count statement.
    Separate,
    /// Like `Separate`, but skips the count when it can be inferred.
    Elided,
}

impl PageStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Embedded => "embedded",
            Self::Separate => "separate",
            Self::Elided => "elided",
        }
    }
}

/// Validated zero-based page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page_index: u64,
    page_size: u64,
    offset: u64,
    sort: Sort,
}

impl PageRequest {
    /// Validates raw paging input.
    ///
    /// # Errors
    /// - `InvalidArgument` when `page_index < 0`, `page_size <= 0`, or the
    ///   resulting offset overflows.
    pub fn new(page_index: i64, page_size: i64) -> RepoResult<Self> {
        if page_index < 0 {
            return Err(RepoError::InvalidArgument(format!(
                "page index must not be negative, got {page_index}"
            )));
        }
        if page_size <= 0 {
            return Err(RepoError::InvalidArgument(format!(
                "page size must be positive, got {page_size}"
            )));
        }
        let offset = page_index.checked_mul(page_size).ok_or_else(|| {
            RepoError::InvalidArgument(format!(
                "page offset overflows for index {page_index} and size {page_size}"
            ))
        })?;

        Ok(Self {
            page_index: page_index as u64,
            page_size: page_size as u64,
            offset: offset as u64,
            sort: Sort::unsorted(),
        })
    }

    /// Builds a request using configured defaults.
    ///
    /// A missing size falls back to `default_page_size`; sizes above
    /// `max_page_size` are clamped.
    pub fn from_config(
        config: &QueryConfig,
        page_index: i64,
        page_size: Option<i64>,
    ) -> RepoResult<Self> {
        let requested = page_size.unwrap_or(i64::from(config.default_page_size));
        let size = requested.min(i64::from(config.max_page_size));
        Self::new(page_index, size)
    }

    pub fn with_sort(self, sort: Sort) -> Self {
        Self { sort, ..self }
    }

    pub fn page_index(&self) -> u64 {
        self.page_index
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageResult<T> {
    pub content: Vec<T>,
    pub total_count: Option<u64>,
    pub page_index: u64,
    pub page_size: u64,
}

impl<T> PageResult<T> {
    /// Saturates instead of overflowing for hand-built results.
    pub fn offset(&self) -> u64 {
        self.page_index.saturating_mul(self.page_size)
    }

    /// True when the total was inferred instead of counted.
    pub fn count_elided(&self) -> bool {
        self.total_count.is_none()
    }

    /// Counted total, or `offset + content.len()` when the count was elided.
    pub fn total_elements(&self) -> u64 {
        self.total_count
            .unwrap_or_else(|| self.offset().saturating_add(self.content.len() as u64))
    }

    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_elements().div_ceil(self.page_size)
    }

    pub fn has_next(&self) -> bool {
        self.offset().saturating_add(self.content.len() as u64) < self.total_elements()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            content: self.content.into_iter().map(f).collect(),
            total_count: self.total_count,
            page_index: self.page_index,
            page_size: self.page_size,
        }
    }
}
