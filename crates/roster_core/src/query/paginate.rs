//! Page assembly and count elision.
//!
//! # Invariants
//! - The count supplier runs at most once, and only when the total cannot be
//!   inferred from the first page.
//! - Elision applies to `page_index == 0` only. A short first page holds
//!   every matching row, so its length is the total.

use crate::model::page::{PageRequest, PageResult};
use crate::repo::RepoResult;

/// Returns true when `content_len` rows on this page prove the total.
pub fn can_elide_count(request: &PageRequest, content_len: usize) -> bool {
    request.page_index() == 0 && (content_len as u64) < request.page_size()
}

/// Assembles a page from a total that is already known.
pub fn with_total<T>(content: Vec<T>, request: &PageRequest, total: u64) -> PageResult<T> {
    debug_assert!(content.len() as u64 <= request.page_size());
    PageResult {
        content,
        total_count: Some(total),
        page_index: request.page_index(),
        page_size: request.page_size(),
    }
}

/// Assembles a page, calling `count` only when elision does not apply.
///
/// When the count is elided, `total_count` is `None` and
/// `PageResult::total_elements()` yields `offset + content.len()`.
pub fn paginate<T, F>(content: Vec<T>, request: &PageRequest, count: F) -> RepoResult<PageResult<T>>
where
    F: FnOnce() -> RepoResult<u64>,
{
    debug_assert!(content.len() as u64 <= request.page_size());
    let total_count = if can_elide_count(request, content.len()) {
        None
    } else {
        Some(count()?)
    };

    Ok(PageResult {
        content,
        total_count,
        page_index: request.page_index(),
        page_size: request.page_size(),
    })
}

#[cfg(test)]
mod tests {
    use super::{can_elide_count, paginate, with_total};
    use crate::model::page::PageRequest;
    use crate::repo::RepoError;
    use std::cell::Cell;

    #[test]
    fn short_first_page_skips_count_supplier() {
        let request = PageRequest::new(0, 10).unwrap();
        let calls = Cell::new(0);

        let page = paginate(vec![1, 2, 3], &request, || {
            calls.set(calls.get() + 1);
            Ok(99)
        })
        .unwrap();

        assert_eq!(calls.get(), 0);
        assert_eq!(page.total_count, None);
        assert_eq!(page.total_elements(), 3);
    }

    #[test]
    fn full_first_page_runs_count_supplier() {
        let request = PageRequest::new(0, 2).unwrap();
        let calls = Cell::new(0);

        let page = paginate(vec!["a", "b"], &request, || {
            calls.set(calls.get() + 1);
            Ok(4)
        })
        .unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(page.total_count, Some(4));
    }

    #[test]
    fn later_pages_always_count() {
        let request = PageRequest::new(1, 10).unwrap();
        assert!(!can_elide_count(&request, 3));
        assert!(!can_elide_count(&request, 0));
    }

    #[test]
    fn empty_first_page_elides_to_zero() {
        let request = PageRequest::new(0, 5).unwrap();
        let page = paginate(Vec::<i32>::new(), &request, || Ok(7)).unwrap();
        assert_eq!(page.total_elements(), 0);
    }

    #[test]
    fn count_supplier_error_propagates() {
        let request = PageRequest::new(2, 1).unwrap();
        let err = paginate(vec![1], &request, || {
            Err(RepoError::InvalidData("count failed".to_string()))
        })
        .unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(_)));
    }

    #[test]
    fn with_total_keeps_request_coordinates() {
        let request = PageRequest::new(3, 4).unwrap();
        let page = with_total(vec![1], &request, 13);
        assert_eq!(page.page_index, 3);
        assert_eq!(page.page_size, 4);
        assert_eq!(page.total_count, Some(13));
    }
}
