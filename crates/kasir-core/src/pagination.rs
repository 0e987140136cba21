//! # Pagination
//!
//! Page/limit math shared by the product listing in both adapters.
//!
//! ```text
//! total_items = 23, limit = 10
//!
//!   page 1 → OFFSET 0   rows 1..=10
//!   page 2 → OFFSET 10  rows 11..=20
//!   page 3 → OFFSET 20  rows 21..=23
//!
//!   total_pages = ceil(23 / 10) = 3
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

/// Highest page number kept by [`PageRequest::new`]. Any larger page is past
/// the last row anyway, and keeping below this keeps `offset` inside `i64`.
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_LIMIT;

/// A normalized page request. Only constructed through [`PageRequest::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    limit: i64,
}

impl PageRequest {
    /// Normalizes raw input: page below 1 becomes 1, page above [`MAX_PAGE`]
    /// becomes `MAX_PAGE`, limit below 1 becomes the default, and limit above
    /// the maximum is capped.
    pub fn new(page: i64, limit: i64) -> Self {
        let page = page.clamp(1, MAX_PAGE);
        let limit = if limit < 1 {
            DEFAULT_PAGE_LIMIT
        } else {
            limit.min(MAX_PAGE_LIMIT)
        };
        PageRequest { page, limit }
    }

    /// Builds a request from optional query values.
    pub fn from_query(page: Option<i64>, limit: Option<i64>) -> Self {
        PageRequest::new(page.unwrap_or(1), limit.unwrap_or(DEFAULT_PAGE_LIMIT))
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Rows to skip: `(page - 1) * limit`.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// `ceil(total / limit)`. Zero when nothing matches.
    pub fn page_count(&self, total: i64) -> i64 {
        if total <= 0 {
            0
        } else {
            (total - 1) / self.limit + 1
        }
    }

    /// Same limit, different page.
    pub fn with_page(&self, page: i64) -> Self {
        PageRequest::new(page, self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(1, DEFAULT_PAGE_LIMIT)
    }
}

/// Paging metadata returned with every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PageMeta {
    pub current_page: i64,
    pub limit: i64,
    pub total_items: i64,
    pub total_pages: i64,
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, request: PageRequest, total_items: i64) -> Self {
        Page {
            data,
            meta: PageMeta {
                current_page: request.page(),
                limit: request.limit(),
                total_items,
                total_pages: request.page_count(total_items),
            },
        }
    }

    pub fn has_next(&self) -> bool {
        self.meta.current_page < self.meta.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.meta.current_page > 1
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_input() {
        let req = PageRequest::new(0, 0);
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), DEFAULT_PAGE_LIMIT);

        let req = PageRequest::new(-3, 1_000);
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), MAX_PAGE_LIMIT);
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
        assert_eq!(PageRequest::new(2, 25).offset(), 25);
    }

    #[test]
    fn test_huge_page_is_clamped() {
        let req = PageRequest::from_query(Some(i64::MAX), Some(10));
        assert_eq!(req.page(), MAX_PAGE);
        assert!(req.offset() > 0);

        let req = PageRequest::new(i64::MAX, MAX_PAGE_LIMIT);
        assert_eq!(req.offset(), (MAX_PAGE - 1) * MAX_PAGE_LIMIT);

        let page = Page::new(Vec::<i64>::new(), req, 3);
        assert_eq!(page.meta.total_pages, 1);
        assert!(!page.has_next());
    }

    #[test]
    fn test_page_count_is_ceiling() {
        let req = PageRequest::new(1, 10);
        assert_eq!(req.page_count(0), 0);
        assert_eq!(req.page_count(1), 1);
        assert_eq!(req.page_count(10), 1);
        assert_eq!(req.page_count(11), 2);
        assert_eq!(req.page_count(23), 3);
        assert_eq!(req.page_count(i64::MAX), i64::MAX / 10 + 1);
    }

    #[test]
    fn test_page_navigation_flags() {
        let page = Page::new(vec![1i64, 2], PageRequest::new(2, 2), 5);
        assert_eq!(page.meta.total_pages, 3);
        assert!(page.has_next());
        assert!(page.has_prev());

        let last = Page::new(vec![5i64], PageRequest::new(3, 2), 5);
        assert!(!last.has_next());
    }

    #[test]
    fn test_meta_serializes_with_snake_case_keys() {
        let page = Page::new(Vec::<i64>::new(), PageRequest::default(), 0);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["meta"]["current_page"], 1);
        assert_eq!(json["meta"]["total_items"], 0);
        assert_eq!(json["meta"]["total_pages"], 0);
    }
}
