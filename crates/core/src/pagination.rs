//! Pagination math for blog/comment/user listings.
//!
//! A [`Page`] is computed per request from the total number of items, the page
//! the caller asked for and the page size. It never fails: out-of-range input
//! collapses to an empty first page.

use serde::{Deserialize, Serialize};

/// Page size used when the caller does not configure one.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// One page of a listing: the slice to fetch plus navigation flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub item_count: u64,
    pub page_size: u64,
    pub page_count: u64,
    /// 1-based index of this page.
    pub page_index: u64,
    /// Number of items before this page.
    pub offset: u64,
    /// Number of items on this page.
    pub limit: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl Page {
    /// Compute the page `page_index` (1-based) of a listing of `item_count` items.
    ///
    /// A `page_size` of zero is treated as one. A `page_index` of zero or past
    /// the last page yields `page_index = 1` with `offset = limit = 0`.
    pub fn new(item_count: u64, page_index: u64, page_size: u64) -> Self {
        let page_size = page_size.max(1);
        let page_count = item_count.div_ceil(page_size);

        let (page_index, offset, limit) =
            if item_count == 0 || page_index == 0 || page_index > page_count {
                (1, 0, 0)
            } else {
                let offset = page_size * (page_index - 1);
                (page_index, offset, page_size.min(item_count - offset))
            };

        Self {
            item_count,
            page_size,
            page_count,
            page_index,
            offset,
            limit,
            has_next: page_index < page_count,
            has_previous: page_index > 1,
        }
    }

    /// Whether there is nothing to fetch for this page.
    pub fn is_empty(&self) -> bool {
        self.limit == 0
    }
}

impl core::fmt::Display for Page {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "item_count: {}, page_count: {}, page_index: {}, page_size: {}, offset: {}, limit: {}",
            self.item_count, self.page_count, self.page_index, self.page_size, self.offset, self.limit
        )
    }
}

/// Parse a user-supplied page number leniently.
///
/// Anything that is not an integer, or is below 1, means page 1.
pub fn page_index(raw: &str) -> u64 {
    match raw.trim().parse::<i64>() {
        Ok(p) if p >= 1 => p as u64,
        _ => 1,
    }
}
