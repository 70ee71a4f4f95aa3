//! Pagination types.

use crate::record::Record;

/// One page of upstream records plus pagination metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Records in upstream order.
    pub records: Vec<Record>,
    /// Current page number, 1-based.
    pub page: u32,
    /// Total number of pages, always at least 1.
    pub page_count: u32,
    /// Total number of records across all pages.
    pub total: u64,
}

impl Page {
    /// Create a page, clamping `page_count` to at least 1.
    ///
    /// Upstreams report `pageCount = 0` for an empty collection; that is read
    /// as a single empty page.
    pub fn new(records: Vec<Record>, page: u32, page_count: u32, total: u64) -> Self {
        Self {
            records,
            page,
            page_count: page_count.max(1),
            total,
        }
    }

    /// Whether the page is empty although the upstream reports records,
    /// either through `total` or through pages still to come.
    pub fn is_unexpectedly_empty(&self) -> bool {
        self.records.is_empty() && (self.total > 0 || self.page < self.page_count)
    }
}
