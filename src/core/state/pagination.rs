//! Pagination arithmetic for paginated feeds

use std::num::NonZeroU32;

/// Page position and size of a paginated feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    page_size: NonZeroU32,
    current_page: u32,
    total_count: u64,
}

impl PaginationState {
    /// Create a new pagination state at page 1 with nothing known yet
    pub fn new(page_size: NonZeroU32) -> Self {
        Self {
            page_size,
            current_page: 1,
            total_count: 0,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.get()
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Latest total reported upstream
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// `ceil(total_count / page_size)`, always derived from the latest total
    pub fn page_count(&self) -> u64 {
        self.total_count.div_ceil(u64::from(self.page_size.get()))
    }

    /// Move to `page`. Page indices are 1-based; returns false for 0.
    pub fn set_current_page(&mut self, page: u32) -> bool {
        if page == 0 {
            return false;
        }
        self.current_page = page;
        true
    }

    pub fn set_total_count(&mut self, total_count: u64) {
        self.total_count = total_count;
    }

    /// Page after the current one, if the known total says it exists
    pub fn next_page(&self) -> Option<u32> {
        if u64::from(self.current_page) >= self.page_count() {
            None
        } else {
            self.current_page.checked_add(1)
        }
    }

    /// Back to page 1 with an unknown total
    pub fn reset(&mut self) {
        self.current_page = 1;
        self.total_count = 0;
    }
}
