//! Pagination utilities for the listing contract.
//!
//! The listing promises `total_pages == ceil(total / per_page)` for
//! whatever `per_page` the caller sends, so normalization clamps the
//! zero lower bounds and nothing else.

/// Pagination parameters
#[derive(Clone, Copy, Debug)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    /// Clamp zero inputs to 1 and convert to the 0-based page index and
    /// page size pair the paginator expects.
    pub fn normalize(self) -> (u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = if self.per_page == 0 { 1 } else { self.per_page };
        ((page - 1) as u64, per_page as u64)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 10 } }
}
