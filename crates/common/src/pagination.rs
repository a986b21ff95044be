//! Page-number pagination for order listings

use serde::{Deserialize, Serialize};

/// Page size used when the caller does not ask for one
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Upper bound on a caller-requested page size
pub const MAX_PAGE_SIZE: u64 = 100;

/// `?page=&page_size=` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageRequest {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl PageRequest {
    /// 1-based page number
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

/// One page of results
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<u64>,
    pub previous: Option<u64>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, count: u64, request: &PageRequest) -> Self {
        let page = request.page();
        let pages = count.div_ceil(request.page_size());

        Self {
            count,
            next: (page < pages).then_some(page + 1),
            previous: (page > 1).then(|| page - 1),
            results,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}
