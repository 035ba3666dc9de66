//! Page requests and paged results shared by every list operation.

use serde::{Deserialize, Serialize};

use crate::validation::ValidationErrors;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// A validated page request: `page >= 1`, `1 <= limit <= MAX_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build a page request from raw query parameters.
    ///
    /// Missing values fall back to `page = 1` and `limit = 10`; values that
    /// are present but out of range are rejected.
    pub fn from_params(page: Option<i64>, limit: Option<i64>) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let page = match page {
            None => DEFAULT_PAGE,
            Some(p) if p >= 1 && p <= i64::from(u32::MAX) => p as u32,
            Some(p) => {
                errors.add("page", format!("must be a positive integer, got {}", p));
                DEFAULT_PAGE
            }
        };

        let limit = match limit {
            None => DEFAULT_LIMIT,
            Some(l) if l >= 1 && l <= i64::from(MAX_LIMIT) => l as u32,
            Some(l) => {
                errors.add(
                    "limit",
                    format!("must be between 1 and {}, got {}", MAX_LIMIT, l),
                );
                DEFAULT_LIMIT
            }
        };

        errors.into_result(Self { page, limit })
    }

    pub fn new(page: u32, limit: u32) -> Result<Self, ValidationErrors> {
        Self::from_params(Some(i64::from(page)), Some(i64::from(limit)))
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of items preceding this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// One page of an ordered, filtered result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Size of the whole filtered set, not of this page.
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let limit = u64::from(request.limit);
        let total_pages = total.div_ceil(limit).min(u64::from(u32::MAX)) as u32;
        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
            total_pages,
        }
    }

    /// Slice an already filtered and ordered set.
    pub fn from_ordered(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(request.offset().min(usize::MAX as u64) as usize)
            .take(request.limit as usize)
            .collect();
        Self::new(items, total, request)
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}
