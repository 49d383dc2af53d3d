use serde::Serialize;

use crate::error::EmporiumError;

/// Upper bound for a client-supplied page size.
pub const MAX_PER_PAGE: u32 = 100;

/// Offset pagination request. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    /// Missing or non-positive `page` means 1; `per_page` is clamped to `1..=MAX_PER_PAGE`.
    pub fn new(page: Option<i64>, per_page: Option<i64>, default_per_page: u32) -> Self {
        let page = page
            .filter(|p| *p > 0)
            .map(|p| u32::try_from(p).unwrap_or(u32::MAX))
            .unwrap_or(1);
        let per_page = per_page
            .map(|p| p.clamp(1, i64::from(MAX_PER_PAGE)) as u32)
            .unwrap_or(default_per_page)
            .clamp(1, MAX_PER_PAGE);
        Self { page, per_page }
    }

    pub fn total_pages(&self, total_posts: i64) -> u32 {
        let total = u64::try_from(total_posts).unwrap_or(0);
        let pages = total.div_ceil(u64::from(self.per_page));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// `LIMIT` / `OFFSET` for this page, `None` when nothing matches.
    ///
    /// Asking past the last page is a NotFound.
    pub fn window(&self, total_posts: i64) -> Result<Option<(i64, i64)>, EmporiumError> {
        let total_pages = self.total_pages(total_posts);
        if total_pages == 0 {
            return Ok(None);
        }
        if self.page > total_pages {
            return Err(EmporiumError::not_found("Page not found"));
        }
        let limit = i64::from(self.per_page);
        Ok(Some((limit, (i64::from(self.page) - 1) * limit)))
    }
}

/// One page of results plus the counters every list endpoint reports.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: u32,
    pub page: u32,
    pub total_posts: i64,
    pub per_page: u32,
}

impl<T> Page<T> {
    pub fn empty(per_page: u32) -> Self {
        Self {
            items: Vec::new(),
            total_pages: 0,
            page: 1,
            total_posts: 0,
            per_page,
        }
    }

    /// Same counters, different items (e.g. rows with their relations resolved).
    pub fn with_items<U>(self, items: Vec<U>) -> Page<U> {
        Page {
            items,
            total_pages: self.total_pages,
            page: self.page,
            total_posts: self.total_posts,
            per_page: self.per_page,
        }
    }
}
