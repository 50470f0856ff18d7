use serde::{Deserialize, Serialize};

use crate::config::ReportingConfig;
use crate::error::ReportError;

/// Requested page (1-based). `page_size: None` means the configured default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: Option<u32>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: None,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size: Some(page_size),
        }
    }

    /// Effective `(page, page_size)`; oversized pages are clamped to the max.
    pub fn resolve(&self, config: &ReportingConfig) -> Result<(u32, u32), ReportError> {
        if self.page == 0 {
            return Err(ReportError::validation("page numbers start at 1"));
        }
        let size = match self.page_size {
            Some(0) => return Err(ReportError::validation("page_size must be positive")),
            Some(size) => size.min(config.max_page_size),
            None => config.default_page_size,
        };
        Ok((self.page, size))
    }
}

/// One page of report rows plus the totals needed to render pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total_count: usize,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Slice already-sorted `rows`; a page past the end is empty.
    pub fn from_sorted(rows: Vec<T>, page: u32, page_size: u32) -> Self {
        let total_count = rows.len();
        let size = page_size.max(1) as usize;
        let total_pages = u32::try_from(total_count.div_ceil(size)).unwrap_or(u32::MAX);
        let skip = (page.saturating_sub(1) as usize).saturating_mul(size);

        let items = rows.into_iter().skip(skip).take(size).collect();

        Self {
            items,
            page,
            page_size,
            total_count,
            total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}
