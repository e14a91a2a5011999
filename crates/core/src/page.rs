//! Offset pagination for list queries.

use serde::Serialize;

use crate::error::{DomainError, DomainResult};

/// A validated page request (1-based page number).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    pub const DEFAULT_PAGE: u32 = 1;
    pub const DEFAULT_PAGE_SIZE: u32 = 50;
    pub const MAX_PAGE_SIZE: u32 = 500;

    /// Build a page request, applying defaults for missing values.
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> DomainResult<Self> {
        let page = page.unwrap_or(Self::DEFAULT_PAGE);
        let page_size = page_size.unwrap_or(Self::DEFAULT_PAGE_SIZE);

        if page == 0 {
            return Err(DomainError::validation("page must be >= 1"));
        }
        if page_size == 0 || page_size > Self::MAX_PAGE_SIZE {
            return Err(DomainError::validation(format!(
                "pageSize must be between 1 and {}",
                Self::MAX_PAGE_SIZE
            )));
        }

        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    /// Slice an already ordered collection down to this page.
    pub fn apply<T>(&self, ordered: Vec<T>) -> Page<T> {
        let total = ordered.len() as u64;
        let items = ordered
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.page_size as usize)
            .collect();
        Page {
            items,
            total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus the total row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}
