//! Pagination state shared by both history controllers.

use crate::error::ClientError;
use serde::Serialize;
use std::fmt;

/// Page sizes offered to the user.
pub const ALLOWED_PAGE_SIZES: [u32; 4] = [5, 10, 20, 50];

/// A page size drawn from [`ALLOWED_PAGE_SIZES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PageSize(u32);

impl PageSize {
    pub const DEFAULT: PageSize = PageSize(10);

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for PageSize {
    type Error = ClientError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if ALLOWED_PAGE_SIZES.contains(&value) {
            Ok(Self(value))
        } else {
            Err(ClientError::validation(format!(
                "Items per page must be one of 5, 10, 20 or 50, got {value}"
            )))
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position within the paginated history.
///
/// Invariants: `1 <= current_page <= total_pages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub items_per_page: PageSize,
}

impl PaginationState {
    /// Builds a state, widening `total_pages` so it never falls below
    /// `current_page`.
    pub fn new(current_page: u32, total_pages: u32, total_items: u64, items_per_page: PageSize) -> Self {
        let current_page = current_page.max(1);
        Self {
            current_page,
            total_pages: total_pages.max(current_page),
            total_items,
            items_per_page,
        }
    }

    pub fn contains_page(&self, page: u32) -> bool {
        (1..=self.total_pages).contains(&page)
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new(1, 1, 0, PageSize::DEFAULT)
    }
}
