//! Pagination arithmetic and list-parameter normalization.

use serde::Serialize;

/// Default page size when the request does not specify one.
pub const DEFAULT_LIMIT: u64 = 20;
/// Hard ceiling on the page size.
pub const MAX_LIMIT: u64 = 100;

/// Derived pagination metadata, computed fresh per request. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    /// Offset into the result set; internal, not part of the response.
    #[serde(skip)]
    pub skip: u64,
}

/// Compute the page descriptor for `total_items` results.
///
/// Assumes `limit >= 1`; callers normalize parameters first (see
/// [`ListParams::normalize`]). There is no upper clamp on `page`: a page
/// beyond the end yields an empty result with `has_next_page = false`.
pub fn paginate(page: u64, limit: u64, total_items: u64) -> Page {
    let total_pages = total_items.div_ceil(limit);
    Page {
        current_page: page,
        total_pages,
        total_items,
        items_per_page: limit,
        has_next_page: page < total_pages,
        has_previous_page: page > 1,
        skip: (page - 1) * limit,
    }
}

/// Normalized list-query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub page: u64,
    pub limit: u64,
    pub search: Option<String>,
}

impl ListParams {
    /// Normalize raw query parameters: `page` defaults to 1 when missing or
    /// non-positive, `limit` defaults to 20 and clamps to 100, `search` is
    /// trimmed and dropped when empty.
    pub fn normalize(page: Option<i64>, limit: Option<i64>, search: Option<String>) -> Self {
        let page = match page {
            Some(p) if p >= 1 => p as u64,
            _ => 1,
        };
        let limit = match limit {
            Some(l) if l >= 1 => (l as u64).min(MAX_LIMIT),
            _ => DEFAULT_LIMIT,
        };
        let search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self { page, limit, search }
    }
}
