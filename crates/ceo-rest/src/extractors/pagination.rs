//! Pagination extractor.

use ceo_core::PageRequest;
use serde::Deserialize;

/// Query parameters for pagination (`?page=&limit=`, pages start at 1).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl From<PaginationQuery> for PageRequest {
    fn from(query: PaginationQuery) -> Self {
        PageRequest::new(
            query.page.unwrap_or(1),
            query.limit.unwrap_or(PageRequest::DEFAULT_LIMIT),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let page: PageRequest = PaginationQuery::default().into();
        assert_eq!(page, PageRequest::new(1, 10));
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let page: PageRequest = PaginationQuery {
            page: Some(0),
            limit: Some(1000),
        }
        .into();
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, PageRequest::MAX_LIMIT);
    }
}
