use serde::{Deserialize, Serialize};

use crate::config;

/// Offset/limit query parameters shared by every collection endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> i64 {
        let api = &config::config().api;
        self.limit
            .unwrap_or(api.default_page_size)
            .clamp(1, api.max_page_size)
    }
}

/// Collection envelope: total count plus the current page.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub results: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamping() {
        let p = Pagination::default();
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), config::config().api.default_page_size);

        let p = Pagination {
            offset: Some(-5),
            limit: Some(0),
        };
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 1);

        let p = Pagination {
            offset: Some(40),
            limit: Some(i64::MAX),
        };
        assert_eq!(p.offset(), 40);
        assert_eq!(p.limit(), config::config().api.max_page_size);
    }
}
