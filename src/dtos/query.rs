//! Query DTOs - query-string parameters of the list endpoints

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const USER_EVENTS_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 100;

/// `?page=&limit=` (or `page_size=`). Raw text; see [`PageQuery::resolve`].
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct PageQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub limit: Option<String>,
}

impl PageQuery {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: Some(page.to_string()),
            page_size: Some(page_size.to_string()),
            limit: None,
        }
    }

    /// Unparsable or out-of-range values fall back to the defaults instead of failing.
    pub fn resolve(&self, default_size: u32) -> Pagination {
        let page = self
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        let page_size = self
            .page_size
            .as_deref()
            .or(self.limit.as_deref())
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|s| (1..=MAX_PAGE_SIZE).contains(s))
            .unwrap_or(default_size);
        Pagination { page, page_size }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn meta(&self, total: i64) -> PaginationMeta {
        let size = i64::from(self.page_size);
        PaginationMeta {
            page: self.page,
            page_size: self.page_size,
            total,
            total_pages: (total + size - 1) / size,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
    pub total_pages: i64,
}

/// Filters accepted by `GET /api/events` and `GET /api/events/upcoming`.
/// Kept as text so a bad value maps to a JSON 400; empty means absent.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct EventFilterQuery {
    pub event_type: Option<String>,
    pub status: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// `YYYY-MM-DD` bounds, both inclusive
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RsvpFilterQuery {
    pub response: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>, page_size: Option<&str>, limit: Option<&str>) -> PageQuery {
        PageQuery {
            page: page.map(String::from),
            page_size: page_size.map(String::from),
            limit: limit.map(String::from),
        }
    }

    #[test]
    fn defaults_apply_when_missing_or_out_of_range() {
        let p = PageQuery::default().resolve(DEFAULT_PAGE_SIZE);
        assert_eq!(p, Pagination { page: 1, page_size: 10 });

        let p = query(Some("0"), Some("500"), None).resolve(DEFAULT_PAGE_SIZE);
        assert_eq!(p, Pagination { page: 1, page_size: 10 });

        let p = query(Some("-3"), None, Some("abc")).resolve(USER_EVENTS_PAGE_SIZE);
        assert_eq!(p, Pagination { page: 1, page_size: 50 });
    }

    #[test]
    fn limit_is_an_alias_of_page_size() {
        let p = query(Some("3"), None, Some("20")).resolve(DEFAULT_PAGE_SIZE);
        assert_eq!(p, Pagination { page: 3, page_size: 20 });
        assert_eq!(p.offset(), 40);
    }

    #[test]
    fn total_pages_round_up() {
        let p = Pagination { page: 1, page_size: 10 };
        assert_eq!(p.meta(0).total_pages, 0);
        assert_eq!(p.meta(10).total_pages, 1);
        assert_eq!(p.meta(11).total_pages, 2);
    }
}
