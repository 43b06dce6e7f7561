//! Filtered, paginated list views.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::error::AdminError;

/// Rows per page unless the view says otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Number of pages needed for `total` rows: `ceil(total / page_size)`.
#[must_use]
pub fn page_count(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    u32::try_from(total.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
}

/// A filter set for one kind of row.
pub trait ListFilter: Clone + PartialEq {
    type Item;

    /// Whether `item` passes every active filter.
    fn matches(&self, item: &Self::Item) -> bool;

    /// Active filters as query parameters.
    fn query_pairs(&self) -> Vec<(&'static str, String)>;
}

/// Parse a filter choice. `"all"` and blank mean no filter.
///
/// # Errors
///
/// Returns `AdminError::InvalidFilter` for values `T` does not know.
pub fn choice<T>(field: &'static str, value: &str) -> Result<Option<T>, AdminError>
where
    T: FromStr,
    T::Err: Display,
{
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|e: T::Err| AdminError::InvalidFilter {
            field,
            message: e.to_string(),
        })
}

/// Whether `at` falls inside the inclusive day range.
///
/// Rows without a timestamp only pass when no bound is set.
pub(crate) fn within_dates(
    at: Option<DateTime<Utc>>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> bool {
    if start.is_none() && end.is_none() {
        return true;
    }
    let Some(at) = at else {
        return false;
    };
    let day = at.date_naive();
    start.is_none_or(|s| day >= s) && end.is_none_or(|e| day <= e)
}

/// Case-insensitive substring match on any of `fields`.
pub(crate) fn search_matches<'a>(
    needle: &str,
    fields: impl IntoIterator<Item = Option<&'a str>>,
) -> bool {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    fields
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// A day as a query parameter value.
pub(crate) fn day_param(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Pagination metadata some list endpoints return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// One page of rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }
}

// =============================================================================
// ListView
// =============================================================================

/// Filters, page size and current page of a list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView<F> {
    filters: F,
    page: u32,
    page_size: u32,
}

impl<F: ListFilter + Default> Default for ListView<F> {
    fn default() -> Self {
        Self::new(F::default())
    }
}

impl<F: ListFilter> ListView<F> {
    #[must_use]
    pub const fn new(filters: F) -> Self {
        Self {
            filters,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    #[must_use]
    pub const fn filters(&self) -> &F {
        &self.filters
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Replace the filters. Any change goes back to page 1.
    pub fn set_filters(&mut self, filters: F) {
        if filters != self.filters {
            self.filters = filters;
            self.page = 1;
        }
    }

    /// Edit the filters in place. Any change goes back to page 1.
    pub fn update_filters(&mut self, edit: impl FnOnce(&mut F)) {
        let mut filters = self.filters.clone();
        edit(&mut filters);
        self.set_filters(filters);
    }

    /// Go to `page` (1-based; 0 is treated as 1).
    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Change rows per page and go back to page 1.
    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    /// Filters plus `page` and `limit`.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.filters.query_pairs();
        pairs.push(("page", self.page.to_string()));
        pairs.push(("limit", self.page_size.to_string()));
        pairs
    }

    /// Build the current page from a server response.
    ///
    /// With `meta` the server already filtered and paged `items`. Without it
    /// `items` is the full list, filtered and sliced here.
    #[must_use]
    pub fn paginate(&self, items: Vec<F::Item>, meta: Option<PageMeta>) -> Page<F::Item> {
        if let Some(meta) = meta {
            return Page {
                items,
                page: meta.page.unwrap_or(self.page),
                page_size: self.page_size,
                total: meta.total,
                total_pages: meta
                    .total_pages
                    .unwrap_or_else(|| page_count(meta.total, self.page_size)),
            };
        }

        let filtered: Vec<F::Item> = items
            .into_iter()
            .filter(|item| self.filters.matches(item))
            .collect();
        let total = filtered.len() as u64;
        let start = (self.page as usize - 1).saturating_mul(self.page_size as usize);

        Page {
            items: filtered
                .into_iter()
                .skip(start)
                .take(self.page_size as usize)
                .collect(),
            page: self.page,
            page_size: self.page_size,
            total,
            total_pages: page_count(total, self.page_size),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct EvenOnly(bool);

    impl ListFilter for EvenOnly {
        type Item = u32;

        fn matches(&self, item: &u32) -> bool {
            !self.0 || item % 2 == 0
        }

        fn query_pairs(&self) -> Vec<(&'static str, String)> {
            if self.0 {
                vec![("even", "true".to_string())]
            } else {
                vec![]
            }
        }
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(1, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(95, 10), 10);
        assert_eq!(page_count(5, 0), 0);
    }

    #[test]
    fn test_filter_change_resets_page() {
        let mut view = ListView::new(EvenOnly(false));
        view.set_page(3);

        view.set_filters(EvenOnly(false));
        assert_eq!(view.page(), 3, "unchanged filters keep the page");

        view.update_filters(|f| f.0 = true);
        assert_eq!(view.page(), 1);

        view.set_page(2);
        view.set_page_size(25);
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn test_in_memory_pagination() {
        let mut view = ListView::new(EvenOnly(true));
        view.set_page(2);
        let page = view.paginate((1..=30).collect(), None);

        assert_eq!(page.total, 15);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items, vec![22, 24, 26, 28, 30]);
        assert!(page.has_previous());
        assert!(!page.has_next());
    }

    #[test]
    fn test_page_past_the_end_is_empty() {
        let mut view = ListView::new(EvenOnly(false));
        view.set_page(9);
        let page = view.paginate(vec![1, 2, 3], None);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_server_pagination_is_trusted() {
        let mut view = ListView::new(EvenOnly(true));
        view.set_page(4);
        let page = view.paginate(
            vec![1, 3],
            Some(PageMeta {
                total: 42,
                page: None,
                total_pages: None,
            }),
        );
        assert_eq!(page.items, vec![1, 3]);
        assert_eq!(page.page, 4);
        assert_eq!(page.total_pages, 5);
    }

    #[test]
    fn test_query_pairs() {
        let view = ListView::new(EvenOnly(true));
        assert_eq!(
            view.query_pairs(),
            vec![
                ("even", "true".to_string()),
                ("page", "1".to_string()),
                ("limit", "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_choice() {
        use book_kart_core::types::OrderStatus;

        assert_eq!(choice::<OrderStatus>("status", "all").unwrap(), None);
        assert_eq!(choice::<OrderStatus>("status", " ").unwrap(), None);
        assert_eq!(
            choice::<OrderStatus>("status", "Shipped").unwrap(),
            Some(OrderStatus::Shipped)
        );
        assert!(choice::<OrderStatus>("status", "lost").is_err());
    }

    #[test]
    fn test_within_dates() {
        let at = "2024-05-10T23:30:00Z".parse::<DateTime<Utc>>().unwrap();
        let day = |s: &str| s.parse::<NaiveDate>().unwrap();

        assert!(within_dates(Some(at), None, None));
        assert!(within_dates(None, None, None));
        assert!(!within_dates(None, Some(day("2024-05-01")), None));
        assert!(within_dates(Some(at), Some(day("2024-05-10")), Some(day("2024-05-10"))));
        assert!(!within_dates(Some(at), Some(day("2024-05-11")), None));
    }

    #[test]
    fn test_search_matches() {
        assert!(search_matches("", [None]));
        assert!(search_matches("ASHA", [Some("o1"), Some("Asha Rao")]));
        assert!(!search_matches("ravi", [Some("o1"), None]));
    }
}
