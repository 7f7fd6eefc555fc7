//! Filtering and pagination over a snapshot.
//!
//! Queries are plain values; selecting a page never mutates the snapshot.

use super::aging::{timeline_status, TimelineStatus};
use crate::models::{ItemKind, ItemStatus, Severity, TrackedItem};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Filter criteria. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemQuery {
    /// Case-insensitive substring over id, title and description.
    pub search: Option<String>,
    pub status: Option<ItemStatus>,
    pub severity: Option<Severity>,
    pub timeline: Option<TimelineStatus>,
    pub kind: Option<ItemKind>,
}

impl ItemQuery {
    /// Whether any criterion is set.
    pub fn is_filtered(&self) -> bool {
        self.search.is_some()
            || self.status.is_some()
            || self.severity.is_some()
            || self.timeline.is_some()
            || self.kind.is_some()
    }

    pub fn matches(&self, item: &TrackedItem, now: NaiveDateTime) -> bool {
        if let Some(ref term) = self.search {
            let term = term.to_lowercase();
            let hit = item.title.to_lowercase().contains(&term)
                || item.description.to_lowercase().contains(&term)
                || item.id.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }

        if let Some(ref status) = self.status {
            if &item.status != status {
                return false;
            }
        }

        if self.severity.is_some() && item.severity != self.severity {
            return false;
        }

        if let Some(kind) = self.kind {
            if item.kind != kind {
                return false;
            }
        }

        if let Some(timeline) = self.timeline {
            if timeline_status(item, now).status != timeline {
                return false;
            }
        }

        true
    }

    /// Items matching the query, in snapshot order.
    pub fn apply<'a>(&self, items: &'a [TrackedItem], now: NaiveDateTime) -> Vec<&'a TrackedItem> {
        items.iter().filter(|item| self.matches(item, now)).collect()
    }
}

/// A page of filtered items.
#[derive(Debug, Clone, Serialize)]
pub struct Page<'a> {
    pub items: Vec<&'a TrackedItem>,
    /// 1-based page number actually returned.
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    /// Number of items matching the query.
    pub total_items: usize,
    /// 1-based position of the first item on the page, 0 when empty.
    pub start_index: usize,
    /// 1-based position of the last item on the page, 0 when empty.
    pub end_index: usize,
}

/// Filter `items` and slice out one page.
///
/// `page` is 1-based and clamped to `[1, total_pages]`; a `page_size` of 0
/// is treated as 1.
pub fn select_page<'a>(
    items: &'a [TrackedItem],
    query: &ItemQuery,
    page: usize,
    page_size: usize,
    now: NaiveDateTime,
) -> Page<'a> {
    let page_size = page_size.max(1);
    let filtered = query.apply(items, now);
    let total_items = filtered.len();
    let total_pages = total_items.div_ceil(page_size);
    let page = page.clamp(1, total_pages.max(1));

    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total_items);
    let page_items: Vec<&TrackedItem> = filtered
        .into_iter()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect();

    let (start_index, end_index) = if page_items.is_empty() {
        (0, 0)
    } else {
        (start + 1, end)
    };

    Page {
        items: page_items,
        page,
        page_size,
        total_pages,
        total_items,
        start_index,
        end_index,
    }
}

/// One entry in a pagination strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageLink {
    Number(usize),
    Ellipsis,
}

/// Default number of page links shown before collapsing with ellipses.
pub const MAX_VISIBLE_PAGES: usize = 5;

/// Page links around `current`: the first and last page, the neighbours of
/// `current`, and ellipses where pages are skipped.
pub fn page_strip(current: usize, total_pages: usize, max_visible: usize) -> Vec<PageLink> {
    if total_pages <= max_visible.max(1) {
        return (1..=total_pages).map(PageLink::Number).collect();
    }

    let mut links = vec![PageLink::Number(1)];

    if current > 3 {
        links.push(PageLink::Ellipsis);
    }

    let start = current.saturating_sub(1).max(2);
    let end = (current + 1).min(total_pages - 1);
    links.extend((start..=end).map(PageLink::Number));

    if current + 2 < total_pages {
        links.push(PageLink::Ellipsis);
    }

    links.push(PageLink::Number(total_pages));
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use super::PageLink::{Ellipsis, Number};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn snapshot(n: usize) -> Vec<TrackedItem> {
        (0..n)
            .map(|i| TrackedItem::new(format!("F-{i:03}"), now() - Duration::days(i as i64)))
            .collect()
    }

    #[test]
    fn test_select_page_indices() {
        let items = snapshot(23);
        let page = select_page(&items, &ItemQuery::default(), 3, 10, now());

        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 23);
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.start_index, 21);
        assert_eq!(page.end_index, 23);
        assert_eq!(page.items[0].id, "F-020");
    }

    #[test]
    fn test_select_page_clamps_page_number() {
        let items = snapshot(5);

        let past_end = select_page(&items, &ItemQuery::default(), 9, 2, now());
        assert_eq!(past_end.page, 3);
        assert_eq!(past_end.items.len(), 1);

        let zero = select_page(&items, &ItemQuery::default(), 0, 2, now());
        assert_eq!(zero.page, 1);
        assert_eq!(zero.start_index, 1);
    }

    #[test]
    fn test_select_page_of_empty_snapshot() {
        let page = select_page(&[], &ItemQuery::default(), 1, 10, now());

        assert_eq!(page.total_pages, 0);
        assert_eq!(page.page, 1);
        assert!(page.items.is_empty());
        assert_eq!((page.start_index, page.end_index), (0, 0));
    }

    #[test]
    fn test_zero_page_size_is_treated_as_one() {
        let items = snapshot(3);
        let page = select_page(&items, &ItemQuery::default(), 2, 0, now());

        assert_eq!(page.page_size, 1);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items[0].id, "F-001");
    }

    #[test]
    fn test_query_filters() {
        let mut items = snapshot(4);
        items[0].title = "Weak password policy".to_string();
        items[1].description = "Password rotation not enforced".to_string();
        items[2].status = ItemStatus::Closed;
        items[3].severity = Some(Severity::High);
        items[3] = items[3].clone().with_due_date(now() - Duration::days(1));

        let search = ItemQuery {
            search: Some("PASSWORD".to_string()),
            ..ItemQuery::default()
        };
        assert_eq!(search.apply(&items, now()).len(), 2);

        let closed = ItemQuery {
            status: Some(ItemStatus::Closed),
            ..ItemQuery::default()
        };
        assert_eq!(closed.apply(&items, now())[0].id, "F-002");

        let high = ItemQuery {
            severity: Some(Severity::High),
            ..ItemQuery::default()
        };
        assert_eq!(high.apply(&items, now()).len(), 1);

        let overdue = ItemQuery {
            timeline: Some(TimelineStatus::Overdue),
            ..ItemQuery::default()
        };
        assert_eq!(overdue.apply(&items, now())[0].id, "F-003");

        let gaps = ItemQuery {
            kind: Some(ItemKind::Gap),
            ..ItemQuery::default()
        };
        assert!(gaps.apply(&items, now()).is_empty());
        assert!(gaps.is_filtered());
        assert!(!ItemQuery::default().is_filtered());
    }

    #[test]
    fn test_page_strip_small_total() {
        assert_eq!(page_strip(1, 0, 5), vec![]);
        assert_eq!(page_strip(2, 3, 5), vec![Number(1), Number(2), Number(3)]);
        assert_eq!(page_strip(1, 1, 0), vec![Number(1)]);
    }

    #[test]
    fn test_page_strip_collapses_long_ranges() {
        assert_eq!(
            page_strip(1, 10, 5),
            vec![Number(1), Number(2), Ellipsis, Number(10)]
        );
        assert_eq!(
            page_strip(5, 10, 5),
            vec![Number(1), Ellipsis, Number(4), Number(5), Number(6), Ellipsis, Number(10)]
        );
        assert_eq!(
            page_strip(10, 10, 5),
            vec![Number(1), Ellipsis, Number(9), Number(10)]
        );
        assert_eq!(
            page_strip(3, 6, 5),
            vec![Number(1), Number(2), Number(3), Number(4), Ellipsis, Number(6)]
        );
    }
}
