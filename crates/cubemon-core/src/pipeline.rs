//! Filter / aggregate / paginate pipeline
//!
//! Pure functions over a read-only record list:
//! - filter_transactions: subset matching every active criterion
//! - compute_stats: today's counts over the filtered set, robots over the full set
//! - paginate: fixed-size 1-based page slice
//! - page_labels: page numbers and ellipses for the pagination control

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use cubemon_source::{Location, Transaction, TransactionStatus, TransactionType};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::time::local_date;

/// Records per page unless configured otherwise
pub const DEFAULT_PAGE_SIZE: usize = 20;

// ==================== Filter Criteria ====================

/// Active filters. `None` / empty means "any".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub location: Option<Location>,
    pub transaction_type: Option<TransactionType>,
    pub status: Option<TransactionStatus>,
    pub search: String,
    pub date: Option<NaiveDate>,
}

/// Parse a selector value; `all`, empty and unknown values mean "any"
fn parse_selector<T: std::str::FromStr>(value: Option<&String>) -> Option<T> {
    let value = value?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("all") {
        return None;
    }
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            log::debug!("Ignoring unknown filter value '{}'", value);
            None
        }
    }
}

impl FilterCriteria {
    /// Build criteria from query parameters (`location`, `type`, `status`, `q`, `date`)
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        Self {
            location: parse_selector(params.get("location")),
            transaction_type: parse_selector(params.get("type")),
            status: parse_selector(params.get("status")),
            search: params.get("q").cloned().unwrap_or_default(),
            date: params
                .get("date")
                .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok()),
        }
    }

    /// Query parameters describing these criteria, "any" fields omitted
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(location) = self.location {
            params.push(("location", location.code().to_string()));
        }
        if let Some(kind) = self.transaction_type {
            params.push(("type", kind.as_str().to_string()));
        }
        if let Some(status) = self.status {
            params.push(("status", status.as_str().to_string()));
        }
        if !self.search.is_empty() {
            params.push(("q", self.search.clone()));
        }
        if let Some(date) = self.date {
            params.push(("date", date.format("%Y-%m-%d").to_string()));
        }
        params
    }

    /// Number of criteria that restrict the result
    pub fn active_count(&self) -> usize {
        [
            self.location.is_some(),
            self.transaction_type.is_some(),
            self.status.is_some(),
            !self.search.is_empty(),
            self.date.is_some(),
        ]
        .iter()
        .filter(|active| **active)
        .count()
    }

    /// Check one record against every active criterion, dates seen from `tz`
    pub fn matches_in<Tz: TimeZone>(&self, tx: &Transaction, tz: &Tz) -> bool {
        let matches_location = self.location.map_or(true, |l| tx.location_name == l);
        let matches_type = self.transaction_type.map_or(true, |t| tx.transaction_type == t);
        let matches_status = self.status.map_or(true, |s| tx.status == s);
        let matches_search = tx.matches_identifier(&self.search.to_lowercase());
        let matches_date = self.date.map_or(true, |d| local_date(&tx.created_at, tz) == d);

        matches_location && matches_type && matches_status && matches_search && matches_date
    }
}

/// Records matching `criteria`, in source order, dates seen in local time
pub fn filter_transactions<'a>(
    records: &'a [Transaction],
    criteria: &FilterCriteria,
) -> Vec<&'a Transaction> {
    filter_transactions_in(records, criteria, &Local)
}

pub fn filter_transactions_in<'a, Tz: TimeZone>(
    records: &'a [Transaction],
    criteria: &FilterCriteria,
    tz: &Tz,
) -> Vec<&'a Transaction> {
    records.iter().filter(|tx| criteria.matches_in(tx, tz)).collect()
}

// ==================== Statistics ====================

/// Summary card values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_transactions: usize,
    pub inbound_transactions: usize,
    pub pickup_transactions: usize,
    pub active_robots: usize,
}

/// Counts over filtered records created at or after `since`; robot count
/// over the whole unfiltered `source`
pub fn compute_stats(
    source: &[Transaction],
    filtered: &[&Transaction],
    since: DateTime<Utc>,
) -> DashboardStats {
    let today: Vec<&&Transaction> = filtered.iter().filter(|t| t.created_at >= since).collect();
    let inbound = today
        .iter()
        .filter(|t| t.transaction_type == TransactionType::Inbound)
        .count();
    let pickup = today
        .iter()
        .filter(|t| t.transaction_type == TransactionType::Pickup)
        .count();
    let robots: HashSet<&str> = source.iter().map(|t| t.robot_id.as_str()).collect();

    DashboardStats {
        total_transactions: today.len(),
        inbound_transactions: inbound,
        pickup_transactions: pickup,
        active_robots: robots.len(),
    }
}

// ==================== Pagination ====================

/// One page of a larger list
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number that was requested
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    /// Never less than 1, even for an empty list
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// `ceil(total_items / page_size)`, at least 1
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    ((total_items + page_size - 1) / page_size).max(1)
}

/// Clamp a requested page into `[1, total_pages]`
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Slice `[(page-1)*size, page*size)` of `items`. Pages outside
/// `[1, total_pages]` yield an empty slice.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let slice = if page == 0 {
        &[][..]
    } else {
        let start = (page - 1).saturating_mul(page_size).min(total_items);
        let end = page.saturating_mul(page_size).min(total_items);
        &items[start..end]
    };

    Page {
        items: slice.to_vec(),
        page,
        page_size,
        total_items,
        total_pages: total_pages(total_items, page_size),
    }
}

// ==================== Pagination Labels ====================

/// An entry in the pagination control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLabel {
    Page(usize),
    Ellipsis,
}

impl std::fmt::Display for PageLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageLabel::Page(n) => write!(f, "{}", n),
            PageLabel::Ellipsis => write!(f, "..."),
        }
    }
}

const MAX_VISIBLE_PAGES: usize = 5;

/// Page labels for `current` of `total`: at most five numbers, the first and
/// last always reachable, gaps shown as ellipses
pub fn page_labels(current: usize, total: usize) -> Vec<PageLabel> {
    if total <= MAX_VISIBLE_PAGES {
        return (1..=total).map(PageLabel::Page).collect();
    }

    let mut labels = Vec::with_capacity(7);
    if current <= 3 {
        labels.extend((1..=4).map(PageLabel::Page));
        labels.push(PageLabel::Ellipsis);
        labels.push(PageLabel::Page(total));
    } else if current >= total - 2 {
        labels.push(PageLabel::Page(1));
        labels.push(PageLabel::Ellipsis);
        labels.extend((total - 3..=total).map(PageLabel::Page));
    } else {
        labels.push(PageLabel::Page(1));
        labels.push(PageLabel::Ellipsis);
        labels.extend((current - 1..=current + 1).map(PageLabel::Page));
        labels.push(PageLabel::Ellipsis);
        labels.push(PageLabel::Page(total));
    }
    labels
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};
    use cubemon_source::generate_transactions;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 15, 0, 0).unwrap()
    }

    fn fixture() -> Vec<Transaction> {
        let mut rng = StdRng::seed_from_u64(42);
        generate_transactions(&mut rng, 300, 30, now()).unwrap()
    }

    fn tx(id: &str, item: &str, tray: &str, created_at: DateTime<Utc>) -> Transaction {
        Transaction {
            id: id.to_string(),
            item_id: item.to_string(),
            tray_id: tray.to_string(),
            created_at,
            updated_at: created_at,
            quantity: 1,
            username: "Emma Davis".to_string(),
            transaction_type: TransactionType::Inbound,
            robot_id: "ROBOT-1".to_string(),
            location_name: Location::DhlMumbai,
            status: TransactionStatus::Completed,
        }
    }

    fn all_combinations() -> Vec<FilterCriteria> {
        let mut out = Vec::new();
        let locations: Vec<Option<Location>> =
            std::iter::once(None).chain(Location::ALL.iter().copied().map(Some)).collect();
        let kinds: Vec<Option<TransactionType>> =
            std::iter::once(None).chain(TransactionType::ALL.iter().copied().map(Some)).collect();
        let statuses: Vec<Option<TransactionStatus>> =
            std::iter::once(None).chain(TransactionStatus::ALL.iter().copied().map(Some)).collect();
        for location in &locations {
            for kind in &kinds {
                for status in &statuses {
                    for search in ["", "item-1", "TRAY-9"] {
                        out.push(FilterCriteria {
                            location: *location,
                            transaction_type: *kind,
                            status: *status,
                            search: search.to_string(),
                            date: None,
                        });
                    }
                }
            }
        }
        out
    }

    #[test]
    fn test_filter_has_no_false_positives_or_negatives() {
        let records = fixture();
        for criteria in all_combinations() {
            let filtered = filter_transactions_in(&records, &criteria, &Utc);
            let expected: Vec<&Transaction> = records
                .iter()
                .filter(|t| {
                    criteria.location.map_or(true, |l| t.location_name == l)
                        && criteria.transaction_type.map_or(true, |k| t.transaction_type == k)
                        && criteria.status.map_or(true, |s| t.status == s)
                        && (t.item_id.to_lowercase().contains(&criteria.search.to_lowercase())
                            || t.tray_id.to_lowercase().contains(&criteria.search.to_lowercase()))
                })
                .collect();
            assert_eq!(filtered, expected, "criteria: {:?}", criteria);
        }
    }

    #[test]
    fn test_adding_criteria_never_grows_result() {
        let records = fixture();
        let mut criteria = FilterCriteria::default();
        let mut previous = filter_transactions_in(&records, &criteria, &Utc).len();
        assert_eq!(previous, records.len());

        criteria.location = Some(Location::DhlKochi);
        let next = filter_transactions_in(&records, &criteria, &Utc).len();
        assert!(next <= previous);
        previous = next;

        criteria.transaction_type = Some(TransactionType::Pickup);
        let next = filter_transactions_in(&records, &criteria, &Utc).len();
        assert!(next <= previous);
        previous = next;

        criteria.status = Some(TransactionStatus::Failed);
        let next = filter_transactions_in(&records, &criteria, &Utc).len();
        assert!(next <= previous);
        previous = next;

        criteria.search = "1".to_string();
        let next = filter_transactions_in(&records, &criteria, &Utc).len();
        assert!(next <= previous);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let records = vec![
            tx("TXN-000001", "ITEM-500", "TRAY-1", now()),
            tx("TXN-000002", "ITEM-42", "TRAY-2", now()),
        ];
        let criteria = FilterCriteria {
            search: "item-5".to_string(),
            ..Default::default()
        };
        let filtered = filter_transactions_in(&records, &criteria, &Utc);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].item_id, "ITEM-500");
    }

    #[test]
    fn test_search_matches_tray_id() {
        let records = vec![tx("TXN-000001", "ITEM-1", "TRAY-777", now())];
        let criteria = FilterCriteria {
            search: "tray-77".to_string(),
            ..Default::default()
        };
        assert_eq!(filter_transactions_in(&records, &criteria, &Utc).len(), 1);
    }

    #[test]
    fn test_date_filter_uses_local_calendar_day() {
        let records = vec![
            tx("TXN-000001", "ITEM-1", "TRAY-1", Utc.with_ymd_and_hms(2024, 6, 14, 20, 0, 0).unwrap()),
            tx("TXN-000002", "ITEM-2", "TRAY-2", Utc.with_ymd_and_hms(2024, 6, 14, 10, 0, 0).unwrap()),
        ];
        let criteria = FilterCriteria {
            date: NaiveDate::from_ymd_opt(2024, 6, 15),
            ..Default::default()
        };
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let filtered = filter_transactions_in(&records, &criteria, &ist);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "TXN-000001");
        assert!(filter_transactions_in(&records, &criteria, &Utc).is_empty());
    }

    #[test]
    fn test_criteria_from_params() {
        let params: HashMap<String, String> = [
            ("location", "DHL_HSR"),
            ("type", "all"),
            ("status", "Pending"),
            ("q", "tray-3"),
            ("date", "2024-06-01"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let criteria = FilterCriteria::from_params(&params);
        assert_eq!(criteria.location, Some(Location::DhlHsr));
        assert_eq!(criteria.transaction_type, None);
        assert_eq!(criteria.status, Some(TransactionStatus::Pending));
        assert_eq!(criteria.search, "tray-3");
        assert_eq!(criteria.date, NaiveDate::from_ymd_opt(2024, 6, 1));
        assert_eq!(criteria.active_count(), 4);
    }

    #[test]
    fn test_search_is_taken_verbatim() {
        let records = vec![tx("TXN-000001", "ITEM-500", "TRAY-1", now())];

        let params: HashMap<String, String> = [("q".to_string(), " ".to_string())].into_iter().collect();
        let criteria = FilterCriteria::from_params(&params);
        assert_eq!(criteria.search, " ");
        assert_eq!(criteria.active_count(), 1);
        assert!(filter_transactions_in(&records, &criteria, &Utc).is_empty());

        let params: HashMap<String, String> =
            [("q".to_string(), "ITEM-5 ".to_string())].into_iter().collect();
        let criteria = FilterCriteria::from_params(&params);
        assert_eq!(criteria.search, "ITEM-5 ");
        assert!(filter_transactions_in(&records, &criteria, &Utc).is_empty());
    }

    #[test]
    fn test_unknown_params_mean_any() {
        let params: HashMap<String, String> = [("location", "Atlantis"), ("date", "yesterday")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(FilterCriteria::from_params(&params), FilterCriteria::default());
    }

    #[test]
    fn test_to_params_omits_any() {
        let criteria = FilterCriteria {
            transaction_type: Some(TransactionType::Inbound),
            search: "ITEM".to_string(),
            ..Default::default()
        };
        assert_eq!(
            criteria.to_params(),
            vec![("type", "Inbound".to_string()), ("q", "ITEM".to_string())]
        );
    }

    #[test]
    fn test_stats_partition_today_by_type() {
        let records = fixture();
        let since = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        for criteria in all_combinations() {
            let filtered = filter_transactions_in(&records, &criteria, &Utc);
            let stats = compute_stats(&records, &filtered, since);
            assert_eq!(
                stats.total_transactions,
                stats.inbound_transactions + stats.pickup_transactions
            );
            let expected_today = filtered.iter().filter(|t| t.created_at >= since).count();
            assert_eq!(stats.total_transactions, expected_today);
        }
    }

    #[test]
    fn test_active_robots_ignores_filters() {
        let records = fixture();
        let all_robots: HashSet<&str> = records.iter().map(|t| t.robot_id.as_str()).collect();
        let since = now() - Duration::hours(1);
        for criteria in all_combinations() {
            let filtered = filter_transactions_in(&records, &criteria, &Utc);
            let stats = compute_stats(&records, &filtered, since);
            assert_eq!(stats.active_robots, all_robots.len());
        }
    }

    #[test]
    fn test_stats_since_is_inclusive() {
        let midnight = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        let records = vec![
            tx("TXN-000001", "ITEM-1", "TRAY-1", midnight),
            tx("TXN-000002", "ITEM-2", "TRAY-2", midnight - Duration::milliseconds(1)),
        ];
        let filtered: Vec<&Transaction> = records.iter().collect();
        let stats = compute_stats(&records, &filtered, midnight);
        assert_eq!(stats.total_transactions, 1);
        assert_eq!(stats.inbound_transactions, 1);
        assert_eq!(stats.active_robots, 1);
    }

    #[test]
    fn test_paginate_45_items() {
        let items: Vec<u32> = (0..45).collect();
        let first = paginate(&items, 1, 20);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.items, (0..20).collect::<Vec<_>>());

        let third = paginate(&items, 3, 20);
        assert_eq!(third.items.len(), 5);
        assert_eq!(third.items[0], 40);
        assert!(!third.has_next());

        let fourth = paginate(&items, 4, 20);
        assert!(fourth.items.is_empty());
        assert_eq!(fourth.total_pages, 3);
    }

    #[test]
    fn test_paginate_empty_and_out_of_range() {
        let empty: Vec<u32> = vec![];
        let page = paginate(&empty, 1, DEFAULT_PAGE_SIZE);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());

        let items: Vec<u32> = (0..10).collect();
        assert!(paginate(&items, 0, 20).items.is_empty());
        assert!(paginate(&items, usize::MAX, 20).items.is_empty());
    }

    #[test]
    fn test_total_pages_and_clamp() {
        assert_eq!(total_pages(0, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(300, 20), 15);
        assert_eq!(clamp_page(0, 3), 1);
        assert_eq!(clamp_page(7, 3), 3);
        assert_eq!(clamp_page(2, 3), 2);
    }

    fn labels(values: &[&str]) -> Vec<PageLabel> {
        values
            .iter()
            .map(|v| match v.parse() {
                Ok(n) => PageLabel::Page(n),
                Err(_) => PageLabel::Ellipsis,
            })
            .collect()
    }

    #[test]
    fn test_page_labels() {
        assert_eq!(page_labels(1, 10), labels(&["1", "2", "3", "4", "...", "10"]));
        assert_eq!(page_labels(5, 10), labels(&["1", "...", "4", "5", "6", "...", "10"]));
        assert_eq!(page_labels(9, 10), labels(&["1", "...", "7", "8", "9", "10"]));
        assert_eq!(page_labels(3, 10), labels(&["1", "2", "3", "4", "...", "10"]));
        assert_eq!(page_labels(8, 10), labels(&["1", "...", "7", "8", "9", "10"]));
    }

    #[test]
    fn test_page_labels_short_lists() {
        assert_eq!(page_labels(1, 1), labels(&["1"]));
        assert_eq!(page_labels(4, 5), labels(&["1", "2", "3", "4", "5"]));
        assert!(page_labels(1, 0).is_empty());
    }

    #[test]
    fn test_page_label_display() {
        let rendered: Vec<String> = page_labels(5, 10).iter().map(|l| l.to_string()).collect();
        assert_eq!(rendered.join(" "), "1 ... 4 5 6 ... 10");
    }
}
