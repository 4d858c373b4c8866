//! Transaction monitoring core
//!
//! `Monitor` owns the record list loaded once at startup and derives every
//! dashboard view from it on demand.

pub mod error;
pub mod export;
pub mod pipeline;
pub mod session;
pub mod time;

use chrono::{DateTime, Local, TimeZone};
use cubemon_config::Config;
use cubemon_source::SourceRef;

pub use error::{CoreError, CoreResult, ErrorCode, ErrorContext, ErrorLogger, DefaultErrorLogger};
pub use export::{export_csv, export_filename, CSV_CONTENT_TYPE};
pub use pipeline::{
    clamp_page, compute_stats, filter_transactions, filter_transactions_in, page_labels, paginate,
    DashboardStats, FilterCriteria, Page, PageLabel,
};
pub use cubemon_source::{Location, Transaction, TransactionStatus, TransactionType};
pub use session::{
    Credentials, MemorySessionStorage, SessionRegistry, SessionStorage, AUTH_KEY, USER_KEY,
};

// ==================== Dashboard View ====================

/// Everything the dashboard renders for one request
#[derive(Debug, Clone)]
pub struct DashboardView<'a> {
    pub criteria: FilterCriteria,
    pub stats: DashboardStats,
    pub page: Page<&'a Transaction>,
    pub labels: Vec<PageLabel>,
    pub total_filtered: usize,
}

// ==================== Monitor ====================

/// Read-only owner of the transaction list
#[derive(Debug)]
pub struct Monitor {
    config: Config,
    transactions: Vec<Transaction>,
}

impl Monitor {
    /// Load the record list from `source`
    pub async fn load(config: Config, source: SourceRef) -> Result<Self, CoreError> {
        log::info!("Loading transactions from {}", source.describe());
        let transactions = source.load().await?;
        log::info!("Loaded {} transactions", transactions.len());
        Ok(Self::from_transactions(config, transactions))
    }

    pub fn from_transactions(config: Config, transactions: Vec<Transaction>) -> Self {
        Self {
            config,
            transactions,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// All records, newest first
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transaction(&self, id: &str) -> CoreResult<&Transaction> {
        self.transactions
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::TransactionNotFound { id: id.to_string() })
    }

    pub fn page_size(&self) -> usize {
        self.config.pagination.records_per_page
    }

    /// Drop criteria whose feature is switched off
    pub fn effective_criteria(&self, criteria: &FilterCriteria) -> FilterCriteria {
        let mut effective = criteria.clone();
        if !self.config.features.status_filter {
            effective.status = None;
        }
        if !self.config.features.date_filter {
            effective.date = None;
        }
        effective
    }

    /// Records matching `criteria`, newest first
    pub fn filtered(&self, criteria: &FilterCriteria) -> Vec<&Transaction> {
        filter_transactions(&self.transactions, &self.effective_criteria(criteria))
    }

    /// Dashboard view for the local clock
    pub fn dashboard(&self, criteria: &FilterCriteria, page: usize) -> DashboardView<'_> {
        self.dashboard_at(criteria, page, &Local::now())
    }

    /// Dashboard view as seen at `now`: "today" and date filtering follow
    /// `now`'s time zone, and `page` is clamped into range
    pub fn dashboard_at<Tz: TimeZone>(
        &self,
        criteria: &FilterCriteria,
        page: usize,
        now: &DateTime<Tz>,
    ) -> DashboardView<'_> {
        let criteria = self.effective_criteria(criteria);
        let filtered = filter_transactions_in(&self.transactions, &criteria, &now.timezone());
        let stats = compute_stats(&self.transactions, &filtered, time::start_of_day(now));

        let page_size = self.page_size();
        let total_pages = pipeline::total_pages(filtered.len(), page_size);
        let page = clamp_page(page, total_pages);
        let page = paginate(&filtered, page, page_size);
        let labels = page_labels(page.page, page.total_pages);

        log::debug!(
            "Dashboard: {} active filters, {} of {} records match, page {}/{}",
            criteria.active_count(),
            filtered.len(),
            self.transactions.len(),
            page.page,
            page.total_pages
        );

        DashboardView {
            criteria,
            stats,
            total_filtered: filtered.len(),
            page,
            labels,
        }
    }

    /// CSV of every record matching `criteria`
    pub fn export_csv(&self, criteria: &FilterCriteria) -> CoreResult<String> {
        let filtered = self.filtered(criteria);
        log::info!("Exporting {} transactions", filtered.len());
        export_csv(&filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, Utc};
    use cubemon_source::{Location, MockTransactionSource, TransactionStatus};
    use std::sync::Arc;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 15, 0, 0).unwrap()
    }

    async fn monitor(config: Config) -> Monitor {
        let source = MockTransactionSource::new(300, 30, Some(7)).at(fixed_now());
        Monitor::load(config, Arc::new(source)).await.unwrap()
    }

    #[tokio::test]
    async fn test_load_from_source() {
        let monitor = monitor(Config::default()).await;
        assert_eq!(monitor.transactions().len(), 300);
        assert!(monitor.transaction("TXN-000001").is_ok());
        assert!(matches!(
            monitor.transaction("TXN-999999"),
            Err(CoreError::TransactionNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_dashboard_first_page() {
        let monitor = monitor(Config::default()).await;
        let view = monitor.dashboard_at(&FilterCriteria::default(), 1, &fixed_now());
        assert_eq!(view.total_filtered, 300);
        assert_eq!(view.page.items.len(), 20);
        assert_eq!(view.page.total_pages, 15);
        assert_eq!(view.labels.len(), 6);
        assert_eq!(
            view.stats.total_transactions,
            view.stats.inbound_transactions + view.stats.pickup_transactions
        );
    }

    #[tokio::test]
    async fn test_dashboard_clamps_page() {
        let monitor = monitor(Config::default()).await;
        let view = monitor.dashboard_at(&FilterCriteria::default(), 99, &fixed_now());
        assert_eq!(view.page.page, 15);
        assert!(!view.page.items.is_empty());

        let view = monitor.dashboard_at(&FilterCriteria::default(), 0, &fixed_now());
        assert_eq!(view.page.page, 1);
    }

    #[tokio::test]
    async fn test_today_stats_follow_time_zone() {
        let monitor = monitor(Config::default()).await;
        let utc_view = monitor.dashboard_at(&FilterCriteria::default(), 1, &fixed_now());
        let since = fixed_now() - Duration::hours(15);
        let expected = monitor
            .transactions()
            .iter()
            .filter(|t| t.created_at >= since)
            .count();
        assert_eq!(utc_view.stats.total_transactions, expected);

        let east = FixedOffset::east_opt(10 * 3600).unwrap();
        let east_now = fixed_now().with_timezone(&east);
        let east_view = monitor.dashboard_at(&FilterCriteria::default(), 1, &east_now);
        let east_since = Utc.with_ymd_and_hms(2024, 6, 15, 14, 0, 0).unwrap();
        let expected = monitor
            .transactions()
            .iter()
            .filter(|t| t.created_at >= east_since)
            .count();
        assert_eq!(east_view.stats.total_transactions, expected);
    }

    #[tokio::test]
    async fn test_disabled_status_filter_is_ignored() {
        let mut config = Config::default();
        config.features.status_filter = false;
        let monitor = monitor(config).await;
        let criteria = FilterCriteria {
            status: Some(TransactionStatus::Failed),
            ..Default::default()
        };
        assert_eq!(monitor.filtered(&criteria).len(), 300);
        assert_eq!(monitor.effective_criteria(&criteria).status, None);
    }

    #[tokio::test]
    async fn test_export_matches_filtered_set() {
        let monitor = monitor(Config::default()).await;
        let criteria = FilterCriteria {
            location: Some(Location::DhlMumbai),
            ..Default::default()
        };
        let csv = monitor.export_csv(&criteria).unwrap();
        let rows = csv.lines().count() - 1;
        assert_eq!(rows, monitor.filtered(&criteria).len());
        assert!(csv.lines().skip(1).all(|line| line.contains(",DHL_Mumbai,")));
    }

    #[tokio::test]
    async fn test_custom_page_size() {
        let mut config = Config::default();
        config.pagination.records_per_page = 50;
        let monitor = monitor(config).await;
        let view = monitor.dashboard_at(&FilterCriteria::default(), 2, &fixed_now());
        assert_eq!(view.page.items.len(), 50);
        assert_eq!(view.page.total_pages, 6);
        assert_eq!(view.page.items[0].id, monitor.transactions()[50].id);
    }
}
