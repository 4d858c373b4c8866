//! Dashboard routes - Transaction monitor
//!
//! Features:
//! - Summary cards for today's filtered activity
//! - Location, type, status, date and identifier filters
//! - Paginated transaction table with HTMX partial updates
//! - CSV export of the filtered set
//!
//! Structure:
//! - api.rs: JSON API and HTMX endpoints
//! - page.rs: Full page rendering and shared fragments

pub mod api;
pub mod page;

pub use api::{
    api_stats,
    api_transaction_detail,
    api_transactions,
    download_export,
    htmx_dashboard_list,
    htmx_dashboard_refresh,
};

pub use page::page_dashboard;
