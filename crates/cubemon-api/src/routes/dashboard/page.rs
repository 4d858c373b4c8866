//! Dashboard page rendering - Full page endpoint and shared fragments
//!
//! Endpoints:
//! - page_dashboard: Transaction monitor page
//!
//! Helper functions:
//! - render_summary_cards: Today's counts and active robots
//! - render_filter_bar: Filter form, refresh and export controls
//! - render_list: Count line, transaction table and pagination
//! - render_list_fragment: List plus out-of-band card, export link and toast updates

use crate::{current_user, notice_message, page_response, redirect, toast_html, AppState, ToastKind};
use axum::extract::Query;
use axum::response::{IntoResponse, Response};
use chrono::Local;
use cubemon_config::FeaturesConfig;
use cubemon_core::{
    DashboardStats, DashboardView, FilterCriteria, Location, PageLabel, Transaction,
    TransactionStatus, TransactionType,
};
use cubemon_utils::{escape_html, format_number};
use std::collections::HashMap;

/// Requested page number, 1 when absent or malformed
pub fn requested_page(params: &HashMap<String, String>) -> usize {
    params
        .get("page")
        .and_then(|p| p.trim().parse().ok())
        .unwrap_or(1)
}

/// Query string for the given criteria and optional page
pub fn query_string(criteria: &FilterCriteria, page: Option<usize>) -> String {
    let mut parts: Vec<String> = criteria
        .to_params()
        .into_iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(&value)))
        .collect();
    if let Some(page) = page {
        parts.push(format!("page={}", page));
    }
    parts.join("&")
}

/// Transaction monitor page
pub async fn page_dashboard(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
    params: Query<HashMap<String, String>>,
) -> Response {
    let Some(user) = current_user(&state, &headers).await else {
        return redirect(&headers, "/");
    };

    let criteria = FilterCriteria::from_params(&params);
    let view = state.monitor.dashboard(&criteria, requested_page(&params));
    let toast = notice_message(&params).map(|message| (message, ToastKind::Success));

    let inner_content = format!(
        r#"{}
<div class='max-w-[1600px] mx-auto p-6'>
    <header class='flex items-center justify-between mb-8'>
        <div>
            <h1 class='text-3xl font-bold mb-2'>DHL Robot Transaction Monitor</h1>
            <p class='text-slate-400'>Real-time monitoring of cube robot transactions</p>
        </div>
        <div class='flex items-center gap-4'>
            <span class='font-medium'>Admin: {}</span>
            <form method='post' action='/logout'>
                <button type='submit' class='px-4 py-2 border border-slate-600 rounded-lg hover:bg-slate-800 flex items-center gap-2'>
                    <svg xmlns='http://www.w3.org/2000/svg' class='h-4 w-4' fill='none' viewBox='0 0 24 24' stroke='currentColor'>
                        <path stroke-linecap='round' stroke-linejoin='round' stroke-width='2' d='M17 16l4-4m0 0l-4-4m4 4H7m6 4v1a3 3 0 01-3 3H6a3 3 0 01-3-3V7a3 3 0 013-3h4a3 3 0 013 3v1'/>
                    </svg>
                    Logout
                </button>
            </form>
        </div>
    </header>
    {}
    {}
    <div id='transactions-content'>{}</div>
</div>"#,
        toast_html(toast, false),
        escape_html(&user),
        render_summary_cards(&view.stats, false),
        render_filter_bar(&view.criteria, &state.config.features),
        render_list(&view)
    );

    axum::response::Html(page_response(&headers, "Dashboard", &inner_content)).into_response()
}

/// Summary cards; `oob` marks them for an HTMX out-of-band swap
pub fn render_summary_cards(stats: &DashboardStats, oob: bool) -> String {
    let cards = [
        ("Total Transactions Today", stats.total_transactions, "text-yellow-400", "bg-yellow-400/10"),
        ("Inbound Transactions", stats.inbound_transactions, "text-blue-400", "bg-blue-400/10"),
        ("Pickup Transactions", stats.pickup_transactions, "text-green-400", "bg-green-400/10"),
        ("Active Robots", stats.active_robots, "text-red-400", "bg-red-400/10"),
    ];

    let mut html = format!(
        "<div id='summary-cards'{} class='grid grid-cols-1 md:grid-cols-2 lg:grid-cols-4 gap-6 mb-8'>",
        if oob { " hx-swap-oob='true'" } else { "" }
    );
    for (title, value, color, bg) in cards {
        html.push_str(&format!(
            r#"<div class='bg-slate-800/60 border border-slate-700 rounded-xl p-6'>
                <div class='flex items-start justify-between'>
                    <div>
                        <p class='text-sm text-slate-400 mb-2'>{}</p>
                        <p class='text-3xl font-bold'>{}</p>
                    </div>
                    <div class='{} {} p-3 rounded-xl'>&#9679;</div>
                </div>
            </div>"#,
            title,
            format_number(value),
            bg,
            color
        ));
    }
    html.push_str("</div>");
    html
}

fn option_html(value: &str, label: &str, selected: bool) -> String {
    format!(
        "<option value='{}'{}>{}</option>",
        value,
        if selected { " selected" } else { "" },
        label
    )
}

/// Export link carrying the current filters
pub fn render_export_link(criteria: &FilterCriteria, oob: bool) -> String {
    let href = format!("/dashboard/export?{}", query_string(criteria, None));
    format!(
        r#"<a id='export-link'{} href='{}' onclick="showToast('Export completed')"
            class='px-4 py-2 bg-yellow-400 text-slate-900 font-medium rounded-lg hover:bg-yellow-300'>Export CSV</a>"#,
        if oob { " hx-swap-oob='true'" } else { "" },
        escape_html(&href)
    )
}

/// Filter form with refresh and export controls. Any change reloads the
/// list from page 1.
pub fn render_filter_bar(criteria: &FilterCriteria, features: &FeaturesConfig) -> String {
    let mut location_options = option_html("all", "All Locations", criteria.location.is_none());
    for location in Location::ALL {
        location_options.push_str(&option_html(
            location.code(),
            location.label(),
            criteria.location == Some(location),
        ));
    }

    let mut type_options = option_html("all", "All Types", criteria.transaction_type.is_none());
    for kind in TransactionType::ALL {
        type_options.push_str(&option_html(
            kind.as_str(),
            kind.as_str(),
            criteria.transaction_type == Some(kind),
        ));
    }

    let status_select = if features.status_filter {
        let mut options = option_html("all", "All Statuses", criteria.status.is_none());
        for status in TransactionStatus::ALL {
            options.push_str(&option_html(status.as_str(), status.as_str(), criteria.status == Some(status)));
        }
        format!(
            "<select name='status' class='px-4 py-2 rounded-lg bg-slate-900 border border-slate-600'>{}</select>",
            options
        )
    } else {
        String::new()
    };

    let date_input = if features.date_filter {
        format!(
            "<input type='date' name='date' value='{}' class='px-4 py-2 rounded-lg bg-slate-900 border border-slate-600'>",
            criteria.date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
        )
    } else {
        String::new()
    };

    format!(
        r#"<form id='filters' hx-get='/dashboard/list' hx-target='#transactions-content'
        hx-trigger='change, keyup changed delay:300ms from:#search-input'
        onsubmit='return false'
        class='flex flex-wrap items-center gap-3 mb-6 bg-slate-800/60 border border-slate-700 rounded-xl p-4'>
    <input id='search-input' type='text' name='q' value='{}' placeholder='Search by Item ID or Tray ID...'
        class='flex-1 min-w-[240px] px-4 py-2 rounded-lg bg-slate-900 border border-slate-600'>
    <select name='location' class='px-4 py-2 rounded-lg bg-slate-900 border border-slate-600'>{}</select>
    <select name='type' class='px-4 py-2 rounded-lg bg-slate-900 border border-slate-600'>{}</select>
    {}
    {}
    <button type='button' hx-post='/dashboard/refresh' hx-include='#filters' hx-target='#transactions-content'
        class='px-4 py-2 border border-slate-600 rounded-lg hover:bg-slate-700'>Refresh</button>
    {}
</form>"#,
        escape_html(&criteria.search),
        location_options,
        type_options,
        status_select,
        date_input,
        render_export_link(criteria, false)
    )
}

fn status_badge(status: TransactionStatus) -> &'static str {
    match status {
        TransactionStatus::Completed => "bg-green-500/20 text-green-400 border-green-500/30",
        TransactionStatus::Pending => "bg-yellow-500/20 text-yellow-400 border-yellow-500/30",
        TransactionStatus::Failed => "bg-red-500/20 text-red-400 border-red-500/30",
    }
}

fn type_badge(kind: TransactionType) -> &'static str {
    match kind {
        TransactionType::Inbound => "bg-blue-500/20 text-blue-400 border-blue-500/30",
        TransactionType::Pickup => "bg-purple-500/20 text-purple-400 border-purple-500/30",
    }
}

fn render_row(tx: &Transaction) -> String {
    format!(
        r#"<tr class='border-b border-slate-700/50 hover:bg-slate-800/50'>
            <td class='px-4 py-3 font-medium'>{}</td>
            <td class='px-4 py-3 text-slate-400'>{}</td>
            <td class='px-4 py-3 text-slate-400'>{}</td>
            <td class='px-4 py-3'><span class='px-2 py-1 text-xs rounded border {}'>{}</span></td>
            <td class='px-4 py-3 text-slate-400'>{}</td>
            <td class='px-4 py-3 text-slate-400'>{}</td>
            <td class='px-4 py-3 text-slate-400'>{}</td>
            <td class='px-4 py-3 text-slate-400'>{}</td>
            <td class='px-4 py-3'><span class='px-2 py-1 text-xs rounded border {}'>{}</span></td>
            <td class='px-4 py-3 text-slate-400'>{}</td>
        </tr>"#,
        escape_html(&tx.id),
        escape_html(&tx.item_id),
        escape_html(&tx.tray_id),
        type_badge(tx.transaction_type),
        tx.transaction_type,
        tx.location_name.code(),
        escape_html(&tx.robot_id),
        tx.quantity,
        escape_html(&tx.username),
        status_badge(tx.status),
        tx.status,
        tx.created_at.with_timezone(&Local).format("%b %d, %H:%M")
    )
}

fn render_pagination(view: &DashboardView<'_>) -> String {
    let page = &view.page;
    if page.total_pages <= 1 {
        return String::new();
    }

    let button = |target: usize, label: &str, enabled: bool, current: bool| -> String {
        let style = if current {
            "bg-yellow-400 text-slate-900 border-yellow-400"
        } else {
            "border-slate-600 hover:bg-slate-700"
        };
        format!(
            "<button {} hx-get='/dashboard/list?{}' hx-target='#transactions-content' class='px-3 py-1 border rounded {}{}'>{}</button>",
            if enabled { "" } else { "disabled" },
            escape_html(&query_string(&view.criteria, Some(target))),
            style,
            if enabled { "" } else { " disabled" },
            label
        )
    };

    let mut html = String::from("<nav class='mt-6 flex items-center justify-center gap-2'>");
    html.push_str(&button(page.page.saturating_sub(1).max(1), "Previous", page.has_previous(), false));
    for label in &view.labels {
        match label {
            PageLabel::Page(n) => {
                html.push_str(&button(*n, &n.to_string(), *n != page.page, *n == page.page));
            }
            PageLabel::Ellipsis => {
                html.push_str("<span class='px-2 text-slate-500'>...</span>");
            }
        }
    }
    html.push_str(&button((page.page + 1).min(page.total_pages), "Next", page.has_next(), false));
    html.push_str("</nav>");
    html
}

/// Count line, table and pagination for `#transactions-content`
pub fn render_list(view: &DashboardView<'_>) -> String {
    let mut html = format!(
        "<div class='mb-4 text-sm text-slate-400'>Showing {} of {} transactions</div>",
        view.page.items.len(),
        view.total_filtered
    );

    if view.page.items.is_empty() {
        html.push_str("<div class='text-center py-12 text-slate-400 bg-slate-800/60 border border-slate-700 rounded-xl'><p>No transactions found</p></div>");
        return html;
    }

    html.push_str(
        r#"<div class='bg-slate-800/60 border border-slate-700 rounded-xl overflow-x-auto'>
        <table class='w-full text-sm text-left'>
            <thead class='border-b border-slate-700 text-slate-400'>
                <tr>
                    <th class='px-4 py-3 font-semibold'>Transaction ID</th>
                    <th class='px-4 py-3 font-semibold'>Item ID</th>
                    <th class='px-4 py-3 font-semibold'>Tray ID</th>
                    <th class='px-4 py-3 font-semibold'>Type</th>
                    <th class='px-4 py-3 font-semibold'>Location</th>
                    <th class='px-4 py-3 font-semibold'>Robot ID</th>
                    <th class='px-4 py-3 font-semibold'>Quantity</th>
                    <th class='px-4 py-3 font-semibold'>Username</th>
                    <th class='px-4 py-3 font-semibold'>Status</th>
                    <th class='px-4 py-3 font-semibold'>Created At</th>
                </tr>
            </thead>
            <tbody>"#,
    );
    for tx in &view.page.items {
        html.push_str(&render_row(tx));
    }
    html.push_str("</tbody></table></div>");
    html.push_str(&render_pagination(view));
    html
}

/// List partial with out-of-band updates for the cards, the export link and
/// the toast region
pub fn render_list_fragment(view: &DashboardView<'_>, toast: Option<(&str, ToastKind)>) -> String {
    format!(
        "{}{}{}{}",
        render_list(view),
        render_summary_cards(&view.stats, true),
        render_export_link(&view.criteria, true),
        toast_html(toast, true)
    )
}
