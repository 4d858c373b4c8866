//! Dashboard API endpoints - JSON API and HTMX partial responses
//!
//! Endpoints:
//! - htmx_dashboard_list: Transaction list (HTML fragment)
//! - htmx_dashboard_refresh: Re-render the list with a toast (HTML fragment)
//! - download_export: CSV download of the filtered set
//! - api_transactions: Filtered page of transactions (JSON)
//! - api_transaction_detail: Single transaction (JSON)
//! - api_stats: Summary card values (JSON)

use super::page::{render_list_fragment, requested_page};
use crate::{current_user, parse_form, redirect, ApiError, AppState, ToastKind};
use axum::extract::Query;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use cubemon_core::{
    export_filename, DefaultErrorLogger, ErrorContext, ErrorLogger, FilterCriteria, Transaction,
    CSV_CONTENT_TYPE,
};
use serde::Serialize;
use std::collections::HashMap;

/// HTMX: Transaction list - count line, table and pagination, with
/// out-of-band updates for the summary cards and the export link
pub async fn htmx_dashboard_list(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
    params: Query<HashMap<String, String>>,
) -> Response {
    if current_user(&state, &headers).await.is_none() {
        return redirect(&headers, "/");
    }

    let criteria = FilterCriteria::from_params(&params);
    let view = state.monitor.dashboard(&criteria, requested_page(&params));
    axum::response::Html(render_list_fragment(&view, None)).into_response()
}

/// HTMX: Refresh - the record list stays as loaded; the current filters are
/// re-applied and a toast confirms the refresh
pub async fn htmx_dashboard_refresh(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
    body: String,
) -> Response {
    if current_user(&state, &headers).await.is_none() {
        return redirect(&headers, "/");
    }

    let params = parse_form(&body);
    let criteria = FilterCriteria::from_params(&params);
    let view = state.monitor.dashboard(&criteria, 1);
    log::debug!("Dashboard refreshed with {} matching records", view.total_filtered);
    axum::response::Html(render_list_fragment(&view, Some(("Data refreshed", ToastKind::Success))))
        .into_response()
}

/// CSV download of every record matching the filters
pub async fn download_export(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
    params: Query<HashMap<String, String>>,
) -> Response {
    let Some(user) = current_user(&state, &headers).await else {
        return redirect(&headers, "/");
    };

    let criteria = FilterCriteria::from_params(&params);
    match state.monitor.export_csv(&criteria) {
        Ok(csv) => {
            let disposition = format!("attachment; filename=\"{}\"", export_filename(chrono::Utc::now()));
            log::info!("User {} exported {} bytes of CSV", user, csv.len());
            (
                [
                    (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                csv,
            )
                .into_response()
        }
        Err(err) => {
            DefaultErrorLogger.log_error(&err, &ErrorContext::new("export").with_user_id(Some(user)));
            ApiError::from(err).into_response()
        }
    }
}

/// JSON page of filtered transactions
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsResponse<'a> {
    pub transactions: Vec<&'a Transaction>,
    pub total_count: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

/// Get a page of filtered transactions (JSON API)
pub async fn api_transactions(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
    params: Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    current_user(&state, &headers).await.ok_or(ApiError::Unauthorized)?;

    if let Some(raw) = params.get("page") {
        if raw.trim().parse::<usize>().is_err() {
            return Err(ApiError::BadRequest {
                message: format!("Invalid page number: {}", raw),
            });
        }
    }

    let criteria = FilterCriteria::from_params(&params);
    let view = state.monitor.dashboard(&criteria, requested_page(&params));
    let response = TransactionsResponse {
        total_count: view.total_filtered,
        page: view.page.page,
        page_size: view.page.page_size,
        total_pages: view.page.total_pages,
        transactions: view.page.items,
    };
    Ok(axum::Json(response).into_response())
}

/// Get single transaction detail (JSON API)
pub async fn api_transaction_detail(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
    path: axum::extract::Path<String>,
) -> Result<Response, ApiError> {
    current_user(&state, &headers).await.ok_or(ApiError::Unauthorized)?;

    let transaction = state.monitor.transaction(&path.0)?;
    Ok(axum::Json(transaction).into_response())
}

/// Get summary card values (JSON API)
pub async fn api_stats(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
    params: Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    current_user(&state, &headers).await.ok_or(ApiError::Unauthorized)?;

    let criteria = FilterCriteria::from_params(&params);
    let view = state.monitor.dashboard(&criteria, 1);
    Ok(axum::Json(view.stats).into_response())
}
