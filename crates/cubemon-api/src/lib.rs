//! HTTP dashboard server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::session: Login page, login and logout
//! - routes::dashboard: Summary cards, filtered transaction table, export

pub mod error;
pub mod routes;

use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use cubemon_config::Config;
use cubemon_core::Monitor;
use cubemon_core::SessionRegistry;
use cubemon_utils::escape_html;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::set_header::SetResponseHeaderLayer;

pub use error::ApiError;

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE: &str = "cubemon_sid";

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<Monitor>,
    pub sessions: Arc<RwLock<SessionRegistry>>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, monitor: Arc<Monitor>) -> Self {
        let ttl = chrono::Duration::minutes(i64::from(config.login.session_ttl_minutes));
        Self {
            monitor,
            sessions: Arc::new(RwLock::new(SessionRegistry::with_ttl(ttl))),
            config,
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::dashboard::{
        api_stats, api_transaction_detail, api_transactions, download_export, htmx_dashboard_list,
        htmx_dashboard_refresh, page_dashboard,
    };
    use routes::session::{htmx_login, htmx_logout, page_login};

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/transactions", get(api_transactions))
        .route("/api/transactions/:id", get(api_transaction_detail))
        .route("/api/stats", get(api_stats))
        // Session routes
        .route("/", get(page_login))
        .route("/login", post(htmx_login))
        .route("/logout", post(htmx_logout))
        // Dashboard pages and HTMX partials
        .route("/dashboard", get(page_dashboard))
        .route("/dashboard/list", get(htmx_dashboard_list))
        .route("/dashboard/export", get(download_export))
        .route("/dashboard/refresh", post(htmx_dashboard_refresh))
        // Keep session-gated pages out of the browser cache
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - DHL Robot Monitor</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
        .disabled {{ cursor: not-allowed; opacity: 0.5; pointer-events: none; }}
    </style>
</head>
<body class="bg-slate-900 text-slate-100 min-h-screen">
    {}
    <script>
    function dismissToasts(root) {{
        (root || document).querySelectorAll('[data-toast]').forEach(function(el) {{
            setTimeout(function() {{ el.remove(); }}, 3000);
        }});
    }}
    function showToast(message) {{
        var region = document.getElementById('toast');
        if (!region) return;
        region.innerHTML = "<div data-toast class='px-4 py-3 rounded-lg shadow-lg bg-green-600 text-white'>" + message + "</div>";
        dismissToasts(region);
    }}
    document.addEventListener('htmx:load', function(e) {{ dismissToasts(e.target); }});
    </script>
</body>
</html>"#,
        title, content
    )
}

/// Toast flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// Toast region with a single message. With `oob` set, the fragment replaces
/// the page's region through an HTMX out-of-band swap.
pub fn toast_html(message: Option<(&str, ToastKind)>, oob: bool) -> String {
    let oob_attr = if oob { " hx-swap-oob='true'" } else { "" };
    let inner = match message {
        Some((text, kind)) => {
            let color = match kind {
                ToastKind::Success => "bg-green-600",
                ToastKind::Error => "bg-red-600",
            };
            format!(
                "<div data-toast class='px-4 py-3 rounded-lg shadow-lg {} text-white'>{}</div>",
                color,
                escape_html(text)
            )
        }
        None => String::new(),
    };
    format!(
        "<div id='toast' class='fixed top-4 right-4 z-50 space-y-2'{}>{}</div>",
        oob_attr, inner
    )
}

/// Check if request is from HTMX (partial page update)
pub fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &HeaderMap, title: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        inner_content.to_string()
    } else {
        base_html(title, inner_content)
    }
}

/// Redirect that works for both plain and HTMX requests
pub fn redirect(headers: &HeaderMap, location: &str) -> Response {
    if is_htmx_request(headers) {
        let mut response = StatusCode::OK.into_response();
        if let Ok(value) = HeaderValue::from_str(location) {
            response.headers_mut().insert("HX-Redirect", value);
        }
        response
    } else {
        Redirect::to(location).into_response()
    }
}

/// Decode an `application/x-www-form-urlencoded` body
pub fn parse_form(body: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in body.split('&') {
        let mut parts = pair.splitn(2, '=');
        if let (Some(key), Some(value)) = (parts.next(), parts.next()) {
            let key = urlencoding::decode(&key.replace('+', " ")).unwrap_or_default().into_owned();
            let value = urlencoding::decode(&value.replace('+', " ")).unwrap_or_default().into_owned();
            params.insert(key, value);
        }
    }
    params
}

/// Message for the `notice` parameter set by the login and logout redirects
pub fn notice_message(params: &HashMap<String, String>) -> Option<&'static str> {
    match params.get("notice").map(String::as_str) {
        Some("login") => Some("Login successful!"),
        Some("logout") => Some("Logged out successfully"),
        _ => None,
    }
}

// ==================== Session Cookie ====================

/// Session id from the request cookies
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

pub fn session_cookie(id: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}

pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Mobile number of the signed-in user for this request
pub async fn current_user(state: &AppState, headers: &HeaderMap) -> Option<String> {
    let id = session_id(headers)?;
    state.sessions.read().await.user(&id, chrono::Utc::now())
}

/// Start the HTTP server
pub async fn start_server(config: Config, monitor: Arc<Monitor>) -> anyhow::Result<()> {
    let addr = config.bind_address();
    let state = AppState::new(config, monitor);

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting cubemon server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - / (Login)");
    log::info!("  - /dashboard (Transaction monitor)");
    log::info!("  - /api/* (JSON API endpoints)");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Shutdown signal received"),
        Err(e) => log::error!("Failed to listen for shutdown signal: {}", e),
    }
}
