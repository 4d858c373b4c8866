//! Session actions - Login and logout
//!
//! Endpoints:
//! - htmx_login: Validate the mobile number, wait out the simulated network
//!   delay, then start a session
//! - htmx_logout: End the session

use super::page::{render_login_form, render_login_page};
use crate::{
    clear_session_cookie, is_htmx_request, page_response, parse_form, redirect, session_cookie,
    session_id, toast_html, AppState, ToastKind,
};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use cubemon_core::session;
use cubemon_core::{CoreError, DefaultErrorLogger, ErrorContext, ErrorLogger};
use cubemon_utils::generate_session_id;
use chrono::Utc;
use std::time::Duration;

fn with_cookie(mut response: Response, cookie: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

/// Re-render the form with the validation message and the input kept
fn reject_login(headers: &axum::http::HeaderMap, mobile: &str, err: &CoreError) -> Response {
    DefaultErrorLogger.log_warning(&err.to_string(), &ErrorContext::new("login"));
    let message = session::MOBILE_ERROR;
    let html = if is_htmx_request(headers) {
        format!(
            "{}{}",
            render_login_form(mobile, Some(message)),
            toast_html(Some((message, ToastKind::Error)), true)
        )
    } else {
        page_response(
            headers,
            "Login",
            &render_login_page(mobile, Some(message), Some((message, ToastKind::Error))),
        )
    };
    axum::response::Html(html).into_response()
}

/// Log in with a mobile number (form field `mobile`). The number is checked
/// before the simulated delay; the session changes only after it.
pub async fn htmx_login(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
    body: String,
) -> Response {
    let params = parse_form(&body);
    let mobile = params.get("mobile").cloned().unwrap_or_default();

    if let Err(err) = session::validate_mobile(&mobile) {
        return reject_login(&headers, &mobile, &err);
    }

    let delay = state.config.login.delay_ms;
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let id = generate_session_id();
    let result = {
        let mut sessions = state.sessions.write().await;
        if let Some(previous) = session_id(&headers) {
            sessions.remove(&previous);
        }
        let result = session::login(sessions.create(id.clone(), Utc::now()), &mobile);
        if result.is_err() {
            sessions.remove(&id);
        }
        result
    };

    match result {
        Ok(credentials) => {
            log::info!("User {} logged in", credentials.mobile);
            with_cookie(redirect(&headers, "/dashboard?notice=login"), &session_cookie(&id))
        }
        Err(err) => reject_login(&headers, &mobile, &err),
    }
}

/// Log out and return to the login page
pub async fn htmx_logout(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> Response {
    if let Some(id) = session_id(&headers) {
        let mut sessions = state.sessions.write().await;
        if let Some(storage) = sessions.get_mut(&id) {
            if let Some(user) = session::current_user(&*storage) {
                log::info!("User {} logged out", user);
            }
            session::logout(storage);
        }
        sessions.remove(&id);
    }

    with_cookie(redirect(&headers, "/?notice=logout"), &clear_session_cookie())
}
