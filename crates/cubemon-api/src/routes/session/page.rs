//! Login page rendering

use crate::{notice_message, page_response, toast_html, ToastKind};
use axum::extract::Query;
use cubemon_utils::escape_html;
use std::collections::HashMap;

/// Login page
pub async fn page_login(
    headers: axum::http::HeaderMap,
    params: Query<HashMap<String, String>>,
) -> axum::response::Html<String> {
    let toast = notice_message(&params).map(|message| (message, ToastKind::Success));
    axum::response::Html(page_response(&headers, "Login", &render_login_page("", None, toast)))
}

/// Full login card. `error` is shown under the input, `toast` in the toast region.
pub fn render_login_page(mobile: &str, error: Option<&str>, toast: Option<(&str, ToastKind)>) -> String {
    format!(
        r#"{}
<div class='min-h-screen flex items-center justify-center bg-gradient-to-br from-slate-900 via-slate-900 to-slate-800 p-4'>
    <div class='w-full max-w-md'>
        <div class='bg-slate-800/60 border border-slate-700 backdrop-blur p-8 rounded-2xl shadow-xl'>
            <div class='text-center mb-8'>
                <div class='inline-flex items-center justify-center w-20 h-20 bg-yellow-400/10 rounded-2xl mb-4'>
                    <svg class='w-10 h-10 text-yellow-400' fill='none' stroke='currentColor' viewBox='0 0 24 24'>
                        <path stroke-linecap='round' stroke-linejoin='round' stroke-width='2' d='M9 3v2m6-2v2M9 19v2m6-2v2M5 9H3m2 6H3m18-6h-2m2 6h-2M7 19h10a2 2 0 002-2V7a2 2 0 00-2-2H7a2 2 0 00-2 2v10a2 2 0 002 2zM9 9h6v6H9V9z'/>
                    </svg>
                </div>
                <h1 class='text-3xl font-bold mb-2'>DHL Robot Monitor</h1>
                <p class='text-slate-400'>Enter your mobile number to continue</p>
            </div>
            {}
            <div class='mt-6 pt-6 border-t border-slate-700 text-center'>
                <p class='text-sm text-slate-400'>DHL Supply Chain &copy; 2024</p>
            </div>
        </div>
    </div>
</div>"#,
        toast_html(toast, false),
        render_login_form(mobile, error)
    )
}

/// Login form, swapped in place on a rejected submission
pub fn render_login_form(mobile: &str, error: Option<&str>) -> String {
    let error_html = error
        .map(|message| format!("<p class='text-sm text-red-400'>{}</p>", escape_html(message)))
        .unwrap_or_default();

    format!(
        r#"<form id='login-form' method='post' action='/login'
        hx-post='/login' hx-target='#login-form' hx-swap='outerHTML' hx-disabled-elt='#login-button'
        hx-on::before-request="document.getElementById('login-button').textContent = 'Logging in...'"
        class='space-y-6'>
    <div class='space-y-2'>
        <label for='mobile' class='block text-sm font-medium'>Mobile Number</label>
        <input id='mobile' name='mobile' type='tel' inputmode='numeric' placeholder='1234567890'
            value='{}' maxlength='10' required autofocus
            oninput="this.value = this.value.replace(/\D/g, '').slice(0, 10)"
            class='w-full h-12 px-4 text-lg rounded-lg bg-slate-900 border border-slate-600 focus:border-yellow-400 focus:outline-none'>
        <p class='text-xs text-slate-400'>Password will be auto-generated from last 6 digits</p>
        {}
    </div>
    <button id='login-button' type='submit'
        class='w-full h-12 bg-yellow-400 hover:bg-yellow-300 text-slate-900 font-semibold text-lg rounded-lg transition'>
        Login
    </button>
</form>"#,
        escape_html(mobile),
        error_html
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_form_preserves_input() {
        let form = render_login_form("12345", Some("Mobile number must be exactly 10 digits"));
        assert!(form.contains("value='12345'"));
        assert!(form.contains("Mobile number must be exactly 10 digits"));
    }

    #[test]
    fn test_login_form_escapes_input() {
        let form = render_login_form("'><script>", None);
        assert!(!form.contains("<script>"));
    }

    #[test]
    fn test_login_page_shows_toast() {
        let page = render_login_page("", None, Some(("Logged out successfully", ToastKind::Success)));
        assert!(page.contains("Logged out successfully"));
        assert!(page.contains("id='login-form'"));
    }
}
