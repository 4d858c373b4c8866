//! Route modules for the dashboard server
//!
//! - session: Login page, login and logout
//! - dashboard: Transaction monitor page, list partials, export, JSON API
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API endpoints and HTMX actions
//! - page.rs: HTMX page rendering

pub mod dashboard;
pub mod session;
