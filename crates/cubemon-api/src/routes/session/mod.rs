//! Session routes - Mobile-number login and logout
//!
//! Structure:
//! - api.rs: Login and logout actions
//! - page.rs: Login page and form rendering

pub mod api;
pub mod page;

pub use api::{htmx_login, htmx_logout};
pub use page::page_login;
