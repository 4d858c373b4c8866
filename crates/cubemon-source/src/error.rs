//! Error types for cubemon-source

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Invalid generator setting {field}: {message}")]
    InvalidSetting { field: String, message: String },
}
