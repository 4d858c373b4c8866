//! Error types for cubemon-core

use cubemon_source::SourceError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable error code, serialized into API error bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    SourceError,
    ExportError,
    TransactionNotFound,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::SourceError => "SOURCE_ERROR",
            ErrorCode::ExportError => "EXPORT_ERROR",
            ErrorCode::TransactionNotFound => "TRANSACTION_NOT_FOUND",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error body returned by the JSON API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            suggestions: vec![],
        }
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestions.push(suggestion.to_string());
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        for suggestion in &self.suggestions {
            write!(f, " ({})", suggestion)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    /// Rejected login input
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    /// Records could not be produced at startup
    #[error("Source error: {message}")]
    SourceError { message: String },

    #[error("Export error: {message}")]
    ExportError { message: String },

    #[error("Transaction not found: {id}")]
    TransactionNotFound { id: String },
}

impl CoreError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::SourceError { .. } => ErrorCode::SourceError,
            CoreError::ExportError { .. } => ErrorCode::ExportError,
            CoreError::TransactionNotFound { .. } => ErrorCode::TransactionNotFound,
        }
    }

    pub fn to_details(&self) -> ErrorDetails {
        let details = ErrorDetails::new(self.code(), self.to_string());
        match self {
            CoreError::TransactionNotFound { .. } => {
                details.with_suggestion("List transaction ids with /api/transactions")
            }
            CoreError::SourceError { .. } => {
                details.with_suggestion("Check the data section of the configuration file")
            }
            _ => details,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

impl From<SourceError> for CoreError {
    fn from(error: SourceError) -> Self {
        CoreError::SourceError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for CoreError {
    fn from(error: csv::Error) -> Self {
        CoreError::ExportError {
            message: error.to_string(),
        }
    }
}

/// Where an error happened, for logs
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Signed-in mobile number, if any
    pub user_id: Option<String>,
    pub operation: String,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            user_id: None,
            operation: operation.into(),
        }
    }

    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }
}

pub trait ErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    fn log_warning(&self, message: &str, context: &ErrorContext);
}

/// Logs through the `log` facade under the `cubemon::error` target
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        log::error!(
            target: "cubemon::error",
            "{} failed: {} (user: {})",
            context.operation,
            error.to_details(),
            context.user_id.as_deref().unwrap_or("-")
        );
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "cubemon::error",
            "{}: {} (user: {})",
            context.operation,
            message,
            context.user_id.as_deref().unwrap_or("-")
        );
    }
}
