//! Error types for cubemon-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cubemon_core::{CoreError, ErrorCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Core(err) => match err.code() {
                ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
                ErrorCode::TransactionNotFound => StatusCode::NOT_FOUND,
                ErrorCode::SourceError | ErrorCode::ExportError => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Core(err) => serde_json::to_value(err.to_details()).unwrap_or_default(),
            other => serde_json::json!({ "message": other.to_string() }),
        };
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        let not_found: ApiError = CoreError::TransactionNotFound { id: "TXN-1".into() }.into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        let export: ApiError = CoreError::ExportError { message: "x".into() }.into();
        assert_eq!(export.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
