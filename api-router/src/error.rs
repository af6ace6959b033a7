use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::error::AppError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    StorageError(String),

    #[error("Analytics service error: {0}")]
    AnalyticsError(String),

    #[error("Failed to insert into knowledge base: {details}")]
    LinkageError { details: String, query: String },

    #[error("Failed to query knowledge base: {0}")]
    QueryError(String),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Validation(msg) => Self::ValidationError(msg),
            AppError::Csv(e) => Self::ValidationError(format!("Could not parse CSV: {e}")),
            AppError::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                Self::StorageError(e.to_string())
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {:?}", e);
                Self::StorageError(e.to_string())
            }
            AppError::Transport(e) => Self::AnalyticsError(e.to_string()),
            AppError::QueryFailed(msg) => Self::AnalyticsError(msg),
            AppError::Linkage { details, query } => Self::LinkageError { details, query },
            AppError::Query(msg) => Self::QueryError(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            Self::ValidationError(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: message,
                    details: None,
                    query: None,
                },
            ),
            Self::StorageError(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "Database error".to_string(),
                    details: Some(details),
                    query: None,
                },
            ),
            Self::AnalyticsError(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "Analytics service error".to_string(),
                    details: Some(details),
                    query: None,
                },
            ),
            Self::LinkageError { details, query } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "Failed to insert into knowledge base".to_string(),
                    details: Some(details),
                    query: Some(query),
                },
            ),
            Self::QueryError(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "Failed to query knowledge base".to_string(),
                    details: Some(details),
                    query: None,
                },
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

#[derive(Serialize, Debug)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Debug;

    // Helper to check status code
    fn assert_status_code<T: IntoResponse + Debug>(response: T, expected_status: StatusCode) {
        let response = response.into_response();
        assert_eq!(response.status(), expected_status);
    }

    #[test]
    fn test_app_error_to_api_error_conversion() {
        let validation = AppError::Validation("invalid input".to_string());
        let api_error = ApiError::from(validation);
        assert!(matches!(api_error, ApiError::ValidationError(msg) if msg == "invalid input"));

        let failed = AppError::QueryFailed("Table not found".to_string());
        let api_error = ApiError::from(failed);
        assert!(matches!(api_error, ApiError::AnalyticsError(msg) if msg == "Table not found"));

        let linkage = AppError::Linkage {
            details: "boom".to_string(),
            query: "INSERT INTO kb".to_string(),
        };
        let api_error = ApiError::from(linkage);
        assert!(
            matches!(api_error, ApiError::LinkageError { details, query } if details == "boom" && query == "INSERT INTO kb")
        );

        let io_error = AppError::Io(std::io::Error::new(std::io::ErrorKind::Other, "io error"));
        let api_error = ApiError::from(io_error);
        assert!(matches!(api_error, ApiError::StorageError(_)));
    }

    #[test]
    fn test_api_error_response_status_codes() {
        let error = ApiError::ValidationError("invalid input".to_string());
        assert_status_code(error, StatusCode::BAD_REQUEST);

        let error = ApiError::StorageError("connection refused".to_string());
        assert_status_code(error, StatusCode::INTERNAL_SERVER_ERROR);

        let error = ApiError::AnalyticsError("service error".to_string());
        assert_status_code(error, StatusCode::INTERNAL_SERVER_ERROR);

        let error = ApiError::LinkageError {
            details: "boom".to_string(),
            query: "INSERT".to_string(),
        };
        assert_status_code(error, StatusCode::INTERNAL_SERVER_ERROR);

        let error = ApiError::QueryError("boom".to_string());
        assert_status_code(error, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_messages() {
        let message = "invalid data format";
        let error = ApiError::ValidationError(message.to_string());
        assert_eq!(error.to_string(), format!("Validation error: {}", message));

        let error = ApiError::QueryError("upstream refused".to_string());
        assert_eq!(
            error.to_string(),
            "Failed to query knowledge base: upstream refused"
        );
    }
}
