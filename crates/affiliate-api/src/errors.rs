use affiliate_analytics::AnalyticsError;
use affiliate_db::DatabaseError;
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dto::ApiResponse;

#[derive(Error, Debug, Serialize, Deserialize)]
pub enum ApiError {
    #[error("Database error: {0}")]
    DbError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Internal server error")]
    InternalServerError,
}

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        if err.is_client_error() {
            Self::BadRequest(err.to_string())
        } else {
            tracing::error!(error = %err, "Cannot build analytics response");
            Self::InternalServerError
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { operation } => Self::NotFound(operation),
            // Already logged by the pool.
            other => Self::DbError(other.operation().to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, msg) = match self {
            Self::DbError(operation) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error during {operation}"),
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };
        let response: ApiResponse<()> = ApiResponse::error(msg);
        (status, Json(response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analytics_errors_mapping() {
        let err: ApiError = AnalyticsError::InvalidTimezone("Mars/Olympus".to_string()).into();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg.contains("Mars/Olympus")));

        let err: ApiError = AnalyticsError::AmountOutOfRange("1e30".to_string()).into();
        assert!(matches!(err, ApiError::InternalServerError));
    }

    #[test]
    fn test_database_errors_mapping() {
        let err: ApiError = DatabaseError::not_found("program prog_404").into();
        assert!(matches!(err, ApiError::NotFound(msg) if msg == "program prog_404"));

        let err: ApiError = DatabaseError::QueryError {
            operation: "list commissions".to_string(),
            message: "relation \"commissions\" does not exist".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::DbError(op) if op == "list commissions"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::BadRequest("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("x".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::DbError("x".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
