//! Error types for the Market API.
//!
//! Every failure leaving a handler is an [`ApiError`]. It renders as the
//! standard envelope with `data = {"code", "message"}`.
//!
//! ## Mapping
//! ```text
//! ValidationError ──► 400 VALIDATION_ERROR
//! CoreError       ──► 400 (business rule codes)
//! DbError         ──► 404 NOT_FOUND | 400 VALIDATION_ERROR | 500 DATABASE_ERROR
//! layer BoxError  ──► 408 TIMEOUT | 500 INTERNAL
//! ```

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{BoxError, Json};
use serde::Serialize;
use tower::timeout::error::Elapsed;

use market_core::{CoreError, ValidationError};
use market_db::DbError;

use crate::response::Envelope;

/// Machine-readable error code for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Missing or wrong credentials (401)
    Unauthorized,

    /// Scanned barcode has no stock record in the branch
    ProductNotFound,

    /// Another unit would exceed the stock on hand
    QuantityLimit,

    /// Stock cannot cover the sale
    InsufficientStock,

    /// Sale is not in process
    InvalidSaleStatus,

    /// Sale has no payment
    PaymentError,

    /// Business rule violated (400)
    BusinessLogic,

    /// Database operation failed (500)
    DatabaseError,

    /// Dependency unreachable (503)
    Unavailable,

    /// Request exceeded the configured timeout (408)
    Timeout,

    /// Internal server error (500)
    Internal,
}

/// An HTTP error response.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: ErrorCode,
    message: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, ErrorCode::ValidationError, message)
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            StatusCode::NOT_FOUND,
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    pub fn unauthorized() -> Self {
        ApiError::new(
            StatusCode::UNAUTHORIZED,
            ErrorCode::Unauthorized,
            "The request requires user authentication.",
        )
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::SERVICE_UNAVAILABLE, ErrorCode::Unavailable, message)
    }

    fn business(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, code, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Envelope::new(
            self.status,
            ErrorBody {
                code: self.code,
                message: &self.message,
            },
        );
        (self.status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::ProductNotFound { .. } => {
                ApiError::business(ErrorCode::ProductNotFound, message)
            }
            CoreError::QuantityLimit { .. } => ApiError::business(ErrorCode::QuantityLimit, message),
            CoreError::InsufficientStock { .. } => {
                ApiError::business(ErrorCode::InsufficientStock, message)
            }
            CoreError::InvalidSaleStatus { .. } => {
                ApiError::business(ErrorCode::InvalidSaleStatus, message)
            }
            CoreError::NoPayment { .. } => ApiError::business(ErrorCode::PaymentError, message),
            CoreError::TransactionNotFound { .. } => {
                ApiError::business(ErrorCode::BusinessLogic, message)
            }
            CoreError::Validation(e) => ApiError::from(e),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                ApiError::bad_request(format!("{} '{}' already exists", field, value))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!("Foreign key violation: {}", message);
                ApiError::bad_request("Invalid reference")
            }
            DbError::Core(e) => ApiError::from(e),
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::unavailable("Database pool exhausted")
            }
            other => {
                // Log the actual error but return a generic message
                tracing::error!(error = %other, "Database operation failed");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DatabaseError,
                    "Database operation failed",
                )
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

/// Renders failures raised by tower layers (the request timeout) as envelopes.
pub async fn handle_layer_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        return ApiError::new(
            StatusCode::REQUEST_TIMEOUT,
            ErrorCode::Timeout,
            "Request timed out",
        );
    }

    tracing::error!(error = %err, "Unhandled middleware error");
    ApiError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorCode::Internal,
        "Internal server error",
    )
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_error_mapping() {
        let err = ApiError::from(DbError::not_found("Sale", "abc"));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = ApiError::from(DbError::QueryFailed("disk I/O error".to_string()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Database operation failed");

        let err = ApiError::from(DbError::Core(CoreError::NoPayment {
            sale_id: "s1".to_string(),
        }));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, ErrorCode::PaymentError);
    }

    #[test]
    fn test_core_error_mapping() {
        let err = ApiError::from(CoreError::QuantityLimit {
            barcode: "478".to_string(),
            available: 2,
        });
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, ErrorCode::QuantityLimit);
        assert!(err.message.contains("478"));

        let err = ApiError::from(CoreError::Validation(ValidationError::Required {
            field: "login".to_string(),
        }));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "login is required");
    }

    #[tokio::test]
    async fn test_layer_error_mapping() {
        let err = handle_layer_error(Box::new(Elapsed::new())).await;
        assert_eq!(err.status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(err.code, ErrorCode::Timeout);

        let err = handle_layer_error("broken pipe".into()).await;
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, ErrorCode::Internal);
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::InsufficientStock).unwrap();
        assert_eq!(json, "\"INSUFFICIENT_STOCK\"");
    }
}
