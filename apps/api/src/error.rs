//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow                                       │
//! │                                                                     │
//! │  Handler                                                            │
//! │  Result<T, ApiError>                                                │
//! │       │                                                             │
//! │       ├── ValidationError ──► 400 {code: VALIDATION_ERROR, …}       │
//! │       ├── DbError::NotFound ──► 404 {code: NOT_FOUND, …}            │
//! │       ├── DbError::UniqueViolation ─┐                               │
//! │       ├── DbError::AlreadyPurchased ┴► 409 {code: CONFLICT, …}      │
//! │       └── other DbError ──► 500 {code: DATABASE_ERROR, …}           │
//! │                                                                     │
//! │  The client receives: {"code": "...", "message": "..."}             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use mercado_core::ValidationError;
use mercado_db::DbError;

/// API error returned from HTTP handlers.
///
/// ## Serialization
/// ```json
/// {
///   "code": "CONFLICT",
///   "message": "Headset Kraken from sale 3f2a… has already been purchased"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Business conflict, e.g. duplicate identity or double purchase (409)
    Conflict,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::new(ErrorCode::ValidationError, err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match &err {
            DbError::NotFound { .. } => ApiError::new(ErrorCode::NotFound, err.to_string()),

            DbError::UniqueViolation { .. } | DbError::AlreadyPurchased { .. } => {
                ApiError::new(ErrorCode::Conflict, err.to_string())
            }

            // Store-level failures are propagated as server errors; the
            // details go to the log, a generic message to the client.
            DbError::ForeignKeyViolation { .. }
            | DbError::QueryFailed(_)
            | DbError::ConnectionFailed(_)
            | DbError::MigrationFailed(_)
            | DbError::PoolExhausted
            | DbError::Internal(_) => {
                tracing::error!(error = %err, "Database operation failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let err: ApiError = DbError::not_found("Sale", "abc").into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.code.status(), StatusCode::NOT_FOUND);
        assert!(err.message.contains("Sale"));
    }

    #[test]
    fn test_conflicts_map_to_409() {
        let err: ApiError = DbError::AlreadyPurchased {
            product_name: "Headset Kraken".to_string(),
            sale_id: "s1".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert!(err.message.contains("Headset Kraken"));
        assert!(err.message.contains("s1"));

        let err: ApiError = DbError::duplicate("email", "a@b.c").into();
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[test]
    fn test_store_failures_hide_details() {
        let err: ApiError = DbError::QueryFailed("syntax error near SELCT".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("SELCT"));
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::ValidationError).unwrap();
        assert_eq!(json, "\"VALIDATION_ERROR\"");
    }
}
