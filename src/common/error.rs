// Error handling types for the API

use axum::body::{to_bytes, Body};
use axum::{
    extract::{Extension, Request},
    http::{header::CONTENT_LENGTH, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::error;

use super::state::AppState;
use super::validation::ValidationResult;

/// Underlying error text of a 500, carried as a response extension until
/// `attach_error_details` decides whether the client may see it.
#[derive(Debug, Clone)]
pub struct ErrorDetails(pub String);

/// API error types
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    InternalServer(String),
    ServiceUnavailable(String),
    DatabaseError(sqlx::Error),
    ValidationError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service Unavailable: {}", msg),
            ApiError::DatabaseError(e) => write!(f, "Database Error: {}", e),
            ApiError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Maps a unique-constraint violation to `Conflict`, anything else to `DatabaseError`.
    pub fn from_insert(e: sqlx::Error, conflict_message: &str) -> Self {
        if is_unique_violation(&e) {
            ApiError::Conflict(conflict_message.to_string())
        } else {
            ApiError::DatabaseError(e)
        }
    }
}

/// True when the error is a UNIQUE constraint failure.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => {
            db.is_unique_violation() || db.message().contains("UNIQUE constraint failed")
        }
        _ => false,
    }
}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message, code, details) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, "UNAUTHORIZED", None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST", None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND", None),
            ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg, "CONFLICT", None),
            ApiError::InternalServer(msg) => {
                error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_SERVER_ERROR",
                    Some(msg),
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                msg,
                "SERVICE_UNAVAILABLE",
                None,
            ),
            ApiError::DatabaseError(e) => {
                error!(error = %e, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database operation failed".to_string(),
                    "DATABASE_ERROR",
                    Some(format!("{:?}", e)),
                )
            }
            ApiError::ValidationError(msg) => {
                (StatusCode::BAD_REQUEST, msg, "VALIDATION_ERROR", None)
            }
        };

        let error_response = ErrorResponse {
            error: error_message,
            code: code.to_string(),
            details: None,
        };

        let mut response = (status, Json(error_response)).into_response();
        if let Some(details) = details {
            response.extensions_mut().insert(ErrorDetails(details));
        }
        response
    }
}

/// Copies `ErrorDetails` into the JSON error body outside production.
pub async fn attach_error_details(
    Extension(state): Extension<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let response = next.run(request).await;
    if state.config.production {
        return Ok(response);
    }
    let Some(ErrorDetails(details)) = response.extensions().get::<ErrorDetails>().cloned() else {
        return Ok(response);
    };

    let (mut parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let body = match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(mut map)) => {
            map.insert("details".to_string(), Value::String(details));
            serde_json::to_vec(&Value::Object(map))
                .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        }
        _ => bytes.to_vec(),
    };
    parts.headers.remove(CONTENT_LENGTH);

    Ok(Response::from_parts(parts, Body::from(body)))
}

/// Helper function to convert ValidationResult to ApiError
impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        if result.is_valid {
            ApiError::InternalServer(
                "Validation result was valid but converted to error".to_string(),
            )
        } else {
            let error_messages: Vec<String> = result
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            ApiError::ValidationError(error_messages.join(", "))
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::DatabaseError(e)
    }
}
