//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cart_store::CartStoreError;
use domain::CartError;
use session::{CatalogError, SessionError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Session cart operation error.
    Session(SessionError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Session(err) => session_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn session_error_to_response(err: SessionError) -> (StatusCode, String) {
    match &err {
        SessionError::Cart(cart_err) => match cart_err {
            CartError::InvalidQuantity { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            CartError::ItemNotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
            CartError::UnpricedItem { .. } => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        },
        SessionError::Catalog(CatalogError::ProductNotFound(_)) => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        SessionError::Catalog(CatalogError::Lookup(_)) => {
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        SessionError::CartNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        SessionError::Store(CartStoreError::ConcurrencyConflict { .. }) => {
            (StatusCode::CONFLICT, err.to_string())
        }
        SessionError::Store(CartStoreError::CartNotFound(_)) => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        SessionError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError::Session(err)
    }
}
