//! API Error Taxonomy
//! Mission: Map every failure kind to one HTTP status and JSON body

use crate::auth::tokens::AuthError;
use crate::chain::ContractError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Request-level failure. Database errors surface their underlying
/// message (the store rolled back already); chain failures map to 503.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed address, role, or field -> 400
    Validation(String),
    /// Duplicate registration or repeated vote -> 400
    Conflict(&'static str),
    /// Bad credentials; deliberately generic so the response does not
    /// reveal whether the account exists -> 401
    InvalidCredentials,
    /// Missing/invalid/expired token or role mismatch -> 401/403
    Auth(AuthError),
    /// Credential store failure -> 500
    Database(anyhow::Error),
    /// Blockchain node or contract failure -> 503
    Chain(ContractError),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Database(err)
    }
}

impl From<ContractError> for ApiError {
    fn from(err: ContractError) -> Self {
        ApiError::Chain(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg.to_string()),
            ApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            ApiError::Auth(err) => return err.into_response(),
            ApiError::Database(err) => {
                tracing::error!("Database error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Database error: {}", err),
                )
            }
            ApiError::Chain(err) => {
                tracing::error!("Contract error: {}", err);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    format!("Blockchain unavailable: {}", err),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
