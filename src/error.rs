use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::{jwt::TokenError, password::PasswordError, repo::StoreError};

/// Every failure a request can end in.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidRequest(String),

    /// Missing, malformed, invalid or expired token, and bad login
    /// credentials. Rendered identically in every case.
    #[error("invalid credentials")]
    Unauthenticated,

    #[error("admin only")]
    Forbidden,

    #[error("email already exists")]
    Conflict,

    #[error("{0}")]
    Store(String),

    #[error("internal server error")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Store(detail) => error!(error = %detail, "store failure"),
            AppError::Internal(detail) => error!(error = %detail, "internal failure"),
            _ => {}
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UniqueViolation => AppError::Conflict,
            StoreError::Database(e) => AppError::Store(e.to_string()),
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(e: PasswordError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Invalid => AppError::Unauthenticated,
            TokenError::Signing(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        warn!(error = %e, "rejected request body");
        AppError::InvalidRequest("invalid JSON body".into())
    }
}
