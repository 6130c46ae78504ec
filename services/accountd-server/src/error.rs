//! API error handling
//!
//! Translates gate and ledger errors into HTTP statuses and the service's
//! error envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use accountd_auth::AuthError;
use accountd_ledger::LedgerError;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// Stable error code strings carried in the error envelope
pub mod error_code {
    pub const INVALID_TOKEN: &str = "INVALID_TOKEN";
    pub const NOT_FOUND: &str = "not_found";
    pub const INVALID_CREDENTIALS: &str = "invalid_credentials";
    pub const NOT_ALLOWED: &str = "not_allowed";
    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// API error wrapping the two core error taxonomies
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Auth(AuthError::InvalidCredential) => StatusCode::UNAUTHORIZED,
            Self::Auth(AuthError::UnknownRequester) => StatusCode::NOT_FOUND,
            Self::Auth(AuthError::AccessDenied) => StatusCode::FORBIDDEN,
            Self::Auth(AuthError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Ledger(LedgerError::AccountNotFound) => StatusCode::NOT_FOUND,
            Self::Ledger(LedgerError::InsufficientFunds { .. }) => StatusCode::BAD_REQUEST,
            Self::Ledger(LedgerError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Auth(AuthError::InvalidCredential) => error_code::INVALID_TOKEN,
            Self::Auth(AuthError::UnknownRequester) => error_code::NOT_FOUND,
            Self::Auth(AuthError::AccessDenied) => error_code::INVALID_CREDENTIALS,
            Self::Auth(AuthError::Store(_)) => error_code::INTERNAL_ERROR,
            Self::Ledger(LedgerError::AccountNotFound) => error_code::NOT_FOUND,
            Self::Ledger(LedgerError::InsufficientFunds { .. }) => error_code::NOT_ALLOWED,
            Self::Ledger(LedgerError::Storage(_)) => error_code::INTERNAL_ERROR,
        }
    }
}

/// Error envelope returned for every failed request
#[derive(Debug, Serialize, Deserialize)]
pub struct GlobalResponse {
    /// Unique id for correlating this failure in logs
    pub id: Uuid,
    pub error_code: String,
    pub error_message: String,
    pub time: DateTime<Utc>,
}

impl From<&ApiError> for GlobalResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            id: Uuid::new_v4(),
            error_code: err.error_code().to_string(),
            error_message: err.to_string(),
            time: Utc::now(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = GlobalResponse::from(&self);
        (status, Json(body)).into_response()
    }
}
