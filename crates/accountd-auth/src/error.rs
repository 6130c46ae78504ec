//! Authorization error types
//!
//! Errors are safe for external exposure: they never echo the presented
//! token back to the caller.

use thiserror::Error;

use accountd_db::StoreError;

/// Result type alias for authorization operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authorization error types
#[derive(Debug, Error)]
pub enum AuthError {
    /// Bearer token absent or malformed, or the authenticator rejected it
    #[error("missing or malformed bearer token")]
    InvalidCredential,

    /// Token was valid but the principal is not known locally
    #[error("requester not found in local identity store")]
    UnknownRequester,

    /// Resolved identity does not own the requested resource
    #[error("requester may not view this user's balance")]
    AccessDenied,

    /// Identity store failure while resolving the requester
    #[error("identity store error: {0}")]
    Store(#[from] StoreError),
}
