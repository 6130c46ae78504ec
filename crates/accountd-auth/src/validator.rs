//! External token validation
//!
//! The authenticator is an injected seam: one method taking the opaque
//! token and returning the authenticated username, substitutable by a fake
//! in tests. [`HttpTokenValidator`] is the production implementation that
//! calls the auth service over HTTP.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};

/// Validates an opaque bearer token against the external authenticator.
///
/// Any rejection, whatever its shape on the wire, surfaces uniformly as
/// [`AuthError::InvalidCredential`]; the gate does not interpret
/// authenticator-specific error bodies and does not retry.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Validate a token, returning the authenticated username.
    async fn validate(&self, token: &str) -> AuthResult<String>;
}

#[derive(Debug, Serialize)]
struct TokenValidationRequest<'a> {
    token: &'a str,
}

/// HTTP client for the external auth service
pub struct HttpTokenValidator {
    http: reqwest::Client,
    validate_url: String,
}

impl HttpTokenValidator {
    pub fn new(config: &AuthConfig) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            validate_url: format!("{}/api/auth/validate", config.auth_service_url),
        })
    }
}

#[async_trait]
impl TokenValidator for HttpTokenValidator {
    async fn validate(&self, token: &str) -> AuthResult<String> {
        let response = self
            .http
            .post(&self.validate_url)
            .json(&TokenValidationRequest { token })
            .send()
            .await
            .map_err(|e| {
                debug!("auth service unreachable: {}", e);
                AuthError::InvalidCredential
            })?;

        if !response.status().is_success() {
            debug!("auth service rejected token: {}", response.status());
            return Err(AuthError::InvalidCredential);
        }

        let username = response
            .text()
            .await
            .map_err(|_| AuthError::InvalidCredential)?;

        if username.is_empty() {
            return Err(AuthError::InvalidCredential);
        }

        Ok(username)
    }
}
