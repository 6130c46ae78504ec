//! Identity-gated read authorization
//!
//! Flow: extract the bearer token from the raw `Authorization` header,
//! delegate validation to the external authenticator, resolve the returned
//! username against the local identity store, and require the resolved user
//! id to equal the requested one exactly. Strict same-identity policy; no
//! roles, no admin override.

use std::sync::Arc;

use tracing::instrument;

use accountd_db::IdentityStore;
use accountd_types::UserId;

use crate::error::{AuthError, AuthResult};
use crate::validator::TokenValidator;

/// Case-sensitive scheme prefix. Anything else (lowercase `bearer`, extra
/// whitespace, missing scheme) is malformed.
const BEARER_PREFIX: &str = "Bearer ";

/// Authorizes reads of a user's balances.
pub struct AuthorizationGate {
    validator: Arc<dyn TokenValidator>,
    identities: Arc<dyn IdentityStore>,
}

impl AuthorizationGate {
    pub fn new(validator: Arc<dyn TokenValidator>, identities: Arc<dyn IdentityStore>) -> Self {
        Self {
            validator,
            identities,
        }
    }

    /// Authorize a read of `requested_user_id`'s balances.
    ///
    /// Returns the resolved local user id on success. Performs no mutation
    /// and is safe to call concurrently. A malformed header fails before
    /// any authenticator or identity store interaction.
    #[instrument(skip(self, authorization_header), err)]
    pub async fn authorize_balance_read(
        &self,
        requested_user_id: UserId,
        authorization_header: Option<&str>,
    ) -> AuthResult<UserId> {
        let token = bearer_token(authorization_header)?;

        // Any authenticator rejection surfaces uniformly as an invalid
        // credential; error bodies are not interpreted and nothing is retried.
        let username = self
            .validator
            .validate(token)
            .await
            .map_err(|_| AuthError::InvalidCredential)?;

        let requester_id = self
            .identities
            .find_user_id(&username)
            .await?
            .ok_or(AuthError::UnknownRequester)?;

        if requester_id != requested_user_id {
            return Err(AuthError::AccessDenied);
        }

        Ok(requester_id)
    }
}

/// Extract the token from a raw `Authorization` header value.
fn bearer_token(header: Option<&str>) -> AuthResult<&str> {
    let token = header
        .and_then(|h| h.strip_prefix(BEARER_PREFIX))
        .ok_or(AuthError::InvalidCredential)?;

    if token.is_empty() {
        return Err(AuthError::InvalidCredential);
    }

    Ok(token)
}
