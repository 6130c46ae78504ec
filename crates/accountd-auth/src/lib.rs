//! accountd authorization layer
//!
//! Gate for balance reads: bearer-token extraction, validation delegated to
//! the external auth service, and strict requester-vs-owner enforcement.
//! Token validity is never decided locally; the authenticator's answer is
//! the only source of trust.

pub mod config;
pub mod error;
pub mod gate;
pub mod validator;

pub use config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use gate::AuthorizationGate;
pub use validator::{HttpTokenValidator, TokenValidator};
