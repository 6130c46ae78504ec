//! Authorization configuration

use serde::{Deserialize, Serialize};

/// Configuration for the external auth service client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Base URL of the auth service
    pub auth_service_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            auth_service_url: "http://localhost:8081".to_string(),
            timeout_secs: 5,
        }
    }
}

impl AuthConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self {
            auth_service_url: std::env::var("AUTH_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),
            timeout_secs: std::env::var("AUTH_SERVICE_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        }
    }
}
