//! Application state shared across handlers

use accountd_auth::AuthorizationGate;
use accountd_ledger::Ledger;

/// Shared application state
pub struct AppState {
    /// Read authorization gate
    pub gate: AuthorizationGate,
    /// Balance mutation engine
    pub ledger: Ledger,
}

impl AppState {
    pub fn new(gate: AuthorizationGate, ledger: Ledger) -> Self {
        Self { gate, ledger }
    }
}
