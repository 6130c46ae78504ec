//! accountd server
//!
//! Per-user multi-currency balance service: authorized balance reads and
//! trusted-internal balance mutations over HTTP.
//!
//! ```bash
//! # Run against PostgreSQL (DATABASE_URL) and the auth service
//! cargo run -p accountd-server
//!
//! # Run against seeded in-memory stores
//! cargo run -p accountd-server -- --in-memory
//! ```

mod dto;
mod error;
mod handlers;
mod middleware;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use rust_decimal_macros::dec;
use tracing::info;

use accountd_auth::{AuthConfig, AuthorizationGate, HttpTokenValidator};
use accountd_db::{
    Database, DatabaseConfig, MemoryAccountStore, MemoryIdentityStore,
};
use accountd_ledger::Ledger;
use accountd_types::Currency;

use crate::state::AppState;

#[derive(Parser)]
#[command(name = "accountd")]
#[command(about = "Per-user multi-currency balance service")]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Run against seeded in-memory stores instead of PostgreSQL
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    info!("Starting accountd server");
    info!("  Port: {}", cli.port);
    info!("  In-memory mode: {}", cli.in_memory);

    let auth_config = AuthConfig::from_env();
    let validator = Arc::new(HttpTokenValidator::new(&auth_config)?);

    let state = if cli.in_memory {
        let accounts = MemoryAccountStore::new();
        let identities = MemoryIdentityStore::new();
        seed_demo(&accounts, &identities);

        AppState::new(
            AuthorizationGate::new(validator, Arc::new(identities)),
            Ledger::new(Arc::new(accounts)),
        )
    } else {
        let db = Database::connect(&DatabaseConfig::from_env()).await?;
        db.migrate().await?;

        AppState::new(
            AuthorizationGate::new(validator, Arc::new(db.identity_store())),
            Ledger::new(Arc::new(db.account_store())),
        )
    };

    let app = routes::router(Arc::new(state));

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Demo fixtures for `--in-memory` mode.
fn seed_demo(accounts: &MemoryAccountStore, identities: &MemoryIdentityStore) {
    identities.insert_user(1, "alice@example.com");
    identities.insert_user(2, "bob@example.com");

    accounts.insert_account(1, Currency::USD, dec!(100.00));
    accounts.insert_account(1, Currency::EUR, dec!(50.00));
    accounts.insert_account(2, Currency::AZN, dec!(75.00));

    info!("Seeded demo users and balances");
}
