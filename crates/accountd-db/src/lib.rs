//! accountd persistence layer
//!
//! PostgreSQL-backed stores for balance records and local identities, plus
//! an in-memory implementation used by tests and the server's demo mode.
//!
//! # Store contracts
//!
//! The mutation engine depends on the [`AccountStore`] and
//! [`IdentityStore`] traits. The critical contract is
//! [`AccountStore::lock_for_update`]: the returned guard holds exclusive
//! access to one `(user_id, currency)` record from the locked read until
//! commit or rollback.

pub mod config;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

pub use config::DatabaseConfig;
pub use error::{StoreError, StoreResult};
pub use memory::{MemoryAccountStore, MemoryIdentityStore};
pub use postgres::{PgAccountStore, PgIdentityStore};
pub use store::{AccountStore, BalanceLock, IdentityStore};

/// Database connection pool
pub struct Database {
    /// PostgreSQL connection pool
    pub pg: PgPool,
}

impl Database {
    /// Connect to PostgreSQL
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        info!("Connecting to PostgreSQL: {}", config.postgres_url_masked());

        let pg = PgPoolOptions::new()
            .max_connections(config.pg_max_connections)
            .min_connections(config.pg_min_connections)
            .acquire_timeout(std::time::Duration::from_secs(
                config.pg_acquire_timeout_secs,
            ))
            .connect(&config.postgres_url)
            .await
            .map_err(|e| StoreError::Connection(format!("PostgreSQL: {}", e)))?;

        info!("Connected to PostgreSQL");

        Ok(Self { pg })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> StoreResult<()> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&self.pg)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;
        info!("Migrations complete");
        Ok(())
    }

    /// Health check
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.pg).await.is_ok()
    }

    /// Create an account store over this pool
    pub fn account_store(&self) -> PgAccountStore {
        PgAccountStore::new(self.pg.clone())
    }

    /// Create an identity store over this pool
    pub fn identity_store(&self) -> PgIdentityStore {
        PgIdentityStore::new(self.pg.clone())
    }
}
