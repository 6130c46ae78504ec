//! PostgreSQL-backed stores
//!
//! Read-for-update is a row-level `SELECT ... FOR UPDATE` inside a
//! transaction; the transaction is held by the returned guard and committed
//! or rolled back when the guard resolves. PostgreSQL serializes mutators
//! on the same row while leaving other rows untouched.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;
use sqlx::{FromRow, Postgres, Transaction};
use std::str::FromStr;

use accountd_types::{BalanceRecord, Currency, UserId};

use crate::error::{StoreError, StoreResult};
use crate::store::{AccountStore, BalanceLock, IdentityStore};

/// Raw `account` table row. Currency is stored as its ISO code.
#[derive(Debug, Clone, FromRow)]
struct BalanceRow {
    id: i64,
    user_id: i64,
    currency: String,
    balance: Decimal,
}

impl TryFrom<BalanceRow> for BalanceRecord {
    type Error = StoreError;

    fn try_from(row: BalanceRow) -> StoreResult<BalanceRecord> {
        let currency = Currency::from_str(&row.currency).map_err(|e| {
            StoreError::Inconsistent(format!("account {}: {}", row.id, e))
        })?;
        Ok(BalanceRecord {
            id: row.id,
            user_id: row.user_id,
            currency,
            balance: row.balance,
        })
    }
}

/// Account store over a PostgreSQL pool
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn balances_for_user(&self, user_id: UserId) -> StoreResult<Vec<BalanceRecord>> {
        let rows = sqlx::query_as::<_, BalanceRow>(
            r#"
            SELECT id, user_id, currency, balance
            FROM account
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BalanceRecord::try_from).collect()
    }

    async fn lock_for_update(
        &self,
        user_id: UserId,
        currency: Currency,
    ) -> StoreResult<Option<Box<dyn BalanceLock>>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, BalanceRow>(
            r#"
            SELECT id, user_id, currency, balance
            FROM account
            WHERE user_id = $1 AND currency = $2
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(currency.code())
        .fetch_optional(&mut *tx)
        .await?;

        match row {
            Some(row) => {
                let record = BalanceRecord::try_from(row)?;
                Ok(Some(Box::new(PgBalanceLock { tx, record })))
            }
            // Dropping the transaction releases it without side effects.
            None => Ok(None),
        }
    }
}

/// Guard holding the row lock via an open transaction
struct PgBalanceLock {
    tx: Transaction<'static, Postgres>,
    record: BalanceRecord,
}

#[async_trait]
impl BalanceLock for PgBalanceLock {
    fn record(&self) -> &BalanceRecord {
        &self.record
    }

    async fn commit(self: Box<Self>, new_balance: Decimal) -> StoreResult<BalanceRecord> {
        let PgBalanceLock { mut tx, record } = *self;

        let row = sqlx::query_as::<_, BalanceRow>(
            r#"
            UPDATE account
            SET balance = $2
            WHERE id = $1
            RETURNING id, user_id, currency, balance
            "#,
        )
        .bind(record.id)
        .bind(new_balance)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| StoreError::Transaction(e.to_string()))?;

        BalanceRecord::try_from(row)
    }
}

/// Identity store over the `account_user` table
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_user_id(&self, username: &str) -> StoreResult<Option<UserId>> {
        let id: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM account_user WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id.map(|(id,)| id))
    }
}
