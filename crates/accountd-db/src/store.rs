//! Store contracts
//!
//! The balance mutation engine depends on these traits rather than on a
//! concrete database, so the same engine runs against PostgreSQL in
//! production and the in-memory store in tests and demo mode.

use async_trait::async_trait;
use rust_decimal::Decimal;

use accountd_types::{BalanceRecord, Currency, UserId};

use crate::error::StoreResult;

/// Lookup of local identities by username. Read-only.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Resolve a username to a local user id, if the user exists.
    async fn find_user_id(&self, username: &str) -> StoreResult<Option<UserId>>;
}

/// Exclusive access to a single balance record, held from the locked read
/// until commit or rollback.
///
/// Dropping the guard without calling [`commit`](BalanceLock::commit) rolls
/// the transaction back; no partial update is ever observable. While the
/// guard is alive no other mutator can read-for-update or modify the same
/// record.
#[async_trait]
pub trait BalanceLock: Send {
    /// The record as read under the lock.
    fn record(&self) -> &BalanceRecord;

    /// Durably persist the new balance and release the lock.
    ///
    /// The lock is released only after the commit succeeds; on failure the
    /// change is rolled back and the lock released with the stored balance
    /// unchanged.
    async fn commit(self: Box<Self>, new_balance: Decimal) -> StoreResult<BalanceRecord>;
}

/// Access to balance records.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Non-locking read of all balance records for a user.
    ///
    /// May run concurrently with mutations; each returned record is an
    /// internally consistent committed value.
    async fn balances_for_user(&self, user_id: UserId) -> StoreResult<Vec<BalanceRecord>>;

    /// Locking read-for-update of the single `(user_id, currency)` record.
    ///
    /// Returns `None` when no such record exists. Otherwise the returned
    /// guard holds exclusive access until committed or dropped; a caller
    /// racing for the same key blocks here and then observes the
    /// post-commit balance. Locks on different keys never contend.
    async fn lock_for_update(
        &self,
        user_id: UserId,
        currency: Currency,
    ) -> StoreResult<Option<Box<dyn BalanceLock>>>;
}
