//! In-memory stores
//!
//! Backs tests and the server's demo mode. Committed records live in a
//! concurrent map and every write replaces the whole record, so readers
//! only ever observe committed values and never block on an in-flight
//! mutation. Exclusive access is a per-key async mutex acquired before the
//! record is read, mirroring the row lock the PostgreSQL store takes.

use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use accountd_types::{BalanceRecord, Currency, UserId};

use crate::error::{StoreError, StoreResult};
use crate::store::{AccountStore, BalanceLock, IdentityStore};

type Key = (UserId, Currency);

/// In-memory account store
#[derive(Clone, Default)]
pub struct MemoryAccountStore {
    /// Committed balance records
    records: Arc<DashMap<Key, BalanceRecord>>,
    /// One lock per `(user_id, currency)` key
    locks: Arc<DashMap<Key, Arc<Mutex<()>>>>,
    next_id: Arc<AtomicI64>,
    /// When set, the next commits fail and roll back (test support)
    fail_commits: Arc<AtomicBool>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a balance record, assigning it the next record id.
    pub fn insert_account(
        &self,
        user_id: UserId,
        currency: Currency,
        balance: Decimal,
    ) -> BalanceRecord {
        let record = BalanceRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            user_id,
            currency,
            balance,
        };
        self.records.insert((user_id, currency), record.clone());
        record
    }

    /// Make subsequent commits fail, so callers can exercise rollback.
    pub fn set_commit_failure(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    fn key_lock(&self, key: Key) -> Arc<Mutex<()>> {
        self.locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn balances_for_user(&self, user_id: UserId) -> StoreResult<Vec<BalanceRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|entry| entry.key().0 == user_id)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn lock_for_update(
        &self,
        user_id: UserId,
        currency: Currency,
    ) -> StoreResult<Option<Box<dyn BalanceLock>>> {
        let key = (user_id, currency);
        if !self.records.contains_key(&key) {
            return Ok(None);
        }

        let guard = self.key_lock(key).lock_owned().await;

        // Re-read under the lock: a racing caller must observe the balance
        // the previous transaction committed.
        let record = match self.records.get(&key) {
            Some(entry) => entry.value().clone(),
            None => return Ok(None),
        };

        Ok(Some(Box::new(MemoryBalanceLock {
            records: self.records.clone(),
            fail_commits: self.fail_commits.clone(),
            record,
            _guard: guard,
        })))
    }
}

/// Guard holding the per-key mutex until commit or drop
struct MemoryBalanceLock {
    records: Arc<DashMap<Key, BalanceRecord>>,
    fail_commits: Arc<AtomicBool>,
    record: BalanceRecord,
    _guard: OwnedMutexGuard<()>,
}

#[async_trait]
impl BalanceLock for MemoryBalanceLock {
    fn record(&self) -> &BalanceRecord {
        &self.record
    }

    async fn commit(self: Box<Self>, new_balance: Decimal) -> StoreResult<BalanceRecord> {
        if self.fail_commits.load(Ordering::SeqCst) {
            // Guard drops here: rollback, committed record untouched.
            return Err(StoreError::Transaction(
                "injected commit failure".to_string(),
            ));
        }

        let mut updated = self.record.clone();
        updated.balance = new_balance;
        self.records
            .insert((updated.user_id, updated.currency), updated.clone());
        Ok(updated)
    }
}

/// In-memory identity store
#[derive(Clone, Default)]
pub struct MemoryIdentityStore {
    users: Arc<DashMap<String, UserId>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, id: UserId, username: &str) {
        self.users.insert(username.to_string(), id);
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_user_id(&self, username: &str) -> StoreResult<Option<UserId>> {
        Ok(self.users.get(username).map(|entry| *entry.value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_lock_read_commit() {
        let store = MemoryAccountStore::new();
        store.insert_account(1, Currency::USD, dec!(100.00));

        let lock = store
            .lock_for_update(1, Currency::USD)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(lock.record().balance, dec!(100.00));

        let updated = lock.commit(dec!(150.00)).await.unwrap();
        assert_eq!(updated.balance, dec!(150.00));

        let balances = store.balances_for_user(1).await.unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].balance, dec!(150.00));
    }

    #[tokio::test]
    async fn test_missing_record_yields_none() {
        let store = MemoryAccountStore::new();
        assert!(store
            .lock_for_update(1, Currency::EUR)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_drop_without_commit_rolls_back() {
        let store = MemoryAccountStore::new();
        store.insert_account(1, Currency::USD, dec!(100.00));

        let lock = store
            .lock_for_update(1, Currency::USD)
            .await
            .unwrap()
            .unwrap();
        drop(lock);

        let balances = store.balances_for_user(1).await.unwrap();
        assert_eq!(balances[0].balance, dec!(100.00));
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_record_and_releases_lock() {
        let store = MemoryAccountStore::new();
        store.insert_account(1, Currency::USD, dec!(100.00));
        store.set_commit_failure(true);

        let lock = store
            .lock_for_update(1, Currency::USD)
            .await
            .unwrap()
            .unwrap();
        let err = lock.commit(dec!(40.00)).await.unwrap_err();
        assert!(matches!(err, StoreError::Transaction(_)));

        // Lock released and stored balance unchanged.
        let lock = store
            .lock_for_update(1, Currency::USD)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(lock.record().balance, dec!(100.00));
    }

    #[tokio::test]
    async fn test_racing_locker_sees_post_commit_balance() {
        let store = MemoryAccountStore::new();
        store.insert_account(1, Currency::USD, dec!(100.00));

        let first = store
            .lock_for_update(1, Currency::USD)
            .await
            .unwrap()
            .unwrap();

        let racing = {
            let store = store.clone();
            tokio::spawn(async move {
                let lock = store
                    .lock_for_update(1, Currency::USD)
                    .await
                    .unwrap()
                    .unwrap();
                lock.record().balance
            })
        };

        tokio::task::yield_now().await;
        first.commit(dec!(75.00)).await.unwrap();

        assert_eq!(racing.await.unwrap(), dec!(75.00));
    }

    #[tokio::test]
    async fn test_identity_lookup() {
        let store = MemoryIdentityStore::new();
        store.insert_user(1, "testuser@example.com");

        assert_eq!(
            store.find_user_id("testuser@example.com").await.unwrap(),
            Some(1)
        );
        assert_eq!(store.find_user_id("ghost@example.com").await.unwrap(), None);
    }
}
