//! accountd balance mutation engine
//!
//! Applies signed deltas to a single `(user_id, currency)` balance under
//! exclusive access, enforcing the non-negative invariant, and lists a
//! user's balances without taking locks.
//!
//! # Invariants
//!
//! 1. No committed balance is ever negative
//! 2. Concurrent deltas on one key serialize; different keys never contend
//! 3. The lock is released only after durable commit or rollback
//! 4. Arithmetic is exact decimal; no rounding, no floating point

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::instrument;

use accountd_db::{AccountStore, StoreError};
use accountd_types::{BalanceRecord, Currency, UserId};

/// Errors that can occur in ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    /// No balance record exists for the `(user, currency)` pair; records
    /// are never auto-created with a zero balance.
    #[error("account not found")]
    AccountNotFound,

    /// The delta would drive the balance negative. Reports the untouched
    /// pre-mutation balance and the debit magnitude that was attempted.
    #[error("Insufficient funds. Current: {current} {currency}, Tried to spend: {attempted}")]
    InsufficientFunds {
        current: Decimal,
        currency: Currency,
        attempted: Decimal,
    },

    /// The durability layer failed after lock acquisition; the balance
    /// change was rolled back and nothing partial is observable.
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// The balance mutation engine.
///
/// Cheap to clone; all state lives in the injected account store.
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn AccountStore>,
}

impl Ledger {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Apply a signed delta (positive = credit, negative = debit) to the
    /// single balance record for `(user_id, currency)`.
    ///
    /// The record is locked for the whole read-compute-commit sequence, so
    /// concurrent deltas on the same key serialize while other keys proceed
    /// in parallel. Returns the just-persisted snapshot. All failures are
    /// terminal; nothing is retried here.
    #[instrument(skip(self), err)]
    pub async fn apply_delta(
        &self,
        user_id: UserId,
        currency: Currency,
        delta: Decimal,
    ) -> Result<BalanceRecord> {
        let lock = self
            .store
            .lock_for_update(user_id, currency)
            .await?
            .ok_or(LedgerError::AccountNotFound)?;

        let current = lock.record().balance;
        let new_balance = current + delta;

        if new_balance < Decimal::ZERO {
            // Guard drops without commit: record stays untouched.
            return Err(LedgerError::InsufficientFunds {
                current,
                currency,
                attempted: -delta,
            });
        }

        let updated = lock.commit(new_balance).await?;
        Ok(updated)
    }

    /// All balance records for a user, sorted by currency code for a stable
    /// listing. Takes no locks and never waits on an in-flight mutation.
    #[instrument(skip(self), err)]
    pub async fn list_balances(&self, user_id: UserId) -> Result<Vec<BalanceRecord>> {
        let mut records = self.store.balances_for_user(user_id).await?;
        records.sort_by_key(|r| r.currency.code());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use rust_decimal_macros::dec;
    use tokio::time::timeout;

    use accountd_db::MemoryAccountStore;

    fn ledger_with_store() -> (Ledger, MemoryAccountStore) {
        let store = MemoryAccountStore::new();
        let ledger = Ledger::new(Arc::new(store.clone()));
        (ledger, store)
    }

    #[tokio::test]
    async fn test_credit_is_exact() {
        let (ledger, store) = ledger_with_store();
        store.insert_account(1, Currency::USD, dec!(100.00));

        let updated = ledger
            .apply_delta(1, Currency::USD, dec!(50.00))
            .await
            .unwrap();

        assert_eq!(updated.user_id, 1);
        assert_eq!(updated.currency, Currency::USD);
        assert_eq!(updated.balance, dec!(150.00));

        let listed = ledger.list_balances(1).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].balance, dec!(150.00));
    }

    #[tokio::test]
    async fn test_debit_to_exactly_zero_is_allowed() {
        let (ledger, store) = ledger_with_store();
        store.insert_account(1, Currency::EUR, dec!(25.50));

        let updated = ledger
            .apply_delta(1, Currency::EUR, dec!(-25.50))
            .await
            .unwrap();

        assert_eq!(updated.balance, dec!(0.00));
    }

    #[tokio::test]
    async fn test_overdraft_is_rejected_and_balance_untouched() {
        let (ledger, store) = ledger_with_store();
        store.insert_account(1, Currency::USD, dec!(100.00));

        let err = ledger
            .apply_delta(1, Currency::USD, dec!(-150.00))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Insufficient funds. Current: 100.00 USD, Tried to spend: 150.00"
        );

        let listed = ledger.list_balances(1).await.unwrap();
        assert_eq!(listed[0].balance, dec!(100.00));
    }

    #[tokio::test]
    async fn test_missing_account() {
        let (ledger, _store) = ledger_with_store();

        let err = ledger
            .apply_delta(42, Currency::USD, dec!(10.00))
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::AccountNotFound));
        assert_eq!(err.to_string(), "account not found");
    }

    #[tokio::test]
    async fn test_no_rounding_drift_on_small_amounts() {
        let (ledger, store) = ledger_with_store();
        store.insert_account(1, Currency::USD, dec!(0.00));

        for _ in 0..100 {
            ledger.apply_delta(1, Currency::USD, dec!(0.01)).await.unwrap();
        }

        let listed = ledger.list_balances(1).await.unwrap();
        assert_eq!(listed[0].balance, dec!(1.00));
    }

    #[tokio::test]
    async fn test_storage_failure_rolls_back() {
        let (ledger, store) = ledger_with_store();
        store.insert_account(1, Currency::USD, dec!(100.00));
        store.set_commit_failure(true);

        let err = ledger
            .apply_delta(1, Currency::USD, dec!(50.00))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Storage(_)));

        store.set_commit_failure(false);
        let listed = ledger.list_balances(1).await.unwrap();
        assert_eq!(listed[0].balance, dec!(100.00));
    }

    #[tokio::test]
    async fn test_concurrent_deltas_on_one_key_serialize() {
        let (ledger, store) = ledger_with_store();
        store.insert_account(1, Currency::USD, dec!(1000.00));

        let mut handles = Vec::new();
        for _ in 0..100 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                ledger.apply_delta(1, Currency::USD, dec!(-10.00)).await
            }));
        }

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // A lost update would leave money behind; a torn one would go below
        // zero. Serialized execution drains the account exactly.
        let listed = ledger.list_balances(1).await.unwrap();
        assert_eq!(listed[0].balance, dec!(0.00));
    }

    #[tokio::test]
    async fn test_contended_overdrafts_never_go_negative() {
        let (ledger, store) = ledger_with_store();
        store.insert_account(1, Currency::USD, dec!(50.00));

        let mut handles = Vec::new();
        for _ in 0..20 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                ledger.apply_delta(1, Currency::USD, dec!(-20.00)).await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        // Only two 20.00 debits fit in 50.00, whatever the interleaving.
        assert_eq!(successes, 2);
        let listed = ledger.list_balances(1).await.unwrap();
        assert_eq!(listed[0].balance, dec!(10.00));
    }

    #[tokio::test]
    async fn test_lock_on_one_key_does_not_block_another() {
        let (ledger, store) = ledger_with_store();
        store.insert_account(1, Currency::USD, dec!(100.00));
        store.insert_account(2, Currency::EUR, dec!(100.00));

        // Hold the (1, USD) lock for the duration of the test.
        let held = store
            .lock_for_update(1, Currency::USD)
            .await
            .unwrap()
            .unwrap();

        let updated = timeout(
            Duration::from_secs(1),
            ledger.apply_delta(2, Currency::EUR, dec!(-40.00)),
        )
        .await
        .expect("mutation on a different key must not wait for the held lock")
        .unwrap();

        assert_eq!(updated.balance, dec!(60.00));
        drop(held);
    }

    #[tokio::test]
    async fn test_list_does_not_block_on_held_lock() {
        let (ledger, store) = ledger_with_store();
        store.insert_account(1, Currency::USD, dec!(100.00));
        store.insert_account(1, Currency::EUR, dec!(5.00));

        let held = store
            .lock_for_update(1, Currency::USD)
            .await
            .unwrap()
            .unwrap();

        let listed = timeout(Duration::from_secs(1), ledger.list_balances(1))
            .await
            .expect("listing must not wait for the mutation lock")
            .unwrap();

        // Committed values only, sorted by currency code.
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].currency, Currency::EUR);
        assert_eq!(listed[1].currency, Currency::USD);
        assert_eq!(listed[1].balance, dec!(100.00));
        drop(held);
    }

    #[tokio::test]
    async fn test_list_reflects_committed_mutation() {
        let (ledger, store) = ledger_with_store();
        store.insert_account(1, Currency::USD, dec!(100.00));

        ledger
            .apply_delta(1, Currency::USD, dec!(50.00))
            .await
            .unwrap();

        let listed = ledger.list_balances(1).await.unwrap();
        assert_eq!(listed[0].balance, dec!(150.00));
    }
}
