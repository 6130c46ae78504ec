//! Request/response shapes
//!
//! Wire representation is camelCase; amounts travel as decimal strings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use accountd_types::{BalanceRecord, Currency, UserId};

/// Body of the internal balance update endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceUpdateRequest {
    pub user_id: UserId,
    pub currency: Currency,
    /// Signed delta: positive = credit, negative = debit
    pub amount: Decimal,
}

/// One balance record as returned to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: i64,
    pub user_id: UserId,
    pub currency: Currency,
    pub balance: Decimal,
}

impl From<BalanceRecord> for AccountResponse {
    fn from(record: BalanceRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            currency: record.currency,
            balance: record.balance,
        }
    }
}
