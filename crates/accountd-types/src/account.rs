//! User and balance record entities

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Currency;

/// Opaque numeric user identifier, assigned outside this service.
pub type UserId = i64;

/// A local identity record. Users are created and destroyed elsewhere;
/// this service only reads them to resolve authenticated usernames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

/// The quantity of one currency held by one user.
///
/// At most one record exists per `(user_id, currency)` pair and its balance
/// is never negative at a committed state. The amount is an exact decimal;
/// binary floating point is never acceptable for money.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
    pub id: i64,
    pub user_id: UserId,
    pub currency: Currency,
    pub balance: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balance_record_serializes_with_currency_code() {
        let record = BalanceRecord {
            id: 7,
            user_id: 1,
            currency: Currency::USD,
            balance: dec!(100.00),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["currency"], "USD");
        assert_eq!(json["balance"], "100.00");
    }
}
