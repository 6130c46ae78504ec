//! Currency codes supported by the balance service
//!
//! A closed enumeration: balances exist only in these currencies, and an
//! unknown code is a hard parse error rather than a free-form string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fiat currency codes (ISO 4217) a balance can be held in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Currency {
    USD,
    EUR,
    GBP,
    AZN,
    TRY,
    RUB,
}

impl Currency {
    /// Get the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::AZN => "AZN",
            Self::TRY => "TRY",
            Self::RUB => "RUB",
        }
    }

    /// Get the standard decimal places for this currency
    pub fn decimals(&self) -> u8 {
        2
    }

    /// All supported currencies
    pub fn all() -> &'static [Currency] {
        &[
            Self::USD,
            Self::EUR,
            Self::GBP,
            Self::AZN,
            Self::TRY,
            Self::RUB,
        ]
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Error returned when a currency code is not in the supported set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported currency code: {0}")]
pub struct ParseCurrencyError(pub String);

impl FromStr for Currency {
    type Err = ParseCurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "AZN" => Ok(Self::AZN),
            "TRY" => Ok(Self::TRY),
            "RUB" => Ok(Self::RUB),
            other => Err(ParseCurrencyError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for currency in Currency::all() {
            assert_eq!(Currency::from_str(currency.code()), Ok(*currency));
        }
    }

    #[test]
    fn test_unknown_code_rejected() {
        let err = Currency::from_str("DOGE").unwrap_err();
        assert_eq!(err.to_string(), "unsupported currency code: DOGE");
    }

    #[test]
    fn test_serde_as_code() {
        let json = serde_json::to_string(&Currency::AZN).unwrap();
        assert_eq!(json, "\"AZN\"");
        let back: Currency = serde_json::from_str("\"USD\"").unwrap();
        assert_eq!(back, Currency::USD);
    }
}
