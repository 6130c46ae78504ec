//! Canonical domain types for accountd
//!
//! Shared entity shapes for the balance service. This crate has no
//! dependencies on other accountd crates so every layer can use it.

pub mod account;
pub mod currency;

pub use account::{BalanceRecord, User, UserId};
pub use currency::{Currency, ParseCurrencyError};
