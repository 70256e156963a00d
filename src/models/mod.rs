//! Data models for the FinWise API.
//!
//! Response models are immutable snapshots of server state. Monetary values use
//! [`rust_decimal::Decimal`] and are sent as JSON strings, dates use `chrono`.
//!
//! - [`account`] - Accounts and their create/update requests
//! - [`account_balance`] - Balance snapshots, amounts and aggregations
//! - [`transaction`] - Transactions and aggregations
//! - [`transaction_category`] - Categories for organizing transactions

pub mod account;
pub mod account_balance;
pub mod transaction;
pub mod transaction_category;

pub use account::*;
pub use account_balance::*;
pub use transaction::*;
pub use transaction_category::*;

use crate::{Error, Result};

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidRequest(format!("{} is required", field)));
    }
    Ok(())
}

pub(crate) fn require_max_len(field: &str, value: Option<&str>, max: usize) -> Result<()> {
    match value {
        Some(value) if value.chars().count() > max => Err(Error::InvalidRequest(format!(
            "{} must be at most {} characters",
            field, max
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn require_len_between(field: &str, value: &str, min: usize, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(Error::InvalidRequest(format!(
            "{} must be between {} and {} characters, got {}",
            field, min, max, len
        )));
    }
    Ok(())
}

/// ISO 4217 codes are three upper-case ASCII letters.
pub(crate) fn require_currency_code(value: &str) -> Result<()> {
    if value.len() == 3 && value.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(Error::InvalidRequest(format!(
            "currency must be a three-letter ISO 4217 code, got {:?}",
            value
        )))
    }
}
