//! Account balance models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{require_currency_code, require_non_empty};
use crate::Result;

/// A monetary value with its currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Amount {
    /// The exact value.
    pub amount: Decimal,
    /// ISO 4217 currency code, e.g. `"USD"`.
    pub currency_code: String,
}

impl Amount {
    /// Creates a new amount.
    pub fn new(amount: Decimal, currency_code: impl Into<String>) -> Self {
        Self {
            amount,
            currency_code: currency_code.into(),
        }
    }

    /// Formats the amount for display, e.g. `"USD 5,000.00"`.
    ///
    /// ```
    /// use finwise::models::Amount;
    /// use rust_decimal::Decimal;
    ///
    /// let amount = Amount::new(Decimal::new(-123456789, 2), "USD");
    /// assert_eq!(amount.format(), "USD -1,234,567.89");
    /// ```
    pub fn format(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let text = format!("{:.2}", rounded.abs());
        let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        format!("{} {}{}.{}", self.currency_code, sign, grouped, fraction)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

/// How a balance record was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceType {
    /// Entered by the user.
    Manual,
    /// Imported from a linked institution.
    Synced,
}

/// A point-in-time balance snapshot for an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalance {
    /// Unique balance record identifier.
    pub id: String,
    /// Owner of the record.
    pub user_id: String,
    /// The account this balance belongs to.
    pub account_id: Option<String>,
    /// When the snapshot was taken.
    pub date: DateTime<Utc>,
    /// Manual or synced.
    #[serde(rename = "type")]
    pub balance_type: BalanceType,
    /// The balance value.
    pub amount: Option<Amount>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
    /// When the record was archived, if it was.
    pub archived_at: Option<DateTime<Utc>>,
    /// The data import that created this record.
    pub data_import_id: Option<String>,
}

impl AccountBalance {
    /// The balance value, if set.
    pub fn balance(&self) -> Option<Decimal> {
        self.amount.as_ref().map(|a| a.amount)
    }

    /// The balance currency, if set.
    pub fn currency(&self) -> Option<&str> {
        self.amount.as_ref().map(|a| a.currency_code.as_str())
    }

    /// Whether the record has been archived.
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

/// Request body for recording a balance snapshot.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use finwise::models::AccountBalanceCreateRequest;
/// use rust_decimal::Decimal;
///
/// let request = AccountBalanceCreateRequest::new(
///     "acc_123",
///     Decimal::new(500000, 2),
///     NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
/// )
/// .currency("EUR");
/// assert_eq!(request.amount.currency_code, "EUR");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalanceCreateRequest {
    /// The account this balance belongs to.
    pub account_id: String,
    /// The balance value and currency.
    pub amount: Amount,
    /// When the snapshot was taken.
    pub date: DateTime<Utc>,
}

impl AccountBalanceCreateRequest {
    /// Records `balance` (in USD) at midnight UTC of `balance_date`.
    pub fn new(account_id: impl Into<String>, balance: Decimal, balance_date: NaiveDate) -> Self {
        Self {
            account_id: account_id.into(),
            amount: Amount::new(balance, "USD"),
            date: balance_date.and_time(chrono::NaiveTime::MIN).and_utc(),
        }
    }

    /// Sets the currency.
    pub fn currency(mut self, currency_code: impl Into<String>) -> Self {
        self.amount.currency_code = currency_code.into();
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        require_non_empty("account_id", &self.account_id)?;
        require_currency_code(&self.amount.currency_code)
    }
}

/// Balances summed across accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedBalance {
    /// Sum of all account balances.
    pub total_balance: Decimal,
    /// Currency of the total.
    pub currency: String,
    /// The date the aggregation applies to.
    pub as_of_date: NaiveDate,
    /// Number of accounts included.
    pub account_count: u64,
}
