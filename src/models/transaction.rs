//! Transaction models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{require_max_len, require_non_empty};
use crate::Result;

/// The kind of a transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in.
    Income,
    /// Money going out.
    #[default]
    Expense,
    /// Movement between the user's own accounts.
    Transfer,
}

impl TransactionType {
    /// The wire value, also used as the `type` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
            TransactionType::Transfer => "transfer",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single financial transaction.
///
/// `transaction_type` stays a string so that values introduced by the server
/// later still decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique transaction identifier.
    pub id: String,
    /// The account the transaction belongs to.
    pub account_id: String,
    /// Positive for income, negative for expenses.
    pub amount: Decimal,
    /// The date of the transaction.
    pub transaction_date: NaiveDate,
    /// Free-text description.
    pub description: Option<String>,
    /// The category, if the transaction is categorized.
    pub category_id: Option<String>,
    /// Name of the category.
    pub category_name: Option<String>,
    /// `income`, `expense`, `transfer`, or a value added by the server later.
    #[serde(rename = "type")]
    pub transaction_type: String,
    /// When the transaction was created.
    pub created_at: DateTime<Utc>,
    /// When the transaction was last updated.
    pub updated_at: DateTime<Utc>,
    /// When the transaction was archived, if it was.
    pub archived_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Whether the transaction has been archived.
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    /// Whether this is an income transaction.
    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income.as_str()
    }

    /// Whether this is an expense transaction.
    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense.as_str()
    }
}

/// Request body for creating a transaction.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use finwise::models::{TransactionCreateRequest, TransactionType};
/// use rust_decimal::Decimal;
///
/// let request = TransactionCreateRequest::new(
///     "acc_123",
///     Decimal::new(-5000, 2),
///     NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
/// )
/// .description("Grocery shopping");
/// assert_eq!(request.transaction_type, TransactionType::Expense);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionCreateRequest {
    /// The account the transaction belongs to.
    pub account_id: String,
    /// Positive for income, negative for expenses.
    pub amount: Decimal,
    /// The date of the transaction.
    pub transaction_date: NaiveDate,
    /// Description (at most 500 characters).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Category to file the transaction under.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    /// Defaults to [`TransactionType::Expense`].
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
}

impl TransactionCreateRequest {
    /// Creates an expense with the required fields.
    pub fn new(
        account_id: impl Into<String>,
        amount: Decimal,
        transaction_date: NaiveDate,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            amount,
            transaction_date,
            description: None,
            category_id: None,
            transaction_type: TransactionType::default(),
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the category.
    pub fn category_id(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    /// Sets the transaction type.
    pub fn transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = transaction_type;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        require_non_empty("account_id", &self.account_id)?;
        require_max_len("description", self.description.as_deref(), 500)
    }
}

/// Income and expense totals over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedTransactions {
    /// Sum of income transactions.
    pub total_income: Decimal,
    /// Sum of expenses, as a positive number.
    pub total_expenses: Decimal,
    /// `total_income - total_expenses`.
    pub net_amount: Decimal,
    /// Number of transactions in the period.
    pub transaction_count: u64,
    /// Start of the period.
    pub start_date: NaiveDate,
    /// End of the period.
    pub end_date: NaiveDate,
}
