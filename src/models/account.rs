//! Account models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{
    require_currency_code, require_len_between, require_max_len, require_non_empty, Amount,
};
use crate::{Error, Result};

/// A financial account.
///
/// `account_type` and `sub_type` are kept as strings: the API documents
/// `depository`, `credit`, `loan`, `investment` and `other`, but returns
/// custom values as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Unique account identifier.
    pub id: String,
    /// Owner of the account.
    pub user_id: String,
    /// Display name.
    pub name: String,
    /// Account type.
    #[serde(rename = "type")]
    pub account_type: String,
    /// Account sub-type, e.g. `"savings"`.
    pub sub_type: String,
    /// Current balance.
    pub current_balance: Option<Amount>,
    /// Available balance (may differ from current for credit accounts).
    pub available_balance: Option<Amount>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
    /// When the account was archived, if it was.
    pub archived_at: Option<DateTime<Utc>>,

    /// Base64-encoded logo image.
    pub logo_base64: Option<String>,
    /// Emoji shown next to the account.
    pub emoji: Option<String>,
    /// Masked or partial account number.
    pub account_number: Option<String>,

    /// Original principal of a loan account.
    pub original_loan_amount: Option<Amount>,
    /// Interest rate, as a percentage.
    pub interest_rate: Option<Decimal>,
    /// `"fixed"` or `"variable"`.
    pub interest_rate_type: Option<String>,

    /// Date of the last payment.
    pub last_payment_date: Option<NaiveDate>,
    /// Amount of the last payment.
    pub last_payment_amount: Option<Amount>,
    /// Current amount due.
    pub amount_due: Option<Amount>,
    /// Minimum payment due.
    pub minimum_amount_due: Option<Amount>,

    /// Whether the account is linked to a financial institution.
    pub is_linked: Option<bool>,
    /// The linked institution.
    pub institution_id: Option<String>,
    /// The user's id at the linked institution.
    pub institution_user_id: Option<String>,

    /// Free-form metadata.
    pub data: Option<Map<String, Value>>,
}

impl Account {
    /// Whether the account has been archived.
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    /// The current balance value.
    pub fn balance(&self) -> Option<Decimal> {
        self.current_balance.as_ref().map(|a| a.amount)
    }

    /// The currency of the current balance.
    pub fn currency(&self) -> Option<&str> {
        self.current_balance
            .as_ref()
            .map(|a| a.currency_code.as_str())
    }
}

/// Request body for creating an account.
///
/// # Example
///
/// ```
/// use finwise::models::AccountCreateRequest;
///
/// let request = AccountCreateRequest::new("Emergency Fund", "depository")
///     .sub_type("savings")
///     .description("6 month emergency fund");
/// assert_eq!(request.currency, "USD");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCreateRequest {
    /// Account name (1-255 characters).
    pub name: String,
    /// Account type.
    #[serde(rename = "type")]
    pub account_type: String,
    /// Account sub-type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Description (at most 1000 characters).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Starting balance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_balance: Option<Decimal>,
}

impl AccountCreateRequest {
    /// Creates a USD account request.
    pub fn new(name: impl Into<String>, account_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            account_type: account_type.into(),
            sub_type: None,
            currency: "USD".to_string(),
            description: None,
            initial_balance: None,
        }
    }

    /// Sets the sub-type.
    pub fn sub_type(mut self, sub_type: impl Into<String>) -> Self {
        self.sub_type = Some(sub_type.into());
        self
    }

    /// Sets the currency.
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the starting balance.
    pub fn initial_balance(mut self, initial_balance: Decimal) -> Self {
        self.initial_balance = Some(initial_balance);
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        require_len_between("name", &self.name, 1, 255)?;
        require_non_empty("type", &self.account_type)?;
        require_currency_code(&self.currency)?;
        require_max_len("description", self.description.as_deref(), 1000)
    }
}

/// Request body for updating an account. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdateRequest {
    /// New name (1-255 characters).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description (at most 1000 characters).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AccountUpdateRequest {
    /// Creates an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the new name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the new description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.is_none() && self.description.is_none() {
            return Err(Error::InvalidRequest(
                "an account update must set at least one field".to_string(),
            ));
        }
        if let Some(name) = &self.name {
            require_len_between("name", name, 1, 255)?;
        }
        require_max_len("description", self.description.as_deref(), 1000)
    }
}
