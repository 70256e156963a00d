//! Transactions service.

use chrono::NaiveDate;
use serde_json::Value;

use crate::models::{
    AggregatedTransactions, Transaction, TransactionCreateRequest, TransactionType,
};
use crate::pagination::{decode_page, Page, PageParams};
use crate::request::{path_id, ApiRequest};
use crate::transport::Transport;
use crate::{Error, Result};

const PATH: &str = "/transactions";

/// Filters for listing transactions. All filters are optional and combine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListTransactionsParams {
    /// Only transactions in this account.
    pub account_id: Option<String>,
    /// Only transactions filed under this category.
    pub category_id: Option<String>,
    /// Inclusive start of the date range.
    pub start_date: Option<NaiveDate>,
    /// Inclusive end of the date range.
    pub end_date: Option<NaiveDate>,
    /// Only income, expenses or transfers.
    pub transaction_type: Option<TransactionType>,
    /// Page selection.
    pub page: PageParams,
}

impl ListTransactionsParams {
    /// Restricts the list to one account.
    pub fn account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    /// Restricts the list to one category.
    pub fn category_id(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    /// Sets the inclusive start of the date range.
    pub fn start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Sets the inclusive end of the date range.
    pub fn end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Restricts the list to one transaction type.
    pub fn transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = Some(transaction_type);
        self
    }

    /// Selects the page to fetch.
    pub fn page(mut self, page: PageParams) -> Self {
        self.page = page;
        self
    }
}

/// Filters for the aggregated transactions call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedTransactionsParams {
    /// Inclusive start of the period.
    pub start_date: Option<NaiveDate>,
    /// Inclusive end of the period.
    pub end_date: Option<NaiveDate>,
    /// Only transactions in this account.
    pub account_id: Option<String>,
    /// Only transactions filed under this category.
    pub category_id: Option<String>,
}

impl AggregatedTransactionsParams {
    /// Aggregates over the inclusive range `start_date..=end_date`.
    pub fn between(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date: Some(start_date),
            end_date: Some(end_date),
            ..Default::default()
        }
    }

    /// Restricts the totals to one account.
    pub fn account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    /// Restricts the totals to one category.
    pub fn category_id(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }
}

/// Service for transaction operations.
///
/// # Example
///
/// ```no_run
/// use chrono::NaiveDate;
/// use finwise::models::TransactionCreateRequest;
/// use finwise::resources::AggregatedTransactionsParams;
/// use rust_decimal::Decimal;
///
/// # async fn example(client: finwise::Client) -> finwise::Result<()> {
/// let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
/// let txn = client
///     .transactions()
///     .create(&TransactionCreateRequest::new("acc_123", Decimal::new(-5000, 2), date))
///     .await?;
/// assert!(txn.is_expense());
///
/// let january = AggregatedTransactionsParams::between(
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
/// );
/// let summary = client.transactions().aggregated(january).await?;
/// println!("Net: {}", summary.net_amount);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Transactions {
    transport: Transport,
}

impl Transactions {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Creates a transaction.
    pub async fn create(&self, request: &TransactionCreateRequest) -> Result<Transaction> {
        request.validate()?;
        let request = ApiRequest::post(PATH).with_json(request)?;
        self.transport.execute(request).await
    }

    /// Lists transactions matching `params`, one page per call.
    pub async fn list(&self, params: ListTransactionsParams) -> Result<Page<Transaction>> {
        check_date_range(params.start_date, params.end_date)?;
        let request = params
            .page
            .apply(ApiRequest::get(PATH))?
            .with_optional_query_param("accountId", params.account_id.as_deref())
            .with_optional_query_param("categoryId", params.category_id.as_deref())
            .with_optional_query_param("startDate", params.start_date)
            .with_optional_query_param("endDate", params.end_date)
            .with_optional_query_param("type", params.transaction_type);
        let body: Value = self.transport.execute(request).await?;
        decode_page(body, &params.page)
    }

    /// Income, expense and net totals for the matching transactions.
    pub async fn aggregated(
        &self,
        params: AggregatedTransactionsParams,
    ) -> Result<AggregatedTransactions> {
        check_date_range(params.start_date, params.end_date)?;
        let request = ApiRequest::get(format!("{}/aggregated", PATH))
            .with_optional_query_param("startDate", params.start_date)
            .with_optional_query_param("endDate", params.end_date)
            .with_optional_query_param("accountId", params.account_id.as_deref())
            .with_optional_query_param("categoryId", params.category_id.as_deref());
        self.transport.execute(request).await
    }

    /// Archives a transaction. The returned transaction has `archived_at` set.
    pub async fn archive(&self, transaction_id: &str) -> Result<Transaction> {
        let path = format!(
            "{}/{}/archive",
            PATH,
            path_id("transaction_id", transaction_id)?
        );
        self.transport.execute(ApiRequest::post(path)).await
    }
}

fn check_date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    match (start, end) {
        (Some(start), Some(end)) if start > end => Err(Error::InvalidRequest(format!(
            "start_date {} is after end_date {}",
            start, end
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_date_range() {
        let jan_1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let jan_31 = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();

        assert!(check_date_range(Some(jan_1), Some(jan_31)).is_ok());
        assert!(check_date_range(Some(jan_1), Some(jan_1)).is_ok());
        assert!(check_date_range(Some(jan_31), None).is_ok());
        assert!(check_date_range(Some(jan_31), Some(jan_1)).is_err());
    }
}
