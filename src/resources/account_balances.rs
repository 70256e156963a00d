//! Account balances service.

use chrono::NaiveDate;
use serde_json::Value;

use crate::models::{
    require_currency_code, AccountBalance, AccountBalanceCreateRequest, AggregatedBalance,
};
use crate::pagination::{decode_page, Page, PageParams};
use crate::request::{path_id, ApiRequest};
use crate::transport::Transport;
use crate::Result;

const PATH: &str = "/account-balances";

/// Filters for listing balance records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListAccountBalancesParams {
    /// Only balances for this account.
    pub account_id: Option<String>,
    /// Page selection.
    pub page: PageParams,
}

impl ListAccountBalancesParams {
    /// Restricts the list to one account.
    pub fn account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    /// Selects the page to fetch.
    pub fn page(mut self, page: PageParams) -> Self {
        self.page = page;
        self
    }
}

/// Options for the aggregated balance call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedBalanceParams {
    /// Aggregate as of this date; the server defaults to today.
    pub as_of_date: Option<NaiveDate>,
    /// Currency to report the total in.
    pub currency: Option<String>,
}

impl AggregatedBalanceParams {
    /// Sets the date to aggregate balances at.
    pub fn as_of_date(mut self, as_of_date: NaiveDate) -> Self {
        self.as_of_date = Some(as_of_date);
        self
    }

    /// Sets the currency the total is reported in.
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }
}

/// Service for balance snapshots.
///
/// # Example
///
/// ```no_run
/// use chrono::NaiveDate;
/// use finwise::resources::AggregatedBalanceParams;
///
/// # async fn example(client: finwise::Client) -> finwise::Result<()> {
/// let total = client
///     .account_balances()
///     .aggregated(AggregatedBalanceParams::default().currency("USD"))
///     .await?;
/// println!("{} across {} accounts", total.total_balance, total.account_count);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AccountBalances {
    transport: Transport,
}

impl AccountBalances {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Records a balance snapshot.
    pub async fn create(&self, request: &AccountBalanceCreateRequest) -> Result<AccountBalance> {
        request.validate()?;
        let request = ApiRequest::post(PATH).with_json(request)?;
        self.transport.execute(request).await
    }

    /// Lists balance records, optionally for one account.
    pub async fn list(&self, params: ListAccountBalancesParams) -> Result<Page<AccountBalance>> {
        let request = params
            .page
            .apply(ApiRequest::get(PATH))?
            .with_optional_query_param("accountId", params.account_id.as_deref());
        let body: Value = self.transport.execute(request).await?;
        decode_page(body, &params.page)
    }

    /// Sums balances across all accounts.
    pub async fn aggregated(&self, params: AggregatedBalanceParams) -> Result<AggregatedBalance> {
        if let Some(currency) = &params.currency {
            require_currency_code(currency)?;
        }
        let request = ApiRequest::get(format!("{}/aggregated", PATH))
            .with_optional_query_param("asOfDate", params.as_of_date)
            .with_optional_query_param("currency", params.currency.as_deref());
        self.transport.execute(request).await
    }

    /// Archives a balance record.
    pub async fn archive(&self, balance_id: &str) -> Result<AccountBalance> {
        let path = format!("{}/{}/archive", PATH, path_id("balance_id", balance_id)?);
        self.transport.execute(ApiRequest::post(path)).await
    }
}
