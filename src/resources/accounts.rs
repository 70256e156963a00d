//! Accounts service.

use serde_json::Value;

use crate::models::{Account, AccountCreateRequest, AccountUpdateRequest};
use crate::pagination::{decode_page, Page, PageParams};
use crate::request::{path_id, ApiRequest};
use crate::transport::Transport;
use crate::Result;

const PATH: &str = "/accounts";

/// Service for account operations.
///
/// # Example
///
/// ```no_run
/// use finwise::models::{AccountCreateRequest, AccountUpdateRequest};
///
/// # async fn example(client: finwise::Client) -> finwise::Result<()> {
/// let account = client
///     .accounts()
///     .create(&AccountCreateRequest::new("Emergency Fund", "depository").sub_type("savings"))
///     .await?;
///
/// let renamed = client
///     .accounts()
///     .update(&account.id, &AccountUpdateRequest::new().name("Rainy Day Fund"))
///     .await?;
/// println!("{} now holds {:?}", renamed.name, renamed.current_balance);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Accounts {
    transport: Transport,
}

impl Accounts {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Creates an account.
    pub async fn create(&self, request: &AccountCreateRequest) -> Result<Account> {
        request.validate()?;
        let request = ApiRequest::post(PATH).with_json(request)?;
        self.transport.execute(request).await
    }

    /// Fetches an account by id.
    pub async fn retrieve(&self, account_id: &str) -> Result<Account> {
        let path = format!("{}/{}", PATH, path_id("account_id", account_id)?);
        self.transport.execute(ApiRequest::get(path)).await
    }

    /// Updates the fields set on `request`, leaving the rest unchanged.
    pub async fn update(&self, account_id: &str, request: &AccountUpdateRequest) -> Result<Account> {
        request.validate()?;
        let path = format!("{}/{}", PATH, path_id("account_id", account_id)?);
        let request = ApiRequest::patch(path).with_json(request)?;
        self.transport.execute(request).await
    }

    /// Lists accounts, one page per call.
    pub async fn list(&self, page: PageParams) -> Result<Page<Account>> {
        let request = page.apply(ApiRequest::get(PATH))?;
        let body: Value = self.transport.execute(request).await?;
        decode_page(body, &page)
    }

    /// Archives an account. The returned account has `archived_at` set.
    pub async fn archive(&self, account_id: &str) -> Result<Account> {
        let path = format!("{}/{}/archive", PATH, path_id("account_id", account_id)?);
        self.transport.execute(ApiRequest::post(path)).await
    }
}
