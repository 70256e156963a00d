//! The FinWise client and its builder.
//!
//! The [`Client`] type is the main entry point. Use [`ClientBuilder`] to
//! configure one, or [`Client::new`] / [`Client::from_env`] for the defaults.

use serde::de::DeserializeOwned;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use url::Url;

use crate::config::{resolve_credential, ClientConfig};
use crate::request::ApiRequest;
use crate::resources::{AccountBalances, Accounts, TransactionCategories, Transactions};
use crate::transport::Transport;
use crate::{Error, Result, RetryPolicy};

/// A client for the FinWise API.
///
/// The client is designed to be reused. Cloning is cheap: every clone shares
/// the same connection pool, configuration and closed state, so it can be
/// handed to concurrent tasks freely.
///
/// # Examples
///
/// ```no_run
/// use finwise::Client;
/// use finwise::models::AccountCreateRequest;
///
/// # async fn example() -> finwise::Result<()> {
/// // Reads FINWISE_API_KEY
/// let client = Client::from_env()?;
///
/// let account = client
///     .accounts()
///     .create(&AccountCreateRequest::new("Checking", "depository"))
///     .await?;
/// println!("Created account {}", account.id);
///
/// client.close();
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    transport: Transport,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use finwise::Client;
    /// use std::time::Duration;
    ///
    /// # fn example() -> finwise::Result<()> {
    /// let client = Client::builder()
    ///     .api_key("sk_live_...")
    ///     .timeout(Duration::from_secs(10))
    ///     .max_retries(5)
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a client with default settings and the given API key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingApiKey`] if `api_key` is blank and
    /// `FINWISE_API_KEY` is not set either.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder().api_key(api_key).build()
    }

    /// Creates a client with default settings, reading the key from `FINWISE_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Self::builder().build()
    }

    /// Account operations.
    pub fn accounts(&self) -> Accounts {
        Accounts::new(self.transport.clone())
    }

    /// Balance snapshot operations.
    pub fn account_balances(&self) -> AccountBalances {
        AccountBalances::new(self.transport.clone())
    }

    /// Transaction operations.
    pub fn transactions(&self) -> Transactions {
        Transactions::new(self.transport.clone())
    }

    /// Transaction category operations.
    pub fn transaction_categories(&self) -> TransactionCategories {
        TransactionCategories::new(self.transport.clone())
    }

    /// Executes an arbitrary request through the shared pipeline.
    ///
    /// The request gets the same authentication, retries and error mapping as
    /// the resource methods. Useful for endpoints this crate does not wrap yet.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use finwise::{ApiRequest, Client};
    /// use serde_json::Value;
    ///
    /// # async fn example(client: Client) -> finwise::Result<()> {
    /// let request = ApiRequest::get("/accounts").with_query_param("pageSize", 10);
    /// let body: Value = client.execute(request).await?;
    /// println!("{}", body);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn execute<T>(&self, request: ApiRequest) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.transport.execute(request).await
    }

    /// The settings this client was built with.
    pub fn config(&self) -> &ClientConfig {
        self.transport.config()
    }

    /// Releases the connection pool.
    ///
    /// Closing is idempotent and applies to every clone. Afterwards each call
    /// fails with [`Error::Closed`] without touching the network.
    pub fn close(&self) {
        self.transport.close();
    }

    /// Whether [`close`](Self::close) has been called on this client or a clone.
    pub fn is_closed(&self) -> bool {
        self.transport.is_closed()
    }

    /// Runs `f` with this client and closes the client when the scope ends.
    ///
    /// The client is closed whether `f` succeeds, fails or panics, and also
    /// when the returned future is dropped before completing. Clones made
    /// inside the scope are closed too.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use finwise::{Client, PageParams};
    ///
    /// # async fn example() -> finwise::Result<()> {
    /// let count = Client::from_env()?
    ///     .scoped(|client| async move {
    ///         let page = client.accounts().list(PageParams::default()).await?;
    ///         Ok(page.total_count())
    ///     })
    ///     .await?;
    /// println!("{} accounts", count);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn scoped<F, Fut, T>(self, f: F) -> Result<T>
    where
        F: FnOnce(Client) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let _guard = CloseOnDrop(self.transport.clone());
        f(self).await
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.config().base_url.as_str())
            .field("closed", &self.is_closed())
            .finish()
    }
}

struct CloseOnDrop(Transport);

impl Drop for CloseOnDrop {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use finwise::{ClientBuilder, RetryPolicy};
/// use std::time::Duration;
///
/// # fn example() -> finwise::Result<()> {
/// let client = ClientBuilder::new()
///     .api_key("sk_test_...")
///     .base_url("https://sandbox.finwiseapp.io")?
///     .retry_policy(
///         RetryPolicy::default()
///             .with_initial_delay(Duration::from_millis(200))
///             .with_max_delay(Duration::from_secs(5)),
///     )
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    api_key: Option<String>,
    base_url: Option<Url>,
    timeout: Option<Duration>,
    retry: RetryPolicy,
    user_agent: Option<String>,
    http_client: Option<reqwest::Client>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: None,
            timeout: None,
            retry: RetryPolicy::default(),
            user_agent: None,
            http_client: None,
        }
    }

    /// Sets the API key. Without one, `FINWISE_API_KEY` is read at build time.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Overrides the base URL, e.g. for a sandbox or a test server.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the URL is invalid or cannot carry
    /// a path.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        let url = Url::parse(url.as_ref())?;
        if url.cannot_be_a_base() {
            return Err(Error::Configuration(format!(
                "Base URL cannot have path segments: {}",
                url
            )));
        }
        self.base_url = Some(url);
        Ok(self)
    }

    /// Sets the timeout for each individual attempt (default 30 seconds).
    ///
    /// The timeout is not a deadline for the whole call. A call that keeps
    /// timing out is retried, so it can take up to
    /// `(max_retries + 1) * timeout` plus the backoff delays before it fails.
    /// See [`ClientConfig::worst_case_attempt_time`].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets how many times transient failures are retried (default 3).
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.retry.max_retries = max_retries;
        self
    }

    /// Replaces the whole retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Overrides the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Uses a preconfigured `reqwest` client, e.g. one with a proxy.
    pub fn http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingApiKey`] if no key was set and
    /// `FINWISE_API_KEY` is unset, or [`Error::Configuration`] if the
    /// settings are invalid.
    pub fn build(self) -> Result<Client> {
        let api_key = resolve_credential(self.api_key.as_deref(), |name| std::env::var(name).ok())?;
        let mut config = ClientConfig::new(api_key)?;

        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
        if let Some(timeout) = self.timeout {
            if timeout.is_zero() {
                return Err(Error::Configuration(
                    "Timeout must be greater than zero".to_string(),
                ));
            }
            config.timeout = timeout;
        }
        if let Some(user_agent) = self.user_agent {
            config.user_agent = user_agent;
        }
        config.retry = self.retry;

        let http_client = match self.http_client {
            Some(http_client) => http_client,
            None => reqwest::Client::builder().build().map_err(|e| {
                Error::Configuration(format!("Failed to build HTTP client: {}", e))
            })?,
        };

        tracing::debug!(
            base_url = %config.base_url,
            timeout_ms = config.timeout.as_millis() as u64,
            max_retries = config.retry.max_retries,
            "Created FinWise client"
        );

        Ok(Client {
            transport: Transport::new(config, http_client)?,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
