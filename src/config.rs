//! Client configuration and credential resolution.

use std::fmt;
use std::time::Duration;
use url::Url;

use crate::{Error, Result, RetryPolicy};

/// The production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.finwiseapp.io";

/// Environment variable consulted when no API key is passed explicitly.
pub const API_KEY_ENV_VAR: &str = "FINWISE_API_KEY";

/// Default per-attempt request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A FinWise API key.
///
/// The key is never printed by `Debug`, so configurations can be logged safely.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a raw key. Empty or whitespace-only keys are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingApiKey`] if the key is blank.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(Error::MissingApiKey("API key must not be empty".to_string()));
        }
        Ok(Self(key))
    }

    /// Returns the raw key for use in the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

/// Resolves the API key from an explicit value or the environment.
///
/// The explicit value wins; otherwise `env_lookup` is asked for
/// [`API_KEY_ENV_VAR`]. Blank values count as absent. This runs once, when the
/// client is built; the environment is never consulted again afterwards.
///
/// # Examples
///
/// ```
/// use finwise::config::resolve_credential;
///
/// let key = resolve_credential(None, |_| Some("sk_env".to_string())).unwrap();
/// assert_eq!(key.expose(), "sk_env");
///
/// assert!(resolve_credential(None, |_| None).is_err());
/// ```
pub fn resolve_credential<F>(explicit: Option<&str>, env_lookup: F) -> Result<ApiKey>
where
    F: FnOnce(&str) -> Option<String>,
{
    let explicit = explicit.filter(|key| !key.trim().is_empty());
    match explicit {
        Some(key) => ApiKey::new(key),
        None => match env_lookup(API_KEY_ENV_VAR).filter(|key| !key.trim().is_empty()) {
            Some(key) => ApiKey::new(key),
            None => Err(Error::MissingApiKey(format!(
                "pass an API key explicitly or set the {} environment variable",
                API_KEY_ENV_VAR
            ))),
        },
    }
}

/// Immutable settings shared by every request a client makes.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// The API key sent with every request.
    pub api_key: ApiKey,
    /// The base URL all request paths are resolved against.
    pub base_url: Url,
    /// Timeout applied to each individual attempt.
    pub timeout: Duration,
    /// The `User-Agent` header value.
    pub user_agent: String,
    /// Retry behaviour for transient failures.
    pub retry: RetryPolicy,
}

impl ClientConfig {
    /// Creates a configuration with default settings for the given key.
    pub fn new(api_key: ApiKey) -> Result<Self> {
        Ok(Self {
            api_key,
            base_url: Url::parse(DEFAULT_BASE_URL)?,
            timeout: DEFAULT_TIMEOUT,
            user_agent: default_user_agent(),
            retry: RetryPolicy::default(),
        })
    }

    /// Upper bound on how long one logical operation may take, excluding backoff.
    ///
    /// The timeout is enforced per attempt, not across the retry sequence, so
    /// the worst case is `(max_retries + 1) * timeout` plus the backoff delays.
    pub fn worst_case_attempt_time(&self) -> Duration {
        self.timeout
            .saturating_mul(self.retry.max_retries.saturating_add(1))
    }
}

pub(crate) fn default_user_agent() -> String {
    format!("finwise-rust/{}", env!("CARGO_PKG_VERSION"))
}
