//! Error types for FinWise API calls.
//!
//! Every failure surfaces as a variant of [`Error`]. Errors produced from an HTTP
//! response wrap an [`ApiError`] carrying the status code, the server message and
//! the request correlation id, so callers can match narrowly on the variant or
//! broadly through the shared accessors.

use http::{HeaderMap, StatusCode};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Message used when an error response carries no readable message.
const FALLBACK_MESSAGE: &str = "Unknown error";

/// Details of an error response returned by the FinWise API.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// The HTTP status code of the response.
    pub status: StatusCode,
    /// The message reported by the API, or a generic fallback.
    pub message: String,
    /// The request correlation id, if one could be determined.
    pub request_id: Option<String>,
    /// An API-specific error code (e.g. `"duplicate_name"`).
    pub code: Option<String>,
    /// The decoded JSON body of the response, when it was valid JSON.
    pub body: Option<Value>,
}

impl ApiError {
    /// Builds an `ApiError` from the pieces of a non-2xx response.
    ///
    /// The request id is taken from the body (`request_id` / `requestId`), then
    /// from the `x-request-id` / `request-id` headers, and finally falls back to
    /// the id the client generated for the request.
    pub(crate) fn from_parts(
        status: StatusCode,
        headers: &HeaderMap,
        body: Option<Value>,
        fallback_request_id: Option<&str>,
    ) -> Self {
        let message = body
            .as_ref()
            .and_then(extract_message)
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());

        let code = body.as_ref().and_then(|b| {
            b.get("code")
                .or_else(|| b.get("error").and_then(|e| e.get("code")))
                .and_then(Value::as_str)
                .map(String::from)
        });

        let request_id = body
            .as_ref()
            .and_then(|b| b.get("request_id").or_else(|| b.get("requestId")))
            .and_then(Value::as_str)
            .map(String::from)
            .or_else(|| header_str(headers, "x-request-id"))
            .or_else(|| header_str(headers, "request-id"))
            .or_else(|| fallback_request_id.map(String::from));

        Self {
            status,
            message,
            request_id,
            code,
            body,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (status {}", self.message, self.status.as_u16())?;
        if let Some(request_id) = &self.request_id {
            write!(f, ", request id {}", request_id)?;
        }
        write!(f, ")")
    }
}

fn extract_message(body: &Value) -> Option<String> {
    if let Some(message) = body.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }
    match body.get("error") {
        Some(Value::String(message)) => Some(message.clone()),
        Some(error) => error
            .get("message")
            .and_then(Value::as_str)
            .map(String::from),
        None => None,
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name)?.to_str().ok().map(String::from)
}

/// The main error type for FinWise API calls.
///
/// # Examples
///
/// ```no_run
/// use finwise::{Client, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder().api_key("sk_test").build()?;
///
/// match client.accounts().retrieve("acc_123").await {
///     Ok(account) => println!("{}", account.name),
///     Err(Error::NotFound(err)) => eprintln!("no such account ({:?})", err.request_id),
///     Err(err) if err.is_retryable() => eprintln!("transient failure: {}", err),
///     Err(err) => return Err(err),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The connection could not be established (DNS, refused connection, TLS).
    #[error("Connection error: {message}")]
    Connection {
        /// Description of the underlying network failure.
        message: String,
        /// The id the client generated for the request.
        request_id: Option<String>,
    },

    /// A single attempt exceeded the configured timeout.
    #[error("Request timed out: {message}")]
    Timeout {
        /// Description of the timeout.
        message: String,
        /// The id the client generated for the request.
        request_id: Option<String>,
    },

    /// The API key was rejected (HTTP 401).
    #[error("Authentication failed: {0}")]
    Authentication(ApiError),

    /// The API key lacks permission for the operation (HTTP 403).
    #[error("Permission denied: {0}")]
    PermissionDenied(ApiError),

    /// The requested resource does not exist (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(ApiError),

    /// The server rejected the request data (HTTP 400 or 422).
    #[error("Validation failed: {0}")]
    Validation(ApiError),

    /// The request conflicts with the current state of a resource (HTTP 409).
    #[error("Conflict: {0}")]
    Conflict(ApiError),

    /// The rate limit was exceeded (HTTP 429).
    #[error("Rate limited: {error}")]
    RateLimited {
        /// The underlying API error.
        error: ApiError,
        /// How long the server asked the client to wait, if it said so.
        retry_after: Option<Duration>,
    },

    /// The server failed to handle the request (HTTP 5xx).
    #[error("Server error: {0}")]
    Server(ApiError),

    /// Any other non-2xx response.
    #[error("API error: {0}")]
    Api(ApiError),

    /// A 2xx response body did not match the expected schema.
    ///
    /// The raw body is kept so malformed payloads can be inspected.
    #[error("Failed to decode response (status {status}): {message}")]
    Deserialization {
        /// The decoding error message.
        message: String,
        /// The raw response body.
        raw_response: String,
        /// The HTTP status code.
        status: StatusCode,
    },

    /// Caller input was rejected before any request was sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No API key was supplied and none was found in the environment.
    #[error("Missing API key: {0}")]
    MissingApiKey(String),

    /// The client configuration is invalid (e.g. a malformed base URL).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The client was used after [`Client::close`](crate::Client::close).
    #[error("Client is closed")]
    Closed,
}

impl Error {
    /// Classifies a non-2xx response into the matching variant.
    pub(crate) fn from_response(
        status: StatusCode,
        headers: &HeaderMap,
        raw_body: &str,
        fallback_request_id: Option<&str>,
    ) -> Self {
        let body = serde_json::from_str::<Value>(raw_body).ok();

        let retry_after = if status == StatusCode::TOO_MANY_REQUESTS {
            crate::rate_limit::retry_after(headers, body.as_ref())
        } else {
            None
        };

        let error = ApiError::from_parts(status, headers, body, fallback_request_id);

        match status.as_u16() {
            401 => Error::Authentication(error),
            403 => Error::PermissionDenied(error),
            404 => Error::NotFound(error),
            400 | 422 => Error::Validation(error),
            409 => Error::Conflict(error),
            429 => Error::RateLimited { error, retry_after },
            500..=599 => Error::Server(error),
            _ => Error::Api(error),
        }
    }

    /// Returns `true` if a retry has a reasonable chance of succeeding.
    ///
    /// Rate limits, 5xx responses, connection failures and timeouts are
    /// transient. Everything else is not.
    ///
    /// # Examples
    ///
    /// ```
    /// use finwise::Error;
    ///
    /// assert!(!Error::Closed.is_retryable());
    /// assert!(!Error::InvalidRequest("bad page size".into()).is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Connection { .. }
                | Error::Timeout { .. }
                | Error::RateLimited { .. }
                | Error::Server(_)
        )
    }

    /// Returns the human-readable message of this error.
    pub fn message(&self) -> &str {
        match self {
            Error::Connection { message, .. }
            | Error::Timeout { message, .. }
            | Error::Deserialization { message, .. } => message.as_str(),
            Error::InvalidRequest(message)
            | Error::MissingApiKey(message)
            | Error::Configuration(message) => message.as_str(),
            Error::Closed => "Client is closed",
            _ => match self.api_error() {
                Some(error) => error.message.as_str(),
                None => FALLBACK_MESSAGE,
            },
        }
    }

    /// Returns the API error details for errors produced from a response.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Authentication(error)
            | Error::PermissionDenied(error)
            | Error::NotFound(error)
            | Error::Validation(error)
            | Error::Conflict(error)
            | Error::Server(error)
            | Error::Api(error)
            | Error::RateLimited { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Returns the HTTP status code, if this error came from a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Deserialization { status, .. } => Some(*status),
            _ => self.api_error().map(|e| e.status),
        }
    }

    /// Returns the request correlation id, if one is known.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Error::Connection { request_id, .. } | Error::Timeout { request_id, .. } => {
                request_id.as_deref()
            }
            _ => self.api_error()?.request_id.as_deref(),
        }
    }

    /// Returns the server-requested wait for rate-limit errors.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Configuration(format!("Invalid URL: {}", err))
    }
}

/// A specialized `Result` type for FinWise API calls.
pub type Result<T> = std::result::Result<T, Error>;
