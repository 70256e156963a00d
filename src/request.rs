//! Request descriptors consumed by the transport.

use http::Method;
use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};

/// A single logical API operation: method, path, query and optional JSON body.
///
/// Resource facades build one of these per call and hand it to the transport,
/// which consumes it exactly once (retries reuse the same descriptor).
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// The HTTP method (GET, POST, etc.).
    pub method: Method,

    /// The request path relative to the base URL, e.g. `/accounts/acc_1/archive`.
    pub path: String,

    /// Query parameters in insertion order.
    pub query: Vec<(String, String)>,

    /// The JSON body, if any.
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Creates a new `ApiRequest` with the given method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Shorthand for a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Shorthand for a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Shorthand for a PATCH request.
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// Shorthand for a DELETE request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Adds a query parameter to the request.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Adds a query parameter only when `value` is present.
    pub fn with_optional_query_param<V: ToString>(
        self,
        key: impl Into<String>,
        value: Option<V>,
    ) -> Self {
        match value {
            Some(value) => self.with_query_param(key, value),
            None => self,
        }
    }

    /// Serializes `body` as the JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if the body cannot be represented as JSON.
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| Error::InvalidRequest(format!("Failed to serialize request body: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }
}

/// Validates a caller-supplied id before it becomes a path segment.
pub(crate) fn path_id<'a>(name: &str, id: &'a str) -> Result<&'a str> {
    if id.trim().is_empty() {
        return Err(Error::InvalidRequest(format!("{} must not be empty", name)));
    }
    if id.contains('/') {
        return Err(Error::InvalidRequest(format!(
            "{} must not contain '/': {:?}",
            name, id
        )));
    }
    // dot-segments are resolved by the URL parser instead of being encoded
    if id == "." || id == ".." {
        return Err(Error::InvalidRequest(format!(
            "{} must not be a dot-segment: {:?}",
            name, id
        )));
    }
    Ok(id)
}
