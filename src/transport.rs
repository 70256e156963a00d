//! The shared request pipeline: authentication, retries, error mapping and decoding.

use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, HeaderValue, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::{Arc, PoisonError, RwLock};
use url::Url;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::request::ApiRequest;
use crate::{Error, Result};

/// Header carrying the client-generated correlation id.
const REQUEST_ID_HEADER: &str = "request-id";

/// Executes API requests over a shared connection pool.
///
/// Cloning is cheap and every clone shares the same pool and closed state.
#[derive(Clone)]
pub(crate) struct Transport {
    inner: Arc<TransportInner>,
}

struct TransportInner {
    // `None` once closed
    http_client: RwLock<Option<reqwest::Client>>,
    default_headers: HeaderMap,
    config: ClientConfig,
}

impl Transport {
    pub(crate) fn new(config: ClientConfig, http_client: reqwest::Client) -> Result<Self> {
        let default_headers = default_headers(&config)?;

        Ok(Self {
            inner: Arc::new(TransportInner {
                http_client: RwLock::new(Some(http_client)),
                default_headers,
                config,
            }),
        })
    }

    pub(crate) fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Releases the connection pool. Idempotent.
    pub(crate) fn close(&self) {
        let released = self
            .inner
            .http_client
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if released.is_some() {
            tracing::debug!(base_url = %self.inner.config.base_url, "Closed FinWise client");
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.inner
            .http_client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn http_client(&self) -> Result<reqwest::Client> {
        self.inner
            .http_client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(Error::Closed)
    }

    /// Executes one logical operation, retrying transient failures.
    ///
    /// Total attempts are at most `max_retries + 1`. When retries are exhausted
    /// the last observed error is returned unchanged.
    pub(crate) async fn execute<T>(&self, request: ApiRequest) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.build_url(&request)?;
        let request_id = Uuid::new_v4().to_string();
        let policy = &self.inner.config.retry;
        let mut retries = 0;

        loop {
            let http_client = self.http_client()?;

            let err = match self
                .execute_attempt(&http_client, &url, &request, &request_id, retries + 1)
                .await
            {
                Ok(data) => return Ok(data),
                Err(e) => e,
            };

            if !err.is_retryable() || retries >= policy.max_retries {
                return Err(err);
            }

            retries += 1;
            let delay = policy.delay_before_retry(retries, err.retry_after());

            tracing::debug!(
                method = %request.method,
                path = %request.path,
                request_id = %request_id,
                status = ?err.status(),
                retry = retries,
                delay_ms = delay.as_millis() as u64,
                "Transient failure, retrying after delay"
            );

            tokio::time::sleep(delay).await;
        }
    }

    /// Executes a single attempt and decodes the response.
    async fn execute_attempt<T>(
        &self,
        http_client: &reqwest::Client,
        url: &Url,
        request: &ApiRequest,
        request_id: &str,
        attempt: u32,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        tracing::debug!(
            method = %request.method,
            url = %url,
            request_id = %request_id,
            attempt = attempt,
            "Executing FinWise request"
        );

        let mut builder = http_client
            .request(request.method.clone(), url.clone())
            .headers(self.inner.default_headers.clone())
            .header(REQUEST_ID_HEADER, request_id)
            .timeout(self.inner.config.timeout);

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.transport_error(e, request_id))?;

        let status = response.status();
        let headers = response.headers().clone();
        let raw_body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e, request_id))?;

        tracing::debug!(
            status = status.as_u16(),
            request_id = %request_id,
            attempt = attempt,
            "Received FinWise response"
        );

        if !status.is_success() {
            return Err(Error::from_response(
                status,
                &headers,
                &raw_body,
                Some(request_id),
            ));
        }

        decode_body(status, raw_body)
    }

    fn build_url(&self, request: &ApiRequest) -> Result<Url> {
        let mut url = self.inner.config.base_url.clone();

        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                Error::Configuration(format!(
                    "Base URL cannot have path segments: {}",
                    self.inner.config.base_url
                ))
            })?;
            segments
                .pop_if_empty()
                .extend(request.path.split('/').filter(|s| !s.is_empty()));
        }

        if !request.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(request.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        Ok(url)
    }

    fn transport_error(&self, err: reqwest::Error, request_id: &str) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                message: format!(
                    "no response within {:?}",
                    self.inner.config.timeout
                ),
                request_id: Some(request_id.to_string()),
            }
        } else {
            Error::Connection {
                message: format!(
                    "Failed to reach {}: {}",
                    self.inner.config.base_url,
                    error_chain(&err)
                ),
                request_id: Some(request_id.to_string()),
            }
        }
    }
}

/// Decodes a 2xx body. An empty body decodes as JSON `null`.
fn decode_body<T: DeserializeOwned>(status: StatusCode, raw_body: String) -> Result<T> {
    let text = if raw_body.trim().is_empty() {
        "null"
    } else {
        raw_body.as_str()
    };

    serde_json::from_str::<T>(text).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        raw_response: raw_body.clone(),
        status,
    })
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn default_headers(config: &ClientConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    let mut auth = HeaderValue::from_str(config.api_key.expose())
        .map_err(|_| Error::Configuration("API key contains invalid header characters".to_string()))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&config.user_agent)
            .map_err(|e| Error::Configuration(format!("Invalid user agent: {}", e)))?,
    );

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiKey;
    use serde_json::Value;

    fn transport(base_url: &str) -> Transport {
        let mut config = ClientConfig::new(ApiKey::new("sk_test").unwrap()).unwrap();
        config.base_url = Url::parse(base_url).unwrap();
        Transport::new(config, reqwest::Client::new()).unwrap()
    }

    #[test]
    fn test_build_url_with_query() {
        let transport = transport("https://api.finwiseapp.io");
        let request = ApiRequest::get("/transactions")
            .with_query_param("pageNumber", 1)
            .with_query_param("startDate", "2024-01-01");

        let url = transport.build_url(&request).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.finwiseapp.io/transactions?pageNumber=1&startDate=2024-01-01"
        );
    }

    #[test]
    fn test_build_url_keeps_base_path_and_encodes_segments() {
        let transport = transport("https://example.com/api/v1/");
        let request = ApiRequest::post("/accounts/acc 1/archive");

        let url = transport.build_url(&request).unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/v1/accounts/acc%201/archive");
    }

    #[test]
    fn test_decode_empty_body_as_null() {
        let value: Value = decode_body(StatusCode::NO_CONTENT, String::new()).unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn test_decode_failure_keeps_raw_body() {
        let err = decode_body::<Vec<u32>>(StatusCode::OK, "{\"oops\": true}".to_string())
            .unwrap_err();
        match err {
            Error::Deserialization {
                raw_response,
                status,
                ..
            } => {
                assert_eq!(raw_response, "{\"oops\": true}");
                assert_eq!(status, StatusCode::OK);
            }
            other => panic!("Expected Deserialization, got {:?}", other),
        }
    }

    #[test]
    fn test_close_is_idempotent() {
        let transport = transport("https://api.finwiseapp.io");
        assert!(!transport.is_closed());

        transport.close();
        transport.close();

        assert!(transport.is_closed());
        assert!(matches!(transport.http_client(), Err(Error::Closed)));
    }

    #[test]
    fn test_default_headers() {
        let config = ClientConfig::new(ApiKey::new("sk_test").unwrap()).unwrap();
        let headers = default_headers(&config).unwrap();

        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "sk_test");
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
    }
}
