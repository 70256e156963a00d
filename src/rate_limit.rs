//! Extraction of the server-requested wait from rate-limited responses.
//!
//! The FinWise API signals how long to back off either through the standard
//! `Retry-After` header or through a `retryAfter` field in the JSON error body.

use http::HeaderMap;
use serde_json::Value;
use std::time::{Duration, SystemTime};

/// Returns how long the server asked the client to wait before retrying.
///
/// The `Retry-After` header wins over the body. The header accepts both
/// delay-seconds and HTTP-date forms; the body accepts `retryAfter` or
/// `retry_after` as a number of seconds.
pub(crate) fn retry_after(headers: &HeaderMap, body: Option<&Value>) -> Option<Duration> {
    parse_retry_after_header(headers).or_else(|| body.and_then(parse_retry_after_body))
}

/// Parses the Retry-After header.
fn parse_retry_after_header(headers: &HeaderMap) -> Option<Duration> {
    let header = headers.get("retry-after")?.to_str().ok()?.trim();

    if !header.is_empty() && header.bytes().all(|b| b.is_ascii_digit()) {
        // more seconds than a u64 holds still means "wait as long as allowed"
        return Some(
            header
                .parse::<u64>()
                .map(Duration::from_secs)
                .unwrap_or(Duration::MAX),
        );
    }

    // HTTP-date in the past means "retry now"
    if let Ok(date_time) = httpdate::parse_http_date(header) {
        return Some(
            date_time
                .duration_since(SystemTime::now())
                .unwrap_or(Duration::ZERO),
        );
    }

    None
}

fn parse_retry_after_body(body: &Value) -> Option<Duration> {
    let value = body.get("retryAfter").or_else(|| body.get("retry_after"))?;

    match value {
        Value::Number(n) => n.as_f64().and_then(seconds_to_duration),
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(seconds_to_duration),
        _ => None,
    }
}

/// Converts a server-supplied number of seconds, saturating at `Duration::MAX`.
fn seconds_to_duration(secs: f64) -> Option<Duration> {
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    // only overflow is left to fail here
    Some(Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX))
}
