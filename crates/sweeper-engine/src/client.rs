//! HTTP client construction and the raw delete call.
//!
//! Builds the reqwest clients the pool hands out, assembles the versioned
//! JSON + keep-alive headers the container service expects, and maps
//! transport-level failures into the engine's error taxonomy. Response
//! *classification* (success / throttled / retryable / fatal) lives in
//! [`crate::retry`].

use std::time::Duration;

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONNECTION, CONTENT_TYPE,
    RETRY_AFTER,
};

use crate::error::{DeleteError, Result};

/// Configuration for the pooled HTTP clients.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout applied to every call.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// API version advertised in the `Accept` header.
    pub api_version: String,
    /// Keep-alive duration in seconds requested on delete calls.
    pub keep_alive_secs: u64,
    /// Bearer token applied to every request, when set.
    pub bearer_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT_SECONDS),
            user_agent: "artifact-sweeper/0.1".to_string(),
            api_version: "6.0-preview".to_string(),
            keep_alive_secs: 10,
            bearer_token: None,
        }
    }
}

/// Builds one reqwest client from the configuration.
///
/// The bearer token, when present, is installed as a sensitive default
/// header so every request through the client is authenticated.
pub(crate) fn build_client(config: &ClientConfig) -> Result<reqwest::Client> {
    let mut default_headers = HeaderMap::new();

    if let Some(token) = &config.bearer_token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| DeleteError::configuration(format!("invalid bearer token: {e}")))?;
        value.set_sensitive(true);
        default_headers.insert(AUTHORIZATION, value);
    }

    reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(&config.user_agent)
        .default_headers(default_headers)
        .build()
        .map_err(|e| DeleteError::configuration(format!("failed to build HTTP client: {e}")))
}

/// Assembles the request headers for a delete or list call.
///
/// All calls request a versioned JSON response; delete calls additionally
/// ask the service to keep the connection alive between attempts.
pub(crate) fn request_headers(config: &ClientConfig, keep_alive: bool) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if keep_alive {
        headers.insert(CONNECTION, HeaderValue::from_static("Keep-Alive"));
        headers.insert(
            HeaderName::from_static("keep-alive"),
            HeaderValue::from_str(&config.keep_alive_secs.to_string())
                .map_err(|e| DeleteError::configuration(format!("invalid keep-alive value: {e}")))?,
        );
    }

    let accept = format!("application/json;api-version={}", config.api_version);
    headers.insert(
        ACCEPT,
        HeaderValue::from_str(&accept)
            .map_err(|e| DeleteError::configuration(format!("invalid api version: {e}")))?,
    );

    Ok(headers)
}

/// Observed result of one delete attempt that produced an HTTP response.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AttemptResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed `Retry-After` wait, when the response carried one.
    pub retry_after_seconds: Option<u64>,
}

/// Issues one delete call and returns the observed response.
///
/// Transport-level failures (no status available) are mapped into
/// [`DeleteError::Network`] / [`DeleteError::Timeout`]. Success bodies are
/// drained and discarded, never parsed.
pub(crate) async fn send_delete(
    client: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
    timeout: Duration,
) -> Result<AttemptResponse> {
    let response = match client.delete(url).headers(headers).send().await {
        Ok(response) => response,
        Err(e) => return Err(categorize_transport_error(&e, timeout)),
    };

    let status = response.status().as_u16();
    let retry_after_seconds = extract_retry_after(response.headers());

    if response.status().is_success() {
        let _ = response.bytes().await;
    }

    Ok(AttemptResponse { status, retry_after_seconds })
}

/// Maps a reqwest error into the transport slice of the taxonomy.
pub(crate) fn categorize_transport_error(error: &reqwest::Error, timeout: Duration) -> DeleteError {
    if error.is_timeout() {
        DeleteError::timeout(timeout.as_secs())
    } else if error.is_connect() {
        DeleteError::network(format!("connection failed: {error}"))
    } else {
        DeleteError::network(error.to_string())
    }
}

/// Extracts the `Retry-After` wait from response headers.
///
/// Supports both the whole-seconds form and the HTTP-date form. A missing
/// or malformed header yields `None`: the caller falls back to exponential
/// backoff rather than failing the attempt.
pub(crate) fn extract_retry_after(headers: &HeaderMap) -> Option<u64> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?;

    if let Ok(seconds) = raw.trim().parse::<u64>() {
        return Some(seconds);
    }

    if let Ok(date_time) = chrono::DateTime::parse_from_rfc2822(raw) {
        let now = chrono::Utc::now();
        let retry_time = date_time.with_timezone(&chrono::Utc);

        if retry_time > now {
            if let Ok(wait) = retry_time.signed_duration_since(now).to_std() {
                return Some(wait.as_secs());
            }
        }
    }

    None
}
