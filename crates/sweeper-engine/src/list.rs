//! Artifact listing through the client pool.
//!
//! The list call runs on slot 0 with the same classification and backoff
//! policy as deletes, but without keep-alive and without replacing the
//! pooled connection between attempts.

use std::time::Duration;

use bytes::Bytes;
use sweeper_core::ListArtifactsResponse;
use tracing::info;

use crate::{
    client::{categorize_transport_error, extract_retry_after, request_headers},
    engine::DeleteEngine,
    error::{DeleteError, Result},
    retry::{classify_status, Disposition},
};

impl DeleteEngine {
    /// Fetches the artifact descriptors available at the service URL.
    ///
    /// Transient failures are retried under the engine's retry policy;
    /// an unexpected status or an exhausted budget surfaces as an error,
    /// since without a listing there is nothing to resolve targets
    /// against.
    ///
    /// # Errors
    ///
    /// Returns [`DeleteError::UnexpectedStatus`] for non-transient
    /// responses, [`DeleteError::RetryLimitExceeded`] when the budget runs
    /// out, or [`DeleteError::Internal`] for an unparseable body.
    pub async fn list_artifacts(&self, url: &str) -> Result<ListArtifactsResponse> {
        let headers = request_headers(self.pool.config(), false)?;
        let timeout = self.pool.config().timeout;
        let policy = &self.config.retry_policy;
        let mut retry_count: u32 = 0;

        loop {
            let client = self.pool.client(0).await;

            let retry_after = match client.get(url).headers(headers.clone()).send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    let retry_after_seconds = extract_retry_after(response.headers());

                    match classify_status(status) {
                        Disposition::Success => {
                            let body: Bytes = response.bytes().await.map_err(|e| {
                                DeleteError::network(format!("failed to read list response: {e}"))
                            })?;
                            return serde_json::from_slice(&body).map_err(|e| {
                                DeleteError::internal(format!("invalid list response body: {e}"))
                            });
                        },
                        Disposition::Throttled => {
                            info!(status, retry_after_seconds, "throttled while listing artifacts");
                            retry_after_seconds
                        },
                        Disposition::Retryable => {
                            info!(status, "retryable response while listing artifacts");
                            None
                        },
                        Disposition::Fatal => return Err(DeleteError::unexpected_status(status)),
                    }
                },
                Err(error) => {
                    let mapped = categorize_transport_error(&error, timeout);
                    info!(error = %mapped, "transport failure while listing artifacts");
                    None
                },
            };

            retry_count += 1;
            if retry_count > policy.retry_limit {
                return Err(DeleteError::retry_limit_exceeded(retry_count, "artifact listing"));
            }

            let delay = match retry_after {
                Some(seconds) => Duration::from_secs(seconds),
                None => policy.backoff_delay(retry_count),
            };
            info!(
                retry = retry_count,
                delay_ms = delay.as_millis() as u64,
                "backing off before retrying list"
            );
            self.clock.sleep(delay).await;
        }
    }
}
