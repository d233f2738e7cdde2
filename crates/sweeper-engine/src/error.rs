//! Error types for artifact delete operations.
//!
//! The taxonomy distinguishes transient conditions the retry controller
//! recovers from locally (throttled, retryable status, transport failure)
//! from terminal ones (unexpected status, exhausted retry budget) and from
//! engine-level malfunction, which is the only class allowed to abort a
//! whole batch.

use thiserror::Error;

/// Result type alias for delete operations.
pub type Result<T> = std::result::Result<T, DeleteError>;

/// Error conditions arising while deleting artifacts.
#[derive(Debug, Clone, Error)]
pub enum DeleteError {
    /// Transport-level failure with no HTTP status available.
    #[error("network connection failed: {message}")]
    Network {
        /// Description of the transport failure.
        message: String,
    },

    /// HTTP request timeout exceeded.
    #[error("request timeout after {timeout_seconds}s")]
    Timeout {
        /// Number of seconds before the request timed out.
        timeout_seconds: u64,
    },

    /// Service signalled too many requests (HTTP 429).
    #[error("throttled by service (HTTP 429)")]
    Throttled {
        /// Server-directed wait from the `Retry-After` header, when
        /// present and parseable.
        retry_after_seconds: Option<u64>,
    },

    /// Response status conventionally treated as transient.
    #[error("retryable response: HTTP {status_code}")]
    RetryableStatus {
        /// HTTP status code (request-timeout or 5xx class).
        status_code: u16,
    },

    /// Response status outside the success/throttled/retryable sets.
    #[error("unexpected response: HTTP {status_code}")]
    UnexpectedStatus {
        /// HTTP status code returned by the service.
        status_code: u16,
    },

    /// Retry budget exhausted without a success.
    #[error("retry limit reached after {attempts} attempts deleting {name}")]
    RetryLimitExceeded {
        /// Total attempts made, including the initial one.
        attempts: u32,
        /// Name of the target whose budget ran out.
        name: String,
    },

    /// Invalid client or engine configuration.
    #[error("invalid configuration: {message}")]
    Configuration {
        /// Configuration error message.
        message: String,
    },

    /// A delete worker task terminated abnormally.
    #[error("delete worker {worker_id} panicked: {message}")]
    WorkerPanic {
        /// Index of the worker that panicked.
        worker_id: usize,
        /// Join error description.
        message: String,
    },

    /// Unexpected internal engine error.
    #[error("internal engine error: {message}")]
    Internal {
        /// Internal error message.
        message: String,
    },
}

impl DeleteError {
    /// Creates a network error from a message.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    /// Creates a timeout error.
    pub fn timeout(timeout_seconds: u64) -> Self {
        Self::Timeout { timeout_seconds }
    }

    /// Creates a throttled error with optional server-directed wait.
    pub fn throttled(retry_after_seconds: Option<u64>) -> Self {
        Self::Throttled { retry_after_seconds }
    }

    /// Creates a retryable-status error.
    pub fn retryable_status(status_code: u16) -> Self {
        Self::RetryableStatus { status_code }
    }

    /// Creates an unexpected-status error.
    pub fn unexpected_status(status_code: u16) -> Self {
        Self::UnexpectedStatus { status_code }
    }

    /// Creates a retry-limit-exceeded error.
    pub fn retry_limit_exceeded(attempts: u32, name: impl Into<String>) -> Self {
        Self::RetryLimitExceeded { attempts, name: name.into() }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Creates a worker-panic error.
    pub fn worker_panic(worker_id: usize, message: impl Into<String>) -> Self {
        Self::WorkerPanic { worker_id, message: message.into() }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Whether this condition is transient and safe to retry.
    ///
    /// Returns `true` for transport failures, timeouts, throttling, and
    /// retryable statuses. Unexpected statuses, exhausted budgets, and
    /// engine malfunction are terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. }
            | Self::Timeout { .. }
            | Self::Throttled { .. }
            | Self::RetryableStatus { .. } => true,

            Self::UnexpectedStatus { .. }
            | Self::RetryLimitExceeded { .. }
            | Self::Configuration { .. }
            | Self::WorkerPanic { .. }
            | Self::Internal { .. } => false,
        }
    }

    /// Server-directed wait in seconds, for throttled responses that
    /// carried a parseable `Retry-After`.
    ///
    /// `None` means standard exponential backoff applies.
    pub fn retry_after_seconds(&self) -> Option<u64> {
        match self {
            Self::Throttled { retry_after_seconds } => *retry_after_seconds,
            _ => None,
        }
    }
}
