//! Concurrent, retrying artifact deletion engine.
//!
//! Given a finite batch of artifact descriptors, the engine issues delete
//! requests against the container service with bounded parallelism,
//! classifies and recovers from transient failures, and produces an exact
//! accounting of what succeeded and what did not.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────┐   ┌─────────────┐
//! │ DeleteEngine │──▶│ Worker pool │──▶│ Client pool │
//! └──────────────┘   └─────────────┘   └─────────────┘
//!        │                 │                  │
//!        ▼                 ▼                  ▼
//! ┌──────────────┐   ┌─────────────┐   ┌─────────────┐
//! │ Work queue   │   │ Retry/      │   │ Container   │
//! │ (atomic)     │   │ backoff     │   │ service     │
//! └──────────────┘   └─────────────┘   └─────────────┘
//! ```
//!
//! A fixed number of workers drain a shared atomic work queue; each worker
//! drives the full delete protocol for one artifact at a time — classify
//! the response, honor `Retry-After` on throttling, back off exponentially
//! on transient failures, replace its pooled connection before every retry
//! — and records the terminal outcome in the shared batch report. One
//! artifact's permanent failure never blocks or cancels its siblings; the
//! only condition that aborts a batch is a malfunction of the engine
//! itself.
//!
//! # Example
//!
//! ```no_run
//! use sweeper_engine::{DeleteEngine, EngineConfig};
//! use sweeper_core::Artifact;
//!
//! # async fn example(artifacts: Vec<Artifact>) -> Result<(), sweeper_engine::DeleteError> {
//! let engine = DeleteEngine::new(EngineConfig::default())?;
//! let report = engine.delete_artifacts(artifacts).await?;
//! println!("deleted {} artifacts, {} failed", report.deleted.count, report.failed.count);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod engine;
pub mod error;
mod list;
pub mod pool;
pub mod progress;
pub mod report;
pub mod retry;
pub mod worker;

pub use client::ClientConfig;
pub use engine::{DeleteEngine, EngineConfig};
pub use error::{DeleteError, Result};
pub use report::{ArtifactOutcome, BatchReport, OutcomeSummary};
pub use retry::RetryPolicy;

/// Default number of concurrent delete workers.
pub const DEFAULT_DELETE_CONCURRENCY: usize = 2;

/// Default retry budget per artifact (retries, not total attempts).
pub const DEFAULT_RETRY_LIMIT: u32 = 5;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
