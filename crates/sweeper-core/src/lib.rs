//! Core domain models and time abstractions.
//!
//! Provides the artifact descriptors exchanged with the container service,
//! the outcome status type carried through batch reports, and the clock
//! abstraction the deletion engine uses for backoff sleeps and elapsed-time
//! measurement. The engine crate and the binary both build on these types.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod models;
pub mod time;

pub use models::{Artifact, DeleteStatus, ListArtifactsResponse};
pub use time::{Clock, RealClock, TestClock};
