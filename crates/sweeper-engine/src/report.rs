//! Batch report assembly from per-target outcomes.
//!
//! Workers record exactly one terminal outcome per target; the finished
//! report partitions every input name into the deleted or failed bucket
//! and carries the listing metadata through unchanged.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sweeper_core::{Artifact, DeleteStatus};

/// Count and name list for one outcome bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeSummary {
    /// Number of targets in this bucket.
    pub count: usize,
    /// Names of the targets in this bucket.
    pub names: Vec<String>,
}

/// Terminal outcome record for one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactOutcome {
    /// Whether the artifact was deleted.
    pub status: DeleteStatus,
    /// Declared size carried from the listing.
    pub size: i64,
    /// Declared type carried from the listing (wire field `type`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Owning container id carried from the listing.
    pub container_id: String,
}

/// Aggregate result of one delete batch.
///
/// Invariant: every processed target appears in exactly one of the two
/// buckets, and `deleted.count + failed.count` equals the number of
/// targets processed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Targets whose delete succeeded.
    pub deleted: OutcomeSummary,
    /// Targets that reached a terminal failure.
    pub failed: OutcomeSummary,
    /// Full outcome record per target name.
    pub artifacts: HashMap<String, ArtifactOutcome>,
}

impl BatchReport {
    /// Whether the report accounts for exactly `total` targets.
    pub fn is_complete_for(&self, total: usize) -> bool {
        self.deleted.count + self.failed.count == total && self.artifacts.len() == total
    }
}

/// Concurrent-append accumulator for a batch report.
///
/// Shared across workers behind a lock; each update touches a distinct
/// target name, so updates only contend on the counters and name lists.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    report: BatchReport,
}

impl ReportBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful delete for `artifact`.
    pub fn record_deleted(&mut self, artifact: &Artifact) {
        self.record(artifact, DeleteStatus::Deleted);
    }

    /// Records a terminal failure for `artifact`.
    pub fn record_failed(&mut self, artifact: &Artifact) {
        self.record(artifact, DeleteStatus::Failed);
    }

    fn record(&mut self, artifact: &Artifact, status: DeleteStatus) {
        let summary = match status {
            DeleteStatus::Deleted => &mut self.report.deleted,
            DeleteStatus::Failed => &mut self.report.failed,
        };
        summary.count += 1;
        summary.names.push(artifact.name.clone());

        self.report.artifacts.insert(
            artifact.name.clone(),
            ArtifactOutcome {
                status,
                size: artifact.size,
                kind: artifact.kind.clone(),
                container_id: artifact.container_id.clone(),
            },
        );
    }

    /// Consumes the builder and returns the finished report.
    pub fn finish(self) -> BatchReport {
        self.report
    }
}
