//! Wire models for the artifact container service.
//!
//! Field names follow the service's camelCase JSON contract. Artifacts are
//! immutable once constructed; the deletion engine owns the batch for the
//! duration of one invocation and carries the metadata through to the
//! final report unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One named remote artifact scheduled for deletion.
///
/// `url` is the dereferenceable delete location for this artifact. The
/// remaining fields are metadata the service reported at listing time,
/// carried through to the batch report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Logical artifact name, unique within a batch.
    pub name: String,

    /// Resource URL the delete call is issued against.
    pub url: String,

    /// Declared artifact size in bytes.
    #[serde(default)]
    pub size: i64,

    /// Declared artifact type (wire field `type`).
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Identifier of the container holding the artifact.
    #[serde(default)]
    pub container_id: String,
}

/// Terminal outcome status for one artifact.
///
/// Serialized as `"success"` / `"fail"` to match the output schema callers
/// consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteStatus {
    /// The artifact was deleted.
    #[serde(rename = "success")]
    Deleted,
    /// The artifact could not be deleted.
    #[serde(rename = "fail")]
    Failed,
}

impl fmt::Display for DeleteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deleted => write!(f, "success"),
            Self::Failed => write!(f, "fail"),
        }
    }
}

/// Response of the artifact list call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListArtifactsResponse {
    /// Number of artifacts in `value`.
    pub count: i64,
    /// Artifact descriptors available in the container.
    pub value: Vec<Artifact>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_deserializes_from_wire_contract() {
        let body = r#"{
            "count": 1,
            "value": [{
                "name": "build-logs",
                "url": "https://service.example.com/_apis/resources/containers/42?itemPath=build-logs",
                "size": 2048,
                "type": "actions_storage",
                "containerId": "42"
            }]
        }"#;

        let response: ListArtifactsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.count, 1);

        let artifact = &response.value[0];
        assert_eq!(artifact.name, "build-logs");
        assert_eq!(artifact.size, 2048);
        assert_eq!(artifact.kind, "actions_storage");
        assert_eq!(artifact.container_id, "42");
    }

    #[test]
    fn artifact_tolerates_missing_metadata() {
        let body = r#"{"name": "a", "url": "https://service.example.com/a"}"#;

        let artifact: Artifact = serde_json::from_str(body).unwrap();
        assert_eq!(artifact.size, 0);
        assert!(artifact.kind.is_empty());
        assert!(artifact.container_id.is_empty());
    }

    #[test]
    fn status_serializes_to_output_schema() {
        assert_eq!(serde_json::to_string(&DeleteStatus::Deleted).unwrap(), r#""success""#);
        assert_eq!(serde_json::to_string(&DeleteStatus::Failed).unwrap(), r#""fail""#);
        assert_eq!(DeleteStatus::Failed.to_string(), "fail");
    }
}
