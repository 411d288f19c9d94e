//! Domain models for pipeline jobs, artifacts, and configuration versions.
//!
//! The event shapes mirror the orchestrator's wire format (camelCase JSON);
//! the version-record helpers carry the rollback listing rules: the trailing
//! retention window and the truncated human label.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Number of characters of a version identifier shown in a rollback label.
const VERSION_LABEL_PREFIX_LEN: usize = 9;

/// A stored object reference: bucket name plus object key.
///
/// Immutable once read from a job event. The promotion destination reuses
/// the same object key under the configured target bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactLocation {
    /// Bucket holding the object.
    pub bucket_name: String,
    /// Key of the object within the bucket.
    pub object_key: String,
}

impl ArtifactLocation {
    /// Creates an artifact location from bucket and key.
    pub fn new(bucket_name: impl Into<String>, object_key: impl Into<String>) -> Self {
        Self { bucket_name: bucket_name.into(), object_key: object_key.into() }
    }

    /// Renders the `bucket/key` copy-source path expected by the storage
    /// service's server-side copy operation.
    pub fn copy_source(&self) -> String {
        format!("{}/{}", self.bucket_name, self.object_key)
    }
}

/// A pipeline job event as delivered by the orchestrator.
///
/// Consumed once per invocation; terminated by reporting success or failure
/// exactly once.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineJobEvent {
    /// Opaque job identifier assigned by the orchestrator.
    pub id: String,
    /// Input artifacts attached to the job. Promotion uses the first entry.
    #[serde(default)]
    pub input_artifacts: Vec<ArtifactLocation>,
}

impl PipelineJobEvent {
    /// Returns the first input artifact, if the job carries any.
    pub fn first_artifact(&self) -> Option<&ArtifactLocation> {
        self.input_artifacts.first()
    }
}

/// Failure details reported to the orchestrator when a job fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFailureDetails {
    /// Failure reason, conventionally a JSON-stringified error.
    pub message: String,
    /// Failure classification tag understood by the orchestrator.
    pub failure_type: String,
    /// Correlation identifier tying the report to this invocation.
    pub external_execution_id: String,
}

impl JobFailureDetails {
    /// Builds `JobFailed` details from an error and a correlation id.
    ///
    /// The message is the JSON-stringified error, matching what the
    /// orchestrator surfaces in its job history UI.
    pub fn job_failed(
        error: &(dyn std::error::Error + '_),
        external_execution_id: impl Into<String>,
    ) -> Self {
        let message = serde_json::json!({ "message": error.to_string() }).to_string();
        Self {
            message,
            failure_type: "JobFailed".to_string(),
            external_execution_id: external_execution_id.into(),
        }
    }
}

/// One historical version of a stored configuration object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigVersion {
    /// Version identifier assigned by the storage service.
    pub version_id: String,
    /// When this version was written.
    pub last_modified: DateTime<Utc>,
}

impl ConfigVersion {
    /// Creates a version record.
    pub fn new(version_id: impl Into<String>, last_modified: DateTime<Utc>) -> Self {
        Self { version_id: version_id.into(), last_modified }
    }

    /// Whether this version falls inside the trailing window ending at `now`.
    ///
    /// The comparison is strict: a version modified exactly at the threshold
    /// is excluded.
    pub fn is_within_window(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.last_modified > now - window
    }

    /// Human label for selection controls: the version id truncated to nine
    /// characters plus an ellipsis, followed by the UTC modification time.
    pub fn option_label(&self) -> String {
        let prefix: String = self.version_id.chars().take(VERSION_LABEL_PREFIX_LEN).collect();
        format!("{}\u{2026} {}", prefix, self.last_modified.format("%Y-%m-%d %H:%M"))
    }
}
