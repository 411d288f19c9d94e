//! Error types and result handling for Gantry operations.
//!
//! Every external call in this system is attempted exactly once, so the
//! taxonomy carries no retry classification: an upstream failure is terminal
//! for the invocation that observed it.

use thiserror::Error;

/// Result type alias using `GantryError`.
pub type Result<T> = std::result::Result<T, GantryError>;

/// Error type covering both handlers and the cloud adapters.
#[derive(Debug, Error)]
pub enum GantryError {
    /// Request signature did not match the computed value.
    ///
    /// Deliberately carries no detail: authentication failures are answered
    /// with an empty 400 and nothing is leaked to the caller.
    #[error("signature verification failed")]
    InvalidSignature,

    /// Server-side object copy failed.
    #[error("object copy failed: {message}")]
    CopyFailed {
        /// Upstream error description
        message: String,
    },

    /// Object version listing failed.
    #[error("version listing failed: {message}")]
    ListVersionsFailed {
        /// Upstream error description
        message: String,
    },

    /// Pipeline execution could not be started.
    #[error("pipeline execution start failed: {message}")]
    StartExecutionFailed {
        /// Upstream error description
        message: String,
    },

    /// Reporting a job result to the orchestrator failed.
    #[error("job result report failed: {message}")]
    ReportResultFailed {
        /// Upstream error description
        message: String,
    },

    /// Stack or change-set description could not be retrieved.
    #[error("stack inspection failed: {message}")]
    InspectStackFailed {
        /// Upstream error description
        message: String,
    },

    /// Publishing a relayed notification failed.
    #[error("notification publish failed: {message}")]
    PublishFailed {
        /// Upstream error description
        message: String,
    },

    /// Request could not be parsed into the expected shape.
    #[error("malformed request: {message}")]
    MalformedRequest {
        /// What was wrong with the input
        message: String,
    },

    /// Generic error for wrapping other errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GantryError {
    /// Creates a copy-failure error from an upstream message.
    pub fn copy_failed(message: impl Into<String>) -> Self {
        Self::CopyFailed { message: message.into() }
    }

    /// Creates a listing-failure error from an upstream message.
    pub fn list_versions_failed(message: impl Into<String>) -> Self {
        Self::ListVersionsFailed { message: message.into() }
    }

    /// Creates an execution-start failure from an upstream message.
    pub fn start_execution_failed(message: impl Into<String>) -> Self {
        Self::StartExecutionFailed { message: message.into() }
    }

    /// Creates a result-report failure from an upstream message.
    pub fn report_result_failed(message: impl Into<String>) -> Self {
        Self::ReportResultFailed { message: message.into() }
    }

    /// Creates a stack-inspection failure from an upstream message.
    pub fn inspect_stack_failed(message: impl Into<String>) -> Self {
        Self::InspectStackFailed { message: message.into() }
    }

    /// Creates a notification-publish failure from an upstream message.
    pub fn publish_failed(message: impl Into<String>) -> Self {
        Self::PublishFailed { message: message.into() }
    }

    /// Creates a malformed-request error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest { message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_signature_carries_no_detail() {
        let message = GantryError::InvalidSignature.to_string();
        assert_eq!(message, "signature verification failed");
    }

    #[test]
    fn upstream_errors_preserve_message() {
        let err = GantryError::copy_failed("access denied");
        assert_eq!(err.to_string(), "object copy failed: access denied");

        let err = GantryError::list_versions_failed("bucket missing");
        assert_eq!(err.to_string(), "version listing failed: bucket missing");
    }
}
