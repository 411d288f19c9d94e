//! Artifact promotion: copies a job's input artifact and reports the
//! outcome.
//!
//! The invocation is terminated by exactly one report to the orchestrator,
//! success or failure, never both. Promotion is idempotent per job: the
//! copy overwrites the same destination object on re-invocation.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use gantry_core::{ArtifactLocation, JobFailureDetails, PipelineJobEvent};
use serde::Serialize;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::server::{AppState, RequestId};

/// Error response body for promotion failures.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error description.
    pub error: String,
}

/// Promotes the job's first input artifact into the infrastructure-code
/// bucket and reports the job result.
///
/// A copy failure is reported to the orchestrator first and then surfaced
/// as this invocation's terminal error; a failure of the report itself
/// replaces it as the terminal error. Nothing is retried.
#[instrument(
    name = "promote_artifact",
    skip(state, request_id, event),
    fields(job_id = %event.id)
)]
pub async fn promote_artifact(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    Json(event): Json<PipelineJobEvent>,
) -> Response {
    let correlation_id = request_id
        .map(|Extension(id)| id.0)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let Some(artifact) = event.first_artifact().cloned() else {
        warn!("job event carries no input artifacts");
        return error_response(StatusCode::BAD_REQUEST, "job event carries no input artifacts");
    };

    let destination = ArtifactLocation::new(
        state.config.infrastructure_code_bucket.clone(),
        artifact.object_key.clone(),
    );

    info!(
        source = %artifact.copy_source(),
        destination = %destination.copy_source(),
        "promoting artifact"
    );

    match state.object_store.copy_object(artifact, destination).await {
        Ok(()) => match state.pipeline.report_job_success(event.id.clone()).await {
            Ok(()) => {
                info!("job reported as succeeded");
                StatusCode::OK.into_response()
            },
            Err(report_err) => {
                error!(error = %report_err, "success report failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, report_err.to_string())
            },
        },
        Err(copy_err) => {
            error!(error = %copy_err, "artifact copy failed");
            let details = JobFailureDetails::job_failed(&copy_err, correlation_id);

            match state.pipeline.report_job_failure(event.id.clone(), details).await {
                // The copy error, not the report acknowledgement, is the
                // terminal result of this invocation.
                Ok(()) => error_response(StatusCode::INTERNAL_SERVER_ERROR, copy_err.to_string()),
                Err(report_err) => {
                    error!(error = %report_err, "failure report failed");
                    error_response(StatusCode::INTERNAL_SERVER_ERROR, report_err.to_string())
                },
            }
        },
    }
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: error.into() })).into_response()
}
