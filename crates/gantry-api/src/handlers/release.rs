//! Release trigger: starts the configured CD pipeline.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info};

use crate::{config::ReleaseFailurePolicy, server::AppState, slack::SlackMessage};

/// Starts an execution of the configured pipeline and acknowledges.
///
/// What a start failure answers depends on the configured policy: the
/// original handler logged the error and swallowed it, which remains
/// selectable as `Acknowledge`.
pub(crate) async fn trigger_release(state: &AppState) -> Response {
    let pipeline_name = state.config.infrastructure_cd_pipeline_name.clone();

    match state.pipeline.start_execution(pipeline_name.clone()).await {
        Ok(execution_id) => {
            info!(
                pipeline = %pipeline_name,
                execution_id = execution_id.as_deref().unwrap_or("unknown"),
                "pipeline execution started"
            );
            started_response(&pipeline_name)
        },
        Err(e) => {
            error!(error = %e, pipeline = %pipeline_name, "pipeline execution start failed");
            match state.config.release_failure_policy {
                ReleaseFailurePolicy::Surface => StatusCode::BAD_REQUEST.into_response(),
                ReleaseFailurePolicy::Acknowledge => started_response(&pipeline_name),
            }
        },
    }
}

fn started_response(pipeline_name: &str) -> Response {
    let message =
        SlackMessage::ephemeral(format!("Pipeline execution started for `{pipeline_name}`"));
    (StatusCode::OK, Json(message)).into_response()
}
