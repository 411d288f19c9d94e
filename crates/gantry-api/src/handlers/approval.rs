//! Approval notifications: renders a pending change set as an interactive
//! approve/reject message and hands it to the relay topic.
//!
//! The notification arrives wrapped in the broker's envelope. Everything a
//! later approve/reject interaction needs to answer the orchestrator is
//! serialized into the button values; the handler itself never answers the
//! approval.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gantry_core::{ApprovalNotification, ParameterDelta};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::{
    server::AppState,
    slack::{Action, Attachment, AttachmentMessage, Confirmation},
};

/// Identifier echoed back when an approval decision button is pressed.
pub const APPROVAL_CALLBACK_ID: &str = "codepipeline-approval-action";

const APPROVED: &str = "Approved";
const REJECTED: &str = "Rejected";

/// Broker envelope wrapping a published notification.
#[derive(Debug, Deserialize)]
pub struct TopicEnvelope {
    /// Records delivered in this envelope; the first one is processed.
    #[serde(rename = "Records")]
    pub records: Vec<TopicRecord>,
}

/// One record inside a broker envelope.
#[derive(Debug, Deserialize)]
pub struct TopicRecord {
    /// Topic payload of the record.
    #[serde(rename = "Sns")]
    pub sns: TopicPayload,
}

/// Topic payload carrying the notification as a JSON string.
#[derive(Debug, Deserialize)]
pub struct TopicPayload {
    /// JSON-encoded [`ApprovalNotification`].
    #[serde(rename = "Message")]
    pub message: String,
}

/// Everything needed to answer the approval later, smuggled through the
/// decision button's value.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DecisionPayload<'a> {
    pipeline_name: &'a str,
    stage_name: &'a str,
    action_name: &'a str,
    token: &'a str,
    value: &'a str,
}

/// Relays a manual-approval notification as an interactive chat message.
///
/// The deployed stack and the pending change set are described, their
/// parameter delta rendered, and the resulting message published to the
/// relay topic. A lookup or publish failure is terminal; the broker's
/// redelivery is the only retry.
#[instrument(name = "approval_notification", skip(state, envelope))]
pub async fn approval_notification(
    State(state): State<AppState>,
    Json(envelope): Json<TopicEnvelope>,
) -> Response {
    let Some(record) = envelope.records.first() else {
        warn!("approval envelope carries no records");
        return StatusCode::BAD_REQUEST.into_response();
    };

    let notification: ApprovalNotification = match serde_json::from_str(&record.sns.message) {
        Ok(notification) => notification,
        Err(e) => {
            warn!(error = %e, "approval notification is not valid JSON");
            return StatusCode::BAD_REQUEST.into_response();
        },
    };

    let target = match notification.approval.change_set_target() {
        Ok(target) => target,
        Err(e) => {
            warn!(error = %e, "approval custom data names no change set");
            return StatusCode::BAD_REQUEST.into_response();
        },
    };

    let stack = match state.inspector.stack_parameters(target.stack_name.clone()).await {
        Ok(parameters) => parameters,
        Err(e) => {
            error!(error = %e, stack = %target.stack_name, "stack description failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        },
    };

    let change_set = match state
        .inspector
        .change_set_parameters(target.stack_name.clone(), target.change_set_name.clone())
        .await
    {
        Ok(parameters) => parameters,
        Err(e) => {
            error!(error = %e, change_set = %target.change_set_name, "change set description failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        },
    };

    let delta = ParameterDelta::between(&stack, &change_set);
    let message = approval_message(&notification, &delta);

    let rendered = match serde_json::to_string(&message) {
        Ok(rendered) => rendered,
        Err(e) => {
            error!(error = %e, "approval message failed to serialize");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        },
    };

    let webhook_url = state.config.pipeline_slack_webhook_url.clone();
    if let Err(e) = state.relay.publish(rendered, webhook_url).await {
        error!(error = %e, "approval notification publish failed");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    info!(
        pipeline = %notification.approval.pipeline_name,
        stack = %target.stack_name,
        change_set = %target.change_set_name,
        delta_lines = delta.lines.len(),
        "approval notification relayed"
    );

    StatusCode::OK.into_response()
}

/// Builds the relayed message: the parameter delta followed by the
/// approve/reject controls.
fn approval_message(
    notification: &ApprovalNotification,
    delta: &ParameterDelta,
) -> AttachmentMessage {
    AttachmentMessage {
        attachments: vec![delta_attachment(delta), decision_attachment(notification)],
    }
}

fn delta_attachment(delta: &ParameterDelta) -> Attachment {
    Attachment {
        title: Some("Stack Parameters Delta".to_string()),
        footer: Some(format!("Excludes {} unchanged parameters", delta.unchanged)),
        mrkdwn_in: Some(vec!["text".to_string()]),
        text: delta.to_markdown(),
        ..Attachment::default()
    }
}

fn decision_attachment(notification: &ApprovalNotification) -> Attachment {
    let approval = &notification.approval;

    let confirm = Confirmation {
        title: "Production Deploy Approval".to_string(),
        text: "Are you sure you want to approve this CloudFormation change set for the \
               production stack? Approval will trigger an immediate update to the production \
               stack!"
            .to_string(),
        ok_text: "Deploy".to_string(),
        dismiss_text: "Cancel".to_string(),
    };

    Attachment {
        fallback: Some(format!(
            "{} {}: {}",
            approval.pipeline_name, approval.stage_name, approval.action_name
        )),
        color: Some("#FF8400".to_string()),
        author_name: Some(approval.pipeline_name.clone()),
        author_link: Some(notification.console_link.clone()),
        title: Some(format!("{}: {}", approval.stage_name, approval.action_name)),
        title_link: Some(approval.approval_review_link.clone()),
        text: "Manual approval required to trigger *ExecuteChangeSet*".to_string(),
        footer: Some(notification.region.clone()),
        mrkdwn_in: Some(vec!["text".to_string()]),
        callback_id: Some(APPROVAL_CALLBACK_ID.to_string()),
        actions: vec![
            Action::button("decision", "Approve", decision_value(notification, APPROVED))
                .with_style("primary")
                .with_confirm(confirm),
            Action::button("decision", "Reject", decision_value(notification, REJECTED)),
        ],
        ..Attachment::default()
    }
}

fn decision_value(notification: &ApprovalNotification, value: &str) -> String {
    let approval = &notification.approval;
    let payload = DecisionPayload {
        pipeline_name: &approval.pipeline_name,
        stage_name: &approval.stage_name,
        action_name: &approval.action_name,
        token: &approval.token,
        value,
    };

    // Infallible: every field is a string.
    serde_json::to_string(&payload).unwrap_or_default()
}
