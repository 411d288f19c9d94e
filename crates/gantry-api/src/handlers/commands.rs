//! Slash-command router: signature verification and command dispatch.
//!
//! Authenticity and authorization are separate gates: the signature proves
//! the request came from the webhook source, the channel allow-list
//! restricts which conversation contexts may invoke privileged commands.
//! Both must pass before a sub-handler runs.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    crypto,
    server::AppState,
    slack::{SlackMessage, UNSUPPORTED_COMMAND_TEXT},
};

use super::{release, rollback};

const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
const SIGNATURE_HEADER: &str = "x-slack-signature";

/// Fields of interest in the URL-encoded slash-command payload.
///
/// The platform sends many more fields; unknown keys are ignored and
/// missing keys default to empty, which can never match a real command or
/// an allow-listed channel.
#[derive(Debug, Default, Deserialize)]
struct SlashCommandForm {
    #[serde(default)]
    command: String,
    #[serde(default)]
    channel_id: String,
    #[serde(default)]
    text: String,
}

/// Routes a signed slash-command request to its sub-handler.
///
/// The signature is computed over the exact raw body bytes, so the body is
/// taken as `Bytes` and only parsed after verification succeeds.
#[instrument(name = "slash_command", skip(state, headers, body))]
pub async fn slash_command(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let timestamp = header_value(&headers, TIMESTAMP_HEADER);
    let signature = header_value(&headers, SIGNATURE_HEADER);

    if !crypto::verify_signature(&state.config.slack_signing_secret, timestamp, &body, signature) {
        // Terminal authentication failure; nothing about the cause leaks.
        warn!("slash command rejected: signature mismatch");
        return StatusCode::BAD_REQUEST.into_response();
    }

    let form: SlashCommandForm = match serde_urlencoded::from_bytes(&body) {
        Ok(form) => form,
        Err(e) => {
            error!(error = %e, "slash command body is not valid form data");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        },
    };

    debug!(command = %form.command, channel_id = %form.channel_id, text = %form.text, "dispatching slash command");

    let authorized = state.config.allowed_channel_ids().contains(&form.channel_id);

    match (form.command.as_str(), authorized) {
        ("/ops-rollback", true) => rollback::list_rollback_versions(&state).await,
        ("/ops-release", true) => release::trigger_release(&state).await,
        _ => {
            info!(
                command = %form.command,
                channel_id = %form.channel_id,
                "slash command not supported in this context"
            );
            (StatusCode::OK, Json(SlackMessage::ephemeral(UNSUPPORTED_COMMAND_TEXT)))
                .into_response()
        },
    }
}

/// Reads a header as a string, treating absent or non-UTF-8 values as
/// empty. An empty timestamp or signature can never verify.
fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or("")
}
