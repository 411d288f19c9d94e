//! Rollback lister: recent configuration versions as a selection prompt.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Duration;
use tracing::{error, info};

use crate::{
    server::AppState,
    slack::{Action, Attachment, Confirmation, SelectOption, SlackMessage},
};

/// Identifier echoed back when a version is selected in the prompt.
pub const ROLLBACK_CALLBACK_ID: &str = "rollback-version-selection-action";

/// Lists configuration versions inside the trailing window and answers
/// with the interactive rollback prompt.
///
/// The listing service's native ordering is preserved (typically
/// most-recent-first); a listing failure is answered with an empty 400 and
/// logged only.
pub(crate) async fn list_rollback_versions(state: &AppState) -> Response {
    let config = &state.config;

    let versions = match state
        .object_store
        .list_config_versions(
            config.infrastructure_config_bucket.clone(),
            config.infrastructure_config_staging_key.clone(),
        )
        .await
    {
        Ok(versions) => versions,
        Err(e) => {
            error!(error = %e, bucket = %config.infrastructure_config_bucket, "configuration version listing failed");
            return StatusCode::BAD_REQUEST.into_response();
        },
    };

    let now = state.clock.now_utc();
    let window = Duration::days(i64::from(config.rollback_window_days));

    let options: Vec<SelectOption> = versions
        .iter()
        .filter(|v| v.is_within_window(now, window))
        .map(|v| SelectOption { value: v.version_id.clone(), text: v.option_label() })
        .collect();

    info!(
        total = versions.len(),
        offered = options.len(),
        window_days = config.rollback_window_days,
        "rollback versions listed"
    );

    (StatusCode::OK, Json(rollback_prompt(options))).into_response()
}

/// Builds the interactive rollback message: a cancel button and a version
/// select guarded by a confirmation prompt.
fn rollback_prompt(options: Vec<SelectOption>) -> SlackMessage {
    let confirm = Confirmation {
        title: "Are you sure?".to_string(),
        text: "This will immediately revert the production template configuration to the \
               selected previous version, which will trigger a CD pipeline execution."
            .to_string(),
        ok_text: "Yes, start rollback".to_string(),
        dismiss_text: "No".to_string(),
    };

    let attachment = Attachment {
        text: "Revert to this staging template configuration version".to_string(),
        fallback: Some("See Slack to continue with the rollback.".to_string()),
        color: Some("#3AA3E3".to_string()),
        attachment_type: Some("default".to_string()),
        callback_id: Some(ROLLBACK_CALLBACK_ID.to_string()),
        actions: vec![
            Action::button("cancel", "Cancel", "cancel").with_style("danger"),
            Action::select("selection", "Choose a configuration\u{2026}", options, confirm),
        ],
        ..Attachment::default()
    };

    SlackMessage::in_channel(
        "Rollback the staging stack to a previous configuration",
        vec![attachment],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_cancel_then_select() {
        let options =
            vec![SelectOption { value: "v-1".to_string(), text: "v-1 label".to_string() }];
        let message = rollback_prompt(options);

        let attachments = message.attachments.as_ref().unwrap();
        assert_eq!(attachments.len(), 1);

        let actions = &attachments[0].actions;
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].name, "cancel");
        assert_eq!(actions[0].kind, "button");
        assert_eq!(actions[1].name, "selection");
        assert_eq!(actions[1].kind, "select");
        assert_eq!(actions[1].options.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn prompt_is_in_channel_with_callback_id() {
        let message = rollback_prompt(Vec::new());

        assert_eq!(message.response_type, "in_channel");
        let attachment = &message.attachments.as_ref().unwrap()[0];
        assert_eq!(attachment.callback_id.as_deref(), Some(ROLLBACK_CALLBACK_ID));
        assert!(attachment.actions[1].confirm.is_some());
    }
}
