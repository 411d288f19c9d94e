//! Slack response message types.
//!
//! Typed renditions of the chat platform's legacy message-and-attachment
//! formatting conventions, covering only what the handlers emit: ephemeral
//! text replies and one interactive attachment with buttons and a select
//! control.

use serde::Serialize;

/// Reply shown only to the invoking user.
pub const RESPONSE_TYPE_EPHEMERAL: &str = "ephemeral";
/// Reply posted into the channel.
pub const RESPONSE_TYPE_IN_CHANNEL: &str = "in_channel";

/// Fixed reply for unknown commands or non-allow-listed origins.
pub const UNSUPPORTED_COMMAND_TEXT: &str = "Sorry, that command doesn't work here.";

/// Top-level slash-command response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlackMessage {
    /// Main message text.
    pub text: String,
    /// Visibility of the reply (`ephemeral` or `in_channel`).
    pub response_type: String,
    /// Interactive attachments, omitted when empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
}

impl SlackMessage {
    /// Builds a text-only reply visible to the invoking user.
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            response_type: RESPONSE_TYPE_EPHEMERAL.to_string(),
            attachments: None,
        }
    }

    /// Builds an in-channel reply carrying interactive attachments.
    pub fn in_channel(text: impl Into<String>, attachments: Vec<Attachment>) -> Self {
        Self {
            text: text.into(),
            response_type: RESPONSE_TYPE_IN_CHANNEL.to_string(),
            attachments: Some(attachments),
        }
    }
}

/// One message attachment, interactive or informational.
///
/// Only fields a handler sets are serialized; the chat platform treats
/// every attachment field as optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Attachment {
    /// Attachment title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Link the title points at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_link: Option<String>,
    /// Attachment body text.
    pub text: String,
    /// Plain-text fallback for clients without attachment support.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
    /// Sidebar color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Attachment rendering style.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_type: Option<String>,
    /// Author line above the title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    /// Link the author line points at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_link: Option<String>,
    /// Footer line under the attachment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    /// Fields rendered as markdown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mrkdwn_in: Option<Vec<String>>,
    /// Identifier echoed back in the interaction callback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_id: Option<String>,
    /// Interactive controls.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

/// Attachment-only message body relayed through the message broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentMessage {
    /// Attachments making up the message.
    pub attachments: Vec<Attachment>,
}

/// One interactive control inside an attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    /// Action name reported in the callback.
    pub name: String,
    /// Control label.
    pub text: String,
    /// Control kind (`button` or `select`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Button styling, omitted for selects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// Button value, omitted for selects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Select options, omitted for buttons.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,
    /// Confirmation prompt shown before the action fires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm: Option<Confirmation>,
}

impl Action {
    /// Builds a button control.
    pub fn button(
        name: impl Into<String>,
        text: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            kind: "button".to_string(),
            style: None,
            value: Some(value.into()),
            options: None,
            confirm: None,
        }
    }

    /// Builds a select control with a confirmation prompt.
    pub fn select(
        name: impl Into<String>,
        text: impl Into<String>,
        options: Vec<SelectOption>,
        confirm: Confirmation,
    ) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            kind: "select".to_string(),
            style: None,
            value: None,
            options: Some(options),
            confirm: Some(confirm),
        }
    }

    /// Sets the button styling.
    #[must_use]
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Attaches a confirmation prompt shown before the action fires.
    #[must_use]
    pub fn with_confirm(mut self, confirm: Confirmation) -> Self {
        self.confirm = Some(confirm);
        self
    }
}

/// One entry in a select control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    /// Value submitted when the option is chosen.
    pub value: String,
    /// Display label.
    pub text: String,
}

/// Confirmation dialog attached to a destructive action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    /// Dialog title.
    pub title: String,
    /// Dialog body text.
    pub text: String,
    /// Confirm button label.
    pub ok_text: String,
    /// Dismiss button label.
    pub dismiss_text: String,
}
