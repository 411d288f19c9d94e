//! Manual-approval notification models and parameter-delta rules.
//!
//! When a pipeline execution pauses on a manual approval, the orchestrator
//! emits a notification naming the pending change set. The delta between
//! the deployed stack's parameters and the change set's parameters is what
//! reviewers decide on, rendered one markdown line per differing key.

use serde::Deserialize;

/// A manual-approval notification as emitted by the orchestrator.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalNotification {
    /// Region the pipeline runs in.
    pub region: String,
    /// Console link for the pipeline.
    pub console_link: String,
    /// The pending approval action.
    pub approval: PendingApproval,
}

/// The approval action a reviewer must decide on.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingApproval {
    /// Pipeline the approval belongs to.
    pub pipeline_name: String,
    /// Stage containing the approval action.
    pub stage_name: String,
    /// Name of the approval action.
    pub action_name: String,
    /// One-time token required to answer the approval.
    pub token: String,
    /// Review link for the approval.
    pub approval_review_link: String,
    /// JSON-encoded [`ChangeSetTarget`] attached by the pipeline.
    pub custom_data: String,
}

impl PendingApproval {
    /// Parses the custom data into the change set it targets.
    pub fn change_set_target(&self) -> Result<ChangeSetTarget, serde_json::Error> {
        serde_json::from_str(&self.custom_data)
    }
}

/// Stack and change set named in an approval's custom data.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangeSetTarget {
    /// Stack the change set applies to.
    pub stack_name: String,
    /// Pending change set awaiting execution.
    pub change_set_name: String,
}

/// One template parameter key/value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackParameter {
    /// Parameter key.
    pub key: String,
    /// Parameter value.
    pub value: String,
}

impl StackParameter {
    /// Creates a parameter from key and value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// Parameter differences between a deployed stack and a pending change set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDelta {
    /// One markdown line per added, removed, or changed parameter, in
    /// first-seen key order.
    pub lines: Vec<String>,
    /// Number of parameters present on both sides with equal values.
    pub unchanged: usize,
}

impl ParameterDelta {
    /// Computes the delta between stack and change-set parameters.
    ///
    /// Keys keep the order they first appear in: all stack keys, then keys
    /// only the change set introduces.
    pub fn between(stack: &[StackParameter], change_set: &[StackParameter]) -> Self {
        let mut keys: Vec<&str> = Vec::new();
        for p in stack.iter().chain(change_set.iter()) {
            if !keys.contains(&p.key.as_str()) {
                keys.push(&p.key);
            }
        }

        fn value_of(params: &[StackParameter], key: &str) -> Option<String> {
            params.iter().find(|p| p.key == key).map(|p| p.value.clone())
        }

        let mut lines = Vec::new();
        let mut unchanged = 0;

        for key in &keys {
            match (value_of(stack, key), value_of(change_set, key)) {
                (None, Some(after)) => {
                    lines.push(format!("*{key}*: \u{2754} \u{27a1} `{after}`"));
                },
                (Some(before), None) => {
                    lines.push(format!("*{key}*: `{before}` \u{27a1} \u{274c}"));
                },
                (Some(before), Some(after)) if before != after => {
                    lines.push(format!("*{key}*: `{before}` \u{27a1} `{after}`"));
                },
                _ => unchanged += 1,
            }
        }

        Self { lines, unchanged }
    }

    /// Renders the delta lines as one markdown block.
    pub fn to_markdown(&self) -> String {
        self.lines.join("\n")
    }
}
