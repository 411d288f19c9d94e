//! Integration tests for the approval-notification relay.
//!
//! The handler receives the broker envelope, describes the pending change
//! set, and must publish exactly one rendered message per notification.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use gantry_api::{create_router, AppState, Config};
use gantry_cloud::{
    change_set::mock::MockStackInspector, notifier::mock::MockMessageRelay,
    object_store::mock::MockObjectStore, pipeline::mock::MockPipelineService,
};
use gantry_core::{StackParameter, TestClock};
use tower::ServiceExt;

const WEBHOOK_URL: &str = "https://hooks.example.com/T0/B0/x";

struct TestApp {
    router: Router,
    inspector: Arc<MockStackInspector>,
    relay: Arc<MockMessageRelay>,
}

impl TestApp {
    fn new() -> Self {
        let config = Config {
            slack_signing_secret: "test-signing-secret".to_string(),
            slack_allowed_channels: "G3H72T468".to_string(),
            infrastructure_config_bucket: "infra-config".to_string(),
            infrastructure_config_staging_key: "staging/template.yaml".to_string(),
            infrastructure_cd_pipeline_name: "infra-cd".to_string(),
            infrastructure_code_bucket: "infra-code".to_string(),
            pipeline_slack_webhook_url: WEBHOOK_URL.to_string(),
            slack_message_relay_topic_arn: "arn:aws:sns:us-east-1:123456789012:relay".to_string(),
            ..Config::default()
        };

        let inspector = Arc::new(MockStackInspector::new());
        let relay = Arc::new(MockMessageRelay::new());
        let state = AppState::new(
            Arc::new(config),
            Arc::new(MockObjectStore::new()),
            Arc::new(MockPipelineService::new()),
            inspector.clone(),
            relay.clone(),
            Arc::new(TestClock::at(Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap())),
        );

        Self { router: create_router(state), inspector, relay }
    }

    async fn send(&self, body: String) -> StatusCode {
        let request = Request::builder()
            .method("POST")
            .uri("/pipeline/approvals")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .expect("request should build");

        let response = self.router.clone().oneshot(request).await.expect("request should route");
        response.status()
    }
}

fn envelope() -> String {
    let notification = serde_json::json!({
        "region": "us-east-1",
        "consoleLink": "https://console.example.com/pipeline",
        "approval": {
            "pipelineName": "infra-cd",
            "stageName": "Production",
            "actionName": "ApproveChangeSet",
            "token": "tok-1",
            "approvalReviewLink": "https://console.example.com/approval",
            "customData": "{\"StackName\":\"infra\",\"ChangeSetName\":\"cs-1\"}"
        }
    });

    serde_json::json!({
        "Records": [ { "Sns": { "Message": notification.to_string() } } ]
    })
    .to_string()
}

#[tokio::test]
async fn notification_is_rendered_and_relayed_once() {
    let app = TestApp::new();
    app.inspector
        .set_stack_parameters(vec![
            StackParameter::new("Environment", "staging"),
            StackParameter::new("InstanceCount", "2"),
        ])
        .await;
    app.inspector
        .set_change_set_parameters(vec![
            StackParameter::new("Environment", "production"),
            StackParameter::new("InstanceCount", "2"),
        ])
        .await;

    let status = app.send(envelope()).await;

    assert_eq!(status, StatusCode::OK);

    let published = app.relay.published_messages().await;
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].webhook_url, WEBHOOK_URL);

    let message: serde_json::Value = serde_json::from_str(&published[0].message).unwrap();
    let attachments = message["attachments"].as_array().unwrap();
    assert_eq!(attachments.len(), 2);

    let delta = &attachments[0];
    assert_eq!(delta["title"], "Stack Parameters Delta");
    assert_eq!(delta["footer"], "Excludes 1 unchanged parameters");
    assert!(delta["text"]
        .as_str()
        .unwrap()
        .contains("*Environment*: `staging` \u{27a1} `production`"));

    let decision = &attachments[1];
    assert_eq!(decision["callback_id"], "codepipeline-approval-action");
    assert_eq!(decision["title"], "Production: ApproveChangeSet");
    assert_eq!(decision["footer"], "us-east-1");

    let approve: serde_json::Value =
        serde_json::from_str(decision["actions"][0]["value"].as_str().unwrap()).unwrap();
    assert_eq!(approve["value"], "Approved");
    assert_eq!(approve["token"], "tok-1");
    assert!(decision["actions"][0].get("confirm").is_some());

    let reject: serde_json::Value =
        serde_json::from_str(decision["actions"][1]["value"].as_str().unwrap()).unwrap();
    assert_eq!(reject["value"], "Rejected");
}

#[tokio::test]
async fn envelope_without_records_is_rejected() {
    let app = TestApp::new();

    let status = app.send(r#"{ "Records": [] }"#.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.relay.published_messages().await.is_empty());
}

#[tokio::test]
async fn unparseable_notification_is_rejected() {
    let app = TestApp::new();

    let body = serde_json::json!({
        "Records": [ { "Sns": { "Message": "not json" } } ]
    })
    .to_string();
    let status = app.send(body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.relay.published_messages().await.is_empty());
}

#[tokio::test]
async fn stack_lookup_failure_publishes_nothing() {
    let app = TestApp::new();
    app.inspector.inject_error("access denied").await;

    let status = app.send(envelope()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(app.relay.published_messages().await.is_empty());
}

#[tokio::test]
async fn publish_failure_is_a_server_error() {
    let app = TestApp::new();
    app.relay.inject_error("topic gone").await;

    let status = app.send(envelope()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
