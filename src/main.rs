//! Gantry CD operations service.
//!
//! Main entry point for the Gantry server. Initializes tracing, loads
//! configuration, constructs the AWS service adapters, and serves the HTTP
//! handlers until shutdown.

use std::sync::Arc;

use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use gantry_api::{start_server, AppState, Config};
use gantry_cloud::{CloudFormationInspector, CodePipelineService, S3ObjectStore, SnsMessageRelay};
use gantry_core::RealClock;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with structured logging
    init_tracing();

    info!("Starting Gantry CD operations service");

    // Load configuration from defaults, config.toml, and environment
    let config = Config::load()?;
    let addr = config.parse_server_addr()?;
    info!(
        addr = %addr,
        pipeline = %config.infrastructure_cd_pipeline_name,
        config_bucket = %config.infrastructure_config_bucket,
        code_bucket = %config.infrastructure_code_bucket,
        allowed_channels = config.allowed_channel_ids().len(),
        "Configuration loaded"
    );

    // Shared AWS credentials and region resolution for all clients
    let aws_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
    let object_store = Arc::new(S3ObjectStore::new(aws_sdk_s3::Client::new(&aws_config)));
    let pipeline =
        Arc::new(CodePipelineService::new(aws_sdk_codepipeline::Client::new(&aws_config)));
    let inspector =
        Arc::new(CloudFormationInspector::new(aws_sdk_cloudformation::Client::new(&aws_config)));
    let relay = Arc::new(SnsMessageRelay::new(
        aws_sdk_sns::Client::new(&aws_config),
        config.slack_message_relay_topic_arn.clone(),
    ));

    let state = AppState::new(
        Arc::new(config),
        object_store,
        pipeline,
        inspector,
        relay,
        Arc::new(RealClock::new()),
    );

    start_server(state, addr).await.context("HTTP server failed")?;

    info!("Gantry shutdown complete");
    Ok(())
}

/// Initializes tracing with environment-based filtering.
fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,gantry=debug,tower_http=debug"))
        .expect("Invalid RUST_LOG environment variable");

    let fmt_layer = fmt::layer().with_target(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
