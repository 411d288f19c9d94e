//! Configuration management for the Gantry CD operations service.

use std::{collections::HashSet, net::SocketAddr, str::FromStr};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.toml";

/// What the release trigger answers when the execution start fails.
///
/// The original handler logged the error and never answered at all.
/// `Acknowledge` preserves that log-and-swallow policy (while still
/// answering the webhook); `Surface` reports the failure to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseFailurePolicy {
    /// Respond 400 with an empty body, like the lister's failure path.
    Surface,
    /// Log the error and respond exactly as on success.
    Acknowledge,
}

/// Complete service configuration with defaults, file, and environment
/// overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`config.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// Validated once at startup and read-only afterwards; handlers never read
/// the environment ad hoc.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server
    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host", alias = "HOST")]
    pub host: String,
    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port", alias = "PORT")]
    pub port: u16,
    /// HTTP request timeout in seconds.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout", alias = "REQUEST_TIMEOUT")]
    pub request_timeout: u64,

    // Slash commands
    /// Shared secret for webhook signature verification.
    ///
    /// Environment variable: `SLACK_SIGNING_SECRET`
    #[serde(default, alias = "SLACK_SIGNING_SECRET")]
    pub slack_signing_secret: String,
    /// Comma-separated channel identifiers permitted to invoke privileged
    /// commands.
    ///
    /// Environment variable: `SLACK_ALLOWED_CHANNELS`
    #[serde(default, alias = "SLACK_ALLOWED_CHANNELS")]
    pub slack_allowed_channels: String,

    // Infrastructure
    //
    // Field names must equal the lowercased environment variable names:
    // the env provider lowercases keys before deserialization.
    /// Bucket holding the versioned infrastructure configuration object.
    ///
    /// Environment variable: `INFRASTRUCTURE_CONFIG_BUCKET`
    #[serde(default, alias = "INFRASTRUCTURE_CONFIG_BUCKET")]
    pub infrastructure_config_bucket: String,
    /// Key prefix of the staging configuration object.
    ///
    /// Environment variable: `INFRASTRUCTURE_CONFIG_STAGING_KEY`
    #[serde(default, alias = "INFRASTRUCTURE_CONFIG_STAGING_KEY")]
    pub infrastructure_config_staging_key: String,
    /// Name of the CD pipeline started by `/ops-release`.
    ///
    /// Environment variable: `INFRASTRUCTURE_CD_PIPELINE_NAME`
    #[serde(default, alias = "INFRASTRUCTURE_CD_PIPELINE_NAME")]
    pub infrastructure_cd_pipeline_name: String,
    /// Destination bucket for promoted infrastructure-code artifacts.
    ///
    /// Environment variable: `INFRASTRUCTURE_CODE_BUCKET`
    #[serde(default, alias = "INFRASTRUCTURE_CODE_BUCKET")]
    pub infrastructure_code_bucket: String,

    // Approval relay
    /// Webhook URL attached to relayed approval notifications.
    ///
    /// Environment variable: `PIPELINE_SLACK_WEBHOOK_URL`
    #[serde(default, alias = "PIPELINE_SLACK_WEBHOOK_URL")]
    pub pipeline_slack_webhook_url: String,
    /// Message-relay topic ARN approval notifications are published to.
    ///
    /// Environment variable: `SLACK_MESSAGE_RELAY_TOPIC_ARN`
    #[serde(default, alias = "SLACK_MESSAGE_RELAY_TOPIC_ARN")]
    pub slack_message_relay_topic_arn: String,

    // Rollback
    /// Trailing window, in days, of configuration versions offered for
    /// rollback.
    ///
    /// Environment variable: `ROLLBACK_WINDOW_DAYS`
    #[serde(default = "default_rollback_window_days", alias = "ROLLBACK_WINDOW_DAYS")]
    pub rollback_window_days: u32,

    // Release
    /// Failure policy for the release trigger.
    ///
    /// Environment variable: `RELEASE_FAILURE_POLICY`
    #[serde(default = "default_release_failure_policy", alias = "RELEASE_FAILURE_POLICY")]
    pub release_failure_policy: ReleaseFailurePolicy,

    // Logging
    /// Log level configuration.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level", alias = "RUST_LOG")]
    pub rust_log: String,
}

impl Config {
    /// Load configuration from defaults, config file, and environment
    /// variable overrides.
    ///
    /// # Errors
    ///
    /// Fails if a source cannot be read or the merged configuration does
    /// not validate (missing secret, empty allow-list, missing buckets).
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(""));

        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// The set of channel identifiers permitted to invoke privileged
    /// commands.
    pub fn allowed_channel_ids(&self) -> HashSet<String> {
        self.slack_allowed_channels
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect()
    }

    /// Parse server socket address from host and port configuration.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.slack_signing_secret.is_empty() {
            anyhow::bail!("slack_signing_secret must be set");
        }

        if self.allowed_channel_ids().is_empty() {
            anyhow::bail!("slack_allowed_channels must list at least one channel id");
        }

        if self.infrastructure_config_bucket.is_empty() {
            anyhow::bail!("infrastructure_config_bucket must be set");
        }

        if self.infrastructure_config_staging_key.is_empty() {
            anyhow::bail!("infrastructure_config_staging_key must be set");
        }

        if self.infrastructure_cd_pipeline_name.is_empty() {
            anyhow::bail!("infrastructure_cd_pipeline_name must be set");
        }

        if self.infrastructure_code_bucket.is_empty() {
            anyhow::bail!("infrastructure_code_bucket must be set");
        }

        if self.pipeline_slack_webhook_url.is_empty() {
            anyhow::bail!("pipeline_slack_webhook_url must be set");
        }

        if self.slack_message_relay_topic_arn.is_empty() {
            anyhow::bail!("slack_message_relay_topic_arn must be set");
        }

        if self.rollback_window_days == 0 {
            anyhow::bail!("rollback_window_days must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            slack_signing_secret: String::new(),
            slack_allowed_channels: String::new(),
            infrastructure_config_bucket: String::new(),
            infrastructure_config_staging_key: String::new(),
            infrastructure_cd_pipeline_name: String::new(),
            infrastructure_code_bucket: String::new(),
            pipeline_slack_webhook_url: String::new(),
            slack_message_relay_topic_arn: String::new(),
            rollback_window_days: default_rollback_window_days(),
            release_failure_policy: default_release_failure_policy(),
            rust_log: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_rollback_window_days() -> u32 {
    14
}

fn default_release_failure_policy() -> ReleaseFailurePolicy {
    ReleaseFailurePolicy::Surface
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, env, sync::Mutex};

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct TestEnvGuard {
        _lock: std::sync::MutexGuard<'static, ()>,
        vars: Vec<String>,
        originals: HashMap<String, Option<String>>,
    }

    impl TestEnvGuard {
        fn new() -> Self {
            let lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            Self { _lock: lock, vars: Vec::new(), originals: HashMap::new() }
        }

        fn set_var(&mut self, key: &str, value: &str) {
            if !self.vars.contains(&key.to_string()) {
                self.originals.insert(key.to_string(), env::var(key).ok());
                self.vars.push(key.to_string());
            }
            env::set_var(key, value);
        }
    }

    impl Drop for TestEnvGuard {
        fn drop(&mut self) {
            for var in &self.vars {
                match self.originals.get(var) {
                    Some(Some(value)) => env::set_var(var, value),
                    Some(None) => env::remove_var(var),
                    None => {},
                }
            }
        }
    }

    fn populated_config() -> Config {
        Config {
            slack_signing_secret: "shhh".to_string(),
            slack_allowed_channels: "G3H72T468".to_string(),
            infrastructure_config_bucket: "infra-config".to_string(),
            infrastructure_config_staging_key: "staging/template.yaml".to_string(),
            infrastructure_cd_pipeline_name: "infra-cd".to_string(),
            infrastructure_code_bucket: "infra-code".to_string(),
            pipeline_slack_webhook_url: "https://hooks.example.com/T0/B0/x".to_string(),
            slack_message_relay_topic_arn: "arn:aws:sns:us-east-1:123456789012:relay".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn populated_config_validates() {
        assert!(populated_config().validate().is_ok());
    }

    #[test]
    fn defaults_fail_validation_without_secret() {
        assert!(Config::default().validate().is_err());
    }

    #[test]
    fn allow_list_splits_and_trims() {
        let mut config = populated_config();
        config.slack_allowed_channels = "G3H72T468, C024BE91L ,".to_string();

        let allowed = config.allowed_channel_ids();
        assert_eq!(allowed.len(), 2);
        assert!(allowed.contains("G3H72T468"));
        assert!(allowed.contains("C024BE91L"));
    }

    #[test]
    fn env_overrides_take_priority() {
        let mut guard = TestEnvGuard::new();
        guard.set_var("SLACK_SIGNING_SECRET", "env-secret");
        guard.set_var("SLACK_ALLOWED_CHANNELS", "G3H72T468");
        guard.set_var("INFRASTRUCTURE_CONFIG_BUCKET", "env-config-bucket");
        guard.set_var("INFRASTRUCTURE_CONFIG_STAGING_KEY", "staging/template.yaml");
        guard.set_var("INFRASTRUCTURE_CD_PIPELINE_NAME", "env-pipeline");
        guard.set_var("INFRASTRUCTURE_CODE_BUCKET", "env-code-bucket");
        guard.set_var("PIPELINE_SLACK_WEBHOOK_URL", "https://hooks.example.com/T0/B0/x");
        guard.set_var("SLACK_MESSAGE_RELAY_TOPIC_ARN", "arn:aws:sns:us-east-1:123456789012:relay");
        guard.set_var("PORT", "9090");
        guard.set_var("ROLLBACK_WINDOW_DAYS", "7");
        guard.set_var("RELEASE_FAILURE_POLICY", "acknowledge");

        let config = Config::load().expect("Config should load with env overrides");

        assert_eq!(config.slack_signing_secret, "env-secret");
        assert_eq!(config.port, 9090);
        assert_eq!(config.rollback_window_days, 7);
        assert_eq!(config.release_failure_policy, ReleaseFailurePolicy::Acknowledge);
        assert_eq!(config.infrastructure_config_bucket, "env-config-bucket");
        assert_eq!(config.infrastructure_config_staging_key, "staging/template.yaml");
        assert_eq!(config.infrastructure_cd_pipeline_name, "env-pipeline");
        assert_eq!(config.infrastructure_code_bucket, "env-code-bucket");
        assert_eq!(config.pipeline_slack_webhook_url, "https://hooks.example.com/T0/B0/x");
    }

    #[test]
    fn invalid_config_validation_fails() {
        let mut config = populated_config();
        config.port = 0;
        assert!(config.validate().is_err());

        config = populated_config();
        config.slack_allowed_channels = " , ".to_string();
        assert!(config.validate().is_err());

        config = populated_config();
        config.rollback_window_days = 0;
        assert!(config.validate().is_err());

        config = populated_config();
        config.infrastructure_cd_pipeline_name = String::new();
        assert!(config.validate().is_err());

        config = populated_config();
        config.slack_message_relay_topic_arn = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn socket_address_parsing() {
        let mut config = populated_config();
        config.host = "127.0.0.1".to_string();
        config.port = 9000;

        let addr = config.parse_server_addr().expect("Should parse socket address");

        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 9000);
    }
}
