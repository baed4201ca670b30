//! Configuration loading and management

use anyhow::{Context, Result, bail};
use report_notifier_adapters::state::DEFAULT_GCS_BASE_URL;
use report_notifier_domain::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Prefix for environment overrides, e.g. `REPORT_NOTIFIER__STATE__BUCKET`
pub const ENV_PREFIX: &str = "REPORT_NOTIFIER";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub state: StateConfig,

    #[serde(default)]
    pub reports: ReportsConfig,

    #[serde(default)]
    pub notify: NotifyConfig,

    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    #[serde(default)]
    pub bucket: String,

    #[serde(default = "default_blob")]
    pub blob: String,

    #[serde(default = "default_storage_base_url")]
    pub base_url: String,

    #[serde(default = "default_access_token_env")]
    pub access_token_env: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    #[serde(default)]
    pub endpoint: String,

    /// Static, non-secret request headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Header name -> environment variable holding its value
    #[serde(default)]
    pub secret_headers: BTreeMap<String, String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_webhook_url_env")]
    pub webhook_url_env: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_blob() -> String {
    "reported_posts.json".to_string()
}

fn default_storage_base_url() -> String {
    DEFAULT_GCS_BASE_URL.to_string()
}

fn default_access_token_env() -> String {
    "GCS_ACCESS_TOKEN".to_string()
}

fn default_webhook_url_env() -> String {
    "SLACK_WEBHOOK_URL".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    RetryPolicy::DEFAULT_MAX_ATTEMPTS
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            blob: default_blob(),
            base_url: default_storage_base_url(),
            access_token_env: default_access_token_env(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            headers: BTreeMap::new(),
            secret_headers: BTreeMap::new(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url_env: default_webhook_url_env(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts)
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Log level from config, if it loads; used before logging is set up
    pub fn peek_log_level(config_path: Option<&Path>) -> Option<String> {
        Self::load(config_path).ok().map(|c| c.general.log_level)
    }

    /// Check the settings a run cannot proceed without
    pub fn validate(&self) -> Result<()> {
        if self.state.bucket.trim().is_empty() {
            bail!("state.bucket is not configured");
        }
        if self.state.blob.trim().is_empty() {
            bail!("state.blob is not configured");
        }
        if self.reports.endpoint.trim().is_empty() {
            bail!("reports.endpoint is not configured");
        }
        Ok(())
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# report-notifier configuration

[general]
log_level = "info"
dry_run = false

[state]
# Bucket and object holding the JSON array of already-notified post IDs
bucket = "my-reports-bucket"
blob = "reported_posts.json"
base_url = "https://storage.googleapis.com"
# Env var holding an OAuth2 access token with devstorage.read_write scope
access_token_env = "GCS_ACCESS_TOKEN"
timeout_secs = 30

[reports]
endpoint = "https://api.example.com/v1/reported-posts"
timeout_secs = 30

[reports.headers]
Accept = "application/json"

# Header name = env var holding the value
[reports.secret_headers]
Authorization = "REPORTS_API_AUTHORIZATION"

[notify]
webhook_url_env = "SLACK_WEBHOOK_URL"
timeout_secs = 30

[retry]
# Total attempts for connection failures; HTTP error statuses are never retried
max_attempts = 3
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_toml_parses() {
        let config: AppConfig = toml::from_str(&AppConfig::example_toml()).unwrap();

        assert_eq!(config.state.bucket, "my-reports-bucket");
        assert_eq!(config.state.blob, "reported_posts.json");
        assert_eq!(
            config.reports.secret_headers.get("Authorization"),
            Some(&"REPORTS_API_AUTHORIZATION".to_string())
        );
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.state.base_url, DEFAULT_GCS_BASE_URL);
        assert_eq!(config.notify.webhook_url_env, "SLACK_WEBHOOK_URL");
        assert_eq!(config.retry.policy().max_attempts(), 3);
        assert!(!config.general.dry_run);
    }

    #[test]
    fn test_validate_requires_bucket_and_endpoint() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_err());

        config.state.bucket = "bucket".to_string();
        assert!(config.validate().is_err());

        config.reports.endpoint = "https://api.example.com/reports".to_string();
        assert!(config.validate().is_ok());
    }
}
